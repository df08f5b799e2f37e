//! Scheduler drivers.
//!
//! `RealTimeDriver` paces a scheduler against the wall clock on a worker
//! thread: elapsed milliseconds are scaled by a speed multiplier, the
//! integer part becomes ticks to process and the fraction is carried to the
//! next iteration, so there is no cumulative drift. When no ticks are due
//! the loop yields cooperatively for a while and then backs off to short
//! sleeps.
//!
//! `HeadlessDriver` has no clock at all: it drains the queue to the
//! far-future bound in one call, for instant results.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{DriverError, EngineError, Result, SchedulerError};

use super::scheduler::EventScheduler;

/// Iterations of zero-delay yielding before the idle loop backs off.
const IDLE_SPIN_ITERS: u32 = 50;
/// Sleep length once backed off.
const IDLE_SLEEP: Duration = Duration::from_millis(4);

/// Lifecycle hooks. All run on the worker thread.
#[derive(Default)]
pub struct DriverHooks {
    pub on_start: Option<Box<dyn FnMut() + Send>>,
    pub on_stop: Option<Box<dyn FnMut() + Send>>,
    /// Queue went empty during a drain. The driver keeps running; events may
    /// still be scheduled later (externally or by a restarted subscription).
    pub on_drain: Option<Box<dyn FnMut() + Send>>,
    /// Entered the idle (no ticks due) state.
    pub on_idle: Option<Box<dyn FnMut() + Send>>,
    pub on_error: Option<Box<dyn FnMut(&EngineError) + Send>>,
}

/// Hook run before every drain; the match aggregate uses it to pump
/// externally queued input into the scheduler.
pub type BeforeAdvance<T> = Box<dyn FnMut(&mut EventScheduler<T>, &mut T) + Send>;

struct WorkerState<T> {
    scheduler: EventScheduler<T>,
    ctx: T,
    hooks: DriverHooks,
    before_advance: Option<BeforeAdvance<T>>,
}

/// Wall-clock pacing driver. Owns the scheduler and its context; both move
/// onto the worker thread while running and come back on `stop`.
pub struct RealTimeDriver<T> {
    state: Option<WorkerState<T>>,
    worker: Option<JoinHandle<WorkerState<T>>>,
    stop_flag: Arc<AtomicBool>,
    speed_bits: Arc<AtomicU64>,
    last_error: Arc<Mutex<Option<EngineError>>>,
}

impl<T: Send + 'static> RealTimeDriver<T> {
    pub fn new(scheduler: EventScheduler<T>, ctx: T) -> Self {
        Self {
            state: Some(WorkerState {
                scheduler,
                ctx,
                hooks: DriverHooks::default(),
                before_advance: None,
            }),
            worker: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
            speed_bits: Arc::new(AtomicU64::new(1.0f64.to_bits())),
            last_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Current speed multiplier (1.0 = real time).
    pub fn speed(&self) -> f64 {
        f64::from_bits(self.speed_bits.load(Ordering::Relaxed))
    }

    /// Set the speed multiplier. Takes effect on the next loop iteration;
    /// legal while running.
    pub fn set_speed(&self, speed: f64) -> Result<(), DriverError> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(DriverError::InvalidSpeed(speed));
        }
        self.speed_bits.store(speed.to_bits(), Ordering::Relaxed);
        Ok(())
    }

    /// Error that aborted the last run, if any.
    pub fn take_last_error(&self) -> Option<EngineError> {
        self.last_error.lock().ok().and_then(|mut guard| guard.take())
    }

    pub fn hooks_mut(&mut self) -> Option<&mut DriverHooks> {
        self.state.as_mut().map(|s| &mut s.hooks)
    }

    pub fn set_before_advance(&mut self, hook: BeforeAdvance<T>) {
        if let Some(state) = self.state.as_mut() {
            state.before_advance = Some(hook);
        }
    }

    /// Scheduler access while stopped (e.g. to seed events before `run`).
    pub fn scheduler_mut(&mut self) -> Option<&mut EventScheduler<T>> {
        self.state.as_mut().map(|s| &mut s.scheduler)
    }

    /// Context access while stopped.
    pub fn context_mut(&mut self) -> Option<&mut T> {
        self.state.as_mut().map(|s| &mut s.ctx)
    }

    /// Give up the driver and recover the scheduler and context. `None`
    /// while running.
    pub fn into_parts(mut self) -> Option<(EventScheduler<T>, T)> {
        self.state.take().map(|s| (s.scheduler, s.ctx))
    }

    /// Start the pacing loop on a worker thread. Non-blocking. Scheduler
    /// state is preserved across stop/run cycles.
    pub fn run(&mut self) -> Result<(), DriverError> {
        if self.worker.is_some() {
            return Err(DriverError::AlreadyRunning);
        }
        let state = self.state.take().ok_or(DriverError::WorkerPanicked)?;
        self.stop_flag.store(false, Ordering::SeqCst);
        let stop_flag = Arc::clone(&self.stop_flag);
        let speed_bits = Arc::clone(&self.speed_bits);
        let last_error = Arc::clone(&self.last_error);
        log::debug!("real-time driver starting at speed {}", self.speed());
        self.worker = Some(thread::spawn(move || {
            run_loop(state, &stop_flag, &speed_bits, &last_error)
        }));
        Ok(())
    }

    /// Request a stop and wait for the loop to exit. The in-flight drain
    /// completes first. Safe to call when not running.
    pub fn stop(&mut self) -> Result<(), DriverError> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        self.stop_flag.store(true, Ordering::SeqCst);
        match worker.join() {
            Ok(state) => {
                self.state = Some(state);
                log::debug!("real-time driver stopped");
                Ok(())
            }
            Err(_) => Err(DriverError::WorkerPanicked),
        }
    }
}

fn run_loop<T>(
    mut state: WorkerState<T>,
    stop_flag: &AtomicBool,
    speed_bits: &AtomicU64,
    last_error: &Mutex<Option<EngineError>>,
) -> WorkerState<T> {
    if let Some(hook) = state.hooks.on_start.as_mut() {
        hook();
    }
    let mut carry: f64 = 0.0;
    let mut last = Instant::now();
    let mut idle_iters: u32 = 0;
    loop {
        if stop_flag.load(Ordering::SeqCst) {
            break;
        }
        let now = Instant::now();
        // Monotonic clock, but clamp anyway: a negative delta must never be
        // folded into the carry.
        let dt_ms = now.duration_since(last).as_secs_f64() * 1000.0;
        last = now;
        let speed = f64::from_bits(speed_bits.load(Ordering::Relaxed));
        let scaled = dt_ms.max(0.0) * speed + carry;
        let ticks = scaled.floor().max(0.0).min(u32::MAX as f64) as u32;
        carry = (scaled - ticks as f64).max(0.0);
        if ticks > 0 {
            if let Some(pump) = state.before_advance.as_mut() {
                pump(&mut state.scheduler, &mut state.ctx);
            }
            match state.scheduler.advance(&mut state.ctx, ticks) {
                Ok(has_pending) => {
                    if !has_pending {
                        if let Some(hook) = state.hooks.on_drain.as_mut() {
                            hook();
                        }
                    }
                }
                Err(err) => {
                    log::error!("real-time drive aborted: {err}");
                    if let Some(hook) = state.hooks.on_error.as_mut() {
                        hook(&err);
                    }
                    if let Ok(mut guard) = last_error.lock() {
                        *guard = Some(err);
                    }
                    break;
                }
            }
            idle_iters = 0;
        } else {
            if idle_iters == 0 {
                if let Some(hook) = state.hooks.on_idle.as_mut() {
                    hook();
                }
            }
            if idle_iters < IDLE_SPIN_ITERS {
                thread::yield_now();
            } else {
                thread::sleep(IDLE_SLEEP);
            }
            idle_iters = idle_iters.saturating_add(1);
        }
    }
    if let Some(hook) = state.hooks.on_stop.as_mut() {
        hook();
    }
    state
}

/// Clockless driver: one call, full drain, instant result.
pub struct HeadlessDriver;

impl HeadlessDriver {
    /// Drain the scheduler to the far-future bound. Returns whether events
    /// remain (they can only remain if a callback errored out first).
    pub fn run<T>(scheduler: &mut EventScheduler<T>, ctx: &mut T) -> Result<bool> {
        log::debug!("headless drive from tick {}", scheduler.current_tick());
        match scheduler.run_until_end(ctx) {
            Err(EngineError::Scheduler(SchedulerError::Reentrancy)) => {
                Err(DriverError::AlreadyRunning.into())
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::events::{EventKind, EventPayload};
    use std::sync::atomic::AtomicU32;

    #[derive(Default)]
    struct Counter {
        fired: u32,
    }

    #[test]
    fn test_headless_runs_to_completion() {
        let mut sched: EventScheduler<Counter> = EventScheduler::new();
        let mut ctx = Counter::default();
        sched.schedule(
            10,
            EventKind::Debug,
            EventPayload::None,
            Box::new(|ctx: &mut Counter, sched, handle| {
                ctx.fired += 1;
                if ctx.fired < 5 {
                    sched.reschedule(&handle, 10)?;
                }
                Ok(())
            }),
        );
        let pending = HeadlessDriver::run(&mut sched, &mut ctx).unwrap();
        assert!(!pending);
        assert_eq!(ctx.fired, 5);
    }

    #[test]
    fn test_realtime_processes_wall_clock_ticks() {
        let sched: EventScheduler<Counter> = EventScheduler::new();
        let mut driver = RealTimeDriver::new(sched, Counter::default());
        driver.set_speed(2.0).unwrap();
        driver.run().unwrap();
        thread::sleep(Duration::from_millis(250));
        driver.stop().unwrap();
        let (sched, _) = driver.into_parts().unwrap();
        // ~250 ms at speed 2.0 is ~500 ticks; leave wide margins for CI
        // scheduling noise, but it must clearly track the clock.
        let ticks = sched.current_tick();
        assert!(ticks >= 300, "expected >= 300 ticks, got {ticks}");
        assert!(ticks <= 900, "expected <= 900 ticks, got {ticks}");
    }

    #[test]
    fn test_realtime_fires_events() {
        let mut sched: EventScheduler<Counter> = EventScheduler::new();
        sched.schedule(
            1,
            EventKind::Debug,
            EventPayload::None,
            Box::new(|ctx: &mut Counter, sched, handle| {
                ctx.fired += 1;
                sched.reschedule(&handle, 10)?;
                Ok(())
            }),
        );
        let mut driver = RealTimeDriver::new(sched, Counter::default());
        driver.run().unwrap();
        thread::sleep(Duration::from_millis(100));
        driver.stop().unwrap();
        let (_, ctx) = driver.into_parts().unwrap();
        assert!(ctx.fired > 0);
    }

    #[test]
    fn test_stop_and_restart_preserves_state() {
        let sched: EventScheduler<Counter> = EventScheduler::new();
        let mut driver = RealTimeDriver::new(sched, Counter::default());
        driver.run().unwrap();
        thread::sleep(Duration::from_millis(60));
        driver.stop().unwrap();
        let first = driver.scheduler_mut().unwrap().current_tick();
        assert!(first > 0);
        driver.run().unwrap();
        thread::sleep(Duration::from_millis(60));
        driver.stop().unwrap();
        let second = driver.scheduler_mut().unwrap().current_tick();
        assert!(second > first, "clock went backwards: {first} -> {second}");
    }

    #[test]
    fn test_run_twice_rejected() {
        let sched: EventScheduler<Counter> = EventScheduler::new();
        let mut driver = RealTimeDriver::new(sched, Counter::default());
        driver.run().unwrap();
        assert!(matches!(driver.run(), Err(DriverError::AlreadyRunning)));
        driver.stop().unwrap();
    }

    #[test]
    fn test_speed_validation() {
        let sched: EventScheduler<Counter> = EventScheduler::new();
        let driver = RealTimeDriver::new(sched, Counter::default());
        assert!(driver.set_speed(0.0).is_err());
        assert!(driver.set_speed(-2.0).is_err());
        assert!(driver.set_speed(f64::NAN).is_err());
        assert!(driver.set_speed(f64::INFINITY).is_err());
        assert!(driver.set_speed(0.25).is_ok());
        assert_eq!(driver.speed(), 0.25);
    }

    #[test]
    fn test_callback_error_captured_and_hooks_fire() {
        let mut sched: EventScheduler<Counter> = EventScheduler::new();
        sched.schedule(
            1,
            EventKind::Debug,
            EventPayload::None,
            Box::new(|_: &mut Counter, _, _| {
                Err(EngineError::Callback { tick: 1, message: "deliberate".into() })
            }),
        );
        let mut driver = RealTimeDriver::new(sched, Counter::default());
        let errored = Arc::new(AtomicBool::new(false));
        let stopped = Arc::new(AtomicBool::new(false));
        let started = Arc::new(AtomicU32::new(0));
        {
            let hooks = driver.hooks_mut().unwrap();
            let e = Arc::clone(&errored);
            hooks.on_error = Some(Box::new(move |_| e.store(true, Ordering::SeqCst)));
            let s = Arc::clone(&stopped);
            hooks.on_stop = Some(Box::new(move || s.store(true, Ordering::SeqCst)));
            let st = Arc::clone(&started);
            hooks.on_start = Some(Box::new(move || {
                st.fetch_add(1, Ordering::SeqCst);
            }));
        }
        driver.run().unwrap();
        thread::sleep(Duration::from_millis(100));
        driver.stop().unwrap();
        assert!(errored.load(Ordering::SeqCst));
        assert!(stopped.load(Ordering::SeqCst));
        assert_eq!(started.load(Ordering::SeqCst), 1);
        let err = driver.take_last_error().expect("error should be captured");
        assert!(matches!(err, EngineError::Callback { .. }));
        // Captured once; a second take is empty.
        assert!(driver.take_last_error().is_none());
    }
}
