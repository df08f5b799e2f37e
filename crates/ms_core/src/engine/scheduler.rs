//! Tick event scheduler.
//!
//! A binary min-heap of events keyed by `(tick, seq)`. One tick is one
//! millisecond of simulated time. Sequence numbers live in two disjoint
//! bands — externally injected events draw from `[0, 1M)`, simulation
//! events from `[1M, ..)` — so at equal tick every external event fires
//! before every simulation event, and two runs that schedule in the same
//! order replay identically.
//!
//! Events are stored in a generational slab owned by the scheduler; an
//! `EventHandle` is a copyable id into it. Handles go stale when the event
//! fires or is cancelled, and stale handles are detected, never dangling.
//!
//! Callbacks run to completion one at a time during a drain. A callback may
//! schedule, reschedule (including its own handle, which is how every
//! repeating subscription re-arms itself), and cancel freely; it may not
//! start a nested drain.

use crate::error::{Result, SchedulerError};

use super::events::{EventKind, EventPayload, ExternalEvent};
use std::sync::atomic::{AtomicU32, Ordering};

/// Simulated time in milliseconds.
pub type Tick = u32;

/// Upper bound used by `run_until_end`: far past any real match.
pub const TICK_FOREVER: Tick = 100_000_000;

/// First sequence number of the simulation band. Everything below is
/// reserved for external events.
pub const EXTERNAL_SEQ_BAND: u64 = 1_000_000;

/// Callback invoked when an event fires. Receives the shared context, the
/// scheduler (for re-arming and follow-up scheduling), and the firing
/// event's own handle.
pub type EventCallback<T> =
    Box<dyn FnMut(&mut T, &mut EventScheduler<T>, EventHandle) -> Result<()> + Send>;

/// Hook fired once per processed tick that had events.
pub type TickHook<T> = Box<dyn FnMut(&mut T, Tick) + Send>;

static NEXT_SCHEDULER_ID: AtomicU32 = AtomicU32::new(1);

/// Copyable reference to a scheduled event. Stale after fire or cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventHandle {
    slot: u32,
    generation: u32,
    scheduler_id: u32,
}

/// Single-use capability for injecting external events. Returned exactly
/// once per scheduler by `take_external_token`; whoever holds it is the only
/// party that can schedule into the external sequence band. Deliberately
/// neither `Clone` nor `Copy`.
#[derive(Debug)]
pub struct ExternalToken {
    scheduler_id: u32,
}

struct EventEntry<T> {
    tick: Tick,
    seq: u64,
    kind: EventKind,
    payload: EventPayload,
    callback: Option<EventCallback<T>>,
    /// Position in the heap; `None` when not queued (firing or fired).
    heap_pos: Option<u32>,
}

struct Slot<T> {
    generation: u32,
    entry: Option<EventEntry<T>>,
}

/// Min-heap tick scheduler. `T` is the shared simulation context handed to
/// every callback.
pub struct EventScheduler<T> {
    id: u32,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    heap: Vec<u32>,
    current_tick: Tick,
    next_sim_seq: u64,
    next_ext_seq: u64,
    min_external_tick: Tick,
    running: bool,
    external_token_taken: bool,
    on_tick: Option<TickHook<T>>,
}

impl<T> Default for EventScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventScheduler<T> {
    pub fn new() -> Self {
        Self {
            id: NEXT_SCHEDULER_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
            free: Vec::new(),
            heap: Vec::new(),
            current_tick: 0,
            next_sim_seq: EXTERNAL_SEQ_BAND,
            next_ext_seq: 0,
            min_external_tick: 0,
            running: false,
            external_token_taken: false,
            on_tick: None,
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    #[inline]
    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    #[inline]
    pub fn next_tick(&self) -> Tick {
        self.current_tick + 1
    }

    #[inline]
    pub fn event_count(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn has_pending_events(&self) -> bool {
        !self.heap.is_empty()
    }

    /// Tick of the earliest queued event, if any.
    pub fn next_scheduled_tick(&self) -> Option<Tick> {
        self.heap.first().map(|&slot| self.key_of(slot).0)
    }

    #[inline]
    pub fn min_external_tick(&self) -> Tick {
        self.min_external_tick
    }

    /// True while a handle still refers to a queued event.
    pub fn is_pending(&self, handle: &EventHandle) -> bool {
        self.live_entry(handle).map_or(false, |e| e.heap_pos.is_some())
    }

    /// The `(tick, seq)` key a live handle is queued under. Used by the
    /// match aggregate to record external events for replay.
    pub fn event_key(&self, handle: &EventHandle) -> Option<(Tick, u64)> {
        self.live_entry(handle).map(|e| (e.tick, e.seq))
    }

    /// The kind a live handle was scheduled under.
    pub fn event_kind(&self, handle: &EventHandle) -> Option<EventKind> {
        self.live_entry(handle).map(|e| e.kind)
    }

    /// The payload a live handle carries.
    pub fn event_payload(&self, handle: &EventHandle) -> Option<&EventPayload> {
        self.live_entry(handle).map(|e| &e.payload)
    }

    /// Install the per-tick hook (at most one).
    pub fn set_on_tick(&mut self, hook: TickHook<T>) {
        self.on_tick = Some(hook);
    }

    // ------------------------------------------------------------------
    // Scheduling
    // ------------------------------------------------------------------

    /// Schedule a simulation event `offset` ticks from now. During a drain,
    /// "now" is the tick being processed, so an offset of zero lands later
    /// in the same tick (after every event already queued for it).
    pub fn schedule(
        &mut self,
        offset: Tick,
        kind: EventKind,
        payload: EventPayload,
        callback: EventCallback<T>,
    ) -> EventHandle {
        let tick = self.current_tick.saturating_add(offset);
        let seq = self.next_sim_seq;
        self.next_sim_seq += 1;
        self.insert(tick, seq, kind, payload, callback)
    }

    /// Move an event to `current_tick + offset` with a fresh simulation
    /// sequence number. Re-queues the event if it has already been popped
    /// for firing — this is the self-rescheduling idiom. Returns `false`
    /// for a stale handle.
    pub fn reschedule(&mut self, handle: &EventHandle, offset: Tick) -> Result<bool, SchedulerError> {
        if handle.scheduler_id != self.id {
            return Err(SchedulerError::ForeignEvent);
        }
        if self.live_entry(handle).is_none() {
            return Ok(false);
        }
        let tick = self.current_tick.saturating_add(offset);
        let seq = self.next_sim_seq;
        self.next_sim_seq += 1;
        let slot = handle.slot as usize;
        let entry = self.slots[slot]
            .entry
            .as_mut()
            .expect("live entry vanished");
        entry.tick = tick;
        entry.seq = seq;
        match entry.heap_pos {
            Some(pos) => {
                // Key changed in place; one of the two sifts restores order.
                self.sift_up(pos as usize);
                let pos = self.position_of(handle.slot);
                self.sift_down(pos);
            }
            None => self.heap_push(handle.slot),
        }
        Ok(true)
    }

    /// Remove a pending event. Returns `false` if it already fired or was
    /// cancelled (idempotent).
    pub fn cancel(&mut self, handle: &EventHandle) -> Result<bool, SchedulerError> {
        if handle.scheduler_id != self.id {
            return Err(SchedulerError::ForeignEvent);
        }
        let Some(entry) = self.live_entry(handle) else {
            return Ok(false);
        };
        let Some(pos) = entry.heap_pos else {
            // Mid-fire: the event is no longer queued.
            return Ok(false);
        };
        self.heap_remove_at(pos as usize);
        self.free_slot(handle.slot);
        Ok(true)
    }

    /// Hand out the single-use external scheduling capability.
    pub fn take_external_token(&mut self) -> Result<ExternalToken, SchedulerError> {
        if self.external_token_taken {
            return Err(SchedulerError::ExternalTokenTaken);
        }
        self.external_token_taken = true;
        Ok(ExternalToken { scheduler_id: self.id })
    }

    /// Schedule an externally-originated event. The target tick is computed
    /// from `min_external_tick`, which is bumped past the tick currently
    /// being processed, so an external event can never be injected into the
    /// running tick. External sequence numbers sort before every simulation
    /// event at the same tick.
    pub fn schedule_external(
        &mut self,
        token: &ExternalToken,
        offset: Tick,
        payload: ExternalEvent,
        callback: EventCallback<T>,
    ) -> Result<EventHandle, SchedulerError> {
        if token.scheduler_id != self.id {
            return Err(SchedulerError::ForeignEvent);
        }
        if self.next_ext_seq >= EXTERNAL_SEQ_BAND {
            return Err(SchedulerError::ExternalBandExhausted);
        }
        let tick = self.min_external_tick.saturating_add(offset);
        let seq = self.next_ext_seq;
        self.next_ext_seq += 1;
        let kind = payload.kind();
        Ok(self.insert(tick, seq, kind, EventPayload::External(payload), callback))
    }

    // ------------------------------------------------------------------
    // Draining
    // ------------------------------------------------------------------

    /// Process every event due within the next `ticks` ticks. On success the
    /// scheduler's clock sits exactly `ticks` past where it started, whether
    /// or not the queue emptied earlier. Returns whether events remain.
    pub fn advance(&mut self, ctx: &mut T, ticks: Tick) -> Result<bool> {
        let target = self.current_tick.saturating_add(ticks);
        self.drain(ctx, target)?;
        Ok(self.has_pending_events())
    }

    /// Drain against the far-future sentinel bound. Used by the headless
    /// driver for instant results.
    pub fn run_until_end(&mut self, ctx: &mut T) -> Result<bool> {
        self.drain(ctx, TICK_FOREVER)?;
        Ok(self.has_pending_events())
    }

    fn drain(&mut self, ctx: &mut T, target: Tick) -> Result<()> {
        if self.running {
            return Err(SchedulerError::Reentrancy.into());
        }
        self.running = true;
        let result = self.drain_inner(ctx, target);
        self.running = false;
        if result.is_ok() {
            self.current_tick = target;
            self.min_external_tick = target;
        } else {
            log::debug!(
                "drain aborted at tick {} ({} events left)",
                self.current_tick,
                self.heap.len()
            );
        }
        result
    }

    fn drain_inner(&mut self, ctx: &mut T, target: Tick) -> Result<()> {
        while let Some(&root) = self.heap.first() {
            let tick = self.key_of(root).0;
            if tick > target {
                break;
            }
            self.current_tick = tick;
            // External injections from inside callbacks land at tick + 1 or
            // later; the running tick is closed to them.
            self.min_external_tick = tick.saturating_add(1);
            while let Some(&root) = self.heap.first() {
                if self.key_of(root).0 != tick {
                    break;
                }
                self.pop_and_fire(ctx)?;
            }
            if let Some(mut hook) = self.on_tick.take() {
                hook(ctx, tick);
                self.on_tick = Some(hook);
            }
        }
        Ok(())
    }

    fn pop_and_fire(&mut self, ctx: &mut T) -> Result<()> {
        let slot = self.heap_pop_root();
        let generation = self.slots[slot as usize].generation;
        let handle = EventHandle { slot, generation, scheduler_id: self.id };
        let mut callback = self.slots[slot as usize]
            .entry
            .as_mut()
            .and_then(|e| e.callback.take());
        let result = match callback.as_mut() {
            Some(cb) => cb(ctx, self, handle),
            None => Ok(()),
        };
        // The callback may have re-armed its own handle (back in the heap)
        // or cancelled it outright; only a still-fired event frees the slot.
        if self.slots[slot as usize].generation == generation {
            let rearmed = self.slots[slot as usize]
                .entry
                .as_ref()
                .map_or(false, |e| e.heap_pos.is_some());
            if rearmed {
                if let Some(entry) = self.slots[slot as usize].entry.as_mut() {
                    if entry.callback.is_none() {
                        entry.callback = callback;
                    }
                }
            } else {
                self.free_slot(slot);
            }
        }
        if let Err(err) = &result {
            log::error!("event callback failed at tick {}: {err}", self.current_tick);
        }
        result
    }

    // ------------------------------------------------------------------
    // Reset
    // ------------------------------------------------------------------

    /// Drop every queued event and reset the clock and both sequence bands.
    /// The external token stays taken: the capability is issued once per
    /// scheduler lifetime, not once per match segment. Idempotent.
    pub fn clear(&mut self) {
        for idx in 0..self.slots.len() {
            if self.slots[idx].entry.is_some() {
                self.free_slot(idx as u32);
            }
        }
        self.heap.clear();
        self.current_tick = 0;
        self.next_sim_seq = EXTERNAL_SEQ_BAND;
        self.next_ext_seq = 0;
        self.min_external_tick = 0;
        self.running = false;
    }

    // ------------------------------------------------------------------
    // Slab
    // ------------------------------------------------------------------

    fn insert(
        &mut self,
        tick: Tick,
        seq: u64,
        kind: EventKind,
        payload: EventPayload,
        callback: EventCallback<T>,
    ) -> EventHandle {
        let entry = EventEntry { tick, seq, kind, payload, callback: Some(callback), heap_pos: None };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot as usize].entry = Some(entry);
                slot
            }
            None => {
                let slot = self.slots.len() as u32;
                self.slots.push(Slot { generation: 0, entry: Some(entry) });
                slot
            }
        };
        self.heap_push(slot);
        EventHandle { slot, generation: self.slots[slot as usize].generation, scheduler_id: self.id }
    }

    fn live_entry(&self, handle: &EventHandle) -> Option<&EventEntry<T>> {
        self.slots
            .get(handle.slot as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.entry.as_ref())
    }

    fn free_slot(&mut self, slot: u32) {
        let slot_ref = &mut self.slots[slot as usize];
        slot_ref.entry = None;
        slot_ref.generation = slot_ref.generation.wrapping_add(1);
        self.free.push(slot);
    }

    // ------------------------------------------------------------------
    // Heap
    // ------------------------------------------------------------------

    fn key_of(&self, slot: u32) -> (Tick, u64) {
        let entry = self.slots[slot as usize]
            .entry
            .as_ref()
            .expect("heap references a vacant slot");
        (entry.tick, entry.seq)
    }

    fn position_of(&self, slot: u32) -> usize {
        self.slots[slot as usize]
            .entry
            .as_ref()
            .and_then(|e| e.heap_pos)
            .expect("event not in heap") as usize
    }

    #[inline]
    fn less(&self, a: u32, b: u32) -> bool {
        self.key_of(a) < self.key_of(b)
    }

    fn set_pos(&mut self, heap_index: usize) {
        let slot = self.heap[heap_index];
        if let Some(entry) = self.slots[slot as usize].entry.as_mut() {
            entry.heap_pos = Some(heap_index as u32);
        }
    }

    fn heap_push(&mut self, slot: u32) {
        self.heap.push(slot);
        let pos = self.heap.len() - 1;
        self.set_pos(pos);
        self.sift_up(pos);
    }

    fn heap_pop_root(&mut self) -> u32 {
        let root = self.heap[0];
        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        self.heap.pop();
        if let Some(entry) = self.slots[root as usize].entry.as_mut() {
            entry.heap_pos = None;
        }
        if !self.heap.is_empty() {
            self.set_pos(0);
            self.sift_down(0);
        }
        root
    }

    fn heap_remove_at(&mut self, pos: usize) {
        let removed = self.heap[pos];
        let last = self.heap.len() - 1;
        self.heap.swap(pos, last);
        self.heap.pop();
        if let Some(entry) = self.slots[removed as usize].entry.as_mut() {
            entry.heap_pos = None;
        }
        if pos < self.heap.len() {
            self.set_pos(pos);
            // The replacement may belong above or below its new spot.
            self.sift_up(pos);
            let slot = self.heap[pos];
            let pos = self.position_of(slot);
            self.sift_down(pos);
        }
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.less(self.heap[pos], self.heap[parent]) {
                self.heap.swap(pos, parent);
                self.set_pos(pos);
                self.set_pos(parent);
                pos = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.heap.len();
        loop {
            let left = pos * 2 + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let mut smallest = pos;
            if self.less(self.heap[left], self.heap[smallest]) {
                smallest = left;
            }
            if right < len && self.less(self.heap[right], self.heap[smallest]) {
                smallest = right;
            }
            if smallest == pos {
                break;
            }
            self.heap.swap(pos, smallest);
            self.set_pos(pos);
            self.set_pos(smallest);
            pos = smallest;
        }
    }

    #[cfg(test)]
    fn assert_heap_invariants(&self) {
        for (i, &slot) in self.heap.iter().enumerate() {
            let entry = self.slots[slot as usize].entry.as_ref().unwrap();
            assert_eq!(entry.heap_pos, Some(i as u32), "heap position out of sync");
            if i > 0 {
                let parent = self.heap[(i - 1) / 2];
                assert!(
                    self.key_of(parent) <= self.key_of(slot),
                    "heap order violated at index {i}"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    type Log = Vec<(Tick, u32)>;

    fn noop() -> EventCallback<Log> {
        Box::new(|_, _, _| Ok(()))
    }

    fn logger(tag: u32) -> EventCallback<Log> {
        Box::new(move |log: &mut Log, sched, _| {
            log.push((sched.current_tick(), tag));
            Ok(())
        })
    }

    #[test]
    fn test_empty_advance() {
        let mut sched: EventScheduler<Log> = EventScheduler::new();
        let mut log = Log::new();
        let pending = sched.advance(&mut log, 1000).unwrap();
        assert!(!pending);
        assert_eq!(sched.current_tick(), 1000);
    }

    #[test]
    fn test_same_tick_fifo() {
        let mut sched: EventScheduler<Log> = EventScheduler::new();
        let mut log = Log::new();
        for tag in 1..=3 {
            sched.schedule(100, EventKind::Debug, EventPayload::None, logger(tag));
        }
        sched.advance(&mut log, 200).unwrap();
        assert_eq!(log, vec![(100, 1), (100, 2), (100, 3)]);
        assert_eq!(sched.current_tick(), 200);
    }

    #[test]
    fn test_self_rescheduling() {
        let mut sched: EventScheduler<Log> = EventScheduler::new();
        let mut log = Log::new();
        sched.schedule(
            10,
            EventKind::Debug,
            EventPayload::None,
            Box::new(|log: &mut Log, sched, handle| {
                log.push((sched.current_tick(), 0));
                sched.reschedule(&handle, 10)?;
                Ok(())
            }),
        );
        sched.advance(&mut log, 100).unwrap();
        let ticks: Vec<Tick> = log.iter().map(|&(t, _)| t).collect();
        assert_eq!(ticks, vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
        // Still pending at 110
        assert!(sched.has_pending_events());
        assert_eq!(sched.next_scheduled_tick(), Some(110));
    }

    #[test]
    fn test_external_precedes_simulation() {
        let mut sched: EventScheduler<Log> = EventScheduler::new();
        let mut log = Log::new();
        sched.schedule(5, EventKind::Debug, EventPayload::None, logger(2));
        let token = sched.take_external_token().unwrap();
        let shout = ExternalEvent::Shout {
            player_id: 1,
            shout: crate::engine::events::ShoutKind::Encourage,
        };
        sched.schedule_external(&token, 5, shout, logger(1)).unwrap();
        sched.advance(&mut log, 10).unwrap();
        // Both report tick 5, external first
        assert_eq!(log, vec![(5, 1), (5, 2)]);
    }

    #[test]
    fn test_external_token_single_use() {
        let mut sched: EventScheduler<Log> = EventScheduler::new();
        assert!(sched.take_external_token().is_ok());
        assert!(matches!(
            sched.take_external_token(),
            Err(SchedulerError::ExternalTokenTaken)
        ));
    }

    #[test]
    fn test_external_never_lands_in_running_tick() {
        let mut sched: EventScheduler<Log> = EventScheduler::new();
        let mut log = Log::new();
        // min_external_tick is bumped before callbacks run, so an injection
        // during tick 5 targets tick 6 at the earliest.
        sched.schedule(
            5,
            EventKind::Debug,
            EventPayload::None,
            Box::new(|_log: &mut Log, sched, _| {
                assert_eq!(sched.min_external_tick(), 6);
                Ok(())
            }),
        );
        sched.advance(&mut log, 10).unwrap();
        assert_eq!(sched.min_external_tick(), 10);
    }

    #[test]
    fn test_cancel_twice() {
        let mut sched: EventScheduler<Log> = EventScheduler::new();
        let handle = sched.schedule(50, EventKind::Debug, EventPayload::None, noop());
        assert!(sched.cancel(&handle).unwrap());
        assert!(!sched.cancel(&handle).unwrap());
        assert_eq!(sched.event_count(), 0);
    }

    #[test]
    fn test_cancelled_event_does_not_fire() {
        let mut sched: EventScheduler<Log> = EventScheduler::new();
        let mut log = Log::new();
        let keep = sched.schedule(10, EventKind::Debug, EventPayload::None, logger(1));
        let drop_it = sched.schedule(10, EventKind::Debug, EventPayload::None, logger(2));
        sched.cancel(&drop_it).unwrap();
        sched.advance(&mut log, 20).unwrap();
        assert_eq!(log, vec![(10, 1)]);
        assert!(!sched.is_pending(&keep));
    }

    #[test]
    fn test_foreign_handle_rejected() {
        let mut a: EventScheduler<Log> = EventScheduler::new();
        let mut b: EventScheduler<Log> = EventScheduler::new();
        let handle = a.schedule(10, EventKind::Debug, EventPayload::None, noop());
        assert!(matches!(b.cancel(&handle), Err(SchedulerError::ForeignEvent)));
        assert!(matches!(b.reschedule(&handle, 5), Err(SchedulerError::ForeignEvent)));
    }

    #[test]
    fn test_reschedule_pending_event() {
        let mut sched: EventScheduler<Log> = EventScheduler::new();
        let mut log = Log::new();
        let handle = sched.schedule(10, EventKind::Debug, EventPayload::None, logger(1));
        assert!(sched.reschedule(&handle, 30).unwrap());
        sched.advance(&mut log, 20).unwrap();
        assert!(log.is_empty());
        sched.advance(&mut log, 20).unwrap();
        assert_eq!(log, vec![(30, 1)]);
    }

    #[test]
    fn test_reschedule_stale_handle() {
        let mut sched: EventScheduler<Log> = EventScheduler::new();
        let mut log = Log::new();
        let handle = sched.schedule(5, EventKind::Debug, EventPayload::None, logger(1));
        sched.advance(&mut log, 10).unwrap();
        // Fired and not re-armed: the handle is stale.
        assert!(!sched.reschedule(&handle, 10).unwrap());
        assert!(!sched.is_pending(&handle));
    }

    #[test]
    fn test_reentrant_drain_rejected() {
        let mut sched: EventScheduler<Log> = EventScheduler::new();
        let mut log = Log::new();
        sched.schedule(
            5,
            EventKind::Debug,
            EventPayload::None,
            Box::new(|log: &mut Log, sched, _| {
                let mut inner = Log::new();
                match sched.advance(&mut inner, 10) {
                    Err(EngineError::Scheduler(SchedulerError::Reentrancy)) => {
                        log.push((sched.current_tick(), 99));
                        Ok(())
                    }
                    other => panic!("expected reentrancy error, got {other:?}"),
                }
            }),
        );
        sched.advance(&mut log, 10).unwrap();
        assert_eq!(log, vec![(5, 99)]);
    }

    #[test]
    fn test_callback_error_aborts_drain() {
        let mut sched: EventScheduler<Log> = EventScheduler::new();
        let mut log = Log::new();
        sched.schedule(5, EventKind::Debug, EventPayload::None, logger(1));
        sched.schedule(
            6,
            EventKind::Debug,
            EventPayload::None,
            Box::new(|_: &mut Log, _, _| {
                Err(EngineError::Callback { tick: 6, message: "boom".into() })
            }),
        );
        sched.schedule(7, EventKind::Debug, EventPayload::None, logger(3));
        let err = sched.advance(&mut log, 10).unwrap_err();
        assert!(matches!(err, EngineError::Callback { tick: 6, .. }));
        // First event ran, the failing tick stopped the drain, the rest is
        // intact and a fresh drain picks it up.
        assert_eq!(log, vec![(5, 1)]);
        assert_eq!(sched.current_tick(), 6);
        assert!(sched.has_pending_events());
        sched.advance(&mut log, 10).unwrap();
        assert_eq!(log, vec![(5, 1), (7, 3)]);
    }

    #[test]
    fn test_drain_closure_exact_tick() {
        let mut sched: EventScheduler<Log> = EventScheduler::new();
        let mut log = Log::new();
        sched.schedule(3, EventKind::Debug, EventPayload::None, logger(1));
        sched.advance(&mut log, 1000).unwrap();
        assert_eq!(sched.current_tick(), 1000);
        sched.advance(&mut log, 500).unwrap();
        assert_eq!(sched.current_tick(), 1500);
    }

    #[test]
    fn test_on_tick_hook_once_per_busy_tick() {
        let mut sched: EventScheduler<Log> = EventScheduler::new();
        let mut log = Log::new();
        sched.set_on_tick(Box::new(|log: &mut Log, tick| log.push((tick, 1000))));
        sched.schedule(5, EventKind::Debug, EventPayload::None, logger(1));
        sched.schedule(5, EventKind::Debug, EventPayload::None, logger(2));
        sched.schedule(8, EventKind::Debug, EventPayload::None, logger(3));
        sched.advance(&mut log, 10).unwrap();
        assert_eq!(log, vec![(5, 1), (5, 2), (5, 1000), (8, 3), (8, 1000)]);
    }

    #[test]
    fn test_clear_resets_but_keeps_token() {
        let mut sched: EventScheduler<Log> = EventScheduler::new();
        let mut log = Log::new();
        let handle = sched.schedule(10, EventKind::Debug, EventPayload::None, noop());
        sched.take_external_token().unwrap();
        sched.advance(&mut log, 5).unwrap();
        sched.clear();
        assert_eq!(sched.current_tick(), 0);
        assert_eq!(sched.event_count(), 0);
        assert_eq!(sched.min_external_tick(), 0);
        assert!(!sched.is_pending(&handle));
        assert!(!sched.cancel(&handle).unwrap());
        // Token stays taken across clear
        assert!(matches!(
            sched.take_external_token(),
            Err(SchedulerError::ExternalTokenTaken)
        ));
        // Idempotent
        sched.clear();
        assert_eq!(sched.event_count(), 0);
    }

    #[test]
    fn test_run_until_end_drains_everything() {
        let mut sched: EventScheduler<Log> = EventScheduler::new();
        let mut log = Log::new();
        sched.schedule(1_000_000, EventKind::Debug, EventPayload::None, logger(1));
        let pending = sched.run_until_end(&mut log).unwrap();
        assert!(!pending);
        assert_eq!(log, vec![(1_000_000, 1)]);
        assert_eq!(sched.current_tick(), TICK_FOREVER);
    }

    #[test]
    fn test_event_key_for_replay_recording() {
        let mut sched: EventScheduler<Log> = EventScheduler::new();
        let token = sched.take_external_token().unwrap();
        let ev = ExternalEvent::Shout {
            player_id: 2,
            shout: crate::engine::events::ShoutKind::HoldPosition,
        };
        let handle = sched.schedule_external(&token, 42, ev, noop()).unwrap();
        assert_eq!(sched.event_key(&handle), Some((42, 0)));
        let sim = sched.schedule(42, EventKind::Debug, EventPayload::None, noop());
        assert_eq!(sched.event_key(&sim), Some((42, EXTERNAL_SEQ_BAND)));
    }

    #[test]
    fn test_schedule_inside_callback_same_tick() {
        // An offset-zero schedule from inside a callback fires later in the
        // same tick, after everything already queued for it.
        let mut sched: EventScheduler<Log> = EventScheduler::new();
        let mut log = Log::new();
        sched.schedule(
            5,
            EventKind::Debug,
            EventPayload::None,
            Box::new(|log: &mut Log, sched, _| {
                log.push((sched.current_tick(), 1));
                sched.schedule(0, EventKind::Debug, EventPayload::None, logger(2));
                Ok(())
            }),
        );
        sched.schedule(5, EventKind::Debug, EventPayload::None, logger(3));
        sched.advance(&mut log, 10).unwrap();
        assert_eq!(log, vec![(5, 1), (5, 3), (5, 2)]);
    }

    #[test]
    fn test_heap_invariants_after_mixed_ops() {
        let mut sched: EventScheduler<Log> = EventScheduler::new();
        let mut handles = Vec::new();
        for i in 0..64u32 {
            let offset = (i * 37) % 101;
            handles.push(sched.schedule(offset, EventKind::Debug, EventPayload::None, noop()));
        }
        sched.assert_heap_invariants();
        for (i, handle) in handles.iter().enumerate() {
            if i % 3 == 0 {
                sched.cancel(handle).unwrap();
            } else if i % 3 == 1 {
                sched.reschedule(handle, (i as u32 * 13) % 77).unwrap();
            }
            sched.assert_heap_invariants();
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Events fire in (tick, insertion order) regardless of the
            /// offsets they were scheduled with.
            #[test]
            fn prop_pop_order_is_tick_then_seq(offsets in proptest::collection::vec(0u32..500, 1..60)) {
                let mut sched: EventScheduler<Log> = EventScheduler::new();
                let mut log = Log::new();
                for (i, &offset) in offsets.iter().enumerate() {
                    sched.schedule(offset, EventKind::Debug, EventPayload::None, logger(i as u32));
                }
                sched.advance(&mut log, 500).unwrap();
                prop_assert_eq!(log.len(), offsets.len());
                for pair in log.windows(2) {
                    let (t0, i0) = pair[0];
                    let (t1, i1) = pair[1];
                    prop_assert!(t0 < t1 || (t0 == t1 && i0 < i1));
                }
            }

            /// Cancelling an arbitrary subset never breaks the heap or the
            /// ordering of the survivors.
            #[test]
            fn prop_cancel_subset_keeps_order(
                offsets in proptest::collection::vec(0u32..200, 1..40),
                mask in proptest::collection::vec(any::<bool>(), 40),
            ) {
                let mut sched: EventScheduler<Log> = EventScheduler::new();
                let mut log = Log::new();
                let mut handles = Vec::new();
                for (i, &offset) in offsets.iter().enumerate() {
                    handles.push((i, sched.schedule(offset, EventKind::Debug, EventPayload::None, logger(i as u32))));
                }
                let mut kept = Vec::new();
                for (i, handle) in &handles {
                    if mask[*i % mask.len()] {
                        prop_assert!(sched.cancel(handle).unwrap());
                    } else {
                        kept.push(*i as u32);
                    }
                }
                sched.assert_heap_invariants();
                sched.advance(&mut log, 200).unwrap();
                let fired: Vec<u32> = log.iter().map(|&(_, i)| i).collect();
                let mut expected = kept;
                expected.sort_by_key(|&i| (offsets[i as usize], i));
                prop_assert_eq!(fired, expected);
            }
        }
    }
}
