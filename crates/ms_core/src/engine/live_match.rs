//! The match aggregate.
//!
//! `LiveMatch` owns the world and its scheduler, holds the single-use
//! external-schedule token, and brokers the one legal cross-task entry
//! point for non-deterministic input: a channel of `ExternalEvent`s. Queued
//! input is pumped into the scheduler immediately before every drain, so an
//! injected event always lands on a tick the simulation has not reached,
//! and every injection is recorded for replay.

use std::sync::mpsc::{channel, Receiver, Sender};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::replay::ReplayLog;

use super::config::EngineConfig;
use super::driver::{HeadlessDriver, RealTimeDriver};
use super::events::ExternalEvent;
use super::geometry::{Vec2, Vec3};
use super::match_engine::{self, MatchSnapshot, MatchWorld};
use super::match_events::{MatchEvent, MatchEventLog};
use super::match_state::PlayState;
use super::scheduler::{EventScheduler, ExternalToken, Tick};
use super::squad::TeamSheet;

/// Everything needed to reproduce a match up to its external inputs.
#[derive(Debug, Clone)]
pub struct MatchSetup {
    pub seed: u64,
    pub config: EngineConfig,
    pub home: TeamSheet,
    pub away: TeamSheet,
}

/// Clonable producer handle for external events. Safe to hand to any
/// thread; the match consumes the queue at its next drain boundary.
#[derive(Debug, Clone)]
pub struct ExternalInput(Sender<ExternalEvent>);

impl ExternalInput {
    /// Queue an event. Returns false once the match has been dropped.
    pub fn send(&self, event: ExternalEvent) -> bool {
        self.0.send(event).is_ok()
    }
}

/// Final numbers handed to the caller after a headless run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub home_name: String,
    pub away_name: String,
    pub home_score: u8,
    pub away_score: u8,
    pub ticks_played: Tick,
    pub events: MatchEventLog,
    pub external_events: ReplayLog,
}

/// One player's slice of a streaming tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerTickData {
    pub id: u32,
    pub team_id: u32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub body_dir: Vec2,
    pub head_world_dir: Vec2,
    pub fatigue: f32,
}

/// What a streaming consumer (renderer, commentary feed) gets per step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickData {
    pub tick: Tick,
    pub play_state: PlayState,
    pub score: (u8, u8),
    pub ball_position: Vec3,
    pub ball_owner: Option<u32>,
    pub players: Vec<PlayerTickData>,
    /// Match events logged since the previous step.
    pub new_events: Vec<MatchEvent>,
}

/// Outcome of one streaming step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepResult {
    /// Normal step; the match continues.
    Tick(TickData),
    /// Full time was reached during this step.
    FullTime(TickData),
}

impl StepResult {
    pub fn data(&self) -> &TickData {
        match self {
            StepResult::Tick(data) | StepResult::FullTime(data) => data,
        }
    }
}

pub struct LiveMatch {
    scheduler: EventScheduler<MatchWorld>,
    world: MatchWorld,
    token: ExternalToken,
    rx: Receiver<ExternalEvent>,
    tx: Sender<ExternalEvent>,
    /// Event-log cursor for `step`'s per-step delta.
    streamed_events: usize,
}

impl LiveMatch {
    pub fn new(setup: MatchSetup) -> Result<Self> {
        let mut world = MatchWorld::new(setup.seed, setup.config, setup.home, setup.away)?;
        let mut scheduler = EventScheduler::new();
        let token = scheduler.take_external_token()?;
        match_engine::initialize(&mut world, &mut scheduler)?;
        let (tx, rx) = channel();
        Ok(Self { scheduler, world, token, rx, tx, streamed_events: 0 })
    }

    pub fn world(&self) -> &MatchWorld {
        &self.world
    }

    pub fn current_tick(&self) -> Tick {
        self.scheduler.current_tick()
    }

    pub fn score(&self) -> (u8, u8) {
        (self.world.state.home_score, self.world.state.away_score)
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        self.world.snapshot()
    }

    pub fn replay_log(&self) -> &ReplayLog {
        &self.world.replay
    }

    /// Producer handle for external events.
    pub fn input_handle(&self) -> ExternalInput {
        ExternalInput(self.tx.clone())
    }

    /// Kick the match off.
    pub fn start(&mut self) {
        self.world.kickoff();
    }

    /// Step the simulation. Pumps queued external input first, so anything
    /// sent before this call is in the run.
    pub fn advance(&mut self, ticks: Tick) -> Result<bool> {
        self.pump();
        self.scheduler.advance(&mut self.world, ticks)
    }

    /// Streaming variant of `advance`: step the simulation and hand back a
    /// consumer-ready frame with the events that happened in it.
    pub fn step(&mut self, ticks: Tick) -> Result<StepResult> {
        self.advance(ticks)?;
        let all_events = self.world.events.events();
        let new_events = all_events[self.streamed_events.min(all_events.len())..].to_vec();
        self.streamed_events = all_events.len();
        let data = TickData {
            tick: self.world.state.time_elapsed_ms,
            play_state: self.world.state.play_state,
            score: (self.world.state.home_score, self.world.state.away_score),
            ball_position: self.world.ball.position(),
            ball_owner: self.world.ball.held_by(),
            players: self
                .world
                .players
                .iter()
                .map(|p| PlayerTickData {
                    id: p.id,
                    team_id: p.team_id,
                    position: p.body.position,
                    velocity: p.body.velocity,
                    body_dir: p.body.body_dir(),
                    head_world_dir: p.body.head_world_dir(),
                    fatigue: p.body.fatigue,
                })
                .collect(),
            new_events,
        };
        Ok(if self.world.finished {
            StepResult::FullTime(data)
        } else {
            StepResult::Tick(data)
        })
    }

    /// Instant result: drain everything and report.
    pub fn run_headless(&mut self) -> Result<MatchReport> {
        self.pump();
        HeadlessDriver::run(&mut self.scheduler, &mut self.world)?;
        Ok(MatchReport {
            home_name: self.world.teams[0].name.clone(),
            away_name: self.world.teams[1].name.clone(),
            home_score: self.world.state.home_score,
            away_score: self.world.state.away_score,
            ticks_played: self.world.state.time_elapsed_ms,
            events: self.world.events.clone(),
            external_events: self.world.replay.clone(),
        })
    }

    /// Pre-run injection of a recorded external-event log, at the exact
    /// ticks it was recorded at. With the same `MatchSetup`, the replayed
    /// match reproduces the original bit for bit.
    pub fn replay_external(&mut self, log: &ReplayLog) -> Result<()> {
        for record in log.iter() {
            let offset = record.tick.saturating_sub(self.scheduler.min_external_tick());
            inject(
                &mut self.scheduler,
                &mut self.world,
                &self.token,
                record.data.clone(),
                offset,
            )?;
        }
        Ok(())
    }

    /// Hand the match to a wall-clock driver. The channel pump rides along
    /// as the driver's pre-drain hook; the returned `ExternalInput` is the
    /// producer side.
    pub fn into_realtime(self) -> (RealTimeDriver<MatchWorld>, ExternalInput) {
        let LiveMatch { scheduler, world, token, rx, tx, .. } = self;
        let mut driver = RealTimeDriver::new(scheduler, world);
        driver.set_before_advance(Box::new(move |sched, world| {
            while let Ok(event) = rx.try_recv() {
                if let Err(err) = inject(sched, world, &token, event, PUMP_OFFSET) {
                    log::warn!("dropping external event: {err}");
                }
            }
        }));
        (driver, ExternalInput(tx))
    }

    fn pump(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            if let Err(err) =
                inject(&mut self.scheduler, &mut self.world, &self.token, event, PUMP_OFFSET)
            {
                log::warn!("dropping external event: {err}");
            }
        }
    }
}

/// Pumped input targets the tick after `min_external_tick`. The tick the
/// last drain closed on has already run its simulation events; landing on
/// the next fresh tick keeps the external-before-simulation ordering
/// identical between a live run and a replay of its log.
const PUMP_OFFSET: Tick = 1;

/// Schedule one external event and record its assigned `(tick, seq)`.
fn inject(
    sched: &mut EventScheduler<MatchWorld>,
    world: &mut MatchWorld,
    token: &ExternalToken,
    event: ExternalEvent,
    offset: Tick,
) -> Result<()> {
    let record = event.clone();
    let apply = event.clone();
    let handle = sched.schedule_external(
        token,
        offset,
        event,
        Box::new(move |world: &mut MatchWorld, _sched, _handle| {
            world.apply_external(&apply);
            Ok(())
        }),
    )?;
    if let Some((tick, seq)) = sched.event_key(&handle) {
        world.replay.push(tick, seq, record);
    }
    Ok(())
}
