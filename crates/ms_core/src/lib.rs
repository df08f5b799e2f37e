//! # ms_core - Deterministic Football Match Simulation Core
//!
//! A tick-driven football match engine: a min-heap event scheduler over
//! 1 ms ticks, wall-clock and headless drivers, kinematic ball physics with
//! a drag-crisis model, formation-region spatial math, seek/arrive player
//! steering with anticipatory turning, attribute-driven vision scanning,
//! and a match aggregate that records external inputs for bit-for-bit
//! replay.
//!
//! ## Determinism
//! Same `{seed, config, rosters}` plus the same recorded external events
//! always reproduce the same match, to the byte. The only randomness is
//! the match-owned seeded RNG; the only non-determinism crosses one
//! channel, and everything that crosses it is recorded.
//!
//! Renderers, persistence and competition metadata live outside this crate
//! and consume the typed API.

// Game engine APIs often need many parameters for physics and state
#![allow(clippy::too_many_arguments)]

pub mod engine;
pub mod error;
pub mod replay;

pub use engine::{
    EngineConfig, EventScheduler, ExternalEvent, ExternalInput, HeadlessDriver, LiveMatch,
    MatchReport, MatchSetup, RealTimeDriver, Side, TeamSheet, Tick,
};
pub use error::{ConstraintError, DriverError, EngineError, Result, SchedulerError};
pub use replay::{ExternalRecord, ReplayLog};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
