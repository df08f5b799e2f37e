//! Scheduler event types and externally-injected event payloads.
//!
//! `EventKind` is the closed set of things the scheduler knows how to label;
//! `ExternalEvent` is the wire-facing payload family that crosses the match
//! boundary (bench decisions, touchline shouts) and gets recorded for
//! replay.

use serde::{Deserialize, Serialize};

/// Discriminant for every scheduled event. Closed set; the scheduler never
/// interprets these beyond logging and bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    BallPhysics,
    PlayerPhysics,
    Vision,
    Shout,
    PlayerAi,
    HeadAi,
    HeadPhysics,
    TacticalChange,
    Substitution,
    Referee,
    External,
    Debug,
}

/// Payload attached to a scheduled event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPayload {
    None,
    /// Index into the match's active-player table.
    Player(u32),
    External(ExternalEvent),
}

impl Default for EventPayload {
    fn default() -> Self {
        EventPayload::None
    }
}

/// Touchline shouts a coach or captain can aim at a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShoutKind {
    PressHigh,
    PressHarder,
    HoldPosition,
    GetForward,
    TrackBack,
    DemandMore,
    Encourage,
    Focus,
    Concentrate,
    CalmDown,
    Relax,
    HaveFun,
    Criticize,
    CloseDown,
}

/// Team mentality for a tactical change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mentality {
    VeryDefensive,
    Defensive,
    Balanced,
    Attacking,
    VeryAttacking,
}

/// Team-level instruction tweaks riding on a tactical change.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamInstructions {
    /// Tactical width in `[0, 1]`; maps onto the formation region's side
    /// edges.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    /// Push the whole shape up (+) or drop it off (-), meters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_shift_m: Option<f32>,
}

/// Externally-originated events. These are the only non-deterministic inputs
/// a match accepts; each one is recorded with its assigned `(tick, seq)` so
/// a replay can reproduce the run bit for bit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExternalEvent {
    Substitution {
        player_out_id: u32,
        player_in_id: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        position_slot: Option<u8>,
    },
    TacticalChange {
        team_id: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        formation_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        instructions: Option<TeamInstructions>,
        #[serde(skip_serializing_if = "Option::is_none")]
        mentality: Option<Mentality>,
    },
    Shout {
        player_id: u32,
        shout: ShoutKind,
    },
}

impl ExternalEvent {
    /// The scheduler label this payload travels under.
    pub fn kind(&self) -> EventKind {
        match self {
            ExternalEvent::Substitution { .. } => EventKind::Substitution,
            ExternalEvent::TacticalChange { .. } => EventKind::TacticalChange,
            ExternalEvent::Shout { .. } => EventKind::Shout,
        }
    }
}
