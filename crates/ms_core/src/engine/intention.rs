//! The AI-to-steering contract.
//!
//! A decision tick produces one `Intention` per player: what the player
//! wants to do, where, how fast, and what to look at. The steering layer
//! translates it into forces; AI handlers never touch velocity directly.

use serde::{Deserialize, Serialize};

use super::geometry::Vec2;
use super::physics_constants::steering as consts;

/// What a player is trying to do. Movement, engagement, on-ball, set-piece
/// and keeper cases share one discriminant; unused payload fields stay
/// `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentionKind {
    #[default]
    Idle,
    MoveToPosition,
    MoveToBall,
    ClosePlayerDown,
    MarkPlayer,
    HoldPosition,
    FaceTarget,
    DribbleToPosition,
    PassToPlayer,
    ShootAtGoal,
    ClearBall,
    TakeSetPiece,
    KeeperHoldLine,
    KeeperClaimBall,
}

/// Requested gait. Base speeds in m/s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedHint {
    #[default]
    Idle,
    Walk,
    Jog,
    Run,
    Sprint,
}

impl SpeedHint {
    pub fn base_speed(self) -> f32 {
        match self {
            SpeedHint::Idle => 0.0,
            SpeedHint::Walk => consts::WALK_SPEED,
            SpeedHint::Jog => consts::JOG_SPEED,
            SpeedHint::Run => consts::RUN_SPEED,
            SpeedHint::Sprint => consts::SPRINT_SPEED,
        }
    }
}

/// How the body travels relative to its facing. `Auto` lets the arrive
/// behavior resolve a concrete mode from the approach geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementMode {
    #[default]
    Auto,
    Forward,
    Backward,
    StrafeLeft,
    StrafeRight,
}

impl MovementMode {
    /// Speed penalty for moving off the body axis.
    pub fn speed_multiplier(self) -> f32 {
        match self {
            MovementMode::Auto | MovementMode::Forward => 1.0,
            MovementMode::Backward => consts::BACKWARD_MULT,
            MovementMode::StrafeLeft | MovementMode::StrafeRight => consts::STRAFE_MULT,
        }
    }
}

/// Why the AI chose this intention; carried for telemetry and debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TacticalReason {
    #[default]
    None,
    HoldShape,
    Pressing,
    Support,
    Recovery,
    SetPiece,
    KeeperDuty,
}

/// A call between teammates riding on an intention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerSignal {
    CallForBall,
    LeaveIt,
    ManOn,
    TimeAvailable,
}

/// Per-player AI output, rewritten on every decision tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Intention {
    pub kind: IntentionKind,
    pub target_position: Option<Vec2>,
    pub target_velocity: Option<Vec2>,
    pub target_player_id: Option<u32>,
    /// Direction to face on arrival.
    pub face_target: Option<Vec2>,
    /// Point the head should track.
    pub look_at_target: Option<Vec2>,
    pub speed_hint: SpeedHint,
    pub movement_mode: MovementMode,
    /// Point the next vision scan should favor.
    pub scan_target: Option<Vec2>,
    /// Kick power for on-ball intentions (m/s).
    pub power: Option<f32>,
    /// Curve for on-ball intentions, negative bends right.
    pub curve: Option<f32>,
    pub tactical_reason: TacticalReason,
    pub signal: Option<PlayerSignal>,
}

impl Intention {
    pub fn idle() -> Self {
        Self::default()
    }

    /// Movement intention toward a position at the given gait.
    pub fn move_to(target: Vec2, speed: SpeedHint) -> Self {
        Self {
            kind: IntentionKind::MoveToPosition,
            target_position: Some(target),
            speed_hint: speed,
            ..Self::default()
        }
    }

    /// True when this intention asks for locomotion.
    pub fn wants_movement(&self) -> bool {
        !matches!(self.kind, IntentionKind::Idle | IntentionKind::FaceTarget | IntentionKind::HoldPosition)
            && self.target_position.is_some()
            && self.speed_hint != SpeedHint::Idle
    }
}
