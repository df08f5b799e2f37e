//! Head movement system.
//!
//! Players do not stare straight ahead: between deliberate glances the head
//! follows the body, and every second or two a spontaneous look-around
//! sweeps the field. Deliberate behaviors (tracking a target, glancing at
//! the movement destination, checking a shoulder) are triggered by the AI
//! layer and expire back to follow-body on a tick deadline.
//!
//! The head rotates at a fixed rate and is always clamped to the yaw limit.

use serde::{Deserialize, Serialize};

use super::geometry::{wrap_angle, Vec2};
use super::physics_constants::head as consts;
use super::player_body::PlayerBody;
use super::rng::SimRng;
use super::scheduler::Tick;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadBehavior {
    #[default]
    FollowBody,
    LookAtTarget,
    LookAtDestination,
    CheckShoulder,
    LookAround,
}

/// Per-player head behavior state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadState {
    pub behavior: HeadBehavior,
    /// Target yaw relative to the body (radians).
    pub target_angle: f32,
    pub started_tick: Tick,
    /// Behavior expires back to follow-body at this tick.
    pub end_tick: Tick,
    /// Next spontaneous look-around fires at this tick.
    pub next_look_around_tick: Tick,
}

impl Default for HeadState {
    fn default() -> Self {
        Self {
            behavior: HeadBehavior::FollowBody,
            target_angle: 0.0,
            started_tick: 0,
            end_tick: 0,
            next_look_around_tick: 0,
        }
    }
}

impl HeadState {
    fn begin(&mut self, behavior: HeadBehavior, angle: f32, now: Tick, duration_ms: u32) {
        self.behavior = behavior;
        self.target_angle = angle.clamp(-consts::MAX_ANGLE, consts::MAX_ANGLE);
        self.started_tick = now;
        self.end_tick = now.saturating_add(duration_ms);
    }
}

/// Per-physics-step head update: expire deliberate behaviors, kick off
/// spontaneous look-arounds, and rotate the head toward its target yaw.
pub fn update_head(body: &mut PlayerBody, current_tick: Tick, rng: &mut SimRng, dt: f32) {
    let mut state = body.head;

    if state.behavior != HeadBehavior::FollowBody && current_tick >= state.end_tick {
        state.behavior = HeadBehavior::FollowBody;
        state.target_angle = 0.0;
    }

    if state.behavior == HeadBehavior::FollowBody && current_tick >= state.next_look_around_tick {
        let span = consts::MAX_ANGLE * consts::LOOK_AROUND_SPAN;
        let angle = rng.range_f32(-span, span);
        state.begin(HeadBehavior::LookAround, angle, current_tick, consts::LOOK_AROUND_MS);
        state.next_look_around_tick = current_tick.saturating_add(rng.range_u32(
            consts::LOOK_AROUND_GAP_MIN_MS,
            consts::LOOK_AROUND_GAP_MAX_MS,
        ));
    }

    let target = state.target_angle.clamp(-consts::MAX_ANGLE, consts::MAX_ANGLE);
    let diff = target - body.head_angle();
    if diff != 0.0 {
        let step = (consts::ROTATION_RATE * dt).min(diff.abs());
        body.set_head_angle_clamped(body.head_angle() + step.copysign(diff));
    }

    body.head = state;
}

/// Track a world-space point for `duration_ms`. The relative angle is
/// captured at trigger time; the per-step update does the rotating.
pub fn look_at_target(body: &mut PlayerBody, target: Vec2, now: Tick, duration_ms: u32) {
    let to_target = target - body.position;
    if to_target == Vec2::ZERO {
        return;
    }
    let relative = wrap_angle(to_target.angle() - body.body_angle());
    let mut state = body.head;
    state.begin(HeadBehavior::LookAtTarget, relative, now, duration_ms);
    body.head = state;
}

/// Glance at the movement destination.
pub fn look_at_destination(body: &mut PlayerBody, destination: Vec2, now: Tick) {
    let to_dest = destination - body.position;
    if to_dest == Vec2::ZERO {
        return;
    }
    let relative = wrap_angle(to_dest.angle() - body.body_angle());
    let mut state = body.head;
    state.begin(
        HeadBehavior::LookAtDestination,
        relative,
        now,
        consts::LOOK_AT_DESTINATION_MS,
    );
    body.head = state;
}

/// Check over one shoulder: positive `side` is the left.
pub fn check_shoulder(body: &mut PlayerBody, side: f32, now: Tick, duration_ms: u32) {
    let angle = consts::MAX_ANGLE * if side >= 0.0 { 1.0 } else { -1.0 };
    let mut state = body.head;
    state.begin(HeadBehavior::CheckShoulder, angle, now, duration_ms);
    body.head = state;
}
