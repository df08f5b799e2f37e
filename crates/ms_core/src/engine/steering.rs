//! Steering behaviors.
//!
//! Every behavior fills a caller-owned `SteeringOutput` in place — the match
//! engine reuses one scratchpad per drain, so the hot path allocates
//! nothing. `linear` is a velocity correction (desired minus current); the
//! integrator turns it into motion and enforces the speed cap.

use super::geometry::Vec2;
use super::intention::{Intention, IntentionKind, MovementMode, SpeedHint};
use super::physics_constants::steering as consts;
use super::player_body::PlayerBody;
use std::f32::consts::FRAC_PI_2;

/// Result of one steering evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringOutput {
    /// Velocity correction to apply (m/s, per second).
    pub linear: Vec2,
    /// Unit direction the body should turn toward, if any.
    pub face_direction: Option<Vec2>,
    /// Within the target radius with the approach finished.
    pub arrived: bool,
    /// Concrete movement mode after `Auto` resolution.
    pub movement_mode: MovementMode,
    /// Speed cap for the integrator (m/s).
    pub max_speed: f32,
}

impl Default for SteeringOutput {
    fn default() -> Self {
        Self {
            linear: Vec2::ZERO,
            face_direction: None,
            arrived: false,
            movement_mode: MovementMode::Forward,
            max_speed: consts::SPRINT_SPEED,
        }
    }
}

impl SteeringOutput {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Seek: full speed straight at the target.
pub fn seek(out: &mut SteeringOutput, body: &PlayerBody, target: Vec2, max_speed: f32) {
    let dir = (target - body.position).normalized();
    let desired = dir * max_speed;
    out.linear = desired - body.velocity;
    out.face_direction = if dir == Vec2::ZERO { None } else { Some(dir) };
    out.movement_mode = MovementMode::Forward;
    out.max_speed = max_speed;
    out.arrived = false;
}

/// Pursue a moving target. Currently a plain seek at the target's position;
/// the lead-prediction refinement rides on the same contract.
pub fn pursue(out: &mut SteeringOutput, body: &PlayerBody, target: Vec2, max_speed: f32) {
    seek(out, body, target, max_speed);
}

/// Stand and turn toward a direction.
pub fn face(out: &mut SteeringOutput, direction: Vec2) {
    out.linear = Vec2::ZERO;
    out.face_direction = Some(direction.normalized()).filter(|d| *d != Vec2::ZERO);
    out.movement_mode = MovementMode::Forward;
    out.max_speed = 0.0;
    out.arrived = true;
}

/// Arrive: approach a target, resolving how the body travels (forwards,
/// backpedal or shuffle) from the approach geometry, slowing inside the
/// arrive radius, and beginning to face the final direction before the
/// destination is reached.
pub fn arrive(
    out: &mut SteeringOutput,
    body: &PlayerBody,
    target: Vec2,
    final_face: Option<Vec2>,
    speed_hint: SpeedHint,
    requested_mode: MovementMode,
) {
    let to_target = target - body.position;
    let distance = to_target.length();

    if distance <= consts::TARGET_RADIUS {
        out.linear = -body.velocity;
        out.face_direction = final_face.map(Vec2::normalized).filter(|d| *d != Vec2::ZERO);
        out.movement_mode = MovementMode::Forward;
        out.max_speed = 0.0;
        out.arrived = true;
        return;
    }

    let move_dir = to_target / distance;
    let approach_angle = body.body_dir().signed_angle_to(move_dir);
    let mode = match requested_mode {
        MovementMode::Auto => resolve_mode(approach_angle, distance),
        explicit => explicit,
    };

    // Sprinting sideways is impossible; shuffling sideways is not.
    let angle_factor = (approach_angle.abs() * 0.5).cos().max(consts::MIN_ANGLE_SPEED_FACTOR);
    let mut target_speed = speed_hint.base_speed() * mode.speed_multiplier() * angle_factor;

    if distance < consts::ARRIVE_RADIUS {
        let span = consts::ARRIVE_RADIUS - consts::TARGET_RADIUS;
        target_speed *= ((distance - consts::TARGET_RADIUS) / span).clamp(0.0, 1.0);
    }

    let desired = move_dir * target_speed;
    out.linear = desired - body.velocity;
    out.movement_mode = mode;
    out.max_speed = target_speed.max(0.0);
    out.arrived = false;

    let mode_face = face_for_mode(move_dir, mode);
    out.face_direction = Some(match final_face.map(Vec2::normalized) {
        Some(final_dir) if final_dir != Vec2::ZERO && distance < consts::ANTICIPATION_RADIUS => {
            // Anticipatory turning: blend toward the final facing as the
            // destination closes in.
            let blend = 1.0 - distance / consts::ANTICIPATION_RADIUS;
            mode_face.lerp(final_dir, blend).normalized()
        }
        _ => mode_face,
    });
}

/// Resolve an `Auto` movement mode from the signed angle between the body
/// facing and the travel direction.
fn resolve_mode(approach_angle: f32, distance: f32) -> MovementMode {
    let abs = approach_angle.abs();
    if abs > consts::BACKWARD_ANGLE && distance < consts::BACKWARD_MAX_DIST {
        MovementMode::Backward
    } else if abs > consts::STRAFE_ANGLE {
        if approach_angle > 0.0 {
            MovementMode::StrafeLeft
        } else {
            MovementMode::StrafeRight
        }
    } else {
        MovementMode::Forward
    }
}

/// The facing that keeps the chosen mode honest: forwards faces the travel
/// direction, a backpedal faces away from it, a shuffle keeps the body
/// square to it.
fn face_for_mode(move_dir: Vec2, mode: MovementMode) -> Vec2 {
    match mode {
        MovementMode::Auto | MovementMode::Forward => move_dir,
        MovementMode::Backward => -move_dir,
        MovementMode::StrafeLeft => move_dir.rotated(-FRAC_PI_2),
        MovementMode::StrafeRight => move_dir.rotated(FRAC_PI_2),
    }
}

/// Collision avoidance modifier: a repulsive push away from the nearest
/// neighbors inside the avoidance radius. Applied on top of the primary
/// behavior except when idling.
pub fn avoid_collisions(out: &mut SteeringOutput, position: Vec2, neighbors: &[Vec2]) {
    // Nearest-first without allocating: a fixed insertion buffer.
    const MAX: usize = consts::AVOIDANCE_MAX_NEIGHBORS;
    let mut nearest: [(f32, Vec2); MAX] = [(f32::INFINITY, Vec2::ZERO); MAX];
    let mut count = 0usize;
    for &other in neighbors {
        let away = position - other;
        let dist = away.length();
        if dist >= consts::AVOIDANCE_RADIUS || dist < 1e-6 {
            continue;
        }
        if count == MAX && dist >= nearest[MAX - 1].0 {
            continue;
        }
        // Insertion sort into the small buffer, dropping the farthest when
        // full.
        let mut i = if count < MAX { count } else { MAX - 1 };
        while i > 0 && nearest[i - 1].0 > dist {
            nearest[i] = nearest[i - 1];
            i -= 1;
        }
        nearest[i] = (dist, away / dist);
        if count < MAX {
            count += 1;
        }
    }
    for &(dist, dir) in nearest.iter().take(count) {
        let closeness = 1.0 - dist / consts::AVOIDANCE_RADIUS;
        out.linear += dir * (consts::AVOIDANCE_FORCE_SCALE * closeness * closeness);
    }
}

/// Translate an intention into steering, then layer collision avoidance on
/// top. The one entry point the match engine calls per player per physics
/// tick.
pub fn drive(
    out: &mut SteeringOutput,
    body: &PlayerBody,
    intention: &Intention,
    neighbors: &[Vec2],
) {
    out.reset();
    match intention.kind {
        IntentionKind::Idle | IntentionKind::HoldPosition => {
            out.linear = Vec2::ZERO;
            out.max_speed = 0.0;
            out.arrived = true;
        }
        IntentionKind::FaceTarget => {
            let dir = intention
                .face_target
                .map(|t| t - body.position)
                .unwrap_or(Vec2::ZERO);
            face(out, dir);
        }
        IntentionKind::MoveToBall | IntentionKind::ClosePlayerDown | IntentionKind::KeeperClaimBall => {
            if let Some(target) = intention.target_position {
                let max =
                    intention.speed_hint.base_speed() * intention.movement_mode.speed_multiplier();
                pursue(out, body, target, max);
            }
        }
        _ => {
            if let Some(target) = intention.target_position {
                arrive(
                    out,
                    body,
                    target,
                    intention.face_target.map(|t| t - body.position),
                    intention.speed_hint,
                    intention.movement_mode,
                );
            } else {
                out.arrived = true;
                out.max_speed = 0.0;
            }
        }
    }
    if intention.kind != IntentionKind::Idle {
        avoid_collisions(out, body.position, neighbors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_at(pos: Vec2, facing: Vec2) -> PlayerBody {
        PlayerBody::new(pos, facing)
    }

    #[test]
    fn test_seek_points_at_target() {
        let mut out = SteeringOutput::default();
        let body = body_at(Vec2::ZERO, Vec2::new(1.0, 0.0));
        seek(&mut out, &body, Vec2::new(10.0, 0.0), 7.0);
        assert!(out.linear.x > 0.0);
        assert_eq!(out.linear.y, 0.0);
        assert_eq!(out.movement_mode, MovementMode::Forward);
        assert_eq!(out.max_speed, 7.0);
    }

    #[test]
    fn test_arrive_forward_at_distance() {
        let mut out = SteeringOutput::default();
        let body = body_at(Vec2::ZERO, Vec2::new(1.0, 0.0));
        arrive(&mut out, &body, Vec2::new(20.0, 0.0), None, SpeedHint::Jog, MovementMode::Auto);
        assert_eq!(out.movement_mode, MovementMode::Forward);
        assert!((out.max_speed - SpeedHint::Jog.base_speed()).abs() < 1e-4);
        assert!(!out.arrived);
    }

    #[test]
    fn test_arrive_resolves_strafe() {
        let mut out = SteeringOutput::default();
        let body = body_at(Vec2::ZERO, Vec2::new(1.0, 0.0));
        // Target directly to the left, far enough that it isn't a backpedal
        arrive(&mut out, &body, Vec2::new(0.0, 10.0), None, SpeedHint::Run, MovementMode::Auto);
        assert_eq!(out.movement_mode, MovementMode::StrafeLeft);
        // Strafe speed is penalized
        assert!(out.max_speed < SpeedHint::Run.base_speed());
        // Body stays square: facing is the travel direction rotated back
        let face = out.face_direction.unwrap();
        assert!(face.x > 0.9, "strafe keeps the body facing forward: {face:?}");
    }

    #[test]
    fn test_arrive_resolves_backpedal_close_behind() {
        let mut out = SteeringOutput::default();
        let body = body_at(Vec2::ZERO, Vec2::new(1.0, 0.0));
        arrive(&mut out, &body, Vec2::new(-3.0, 0.0), None, SpeedHint::Jog, MovementMode::Auto);
        assert_eq!(out.movement_mode, MovementMode::Backward);
        // A distant target behind turns the player around instead
        arrive(&mut out, &body, Vec2::new(-30.0, 0.1), None, SpeedHint::Jog, MovementMode::Auto);
        assert_ne!(out.movement_mode, MovementMode::Backward);
    }

    #[test]
    fn test_arrive_slows_inside_radius() {
        let mut out = SteeringOutput::default();
        let body = body_at(Vec2::ZERO, Vec2::new(1.0, 0.0));
        arrive(&mut out, &body, Vec2::new(1.0, 0.0), None, SpeedHint::Sprint, MovementMode::Auto);
        assert!(out.max_speed < SpeedHint::Sprint.base_speed() * 0.5);
        assert!(!out.arrived);
    }

    #[test]
    fn test_arrive_inside_target_radius() {
        let mut out = SteeringOutput::default();
        let mut body = body_at(Vec2::ZERO, Vec2::new(1.0, 0.0));
        body.velocity = Vec2::new(2.0, 0.0);
        arrive(&mut out, &body, Vec2::new(0.2, 0.0), None, SpeedHint::Run, MovementMode::Auto);
        assert!(out.arrived);
        assert_eq!(out.max_speed, 0.0);
        // Linear cancels the residual velocity
        assert!((out.linear + body.velocity).length() < 1e-5);
    }

    #[test]
    fn test_anticipatory_turning_blends_facing() {
        let mut out = SteeringOutput::default();
        let body = body_at(Vec2::ZERO, Vec2::new(1.0, 0.0));
        // Close target ahead, final facing up the pitch
        let final_face = Vec2::new(0.0, 10.0);
        arrive(
            &mut out,
            &body,
            Vec2::new(1.0, 0.0),
            Some(final_face),
            SpeedHint::Jog,
            MovementMode::Auto,
        );
        let face = out.face_direction.unwrap();
        // Already mostly rotated toward the final facing at 1 m out
        assert!(face.y > 0.5, "facing should lean toward the final target: {face:?}");
        // Far away the facing is pure travel direction
        arrive(
            &mut out,
            &body,
            Vec2::new(20.0, 0.0),
            Some(final_face),
            SpeedHint::Jog,
            MovementMode::Auto,
        );
        let face = out.face_direction.unwrap();
        assert!(face.y.abs() < 1e-5);
    }

    #[test]
    fn test_avoidance_pushes_apart() {
        let mut out = SteeringOutput::default();
        avoid_collisions(&mut out, Vec2::ZERO, &[Vec2::new(1.0, 0.0)]);
        assert!(out.linear.x < 0.0, "repulsion points away from the neighbor");
        // Quadratic falloff: a closer neighbor pushes much harder
        let mut close = SteeringOutput::default();
        avoid_collisions(&mut close, Vec2::ZERO, &[Vec2::new(0.4, 0.0)]);
        assert!(close.linear.x < out.linear.x);
        // Outside the radius: no force
        let mut far = SteeringOutput::default();
        avoid_collisions(&mut far, Vec2::ZERO, &[Vec2::new(3.0, 0.0)]);
        assert_eq!(far.linear, Vec2::ZERO);
    }

    #[test]
    fn test_avoidance_caps_neighbor_count() {
        let mut out = SteeringOutput::default();
        // A dense ring of 16 neighbors; only the nearest 8 contribute
        let ring: Vec<Vec2> = (0..16)
            .map(|i| {
                let theta = i as f32 * std::f32::consts::TAU / 16.0;
                let r = if i % 2 == 0 { 0.5 } else { 1.5 };
                Vec2::new(theta.cos() * r, theta.sin() * r)
            })
            .collect();
        avoid_collisions(&mut out, Vec2::ZERO, &ring);
        // Symmetric near-ring largely cancels; the point is that it doesn't
        // blow up with many neighbors.
        assert!(out.linear.is_finite());
    }

    #[test]
    fn test_drive_idle_no_avoidance() {
        let mut out = SteeringOutput::default();
        let body = body_at(Vec2::ZERO, Vec2::new(1.0, 0.0));
        let intention = Intention::idle();
        drive(&mut out, &body, &intention, &[Vec2::new(0.5, 0.0)]);
        assert_eq!(out.linear, Vec2::ZERO);
        assert!(out.arrived);
    }

    #[test]
    fn test_drive_move_applies_avoidance() {
        let mut out = SteeringOutput::default();
        let body = body_at(Vec2::ZERO, Vec2::new(1.0, 0.0));
        let intention = Intention::move_to(Vec2::new(20.0, 0.0), SpeedHint::Run);
        drive(&mut out, &body, &intention, &[Vec2::new(0.5, 0.0)]);
        // Neighbor dead ahead pushes the correction backwards relative to a
        // clean run-up
        let mut clean = SteeringOutput::default();
        drive(&mut clean, &body, &intention, &[]);
        assert!(out.linear.x < clean.linear.x);
    }
}
