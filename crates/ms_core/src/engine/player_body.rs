//! Player body pose.
//!
//! Position, velocity, body facing and head yaw. The head is constrained to
//! 80 degrees either side of the body; there is a strict setter that errors
//! and a clamping one that doesn't, because AI code wants the clamp and
//! external callers want the loud failure.

use serde::{Deserialize, Serialize};

use crate::error::{ConstraintError, Result};

use super::geometry::{Vec2, wrap_angle};
use super::head_movement::HeadState;
use super::physics_constants::head;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerBody {
    pub position: Vec2,
    pub velocity: Vec2,
    body_dir: Vec2,
    head_angle: f32,
    pub fatigue: f32,
    pub head: HeadState,
}

impl PlayerBody {
    /// A stationary body at `position` facing `facing`.
    pub fn new(position: Vec2, facing: Vec2) -> Self {
        let body_dir = facing.normalized();
        Self {
            position,
            velocity: Vec2::ZERO,
            body_dir: if body_dir == Vec2::ZERO { Vec2::new(1.0, 0.0) } else { body_dir },
            head_angle: 0.0,
            fatigue: 0.0,
            head: HeadState::default(),
        }
    }

    /// Unit body facing.
    #[inline]
    pub fn body_dir(&self) -> Vec2 {
        self.body_dir
    }

    /// Body facing as an angle (radians).
    #[inline]
    pub fn body_angle(&self) -> f32 {
        self.body_dir.angle()
    }

    /// Set the facing from an angle.
    pub fn set_body_angle(&mut self, theta: f32) {
        self.body_dir = Vec2::from_angle(theta);
    }

    /// Set the facing from a direction; renormalized on write, zero vectors
    /// ignored.
    pub fn set_body_dir(&mut self, dir: Vec2) {
        let dir = dir.normalized();
        if dir != Vec2::ZERO {
            self.body_dir = dir;
        }
    }

    /// Head yaw relative to the body (radians, positive left).
    #[inline]
    pub fn head_angle(&self) -> f32 {
        self.head_angle
    }

    /// Strict setter: errors outside the physical range.
    pub fn set_head_angle(&mut self, angle: f32) -> Result<(), ConstraintError> {
        if angle.abs() > head::MAX_ANGLE {
            return Err(ConstraintError::HeadAngleOutOfRange {
                requested: angle,
                limit: head::MAX_ANGLE,
            });
        }
        self.head_angle = angle;
        Ok(())
    }

    /// Clamping setter for the hot path.
    pub fn set_head_angle_clamped(&mut self, angle: f32) {
        self.head_angle = angle.clamp(-head::MAX_ANGLE, head::MAX_ANGLE);
    }

    /// Point the head at a world position, clamped to the yaw limit.
    pub fn look_at_clamped(&mut self, target: Vec2) {
        let to_target = target - self.position;
        if to_target == Vec2::ZERO {
            return;
        }
        let relative = wrap_angle(to_target.angle() - self.body_angle());
        self.set_head_angle_clamped(relative);
    }

    /// World-space gaze direction: body facing rotated by the head yaw.
    /// Derived, always consistent with `body_dir` and `head_angle`.
    #[inline]
    pub fn head_world_dir(&self) -> Vec2 {
        self.body_dir.rotated(self.head_angle)
    }

    /// Current ground speed (m/s).
    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_new_normalizes_facing() {
        let body = PlayerBody::new(Vec2::ZERO, Vec2::new(10.0, 0.0));
        assert!((body.body_dir().length() - 1.0).abs() < 1e-6);
        // Degenerate facing falls back to +x
        let fallback = PlayerBody::new(Vec2::ZERO, Vec2::ZERO);
        assert_eq!(fallback.body_dir(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_set_body_angle() {
        let mut body = PlayerBody::new(Vec2::ZERO, Vec2::new(1.0, 0.0));
        body.set_body_angle(FRAC_PI_2);
        assert!((body.body_dir().x).abs() < 1e-6);
        assert!((body.body_dir().y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_strict_head_setter_errors() {
        let mut body = PlayerBody::new(Vec2::ZERO, Vec2::new(1.0, 0.0));
        assert!(body.set_head_angle(1.0).is_ok());
        let err = body.set_head_angle(1.5).unwrap_err();
        assert!(matches!(err, ConstraintError::HeadAngleOutOfRange { .. }));
        // Failed set leaves the previous angle
        assert_eq!(body.head_angle(), 1.0);
    }

    #[test]
    fn test_clamping_head_setter() {
        let mut body = PlayerBody::new(Vec2::ZERO, Vec2::new(1.0, 0.0));
        body.set_head_angle_clamped(2.5);
        assert!((body.head_angle() - 1.3963).abs() < 1e-4);
        body.set_head_angle_clamped(-2.5);
        assert!((body.head_angle() + 1.3963).abs() < 1e-4);
    }

    #[test]
    fn test_look_at_clamped() {
        let mut body = PlayerBody::new(Vec2::ZERO, Vec2::new(1.0, 0.0));
        // Target directly to the left: 90 degrees, clamped to 80
        body.look_at_clamped(Vec2::new(0.0, 5.0));
        assert!((body.head_angle() - 1.3963).abs() < 1e-4);
        // Target slightly right of straight ahead
        body.look_at_clamped(Vec2::new(10.0, -1.0));
        assert!(body.head_angle() < 0.0);
        assert!(body.head_angle() > -0.2);
    }

    #[test]
    fn test_head_world_dir_consistency() {
        let mut body = PlayerBody::new(Vec2::ZERO, Vec2::new(0.0, 1.0));
        body.set_head_angle_clamped(0.5);
        let expected = body.body_dir().rotated(body.head_angle());
        assert_eq!(body.head_world_dir(), expected);
    }
}
