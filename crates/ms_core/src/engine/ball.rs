//! Ball state wrapper.
//!
//! Sits on top of the kinematic stepper: tracks the held/stopped/on-ground
//! flags, the holder, and keeps the derived 2D position in sync with the 3D
//! one. While a player holds the ball, physics integration is suspended and
//! the ball follows the holder via `carry_to`.

use serde::{Deserialize, Serialize};

use super::ball_physics::BallPhysics;
use super::geometry::{Vec2, Vec3};
use super::physics_constants::ball as consts;

/// Height tolerance for the on-ground flag (m).
const GROUND_EPS: f32 = 1e-3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    position: Vec3,
    /// Ground-plane projection of `position`; kept in sync on every write.
    position2d: Vec2,
    velocity: Vec3,
    spin: Vec3,
    speed: f32,
    on_ground: bool,
    is_stopped: bool,
    held_by: Option<u32>,
}

impl Ball {
    /// A stationary ball on the center spot.
    pub fn new(radius: f32) -> Self {
        let position = Vec3::new(0.0, radius, 0.0);
        Self {
            position,
            position2d: position.ground(),
            velocity: Vec3::ZERO,
            spin: Vec3::ZERO,
            speed: 0.0,
            on_ground: true,
            is_stopped: true,
            held_by: None,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn position2d(&self) -> Vec2 {
        self.position2d
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    #[inline]
    pub fn spin(&self) -> Vec3 {
        self.spin
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn on_ground(&self) -> bool {
        self.on_ground
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.is_stopped
    }

    #[inline]
    pub fn is_held(&self) -> bool {
        self.held_by.is_some()
    }

    #[inline]
    pub fn held_by(&self) -> Option<u32> {
        self.held_by
    }

    /// Run one physics step. No-op while held.
    pub fn update(&mut self, physics: &BallPhysics, dt: f32) {
        if self.is_held() {
            return;
        }
        self.speed = physics.step(&mut self.position, &mut self.velocity, dt);
        self.sync_flags(physics.radius());
    }

    /// Place the ball stationary on the ground (set pieces, kickoffs).
    /// Clears velocity, spin and the holder.
    pub fn reposition(&mut self, x: f32, y: f32, radius: f32) {
        self.position = Vec3::new(x, radius, y);
        self.velocity = Vec3::ZERO;
        self.spin = Vec3::ZERO;
        self.speed = 0.0;
        self.held_by = None;
        self.sync_flags(radius);
    }

    /// Release the ball in the air at `height` with zero velocity — the
    /// referee's drop ball.
    pub fn drop_kick(&mut self, x: f32, y: f32, height: f32, radius: f32) {
        let height = height.max(radius);
        self.position = Vec3::new(x, height, y);
        self.velocity = Vec3::ZERO;
        self.spin = Vec3::ZERO;
        self.speed = 0.0;
        self.held_by = None;
        self.sync_flags(radius);
    }

    /// Default-height drop ball.
    pub fn drop_kick_default(&mut self, x: f32, y: f32, radius: f32) {
        self.drop_kick(x, y, consts::DROP_KICK_HEIGHT, radius);
    }

    /// Put the ball under a player's control. Physics suspends until
    /// released.
    pub fn set_held_by(&mut self, player_id: u32) {
        self.held_by = Some(player_id);
        self.velocity = Vec3::ZERO;
        self.spin = Vec3::ZERO;
        self.speed = 0.0;
        self.is_stopped = true;
    }

    /// Drop control without imparting velocity.
    pub fn release(&mut self) {
        self.held_by = None;
    }

    /// Move the held ball with its holder. Ignored when not held.
    pub fn carry_to(&mut self, ground: Vec2, radius: f32) {
        if !self.is_held() {
            return;
        }
        self.position = Vec3::from_ground(ground, radius);
        self.position2d = ground;
        self.on_ground = true;
    }

    /// Strike the ball: releases the holder and sets velocity and spin.
    pub fn kick(&mut self, velocity: Vec3, spin: Vec3) {
        self.held_by = None;
        self.velocity = velocity;
        self.spin = spin;
        self.speed = velocity.length();
        self.is_stopped = self.speed < consts::STOPPED_SPEED;
    }

    fn sync_flags(&mut self, radius: f32) {
        self.position2d = self.position.ground();
        self.on_ground = self.position.y <= radius + GROUND_EPS;
        self.is_stopped = self.speed < consts::STOPPED_SPEED;
    }
}
