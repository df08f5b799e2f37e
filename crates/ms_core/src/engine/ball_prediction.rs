//! Ball-flight prediction.
//!
//! Pure forward projection of the ball's kinematics: copy the state, run
//! the same stepper the simulation runs, never touch the real ball. Players
//! use the landing estimate to attack where a bouncing ball will be, not
//! where it is.

use super::ball::Ball;
use super::ball_physics::BallPhysics;
use super::geometry::{Vec2, Vec3};
use super::physics_constants::prediction as consts;

/// One projected sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictedSample {
    /// Offset from now (ms).
    pub time_ms: u32,
    pub position: Vec3,
}

/// Project the ball forward over the standard window. A held ball projects
/// to its current spot (the holder decides where it goes next).
pub fn project_flight(ball: &Ball, physics: &BallPhysics) -> Vec<PredictedSample> {
    let mut samples = Vec::with_capacity(consts::MAX_SAMPLES);
    if ball.is_held() || ball.is_stopped() {
        samples.push(PredictedSample { time_ms: 0, position: ball.position() });
        return samples;
    }
    let dt = consts::STEP_MS as f32 / 1000.0;
    let mut position = ball.position();
    let mut velocity = ball.velocity();
    let steps = (consts::WINDOW_MS / consts::STEP_MS).min(consts::MAX_SAMPLES as u32);
    for step in 1..=steps {
        let speed = physics.step(&mut position, &mut velocity, dt);
        samples.push(PredictedSample { time_ms: step * consts::STEP_MS, position });
        if speed == 0.0 {
            break;
        }
    }
    samples
}

/// Where an airborne ball first returns to the ground, and when (ms from
/// now). A grounded ball lands where it is.
pub fn predict_landing(ball: &Ball, physics: &BallPhysics) -> (Vec2, u32) {
    if ball.on_ground() || ball.is_held() {
        return (ball.position2d(), 0);
    }
    let dt = consts::STEP_MS as f32 / 1000.0;
    let mut position = ball.position();
    let mut velocity = ball.velocity();
    let ground = physics.radius() + 1e-3;
    let steps = consts::WINDOW_MS / consts::STEP_MS;
    for step in 1..=steps {
        physics.step(&mut position, &mut velocity, dt);
        if position.y <= ground {
            return (position.ground(), step * consts::STEP_MS);
        }
    }
    (position.ground(), consts::WINDOW_MS)
}

/// Where the ball will be roughly `time_ms` from now.
pub fn predict_position_at(ball: &Ball, physics: &BallPhysics, time_ms: u32) -> Vec2 {
    if ball.is_held() || ball.is_stopped() || time_ms == 0 {
        return ball.position2d();
    }
    let dt = consts::STEP_MS as f32 / 1000.0;
    let mut position = ball.position();
    let mut velocity = ball.velocity();
    let steps = (time_ms / consts::STEP_MS).max(1);
    for _ in 0..steps {
        if physics.step(&mut position, &mut velocity, dt) == 0.0 {
            break;
        }
    }
    position.ground()
}
