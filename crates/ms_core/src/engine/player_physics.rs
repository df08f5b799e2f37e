//! Fixed-step player body integrator.
//!
//! Consumes a `SteeringOutput` per physics tick: applies the linear
//! correction, turns the body toward the requested facing at a speed-scaled
//! angular rate, brakes when no steering force is present, enforces the
//! speed cap, and integrates position.

use super::geometry::{lerp, Vec2};
use super::physics_constants::{fatigue, steering as consts};
use super::player_body::PlayerBody;
use super::squad::from_100;
use super::steering::SteeringOutput;

/// Advance one body by `dt` seconds under the given steering.
pub fn integrate(body: &mut PlayerBody, steering: &SteeringOutput, dt: f32) {
    body.velocity += steering.linear * dt;

    if let Some(face) = steering.face_direction {
        turn_toward(body, face, dt);
    }

    // Coasting with no steering force: hard braking toward a stop.
    if steering.linear.length() < consts::LINEAR_EPS && body.velocity.length() > consts::SPEED_EPS
    {
        let speed = body.velocity.length();
        let drop = consts::BRAKE_DECEL * dt;
        body.velocity = if drop >= speed {
            Vec2::ZERO
        } else {
            body.velocity * ((speed - drop) / speed)
        };
    }

    let cap = steering.max_speed.min(consts::SPRINT_SPEED) * fatigue_speed_mult(body.fatigue);
    body.velocity = body.velocity.clamped_length(cap);
    body.position += body.velocity * dt;
}

/// Legs go: the speed cap shrinks linearly with fatigue.
#[inline]
pub fn fatigue_speed_mult(fatigue_level: f32) -> f32 {
    1.0 - fatigue_level.clamp(0.0, 1.0) * (1.0 - fatigue::MIN_SPEED_MULT)
}

/// Accumulate or recover fatigue from the current effort. Low stamina tires
/// faster than high stamina around the same workload.
pub fn fatigue_step(body: &mut PlayerBody, stamina: u8, dt: f32) {
    let speed_fraction = (body.speed() / consts::SPRINT_SPEED).clamp(0.0, 1.0);
    if speed_fraction > fatigue::RECOVERY_SPEED_FRACTION {
        let stamina01 = from_100(stamina);
        let wear = 1.0 + fatigue::STAMINA_SPREAD * (1.0 - 2.0 * stamina01);
        body.fatigue = (body.fatigue + fatigue::RISE_PER_S * speed_fraction * wear * dt).min(1.0);
    } else {
        body.fatigue = (body.fatigue - fatigue::RECOVERY_PER_S * dt).max(0.0);
    }
}

/// Rotate the body toward `face` by at most one tick's worth of angular
/// travel. Faster runners turn faster — the rate lerps with current speed.
fn turn_toward(body: &mut PlayerBody, face: super::geometry::Vec2, dt: f32) {
    let signed = body.body_dir().signed_angle_to(face);
    if signed == 0.0 {
        return;
    }
    let speed_ratio = (body.speed() / consts::SPRINT_SPEED).clamp(0.0, 1.0);
    let rate = lerp(consts::MIN_TURN_RATE, consts::MAX_TURN_RATE, speed_ratio);
    let step = (rate * dt).min(signed.abs());
    body.set_body_angle(body.body_angle() + step.copysign(signed));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::geometry::Vec2;
    use crate::engine::intention::{Intention, MovementMode, SpeedHint};
    use crate::engine::steering::{self, SteeringOutput};

    const DT: f32 = 0.016;

    #[test]
    fn test_velocity_capped_at_max_speed() {
        let mut body = PlayerBody::new(Vec2::ZERO, Vec2::new(1.0, 0.0));
        let steering = SteeringOutput {
            linear: Vec2::new(1000.0, 0.0),
            max_speed: 7.0,
            ..SteeringOutput::default()
        };
        integrate(&mut body, &steering, DT);
        assert!(body.speed() <= 7.0 + 1e-4);
    }

    #[test]
    fn test_hard_cap_at_sprint_speed() {
        let mut body = PlayerBody::new(Vec2::ZERO, Vec2::new(1.0, 0.0));
        let steering = SteeringOutput {
            linear: Vec2::new(5000.0, 0.0),
            max_speed: 50.0,
            ..SteeringOutput::default()
        };
        integrate(&mut body, &steering, DT);
        assert!(body.speed() <= consts::SPRINT_SPEED + 1e-4);
    }

    #[test]
    fn test_braking_without_steering() {
        let mut body = PlayerBody::new(Vec2::ZERO, Vec2::new(1.0, 0.0));
        body.velocity = Vec2::new(6.0, 0.0);
        let steering = SteeringOutput { max_speed: 9.5, ..SteeringOutput::default() };
        // 12 m/s^2 from 6 m/s: stopped inside half a second
        for _ in 0..32 {
            integrate(&mut body, &steering, DT);
        }
        assert_eq!(body.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_turn_rate_capped() {
        let mut body = PlayerBody::new(Vec2::ZERO, Vec2::new(1.0, 0.0));
        let steering = SteeringOutput {
            face_direction: Some(Vec2::new(-1.0, 0.01)),
            max_speed: 0.0,
            ..SteeringOutput::default()
        };
        integrate(&mut body, &steering, DT);
        // At standstill the turn rate is MIN_TURN_RATE: one tick covers
        // 2.0 * 0.016 = 0.032 rad, nowhere near the half-turn requested.
        let turned = body.body_angle().abs();
        assert!(turned > 0.0);
        assert!(turned <= consts::MIN_TURN_RATE * DT + 1e-5);
    }

    #[test]
    fn test_faster_bodies_turn_faster() {
        let face = Vec2::new(0.0, 1.0);
        let mut slow = PlayerBody::new(Vec2::ZERO, Vec2::new(1.0, 0.0));
        let mut fast = PlayerBody::new(Vec2::ZERO, Vec2::new(1.0, 0.0));
        fast.velocity = Vec2::new(consts::SPRINT_SPEED, 0.0);
        let steering = SteeringOutput {
            face_direction: Some(face),
            max_speed: consts::SPRINT_SPEED,
            ..SteeringOutput::default()
        };
        integrate(&mut slow, &steering, DT);
        integrate(&mut fast, &steering, DT);
        let slow_turn = slow.body_dir().signed_angle_to(Vec2::new(1.0, 0.0)).abs();
        let fast_turn = fast.body_dir().signed_angle_to(Vec2::new(1.0, 0.0)).abs();
        assert!(fast_turn > slow_turn);
    }

    #[test]
    fn test_fatigue_rises_under_effort_and_recovers() {
        let mut body = PlayerBody::new(Vec2::ZERO, Vec2::new(1.0, 0.0));
        body.velocity = Vec2::new(consts::SPRINT_SPEED, 0.0);
        for _ in 0..625 {
            fatigue_step(&mut body, 50, DT);
        }
        let tired = body.fatigue;
        assert!(tired > 0.05, "ten seconds of sprinting should cost, got {tired}");
        assert!(tired < 1.0);
        // Standing still recovers, slowly
        body.velocity = Vec2::ZERO;
        for _ in 0..625 {
            fatigue_step(&mut body, 50, DT);
        }
        assert!(body.fatigue < tired);
        assert!(body.fatigue > 0.0, "recovery is slower than accumulation");
    }

    #[test]
    fn test_low_stamina_tires_faster() {
        let mut iron = PlayerBody::new(Vec2::ZERO, Vec2::new(1.0, 0.0));
        let mut glass = PlayerBody::new(Vec2::ZERO, Vec2::new(1.0, 0.0));
        iron.velocity = Vec2::new(8.0, 0.0);
        glass.velocity = Vec2::new(8.0, 0.0);
        for _ in 0..300 {
            fatigue_step(&mut iron, 95, DT);
            fatigue_step(&mut glass, 20, DT);
        }
        assert!(glass.fatigue > iron.fatigue);
    }

    #[test]
    fn test_fatigue_caps_speed() {
        assert_eq!(fatigue_speed_mult(0.0), 1.0);
        assert!((fatigue_speed_mult(1.0) - 0.6).abs() < 1e-6);
        let mut body = PlayerBody::new(Vec2::ZERO, Vec2::new(1.0, 0.0));
        body.fatigue = 1.0;
        let steering = SteeringOutput {
            linear: Vec2::new(1000.0, 0.0),
            max_speed: consts::SPRINT_SPEED,
            ..SteeringOutput::default()
        };
        integrate(&mut body, &steering, DT);
        assert!(body.speed() <= consts::SPRINT_SPEED * 0.6 + 1e-4);
    }

    #[test]
    fn test_jog_across_the_pitch_arrives() {
        // A player 40 m out, facing the target, jogging on auto mode,
        // settles inside the target radius. The first-order velocity lag
        // makes this a little slower than distance over speed.
        let mut body = PlayerBody::new(Vec2::new(-40.0, 0.0), Vec2::new(1.0, 0.0));
        let target = Vec2::ZERO;
        let intention = Intention {
            movement_mode: MovementMode::Auto,
            ..Intention::move_to(target, SpeedHint::Jog)
        };
        let mut out = SteeringOutput::default();
        let mut arrived_at = None;
        for step in 0..1000 {
            steering::drive(&mut out, &body, &intention, &[]);
            integrate(&mut body, &out, DT);
            if body.position.distance_to(target) < 0.3 && body.speed() < 0.2 {
                arrived_at = Some(step);
                break;
            }
        }
        let step = arrived_at.expect("player never settled on the target");
        let seconds = step as f32 * DT;
        assert!(seconds > 8.0, "arrived implausibly fast: {seconds} s");
        assert!(seconds < 16.0, "arrived too slowly: {seconds} s");
        // And it stays settled
        for _ in 0..50 {
            steering::drive(&mut out, &body, &intention, &[]);
            integrate(&mut body, &out, DT);
        }
        assert!(body.position.distance_to(target) < 0.3);
        assert!(body.speed() < 0.2);
    }
}
