//! Kinematic ball simulation.
//!
//! Semi-implicit Euler with gravity, velocity-dependent quadratic air drag,
//! ground bounce and sliding friction. The drag coefficient models the drag
//! crisis: a football's Cd drops from ~0.47 to ~0.20 as the Reynolds number
//! crosses ~2e5, which is why a driven ball carries so much further than a
//! lofted one. The transition is blended with a tanh so the force stays
//! smooth across the boundary.
//!
//! Post, crossbar and net collisions are not simulated here; the ball only
//! interacts with the ground plane.

use super::config::BallConfig;
use super::geometry::Vec3;
use super::physics_constants::ball as consts;

/// Air density (kg/m^3) at the given temperature, from the reference
/// density at 20 C scaled by the ideal-gas ratio.
#[inline]
pub fn air_density(temperature_k: f32) -> f32 {
    consts::AIR_DENSITY_REF * (consts::AIR_TEMP_REF_K / temperature_k)
}

/// Drag coefficient as a function of Reynolds number, blending smoothly
/// from the subcritical to the supercritical regime.
#[inline]
pub fn drag_coefficient(reynolds: f32) -> f32 {
    let t = ((reynolds - consts::DRAG_CRISIS_RE) / consts::DRAG_CRISIS_WIDTH).tanh();
    consts::CD_SUBCRITICAL
        + 0.5 * (1.0 + t) * (consts::CD_SUPERCRITICAL - consts::CD_SUBCRITICAL)
}

/// Stateless stepper; all ball state lives in the caller. Constructed once
/// per match from the ball config.
#[derive(Debug, Clone)]
pub struct BallPhysics {
    cfg: BallConfig,
    cross_section: f32,
    air_density: f32,
}

impl BallPhysics {
    pub fn new(cfg: BallConfig) -> Self {
        Self {
            cfg,
            cross_section: std::f32::consts::PI * cfg.radius_m * cfg.radius_m,
            air_density: air_density(cfg.temperature_k),
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.cfg.radius_m
    }

    #[inline]
    pub fn config(&self) -> &BallConfig {
        &self.cfg
    }

    /// Advance position and velocity by `dt` seconds. Returns the new speed.
    pub fn step(&self, position: &mut Vec3, velocity: &mut Vec3, dt: f32) -> f32 {
        // Gravity first: semi-implicit Euler integrates position with the
        // post-force velocity.
        velocity.y -= self.cfg.gravity * dt;

        let speed = velocity.length();
        if speed > consts::DRAG_MIN_SPEED {
            self.apply_drag(velocity, speed, dt);
        }

        *position = *position + *velocity * dt;

        if position.y <= self.cfg.radius_m {
            self.resolve_ground(position, velocity, dt);
        }

        let mut speed = velocity.length();
        if speed < consts::STOP_SPEED {
            *velocity = Vec3::ZERO;
            speed = 0.0;
        }
        speed
    }

    /// Quadratic drag opposite the velocity. No component of the drag delta
    /// may flip the sign of its velocity component; each axis clamps to zero
    /// instead.
    fn apply_drag(&self, velocity: &mut Vec3, speed: f32, dt: f32) {
        let diameter = 2.0 * self.cfg.radius_m;
        let reynolds = self.air_density * speed * diameter / consts::AIR_VISCOSITY;
        let cd = drag_coefficient(reynolds);
        let accel =
            0.5 * self.air_density * cd * self.cross_section * speed * speed / self.cfg.mass_kg;
        // Per-axis delta along -v_hat
        let scale = accel * dt / speed;
        velocity.x = toward_zero(velocity.x, velocity.x * scale);
        velocity.y = toward_zero(velocity.y, velocity.y * scale);
        velocity.z = toward_zero(velocity.z, velocity.z * scale);
    }

    fn resolve_ground(&self, position: &mut Vec3, velocity: &mut Vec3, dt: f32) {
        position.y = self.cfg.radius_m;
        if velocity.y.abs() < consts::BOUNCE_ABSORB_VY {
            velocity.y = 0.0;
        } else if velocity.y < 0.0 {
            velocity.y = -velocity.y * self.cfg.restitution;
        }
        // Sliding friction on the horizontal components
        let horizontal = (velocity.x * velocity.x + velocity.z * velocity.z).sqrt();
        if horizontal > 0.0 {
            let decel = self.cfg.ground_friction_mu * self.cfg.gravity * dt;
            if decel >= horizontal {
                velocity.x = 0.0;
                velocity.z = 0.0;
            } else {
                let factor = (horizontal - decel) / horizontal;
                velocity.x *= factor;
                velocity.z *= factor;
            }
        }
    }
}

/// Subtract `delta` from `value` without crossing zero.
#[inline]
fn toward_zero(value: f32, delta: f32) -> f32 {
    let out = value - delta;
    if value > 0.0 && out < 0.0 || value < 0.0 && out > 0.0 {
        0.0
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn physics() -> BallPhysics {
        BallPhysics::new(BallConfig::default())
    }

    #[test]
    fn test_air_density_model() {
        assert!((air_density(293.15) - 1.2041).abs() < 1e-4);
        // Colder air is denser
        assert!(air_density(273.15) > air_density(303.15));
    }

    #[test]
    fn test_drag_crisis_transition() {
        // Deep subcritical and supercritical limits
        assert!((drag_coefficient(1.0e4) - 0.47).abs() < 0.01);
        assert!((drag_coefficient(1.0e6) - 0.20).abs() < 0.01);
        // Midpoint of the transition
        assert!((drag_coefficient(2.0e5) - 0.335).abs() < 0.01);
        // Monotonically decreasing through the band
        let mut prev = drag_coefficient(5.0e4);
        for re in [1.0e5, 1.5e5, 2.0e5, 3.0e5, 5.0e5] {
            let cd = drag_coefficient(re);
            assert!(cd <= prev);
            prev = cd;
        }
    }

    #[test]
    fn test_free_fall_and_first_bounce() {
        let phys = physics();
        let dt = 1.0 / 60.0;
        let mut pos = Vec3::new(0.0, 2.0, 0.0);
        let mut vel = Vec3::ZERO;

        // Fall to the ground
        let mut steps = 0;
        while pos.y > phys.radius() + 1e-4 && steps < 600 {
            phys.step(&mut pos, &mut vel, dt);
            steps += 1;
        }
        let fall_time = steps as f32 * dt;
        assert!(
            (0.55..0.75).contains(&fall_time),
            "fall took {fall_time} s over {steps} steps"
        );
        // Purely vertical drop stays purely vertical
        assert_eq!(vel.x, 0.0);
        assert_eq!(vel.z, 0.0);

        // Track the first rebound peak
        let mut peak = 0.0f32;
        for _ in 0..120 {
            phys.step(&mut pos, &mut vel, dt);
            peak = peak.max(pos.y - phys.radius());
            if vel.y < 0.0 && pos.y - phys.radius() < peak * 0.5 {
                break;
            }
        }
        // restitution^2 of the drop height, less a few percent of drag
        let expected = 0.49 * (2.0 - phys.radius());
        assert!(
            peak <= expected * 1.02 && peak >= expected * 0.88,
            "rebound peak {peak} vs expected {expected}"
        );
    }

    #[test]
    fn test_energy_non_increasing() {
        let phys = physics();
        let cfg = phys.config();
        let dt = 0.01;
        let mut pos = Vec3::new(0.0, 1.0, 0.0);
        let mut vel = Vec3::new(5.0, 4.0, 2.0);
        let energy = |pos: &Vec3, vel: &Vec3| {
            0.5 * cfg.mass_kg * vel.length_squared()
                + cfg.mass_kg * cfg.gravity * (pos.y - cfg.radius_m)
        };
        let mut prev = energy(&pos, &vel);
        for _ in 0..800 {
            phys.step(&mut pos, &mut vel, dt);
            let e = energy(&pos, &vel);
            assert!(e <= prev + 1e-3, "energy rose from {prev} to {e}");
            prev = e;
        }
        // And it eventually comes to rest
        assert_eq!(vel, Vec3::ZERO);
    }

    #[test]
    fn test_drag_never_reverses_components() {
        let phys = physics();
        // Tiny horizontal crawl with an absurd dt: drag clamps at zero
        let mut pos = Vec3::new(0.0, 5.0, 0.0);
        let mut vel = Vec3::new(0.02, 0.0, 0.0);
        phys.step(&mut pos, &mut vel, 0.5);
        assert!(vel.x >= 0.0);
    }

    #[test]
    fn test_rolling_ball_stops() {
        let phys = physics();
        let dt = 0.01;
        let mut pos = Vec3::new(0.0, phys.radius(), 0.0);
        let mut vel = Vec3::new(2.0, 0.0, 0.0);
        let mut steps = 0;
        while vel.length() > 0.0 && steps < 2000 {
            phys.step(&mut pos, &mut vel, dt);
            steps += 1;
        }
        // mu * g ~ 2.94 m/s^2 of decel: ~0.7 s to stop from 2 m/s
        assert!(steps < 120, "ball should stop quickly, took {steps} steps");
        assert_eq!(vel, Vec3::ZERO);
        assert!(pos.x > 0.3, "ball should roll forward before stopping");
    }

    #[test]
    fn test_low_vertical_velocity_absorbed() {
        let phys = physics();
        let mut pos = Vec3::new(0.0, phys.radius() + 0.001, 0.0);
        let mut vel = Vec3::new(0.0, -0.05, 0.0);
        phys.step(&mut pos, &mut vel, 0.001);
        assert_eq!(vel.y, 0.0, "sub-threshold bounce should be absorbed");
        assert_eq!(pos.y, phys.radius());
    }
}
