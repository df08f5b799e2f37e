//! Physics and cadence constants for the match simulation core.
//!
//! These are the documented defaults; the tunable subset is mirrored by the
//! structs in `engine::config` so a caller can run a match with non-standard
//! physics without touching globals.

/// Tick and cadence constants. One tick is one millisecond of simulated time.
pub mod tick {
    /// Scheduler tick type granularity (ms of simulated time per tick).
    pub const MS_PER_TICK: u32 = 1;

    /// Physics update interval for ball and players (ms) — 60 Hz nominal.
    pub const PHYSICS_INTERVAL_MS: u32 = 16;

    /// Physics step length in seconds (matches `PHYSICS_INTERVAL_MS`).
    pub const PHYSICS_DT: f32 = 0.016;

    /// AI decision interval (ms).
    pub const AI_INTERVAL_MS: u32 = 100;

    /// Per-fire AI cadence jitter (+/- ms).
    pub const AI_JITTER_MS: i32 = 10;

    /// AI start offsets are staggered uniformly over `[0, this)` ms.
    pub const AI_STAGGER_MS: u32 = 100;

    /// Regulation match length: 90 minutes of 1 ms ticks.
    pub const MATCH_TICKS: u32 = 5_400_000;
}

/// Ball physics defaults.
pub mod ball {
    /// FIFA ball mass (kg).
    pub const MASS_KG: f32 = 0.43;
    /// Ball radius (m).
    pub const RADIUS_M: f32 = 0.11;
    /// Gravity (m/s^2).
    pub const GRAVITY: f32 = 9.81;
    /// Ground bounce restitution.
    pub const RESTITUTION: f32 = 0.7;
    /// Sliding friction coefficient on grass.
    pub const GROUND_FRICTION_MU: f32 = 0.3;

    /// Below this speed (m/s) the whole velocity vector is zeroed.
    pub const STOP_SPEED: f32 = 0.05;
    /// Below this speed (m/s) the ball reports itself stopped.
    pub const STOPPED_SPEED: f32 = 0.1;
    /// Drag is skipped below this speed (m/s).
    pub const DRAG_MIN_SPEED: f32 = 0.01;
    /// Vertical bounce velocities below this (m/s) are absorbed outright.
    pub const BOUNCE_ABSORB_VY: f32 = 0.1;

    /// Dynamic viscosity of air (kg/(m*s)).
    pub const AIR_VISCOSITY: f32 = 1.81e-5;
    /// Air density at the reference temperature (kg/m^3).
    pub const AIR_DENSITY_REF: f32 = 1.2041;
    /// Reference temperature for the density model (K, 20 C).
    pub const AIR_TEMP_REF_K: f32 = 293.15;

    /// Subcritical drag coefficient (smooth sphere, low Reynolds).
    pub const CD_SUBCRITICAL: f32 = 0.47;
    /// Supercritical drag coefficient past the drag crisis.
    pub const CD_SUPERCRITICAL: f32 = 0.20;
    /// Reynolds number at the center of the drag-crisis transition.
    pub const DRAG_CRISIS_RE: f32 = 2.0e5;
    /// Width of the tanh transition band.
    pub const DRAG_CRISIS_WIDTH: f32 = 1.5e5;

    /// Standalone ball physics step (s) when no engine cadence applies.
    pub const DEFAULT_DT: f32 = 0.01;

    /// Drop height for an uncontested drop ball (m).
    pub const DROP_KICK_HEIGHT: f32 = 1.5;
}

/// Player steering and locomotion defaults.
pub mod steering {
    /// Speed-hint base velocities (m/s).
    pub const WALK_SPEED: f32 = 1.5;
    pub const JOG_SPEED: f32 = 4.0;
    pub const RUN_SPEED: f32 = 7.0;
    pub const SPRINT_SPEED: f32 = 9.5;

    /// Movement-mode speed multipliers.
    pub const BACKWARD_MULT: f32 = 0.6;
    pub const STRAFE_MULT: f32 = 0.7;

    /// Arrive: speed starts scaling down inside this radius (m).
    pub const ARRIVE_RADIUS: f32 = 2.0;
    /// Arrive: considered on target inside this radius (m).
    pub const TARGET_RADIUS: f32 = 0.3;
    /// Anticipatory turning blends in inside this distance (m).
    pub const ANTICIPATION_RADIUS: f32 = 3.0;

    /// Angle past which movement resolves to a strafe (rad, ~72 deg).
    pub const STRAFE_ANGLE: f32 = 1.2566;
    /// Angle past which a close target resolves to backpedal (rad, ~120 deg).
    pub const BACKWARD_ANGLE: f32 = 2.0944;
    /// A backpedal is only chosen when the target is closer than this (m).
    pub const BACKWARD_MAX_DIST: f32 = 5.0;
    /// Floor of the angle-speed factor: shuffling sideways still moves.
    pub const MIN_ANGLE_SPEED_FACTOR: f32 = 0.4;

    /// Collision avoidance radius (m).
    pub const AVOIDANCE_RADIUS: f32 = 2.0;
    /// Collision avoidance force scale.
    pub const AVOIDANCE_FORCE_SCALE: f32 = 8.0;
    /// At most this many neighbors contribute to avoidance.
    pub const AVOIDANCE_MAX_NEIGHBORS: usize = 8;

    /// Body turn rate at standstill (rad/s).
    pub const MIN_TURN_RATE: f32 = 2.0;
    /// Body turn rate at full sprint (rad/s).
    pub const MAX_TURN_RATE: f32 = 8.0;
    /// Braking deceleration when no steering force is applied (m/s^2).
    pub const BRAKE_DECEL: f32 = 12.0;
    /// Steering forces below this are treated as absent (m/s^2).
    pub const LINEAR_EPS: f32 = 1e-3;
    /// Velocities below this are treated as standing (m/s).
    pub const SPEED_EPS: f32 = 1e-2;
}

/// Head movement defaults.
pub mod head {
    /// Maximum head yaw relative to the body (rad, 80 deg).
    pub const MAX_ANGLE: f32 = 1.3963;
    /// Head rotation rate (rad/s).
    pub const ROTATION_RATE: f32 = 6.0;
    /// Duration of a spontaneous look-around (ms).
    pub const LOOK_AROUND_MS: u32 = 350;
    /// Minimum gap between spontaneous look-arounds (ms).
    pub const LOOK_AROUND_GAP_MIN_MS: u32 = 800;
    /// Maximum gap between spontaneous look-arounds (ms).
    pub const LOOK_AROUND_GAP_MAX_MS: u32 = 2500;
    /// Look-around targets stay inside this fraction of the yaw limit.
    pub const LOOK_AROUND_SPAN: f32 = 0.8;
    /// Chance per AI tick of glancing at the movement destination.
    pub const LOOK_AT_DESTINATION_CHANCE: f32 = 0.05;
    /// Duration of a destination glance (ms).
    pub const LOOK_AT_DESTINATION_MS: u32 = 400;
    /// Chance per AI tick that a ball carrier checks a shoulder.
    pub const CHECK_SHOULDER_CHANCE: f32 = 0.08;
    /// Duration of a shoulder check (ms).
    pub const CHECK_SHOULDER_MS: u32 = 300;
}

/// Vision scan cadence defaults.
pub mod scan {
    /// Slowest scan interval (ms) for a player with zero perception.
    pub const SLOWEST_MS: f32 = 1500.0;
    /// Fastest scan interval (ms) for an elite scanner.
    pub const FASTEST_MS: f32 = 300.0;
    /// Attribute blend weights (awareness, anticipation, vision).
    pub const W_AWARENESS: f32 = 0.5;
    pub const W_ANTICIPATION: f32 = 0.3;
    pub const W_VISION: f32 = 0.2;
    /// Probability that a scan refocuses on the ball.
    pub const BALL_FOCUS_CHANCE: f32 = 0.8;
}

/// Formation region defaults.
pub mod formation {
    /// Kickoff: back edge sits this far up from the own goal line (m).
    pub const KICKOFF_BACK_OFFSET: f32 = 22.0;
    /// Kickoff: front edge sits this far short of halfway (m, own-half side).
    pub const KICKOFF_FRONT_OFFSET: f32 = 1.0;
    /// Kickoff: side edges (m from center).
    pub const KICKOFF_SIDE_SPAN: f32 = 30.0;
    /// Tactical width 0.0 maps to this side span (m from center).
    pub const WIDTH_SPAN_MIN: f32 = 18.0;
    /// Tactical width 1.0 maps to this side span (m from center).
    pub const WIDTH_SPAN_MAX: f32 = 32.0;
}

/// Ball-flight prediction defaults.
pub mod prediction {
    /// How far ahead the flight is projected (ms).
    pub const WINDOW_MS: u32 = 3000;
    /// Projection step (ms).
    pub const STEP_MS: u32 = 10;
    /// Samples kept per projection.
    pub const MAX_SAMPLES: usize = 300;
}

/// Fatigue accumulation and its effect on locomotion.
pub mod fatigue {
    /// Fatigue gained per second at a full sprint, for average stamina.
    pub const RISE_PER_S: f32 = 0.012;
    /// Fatigue recovered per second at walking pace or below.
    pub const RECOVERY_PER_S: f32 = 0.004;
    /// Speed fraction below which a player recovers.
    pub const RECOVERY_SPEED_FRACTION: f32 = 0.2;
    /// Speed multiplier at full fatigue (fresh = 1.0).
    pub const MIN_SPEED_MULT: f32 = 0.6;
    /// How much low stamina amplifies fatigue gain (1.0 +/- this).
    pub const STAMINA_SPREAD: f32 = 0.5;
}

/// Goalkeeper placement defaults.
pub mod keeper {
    /// Distance in front of the own goal line at kickoff (m).
    pub const GOAL_LINE_OFFSET: f32 = 6.0;
    /// Keeper lateral tracking stays inside the goal mouth plus this (m).
    pub const MOUTH_MARGIN: f32 = 0.5;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cadence_consistency() {
        assert_eq!(tick::PHYSICS_DT, tick::PHYSICS_INTERVAL_MS as f32 / 1000.0);
        assert_eq!(tick::MATCH_TICKS, 90 * 60 * 1000);
    }

    #[test]
    fn test_speed_hints_ordered() {
        assert!(steering::WALK_SPEED < steering::JOG_SPEED);
        assert!(steering::JOG_SPEED < steering::RUN_SPEED);
        assert!(steering::RUN_SPEED < steering::SPRINT_SPEED);
    }

    #[test]
    fn test_head_limit_is_80_degrees() {
        assert!((head::MAX_ANGLE - 80.0_f32.to_radians()).abs() < 1e-3);
    }

    #[test]
    fn test_scan_weights_sum_to_one() {
        let sum = scan::W_AWARENESS + scan::W_ANTICIPATION + scan::W_VISION;
        assert!((sum - 1.0).abs() < 1e-6);
    }
}
