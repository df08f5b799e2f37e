//! Tunable engine configuration.
//!
//! The constants in `physics_constants` are the single source of the default
//! numbers; these structs carry the subset a caller may want to vary per
//! match (field dimensions, ball physics, cadences) without ambient globals.

use serde::{Deserialize, Serialize};

use super::physics_constants::{ball, tick};

/// Meters per yard.
pub const YARD_M: f32 = 0.9144;
/// Meters per foot.
pub const FOOT_M: f32 = 0.3048;

/// Pitch and goal dimensions, in the units the laws of the game use.
/// Converted to meters once, at `Field` construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub length_yd: f32,
    pub width_yd: f32,
    pub goal_width_yd: f32,
    pub goal_height_ft: f32,
    pub goal_depth_yd: f32,
    pub penalty_area_length_yd: f32,
    pub penalty_area_width_yd: f32,
    pub goal_area_length_yd: f32,
    pub goal_area_width_yd: f32,
    pub center_circle_radius_yd: f32,
    pub penalty_spot_yd: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            length_yd: 115.0,
            width_yd: 74.0,
            goal_width_yd: 8.0,
            goal_height_ft: 8.0,
            goal_depth_yd: 2.0,
            penalty_area_length_yd: 18.0,
            penalty_area_width_yd: 44.0,
            goal_area_length_yd: 6.0,
            goal_area_width_yd: 20.0,
            center_circle_radius_yd: 10.0,
            penalty_spot_yd: 12.0,
        }
    }
}

/// Ball physics tunables. Defaults model a regulation ball on grass at 20 C.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallConfig {
    pub mass_kg: f32,
    pub radius_m: f32,
    pub gravity: f32,
    pub restitution: f32,
    pub ground_friction_mu: f32,
    /// Ambient temperature (K); feeds the air-density model.
    pub temperature_k: f32,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            mass_kg: ball::MASS_KG,
            radius_m: ball::RADIUS_M,
            gravity: ball::GRAVITY,
            restitution: ball::RESTITUTION,
            ground_friction_mu: ball::GROUND_FRICTION_MU,
            temperature_k: ball::AIR_TEMP_REF_K,
        }
    }
}

/// Update cadences (ms). The scheduler works in 1 ms ticks; these are the
/// reschedule intervals of the per-entity subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CadenceConfig {
    pub physics_interval_ms: u32,
    pub ai_interval_ms: u32,
    pub ai_jitter_ms: i32,
    pub ai_stagger_ms: u32,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            physics_interval_ms: tick::PHYSICS_INTERVAL_MS,
            ai_interval_ms: tick::AI_INTERVAL_MS,
            ai_jitter_ms: tick::AI_JITTER_MS,
            ai_stagger_ms: tick::AI_STAGGER_MS,
        }
    }
}

/// Top-level engine configuration with the documented default preset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub field: FieldConfig,
    pub ball: BallConfig,
    pub cadence: CadenceConfig,
    /// Match length in ticks (ms). Defaults to 90 minutes.
    pub match_length_ticks: Option<u32>,
}

impl EngineConfig {
    pub fn match_length(&self) -> u32 {
        self.match_length_ticks.unwrap_or(tick::MATCH_TICKS)
    }
}
