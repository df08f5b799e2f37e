//! The deterministic match-simulation engine.

pub mod ball;
pub mod ball_physics;
pub mod ball_prediction;
pub mod config;
pub mod driver;
pub mod events;
pub mod field;
pub mod formation;
pub mod geometry;
pub mod head_movement;
pub mod intention;
pub mod live_match;
pub mod match_engine;
pub mod match_events;
pub mod match_state;
pub mod physics_constants;
pub mod player_body;
pub mod player_decision;
pub mod player_physics;
pub mod rng;
pub mod scheduler;
pub mod squad;
pub mod steering;
pub mod vision;

pub use ball::Ball;
pub use ball_physics::BallPhysics;
pub use config::{BallConfig, CadenceConfig, EngineConfig, FieldConfig};
pub use driver::{DriverHooks, HeadlessDriver, RealTimeDriver};
pub use events::{EventKind, EventPayload, ExternalEvent, Mentality, ShoutKind, TeamInstructions};
pub use field::{BoundaryClass, Field, Side};
pub use formation::FormationRegion;
pub use intention::{Intention, IntentionKind, MovementMode, PlayerSignal, SpeedHint, TacticalReason};
pub use live_match::{
    ExternalInput, LiveMatch, MatchReport, MatchSetup, PlayerTickData, StepResult, TickData,
};
pub use match_engine::{MatchPlayer, MatchSnapshot, MatchWorld, PlayerSnapshot};
pub use match_events::{MatchEvent, MatchEventKind, MatchEventLog};
pub use match_state::{MatchState, PlayState};
pub use player_body::PlayerBody;
pub use rng::SimRng;
pub use scheduler::{EventHandle, EventScheduler, ExternalToken, Tick, EXTERNAL_SEQ_BAND, TICK_FOREVER};
pub use squad::{FormationSlot, PlayerAttributes, PlayerProfile, PositionRole, TeamSheet};
pub use steering::SteeringOutput;
pub use vision::{FocusTarget, PerceivedBall, PerceivedPlayer, PlayerVision};
