use thiserror::Error;

/// Scheduler misuse. Everything here is a programming error, not a runtime
/// condition: a reentrant drain, a handle used against the wrong scheduler,
/// a second grab of the external-schedule token. None of these are
/// recoverable inside the core; callers log and abort the current
/// operation.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler drain re-entered while already running")]
    Reentrancy,

    #[error("event handle belongs to a different scheduler")]
    ForeignEvent,

    #[error("external schedule token already taken")]
    ExternalTokenTaken,

    #[error("external sequence band exhausted")]
    ExternalBandExhausted,
}

/// Driver lifecycle and configuration errors.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("driver is already running")]
    AlreadyRunning,

    #[error("driver worker thread panicked")]
    WorkerPanicked,

    #[error("speed must be positive and finite, got {0}")]
    InvalidSpeed(f64),
}

/// Physical-limit violations. Each constraint has a strict API that raises
/// one of these and a clamping API that does not.
#[derive(Debug, Error)]
pub enum ConstraintError {
    #[error("head angle {requested:.4} rad exceeds limit {limit:.4} rad")]
    HeadAngleOutOfRange { requested: f32, limit: f32 },
}

/// Umbrella error for match-level operations and drains, where scheduler,
/// driver and simulation failures all surface.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Constraint(#[from] ConstraintError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown player id {0}")]
    UnknownPlayer(u32),

    #[error("callback error at tick {tick}: {message}")]
    Callback { tick: u32, message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
