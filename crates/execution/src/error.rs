//! Error types for configuration and the tick engine.
//!
//! The scheduler itself has no error paths: conflicts are resolved by
//! preemption and duplicate schedules are ignored.

use thiserror::Error;

/// Invalid engine or scheduler configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config text is not valid JSON for this type
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// `period_ms` is zero
    #[error("Tick period must be greater than zero")]
    ZeroPeriod,

    /// `max_cycles` is `Some(0)`
    #[error("max_cycles must be greater than zero when set")]
    ZeroMaxCycles,
}

/// Errors from driving a [`TickEngine`](crate::TickEngine).
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The engine must be started first
    #[error("Engine has not been started")]
    NotStarted,

    /// `start` called on a running engine
    #[error("Engine already started")]
    AlreadyStarted,
}
