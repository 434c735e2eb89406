//! Scheduler and engine configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scheduler behaviour switches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Emit a trace event for every tick
    pub trace_ticks: bool,
}

/// Configuration for the tick engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Target time between ticks, in milliseconds
    pub period_ms: u64,
    /// Max cycles before stopping (None = until the routine stops)
    pub max_cycles: Option<u64>,
    /// Log a warning when a cycle takes longer than the period
    pub warn_on_overrun: bool,
    /// Scheduler settings
    pub scheduler: SchedulerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            period_ms: 20,
            max_cycles: None,
            warn_on_overrun: true,
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period_ms == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        if self.max_cycles == Some(0) {
            return Err(ConfigError::ZeroMaxCycles);
        }
        Ok(())
    }

    /// Target time between ticks.
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    /// Set the tick period.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period_ms = period.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    /// Stop after this many cycles.
    pub fn with_max_cycles(mut self, max: u64) -> Self {
        self.max_cycles = Some(max);
        self
    }

    /// Enable or disable overrun warnings.
    pub fn with_overrun_warnings(mut self, warn: bool) -> Self {
        self.warn_on_overrun = warn;
        self
    }

    /// Set scheduler settings.
    pub fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }
}
