//! Execution layer - the scheduler, trigger bindings and the tick engine.
//!
//! A [`Scheduler`] owns the set of running root commands and the map of
//! which command holds which subsystem. A [`TickEngine`] hosts a
//! [`Routine`] and ticks the scheduler at a fixed period.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod trigger;
pub mod scheduler;
pub mod engine;

pub use config::{EngineConfig, SchedulerConfig};
pub use error::{ConfigError, EngineError};
pub use trigger::{Binding, BindingAction, BindingKind, Trigger};
pub use scheduler::{Scheduler, SchedulerHandle};
pub use engine::{CycleReport, EngineSummary, Routine, TickEngine};
