//! Cadence core model.
//!
//! This crate defines the pieces every other layer is built from: the
//! [`Command`] lifecycle contract, shared handles for root commands and
//! subsystems, and the time source used by elapsed-time commands.

#![warn(missing_docs)]

// Identities
mod id;

// Work and resources
mod command;
mod subsystem;

// Time
mod clock;

// Re-exports
pub use id::{CommandId, SubsystemId};
pub use command::{Command, CommandHandle, Requirements};
pub use subsystem::{Subsystem, SubsystemHandle};
pub use clock::{system_clock, Clock, ManualClock, SharedClock, SystemClock};
