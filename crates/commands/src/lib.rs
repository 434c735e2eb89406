//! Command library: primitives, decorators, groups and the routine builder.
//!
//! Everything here implements [`cadence_core::Command`] and composes freely:
//! decorators wrap one child, groups wrap many, and the scheduler only ever
//! sees the root of a tree.

#![warn(missing_docs)]

pub mod primitives;
pub mod decorators;
pub mod group;
pub mod select;
pub mod ext;
pub mod factory;
pub mod auto;

#[cfg(test)]
pub(crate) mod testing;

pub use primitives::{
    FunctionalCommand, InstantCommand, RunCommand, StartEndCommand, WaitCommand, WaitUntilCommand,
};
pub use decorators::{BeforeStarting, FinallyDo, OnlyWhile, Repeat, Timeout, Until, Unless};
pub use group::{DeadlineGroup, ParallelGroup, RaceGroup, SequentialGroup};
pub use select::EitherCommand;
pub use ext::CommandExt;
pub use auto::{auto, AutoBuilder};
