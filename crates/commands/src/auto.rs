//! Step-list builder for scripted routines.
//!
//! ```ignore
//! let routine = AutoBuilder::new()
//!     .run(|| println!("start"))
//!     .wait_seconds(0.5)
//!     .either(|| has_piece(), score(), retreat())
//!     .build();
//! ```

use crate::ext::CommandExt;
use crate::group::{DeadlineGroup, ParallelGroup, RaceGroup, SequentialGroup};
use crate::primitives::{InstantCommand, WaitCommand};
use crate::select::EitherCommand;
use cadence_core::Command;
use std::time::Duration;

/// Accumulates steps and lowers them to one [`SequentialGroup`].
#[derive(Default)]
pub struct AutoBuilder {
    steps: Vec<Box<dyn Command>>,
}

impl AutoBuilder {
    /// Start an empty routine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an arbitrary command.
    pub fn command(mut self, command: impl Command + 'static) -> Self {
        self.steps.push(Box::new(command));
        self
    }

    /// Alias for [`command`](Self::command).
    pub fn add(self, command: impl Command + 'static) -> Self {
        self.command(command)
    }

    /// Append an action that runs once.
    pub fn run(self, action: impl FnMut() + 'static) -> Self {
        self.command(InstantCommand::new(action))
    }

    /// Alias for [`run`](Self::run).
    pub fn do_instant(self, action: impl FnMut() + 'static) -> Self {
        self.run(action)
    }

    /// Append a step that hands `label` to `sink` when reached.
    pub fn marker(self, label: impl Into<String>, mut sink: impl FnMut(&str) + 'static) -> Self {
        let label = label.into();
        self.run(move || sink(&label))
    }

    /// Append a pause.
    pub fn wait(self, duration: Duration) -> Self {
        self.command(WaitCommand::new(duration))
    }

    /// Append a pause given in seconds.
    pub fn wait_seconds(self, seconds: f64) -> Self {
        self.command(WaitCommand::seconds(seconds))
    }

    /// Alias for [`wait_seconds`](Self::wait_seconds).
    pub fn wait_for(self, seconds: f64) -> Self {
        self.wait_seconds(seconds)
    }

    /// Append `command`, skipped unless `condition` holds when the step is reached.
    pub fn when(self, condition: impl Fn() -> bool + 'static, command: impl Command + 'static) -> Self {
        self.command(command.unless(move || !condition()))
    }

    /// Append a branch decided when the step is reached.
    pub fn either(
        self,
        condition: impl Fn() -> bool + 'static,
        on_true: impl Command + 'static,
        on_false: impl Command + 'static,
    ) -> Self {
        self.command(EitherCommand::new(condition, on_true, on_false))
    }

    /// Alias for [`either`](Self::either).
    pub fn if_else(
        self,
        condition: impl Fn() -> bool + 'static,
        on_true: impl Command + 'static,
        on_false: impl Command + 'static,
    ) -> Self {
        self.either(condition, on_true, on_false)
    }

    /// Append commands that run together until all finish.
    pub fn parallel(self, commands: impl IntoIterator<Item = Box<dyn Command>>) -> Self {
        self.command(ParallelGroup::new(commands))
    }

    /// Append commands that run together until one finishes.
    pub fn race(self, commands: impl IntoIterator<Item = Box<dyn Command>>) -> Self {
        self.command(RaceGroup::new(commands))
    }

    /// Append commands that run for as long as `deadline` runs.
    pub fn deadline(
        self,
        deadline: impl Command + 'static,
        others: impl IntoIterator<Item = Box<dyn Command>>,
    ) -> Self {
        self.command(DeadlineGroup::new(deadline.boxed(), others))
    }

    /// Number of steps so far.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no steps have been added.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Lower the steps to a sequential group.
    pub fn build(self) -> SequentialGroup {
        SequentialGroup::new(self.steps)
    }
}

/// Build a routine with a closure over the builder.
pub fn auto(block: impl FnOnce(AutoBuilder) -> AutoBuilder) -> SequentialGroup {
    block(AutoBuilder::new()).build()
}
