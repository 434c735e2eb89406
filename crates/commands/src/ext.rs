//! Fluent combinators available on every command.

use crate::decorators::{BeforeStarting, FinallyDo, OnlyWhile, Repeat, Timeout, Until, Unless};
use crate::group::{DeadlineGroup, ParallelGroup, RaceGroup, SequentialGroup};
use crate::primitives::InstantCommand;
use cadence_core::{Command, CommandHandle};
use std::time::Duration;

/// Decorator and group constructors in method form.
///
/// ```ignore
/// let auto = drive_forward
///     .with_timeout(Duration::from_secs(3))
///     .and_then(raise_arm)
///     .finally_do(|_| log_done());
/// ```
pub trait CommandExt: Command + Sized + 'static {
    /// Box the command for use as a group child.
    fn boxed(self) -> Box<dyn Command> {
        Box::new(self)
    }

    /// Wrap into a schedulable root handle.
    fn into_handle(self) -> CommandHandle {
        CommandHandle::new(self)
    }

    /// Wrap into a schedulable root handle with an explicit name.
    fn into_named_handle(self, name: impl Into<String>) -> CommandHandle {
        CommandHandle::named(name, self)
    }

    /// End after `limit` if not finished before.
    fn with_timeout(self, limit: Duration) -> Timeout {
        Timeout::new(self, limit)
    }

    /// End once `condition` holds.
    fn until(self, condition: impl Fn() -> bool + 'static) -> Until {
        Until::new(self, condition)
    }

    /// End once `condition` stops holding.
    fn only_while(self, condition: impl Fn() -> bool + 'static) -> OnlyWhile {
        OnlyWhile::new(self, condition)
    }

    /// Skip entirely if `condition` holds at start.
    fn unless(self, condition: impl Fn() -> bool + 'static) -> Unless {
        Unless::new(self, condition)
    }

    /// Run `action` before starting.
    fn before_starting(self, action: impl FnMut() + 'static) -> BeforeStarting {
        BeforeStarting::new(self, action)
    }

    /// Run `action` after ending; it receives the `interrupted` flag.
    fn finally_do(self, action: impl FnMut(bool) + 'static) -> FinallyDo {
        FinallyDo::new(self, action)
    }

    /// Restart on every completion until interrupted.
    fn repeatedly(self) -> Repeat {
        Repeat::new(self)
    }

    /// Run alongside `others`; finish when all have finished.
    fn along_with(self, others: impl IntoIterator<Item = Box<dyn Command>>) -> ParallelGroup {
        ParallelGroup::new(std::iter::once(self.boxed()).chain(others))
    }

    /// Run alongside `others`; finish when any has finished.
    fn race_with(self, others: impl IntoIterator<Item = Box<dyn Command>>) -> RaceGroup {
        RaceGroup::new(std::iter::once(self.boxed()).chain(others))
    }

    /// Run `others` for as long as this command runs.
    fn deadline_with(self, others: impl IntoIterator<Item = Box<dyn Command>>) -> DeadlineGroup {
        DeadlineGroup::new(self.boxed(), others)
    }

    /// Run `next` after this command finishes.
    fn and_then(self, next: impl Command + 'static) -> SequentialGroup {
        SequentialGroup::new([self.boxed(), Box::new(next) as Box<dyn Command>])
    }

    /// Run `action` once after this command finishes.
    fn and_then_run(self, action: impl FnMut() + 'static) -> SequentialGroup {
        self.and_then(InstantCommand::new(action))
    }
}

impl<C: Command + 'static> CommandExt for C {}
