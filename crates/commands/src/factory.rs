//! Shorthand constructors for common command shapes.

use crate::group::{DeadlineGroup, ParallelGroup, RaceGroup, SequentialGroup};
use crate::primitives::{InstantCommand, RunCommand, StartEndCommand, WaitCommand, WaitUntilCommand};
use crate::select::EitherCommand;
use cadence_core::Command;
use std::time::Duration;

/// A command that finishes immediately without doing anything.
pub fn none() -> InstantCommand {
    InstantCommand::none()
}

/// Run `action` once.
pub fn run_once(action: impl FnMut() + 'static) -> InstantCommand {
    InstantCommand::new(action)
}

/// Run `action` every tick, forever.
pub fn run(action: impl FnMut() + 'static) -> RunCommand {
    RunCommand::new(action)
}

/// Run `on_start` when started and `on_end` when stopped.
pub fn start_end(on_start: impl FnMut() + 'static, on_end: impl FnMut() + 'static) -> StartEndCommand {
    StartEndCommand::new(on_start, on_end)
}

/// Wait for `duration`.
pub fn wait(duration: Duration) -> WaitCommand {
    WaitCommand::new(duration)
}

/// Wait for a number of seconds.
pub fn wait_seconds(seconds: f64) -> WaitCommand {
    WaitCommand::seconds(seconds)
}

/// Wait until `condition` holds.
pub fn wait_until(condition: impl Fn() -> bool + 'static) -> WaitUntilCommand {
    WaitUntilCommand::new(condition)
}

/// Run `commands` one after another.
pub fn sequence(commands: impl IntoIterator<Item = Box<dyn Command>>) -> SequentialGroup {
    SequentialGroup::new(commands)
}

/// Run `commands` together until all finish.
pub fn parallel(commands: impl IntoIterator<Item = Box<dyn Command>>) -> ParallelGroup {
    ParallelGroup::new(commands)
}

/// Run `commands` together until one finishes.
pub fn race(commands: impl IntoIterator<Item = Box<dyn Command>>) -> RaceGroup {
    RaceGroup::new(commands)
}

/// Run `others` for as long as `deadline` runs.
pub fn deadline(
    deadline: impl Command + 'static,
    others: impl IntoIterator<Item = Box<dyn Command>>,
) -> DeadlineGroup {
    DeadlineGroup::new(Box::new(deadline), others)
}

/// Pick `on_true` or `on_false` when started.
pub fn either(
    condition: impl Fn() -> bool + 'static,
    on_true: impl Command + 'static,
    on_false: impl Command + 'static,
) -> EitherCommand {
    EitherCommand::new(condition, on_true, on_false)
}
