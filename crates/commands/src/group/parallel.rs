//! Side-by-side groups: parallel-all, race and deadline.

use super::ChildSet;
use cadence_core::{Command, Requirements};
use tracing::debug;

/// Runs all children at once; finishes when every child has finished.
pub struct ParallelGroup {
    children: ChildSet,
}

impl ParallelGroup {
    /// Create a group over `children`.
    pub fn new(children: impl IntoIterator<Item = Box<dyn Command>>) -> Self {
        Self {
            children: ChildSet::new(children.into_iter().collect()),
        }
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the group has no children.
    pub fn is_empty(&self) -> bool {
        self.children.len() == 0
    }
}

impl Command for ParallelGroup {
    fn initialize(&mut self) {
        self.children.start_all();
    }

    fn execute(&mut self) {
        for index in 0..self.children.len() {
            if self.children.is_running(index) && self.children.step(index) {
                self.children.stop(index, false);
            }
        }
    }

    fn is_finished(&self) -> bool {
        !self.children.any_running()
    }

    fn end(&mut self, interrupted: bool) {
        self.children.stop_all(interrupted);
    }

    fn requirements(&self) -> Requirements {
        self.children.requirements()
    }

    fn name(&self) -> String {
        format!("Parallel[{}]", self.children.names())
    }
}

/// Runs all children at once; finishes as soon as any child finishes.
///
/// Every running child executes each tick before a winner is picked. Among
/// children finishing in the same tick the first in declaration order wins;
/// the winner ends normally and all other children are interrupted.
pub struct RaceGroup {
    children: ChildSet,
    decided: bool,
}

impl RaceGroup {
    /// Create a group over `children`.
    pub fn new(children: impl IntoIterator<Item = Box<dyn Command>>) -> Self {
        Self {
            children: ChildSet::new(children.into_iter().collect()),
            decided: false,
        }
    }
}

impl Command for RaceGroup {
    fn initialize(&mut self) {
        self.decided = false;
        self.children.start_all();
    }

    fn execute(&mut self) {
        if self.decided {
            return;
        }

        let mut winner = None;
        for index in 0..self.children.len() {
            if self.children.is_running(index) && self.children.step(index) && winner.is_none() {
                winner = Some(index);
            }
        }

        if let Some(winner) = winner {
            debug!(winner, "race decided");
            self.children.stop(winner, false);
            self.children.stop_all(true);
            self.decided = true;
        }
    }

    fn is_finished(&self) -> bool {
        self.decided || !self.children.any_running()
    }

    fn end(&mut self, interrupted: bool) {
        self.children.stop_all(interrupted);
    }

    fn requirements(&self) -> Requirements {
        self.children.requirements()
    }

    fn name(&self) -> String {
        format!("Race[{}]", self.children.names())
    }
}

/// Runs a deadline command alongside others; finishes exactly when the
/// deadline does, interrupting whatever is still running. Children after the
/// deadline are not executed on the tick it finishes.
pub struct DeadlineGroup {
    // Index 0 is the deadline.
    children: ChildSet,
    deadline_done: bool,
}

impl DeadlineGroup {
    /// Create a group that lasts as long as `deadline`.
    pub fn new(
        deadline: Box<dyn Command>,
        others: impl IntoIterator<Item = Box<dyn Command>>,
    ) -> Self {
        let children = std::iter::once(deadline).chain(others).collect();
        Self {
            children: ChildSet::new(children),
            deadline_done: false,
        }
    }
}

impl Command for DeadlineGroup {
    fn initialize(&mut self) {
        self.deadline_done = false;
        self.children.start_all();
    }

    fn execute(&mut self) {
        for index in 0..self.children.len() {
            if self.children.is_running(index) && self.children.step(index) {
                self.children.stop(index, false);
                if index == 0 {
                    // Others still running are interrupted without executing this tick.
                    self.deadline_done = true;
                    self.children.stop_all(true);
                    return;
                }
            }
        }
    }

    fn is_finished(&self) -> bool {
        self.deadline_done
    }

    fn end(&mut self, interrupted: bool) {
        self.children.stop_all(interrupted);
    }

    fn requirements(&self) -> Requirements {
        self.children.requirements()
    }

    fn name(&self) -> String {
        format!("Deadline[{}]", self.children.names())
    }
}
