//! Multi-child composite commands.

mod parallel;
mod sequential;

pub use parallel::{DeadlineGroup, ParallelGroup, RaceGroup};
pub use sequential::SequentialGroup;

use cadence_core::{Command, Requirements};

/// Children that run side by side, with a per-child running flag.
///
/// Iteration is always in declaration order so simultaneous finishes are
/// handled deterministically.
pub(crate) struct ChildSet {
    children: Vec<Box<dyn Command>>,
    running: Vec<bool>,
}

impl ChildSet {
    pub(crate) fn new(children: Vec<Box<dyn Command>>) -> Self {
        let running = vec![false; children.len()];
        Self { children, running }
    }

    pub(crate) fn len(&self) -> usize {
        self.children.len()
    }

    /// Initialize every child.
    pub(crate) fn start_all(&mut self) {
        for (child, running) in self.children.iter_mut().zip(self.running.iter_mut()) {
            child.initialize();
            *running = true;
        }
    }

    pub(crate) fn is_running(&self, index: usize) -> bool {
        self.running[index]
    }

    pub(crate) fn any_running(&self) -> bool {
        self.running.iter().any(|running| *running)
    }

    /// Execute a running child and report whether it is now finished.
    pub(crate) fn step(&mut self, index: usize) -> bool {
        let child = &mut self.children[index];
        child.execute();
        child.is_finished()
    }

    /// End one running child.
    pub(crate) fn stop(&mut self, index: usize, interrupted: bool) {
        if self.running[index] {
            self.running[index] = false;
            self.children[index].end(interrupted);
        }
    }

    /// End every child still running, in declaration order.
    pub(crate) fn stop_all(&mut self, interrupted: bool) {
        for index in 0..self.children.len() {
            self.stop(index, interrupted);
        }
    }

    /// Union of every child's requirements, running or not.
    pub(crate) fn requirements(&self) -> Requirements {
        union_requirements(&self.children)
    }

    pub(crate) fn names(&self) -> String {
        self.children
            .iter()
            .map(|child| child.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub(crate) fn union_requirements(children: &[Box<dyn Command>]) -> Requirements {
    children
        .iter()
        .flat_map(|child| child.requirements())
        .collect()
}
