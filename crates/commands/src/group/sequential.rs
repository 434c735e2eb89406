//! Sequential group.

use super::union_requirements;
use cadence_core::{Command, Requirements};
use tracing::trace;

/// Runs children one after another.
///
/// When the active child finishes, the next one is initialized in the same
/// tick and executes from the following tick on. The group reserves the
/// union of all children's requirements for its whole run.
pub struct SequentialGroup {
    children: Vec<Box<dyn Command>>,
    current: Option<usize>,
}

impl SequentialGroup {
    /// Create a group over `children`, in order.
    pub fn new(children: impl IntoIterator<Item = Box<dyn Command>>) -> Self {
        Self {
            children: children.into_iter().collect(),
            current: None,
        }
    }

    /// Append a child to the end of the sequence.
    pub fn push(&mut self, child: impl Command + 'static) {
        self.children.push(Box::new(child));
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the group has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Index of the active child, if any.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    fn activate(&mut self, index: usize) {
        if index < self.children.len() {
            self.children[index].initialize();
            self.current = Some(index);
        } else {
            self.current = None;
        }
    }
}

impl Command for SequentialGroup {
    fn initialize(&mut self) {
        self.activate(0);
    }

    fn execute(&mut self) {
        let Some(index) = self.current else {
            return;
        };

        let child = &mut self.children[index];
        child.execute();
        if child.is_finished() {
            child.end(false);
            trace!(step = index, of = self.children.len(), "sequence step finished");
            self.activate(index + 1);
        }
    }

    fn is_finished(&self) -> bool {
        self.current.is_none()
    }

    fn end(&mut self, interrupted: bool) {
        if let Some(index) = self.current.take() {
            self.children[index].end(interrupted);
        }
    }

    fn requirements(&self) -> Requirements {
        union_requirements(&self.children)
    }

    fn name(&self) -> String {
        let names: Vec<_> = self.children.iter().map(|child| child.name()).collect();
        format!("Sequence[{}]", names.join(", "))
    }
}
