//! Two-way branch chosen when the command starts.

use cadence_core::{Command, Requirements};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    OnTrue,
    OnFalse,
}

/// Evaluates a condition at `initialize` and then behaves exactly like the
/// chosen branch for the rest of the activation.
///
/// Before a branch is chosen, `requirements` reports the union of both
/// branches, which is what a scheduler reserves up front.
pub struct EitherCommand {
    condition: Box<dyn Fn() -> bool>,
    on_true: Box<dyn Command>,
    on_false: Box<dyn Command>,
    selected: Option<Branch>,
}

impl EitherCommand {
    /// Branch between `on_true` and `on_false`.
    pub fn new(
        condition: impl Fn() -> bool + 'static,
        on_true: impl Command + 'static,
        on_false: impl Command + 'static,
    ) -> Self {
        Self {
            condition: Box::new(condition),
            on_true: Box::new(on_true),
            on_false: Box::new(on_false),
            selected: None,
        }
    }

    fn active(&self) -> Option<&dyn Command> {
        match self.selected? {
            Branch::OnTrue => Some(self.on_true.as_ref()),
            Branch::OnFalse => Some(self.on_false.as_ref()),
        }
    }

    fn active_mut(&mut self) -> Option<&mut Box<dyn Command>> {
        match self.selected? {
            Branch::OnTrue => Some(&mut self.on_true),
            Branch::OnFalse => Some(&mut self.on_false),
        }
    }
}

impl Command for EitherCommand {
    fn initialize(&mut self) {
        let branch = if (self.condition)() {
            Branch::OnTrue
        } else {
            Branch::OnFalse
        };
        self.selected = Some(branch);
        if let Some(active) = self.active_mut() {
            active.initialize();
        }
    }

    fn execute(&mut self) {
        if let Some(active) = self.active_mut() {
            active.execute();
        }
    }

    fn is_finished(&self) -> bool {
        self.active().is_some_and(|active| active.is_finished())
    }

    fn end(&mut self, interrupted: bool) {
        if let Some(active) = self.active_mut() {
            active.end(interrupted);
        }
        self.selected = None;
    }

    fn requirements(&self) -> Requirements {
        match self.active() {
            Some(active) => active.requirements(),
            None => {
                let mut union = self.on_true.requirements();
                union.extend(self.on_false.requirements());
                union
            }
        }
    }

    fn name(&self) -> String {
        match self.active() {
            Some(active) => active.name(),
            None => format!("Either({} | {})", self.on_true.name(), self.on_false.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Probe;
    use cadence_core::SubsystemId;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_branch_chosen_at_initialize() {
        let flag = Rc::new(Cell::new(false));
        let watched = flag.clone();
        let yes = Probe::finishing_after(1);
        let no = Probe::finishing_after(1);
        let mut cmd = EitherCommand::new(move || watched.get(), yes.command(), no.command());

        cmd.initialize();
        // Changing the condition mid-run does not switch branches.
        flag.set(true);
        cmd.execute();
        assert!(cmd.is_finished());
        cmd.end(false);

        assert_eq!(yes.inits(), 0);
        assert_eq!(no.inits(), 1);
        assert_eq!(no.ends(), vec![false]);

        cmd.initialize();
        cmd.execute();
        cmd.end(false);
        assert_eq!(yes.inits(), 1);
    }

    #[test]
    fn test_requirements_follow_selection() {
        let left = SubsystemId::new();
        let right = SubsystemId::new();
        let mut cmd = EitherCommand::new(
            || true,
            Probe::endless().requiring(left).command(),
            Probe::endless().requiring(right).command(),
        );

        assert_eq!(cmd.requirements(), Requirements::from([left, right]));
        cmd.initialize();
        assert_eq!(cmd.requirements(), Requirements::from([left]));
        cmd.end(true);
        assert_eq!(cmd.requirements(), Requirements::from([left, right]));
    }

    #[test]
    fn test_not_finished_before_initialize() {
        let cmd = EitherCommand::new(|| true, Probe::finishing_after(0).command(), Probe::endless().command());
        assert!(!cmd.is_finished());
    }
}
