//! Condition-driven bindings that schedule commands on edges.

use cadence_core::CommandHandle;
use std::rc::Rc;

/// A boolean condition, typically a button or a sensor threshold.
#[derive(Clone)]
pub struct Trigger {
    condition: Rc<dyn Fn() -> bool>,
}

impl Trigger {
    /// Create a trigger from a condition.
    pub fn new(condition: impl Fn() -> bool + 'static) -> Self {
        Self {
            condition: Rc::new(condition),
        }
    }

    /// Current value of the condition.
    pub fn get(&self) -> bool {
        (self.condition)()
    }

    /// True when both triggers are.
    pub fn and(&self, other: &Trigger) -> Trigger {
        let (a, b) = (self.clone(), other.clone());
        Trigger::new(move || a.get() && b.get())
    }

    /// True when either trigger is.
    pub fn or(&self, other: &Trigger) -> Trigger {
        let (a, b) = (self.clone(), other.clone());
        Trigger::new(move || a.get() || b.get())
    }

    /// True when this trigger is not.
    pub fn negate(&self) -> Trigger {
        let a = self.clone();
        Trigger::new(move || !a.get())
    }

    /// Schedule `command` when the condition becomes true.
    pub fn on_true(&self, command: CommandHandle) -> Binding {
        self.bind(BindingKind::OnTrue, command)
    }

    /// Schedule `command` when the condition becomes false.
    pub fn on_false(&self, command: CommandHandle) -> Binding {
        self.bind(BindingKind::OnFalse, command)
    }

    /// Schedule `command` when the condition becomes true, cancel it when
    /// the condition becomes false.
    pub fn while_true(&self, command: CommandHandle) -> Binding {
        self.bind(BindingKind::WhileTrue, command)
    }

    /// Schedule `command` when the condition becomes false, cancel it when
    /// the condition becomes true.
    pub fn while_false(&self, command: CommandHandle) -> Binding {
        self.bind(BindingKind::WhileFalse, command)
    }

    /// Start or stop `command` each time the condition becomes true.
    pub fn toggle_on_true(&self, command: CommandHandle) -> Binding {
        self.bind(BindingKind::ToggleOnTrue, command)
    }

    fn bind(&self, kind: BindingKind, command: CommandHandle) -> Binding {
        Binding {
            trigger: self.clone(),
            kind,
            command,
            last: self.get(),
        }
    }
}

impl std::fmt::Debug for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trigger").finish_non_exhaustive()
    }
}

/// How a binding reacts to edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// Schedule on rising edge
    OnTrue,
    /// Schedule on falling edge
    OnFalse,
    /// Schedule on rising edge, cancel on falling edge
    WhileTrue,
    /// Schedule on falling edge, cancel on rising edge
    WhileFalse,
    /// Toggle on rising edge
    ToggleOnTrue,
}

/// What the scheduler should do after a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingAction {
    /// Schedule the command
    Schedule(CommandHandle),
    /// Cancel the command
    Cancel(CommandHandle),
    /// Cancel the command if running, schedule it otherwise
    Toggle(CommandHandle),
}

/// A trigger bound to a command. Register with
/// [`Scheduler::bind`](crate::Scheduler::bind).
///
/// Edges are detected against the value sampled when the binding was
/// created and at each poll after that.
#[derive(Debug)]
pub struct Binding {
    trigger: Trigger,
    kind: BindingKind,
    command: CommandHandle,
    last: bool,
}

impl Binding {
    /// Binding kind.
    pub fn kind(&self) -> BindingKind {
        self.kind
    }

    /// Bound command.
    pub fn command(&self) -> &CommandHandle {
        &self.command
    }

    /// Sample the condition and report the action for this edge, if any.
    pub fn poll(&mut self) -> Option<BindingAction> {
        let now = self.trigger.get();
        let was = std::mem::replace(&mut self.last, now);
        let rising = !was && now;
        let falling = was && !now;
        let command = self.command.clone();

        match self.kind {
            BindingKind::OnTrue if rising => Some(BindingAction::Schedule(command)),
            BindingKind::OnFalse if falling => Some(BindingAction::Schedule(command)),
            BindingKind::WhileTrue if rising => Some(BindingAction::Schedule(command)),
            BindingKind::WhileTrue if falling => Some(BindingAction::Cancel(command)),
            BindingKind::WhileFalse if falling => Some(BindingAction::Schedule(command)),
            BindingKind::WhileFalse if rising => Some(BindingAction::Cancel(command)),
            BindingKind::ToggleOnTrue if rising => Some(BindingAction::Toggle(command)),
            _ => None,
        }
    }
}
