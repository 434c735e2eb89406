//! Instrumented command for unit tests.

use cadence_core::{Command, Requirements, SubsystemId};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Default)]
struct ProbeState {
    inits: Cell<usize>,
    executes: Cell<usize>,
    ends: RefCell<Vec<bool>>,
}

/// Records every lifecycle call made on the commands it hands out.
#[derive(Clone)]
pub struct Probe {
    label: String,
    finish_after: Option<usize>,
    requirements: Requirements,
    state: Rc<ProbeState>,
    log: Option<Rc<RefCell<Vec<String>>>>,
}

impl Probe {
    /// A probe whose command never finishes.
    pub fn endless() -> Self {
        Self {
            label: "probe".to_string(),
            finish_after: None,
            requirements: Requirements::new(),
            state: Rc::default(),
            log: None,
        }
    }

    /// A probe whose command finishes after `executes` calls to `execute`.
    pub fn finishing_after(executes: usize) -> Self {
        Self {
            finish_after: Some(executes),
            ..Self::endless()
        }
    }

    pub fn named(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn requiring(mut self, subsystem: SubsystemId) -> Self {
        self.requirements.insert(subsystem);
        self
    }

    /// Append `label:event` lines to a shared log.
    pub fn logging_to(mut self, log: Rc<RefCell<Vec<String>>>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn command(&self) -> ProbeCommand {
        ProbeCommand {
            probe: self.clone(),
            ticks: 0,
        }
    }

    pub fn inits(&self) -> usize {
        self.state.inits.get()
    }

    pub fn executes(&self) -> usize {
        self.state.executes.get()
    }

    pub fn ends(&self) -> Vec<bool> {
        self.state.ends.borrow().clone()
    }

    fn record(&self, event: String) {
        if let Some(log) = &self.log {
            log.borrow_mut().push(format!("{}:{}", self.label, event));
        }
    }
}

pub struct ProbeCommand {
    probe: Probe,
    ticks: usize,
}

impl Command for ProbeCommand {
    fn initialize(&mut self) {
        self.ticks = 0;
        let state = &self.probe.state;
        state.inits.set(state.inits.get() + 1);
        self.probe.record("init".to_string());
    }

    fn execute(&mut self) {
        self.ticks += 1;
        let state = &self.probe.state;
        state.executes.set(state.executes.get() + 1);
        self.probe.record("execute".to_string());
    }

    fn is_finished(&self) -> bool {
        self.probe.finish_after.is_some_and(|n| self.ticks >= n)
    }

    fn end(&mut self, interrupted: bool) {
        self.probe.state.ends.borrow_mut().push(interrupted);
        self.probe.record(format!("end:{interrupted}"));
    }

    fn requirements(&self) -> Requirements {
        self.probe.requirements.clone()
    }

    fn name(&self) -> String {
        self.probe.label.clone()
    }
}
