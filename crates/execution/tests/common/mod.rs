//! Shared fixtures for scheduler scenarios.

#![allow(dead_code)]

use cadence_core::{Command, Requirements, SubsystemId};
use std::cell::RefCell;
use std::rc::Rc;

pub type Log = Rc<RefCell<Vec<String>>>;

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A command that logs `label:init`, `label:execute` and `label:end:<bool>`.
pub struct Step {
    label: &'static str,
    finish_after: Option<usize>,
    requirements: Requirements,
    log: Log,
    ticks: usize,
}

impl Step {
    pub fn endless(label: &'static str, log: &Log) -> Self {
        Self {
            label,
            finish_after: None,
            requirements: Requirements::new(),
            log: log.clone(),
            ticks: 0,
        }
    }

    pub fn finishing_after(label: &'static str, executes: usize, log: &Log) -> Self {
        Self {
            finish_after: Some(executes),
            ..Self::endless(label, log)
        }
    }

    pub fn requiring(mut self, subsystem: SubsystemId) -> Self {
        self.requirements.insert(subsystem);
        self
    }

    fn record(&self, event: &str) {
        self.log.borrow_mut().push(format!("{}:{}", self.label, event));
    }
}

impl Command for Step {
    fn initialize(&mut self) {
        self.ticks = 0;
        self.record("init");
    }

    fn execute(&mut self) {
        self.ticks += 1;
        self.record("execute");
    }

    fn is_finished(&self) -> bool {
        self.finish_after.is_some_and(|n| self.ticks >= n)
    }

    fn end(&mut self, interrupted: bool) {
        self.record(&format!("end:{interrupted}"));
    }

    fn requirements(&self) -> Requirements {
        self.requirements.clone()
    }

    fn name(&self) -> String {
        self.label.to_string()
    }
}

/// How many times `entry` appears in the log.
pub fn count(log: &Log, entry: &str) -> usize {
    log.borrow().iter().filter(|e| e.as_str() == entry).count()
}

/// Position of the first `entry` in the log.
pub fn position(log: &Log, entry: &str) -> Option<usize> {
    log.borrow().iter().position(|e| e == entry)
}

/// Drop every entry except lifecycle boundaries.
pub fn boundaries(log: &Log) -> Vec<String> {
    log.borrow()
        .iter()
        .filter(|e| !e.ends_with(":execute"))
        .cloned()
        .collect()
}
