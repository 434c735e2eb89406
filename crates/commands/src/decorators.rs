//! Single-child decorators.
//!
//! Every decorator owns exactly one child, reports the child's requirements
//! as its own, and is itself a [`Command`], so decorated commands nest into
//! groups and other decorators without special cases.

use cadence_core::{system_clock, Command, Requirements, SharedClock};
use std::time::{Duration, Instant};
use tracing::debug;

type Predicate = Box<dyn Fn() -> bool>;

/// Ends the child once a time limit has elapsed.
pub struct Timeout {
    child: Box<dyn Command>,
    limit: Duration,
    clock: SharedClock,
    started: Option<Instant>,
}

impl Timeout {
    /// Limit `child` to `limit`.
    pub fn new(child: impl Command + 'static, limit: Duration) -> Self {
        Self {
            child: Box::new(child),
            limit,
            clock: system_clock(),
            started: None,
        }
    }

    /// Measure time with `clock` instead of the system clock.
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    fn timed_out(&self) -> bool {
        self.started
            .is_some_and(|started| self.clock.elapsed(started) >= self.limit)
    }
}

impl Command for Timeout {
    fn initialize(&mut self) {
        self.started = Some(self.clock.now());
        self.child.initialize();
    }

    fn execute(&mut self) {
        self.child.execute();
    }

    fn is_finished(&self) -> bool {
        self.child.is_finished() || self.timed_out()
    }

    fn end(&mut self, interrupted: bool) {
        // A child cut short by the limit is told it was interrupted.
        let cut_short = !self.child.is_finished() && self.timed_out();
        if cut_short {
            debug!(
                command = %self.child.name(),
                limit_ms = u64::try_from(self.limit.as_millis()).unwrap_or(u64::MAX),
                "timed out"
            );
        }
        self.child.end(interrupted || cut_short);
        self.started = None;
    }

    fn requirements(&self) -> Requirements {
        self.child.requirements()
    }

    fn name(&self) -> String {
        format!("Timeout({})", self.child.name())
    }
}

/// Finishes when the child does or when a condition becomes true.
pub struct Until {
    child: Box<dyn Command>,
    condition: Predicate,
}

impl Until {
    /// Run `child` until `condition` holds.
    pub fn new(child: impl Command + 'static, condition: impl Fn() -> bool + 'static) -> Self {
        Self {
            child: Box::new(child),
            condition: Box::new(condition),
        }
    }
}

impl Command for Until {
    fn initialize(&mut self) {
        self.child.initialize();
    }

    fn execute(&mut self) {
        self.child.execute();
    }

    fn is_finished(&self) -> bool {
        self.child.is_finished() || (self.condition)()
    }

    fn end(&mut self, interrupted: bool) {
        self.child.end(interrupted);
    }

    fn requirements(&self) -> Requirements {
        self.child.requirements()
    }

    fn name(&self) -> String {
        format!("Until({})", self.child.name())
    }
}

/// Finishes when the child does or when a condition stops holding.
pub struct OnlyWhile {
    child: Box<dyn Command>,
    condition: Predicate,
}

impl OnlyWhile {
    /// Run `child` only while `condition` holds.
    pub fn new(child: impl Command + 'static, condition: impl Fn() -> bool + 'static) -> Self {
        Self {
            child: Box::new(child),
            condition: Box::new(condition),
        }
    }
}

impl Command for OnlyWhile {
    fn initialize(&mut self) {
        self.child.initialize();
    }

    fn execute(&mut self) {
        self.child.execute();
    }

    fn is_finished(&self) -> bool {
        self.child.is_finished() || !(self.condition)()
    }

    fn end(&mut self, interrupted: bool) {
        self.child.end(interrupted);
    }

    fn requirements(&self) -> Requirements {
        self.child.requirements()
    }

    fn name(&self) -> String {
        format!("OnlyWhile({})", self.child.name())
    }
}

/// Skips the child entirely if a condition holds when it would start.
pub struct Unless {
    child: Box<dyn Command>,
    condition: Predicate,
    skipped: bool,
}

impl Unless {
    /// Run `child` unless `condition` holds at initialize.
    pub fn new(child: impl Command + 'static, condition: impl Fn() -> bool + 'static) -> Self {
        Self {
            child: Box::new(child),
            condition: Box::new(condition),
            skipped: false,
        }
    }
}

impl Command for Unless {
    fn initialize(&mut self) {
        self.skipped = (self.condition)();
        if !self.skipped {
            self.child.initialize();
        }
    }

    fn execute(&mut self) {
        if !self.skipped {
            self.child.execute();
        }
    }

    fn is_finished(&self) -> bool {
        self.skipped || self.child.is_finished()
    }

    fn end(&mut self, interrupted: bool) {
        if !self.skipped {
            self.child.end(interrupted);
        }
    }

    fn requirements(&self) -> Requirements {
        self.child.requirements()
    }

    fn name(&self) -> String {
        format!("Unless({})", self.child.name())
    }
}

/// Runs an action immediately before the child starts.
pub struct BeforeStarting {
    child: Box<dyn Command>,
    action: Box<dyn FnMut()>,
}

impl BeforeStarting {
    /// Run `action` before each start of `child`.
    pub fn new(child: impl Command + 'static, action: impl FnMut() + 'static) -> Self {
        Self {
            child: Box::new(child),
            action: Box::new(action),
        }
    }
}

impl Command for BeforeStarting {
    fn initialize(&mut self) {
        (self.action)();
        self.child.initialize();
    }

    fn execute(&mut self) {
        self.child.execute();
    }

    fn is_finished(&self) -> bool {
        self.child.is_finished()
    }

    fn end(&mut self, interrupted: bool) {
        self.child.end(interrupted);
    }

    fn requirements(&self) -> Requirements {
        self.child.requirements()
    }

    fn name(&self) -> String {
        self.child.name()
    }
}

/// Runs an action after the child ends, whether or not it was interrupted.
///
/// The action receives the `interrupted` flag.
pub struct FinallyDo {
    child: Box<dyn Command>,
    action: Box<dyn FnMut(bool)>,
}

impl FinallyDo {
    /// Run `action` after each end of `child`.
    pub fn new(child: impl Command + 'static, action: impl FnMut(bool) + 'static) -> Self {
        Self {
            child: Box::new(child),
            action: Box::new(action),
        }
    }
}

impl Command for FinallyDo {
    fn initialize(&mut self) {
        self.child.initialize();
    }

    fn execute(&mut self) {
        self.child.execute();
    }

    fn is_finished(&self) -> bool {
        self.child.is_finished()
    }

    fn end(&mut self, interrupted: bool) {
        self.child.end(interrupted);
        (self.action)(interrupted);
    }

    fn requirements(&self) -> Requirements {
        self.child.requirements()
    }

    fn name(&self) -> String {
        self.child.name()
    }
}

/// Restarts the child every time it finishes. Never finishes on its own.
pub struct Repeat {
    child: Box<dyn Command>,
    // Child ended and waits to be restarted on the next execute.
    child_ended: bool,
}

impl Repeat {
    /// Repeat `child` until interrupted.
    pub fn new(child: impl Command + 'static) -> Self {
        Self {
            child: Box::new(child),
            child_ended: false,
        }
    }
}

impl Command for Repeat {
    fn initialize(&mut self) {
        self.child_ended = false;
        self.child.initialize();
    }

    fn execute(&mut self) {
        if self.child_ended {
            self.child_ended = false;
            self.child.initialize();
        }
        self.child.execute();
        if self.child.is_finished() {
            self.child.end(false);
            self.child_ended = true;
        }
    }

    fn end(&mut self, interrupted: bool) {
        if !self.child_ended {
            self.child.end(interrupted);
        }
        self.child_ended = false;
    }

    fn requirements(&self) -> Requirements {
        self.child.requirements()
    }

    fn name(&self) -> String {
        format!("Repeat({})", self.child.name())
    }
}
