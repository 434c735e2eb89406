//! Leaf commands built from closures.

use cadence_core::{system_clock, Command, Requirements, SharedClock, SubsystemId};
use std::time::{Duration, Instant};

type Action = Box<dyn FnMut()>;
type EndAction = Box<dyn FnMut(bool)>;
type Predicate = Box<dyn Fn() -> bool>;

/// Runs an action once, on its first `execute`, then finishes.
pub struct InstantCommand {
    action: Action,
    has_run: bool,
    requirements: Requirements,
    name: Option<String>,
}

impl InstantCommand {
    /// Create a new instant command.
    pub fn new(action: impl FnMut() + 'static) -> Self {
        Self {
            action: Box::new(action),
            has_run: false,
            requirements: Requirements::new(),
            name: None,
        }
    }

    /// An instant command that does nothing.
    pub fn none() -> Self {
        Self::new(|| {})
    }

    /// Declare a subsystem requirement.
    pub fn requiring(mut self, subsystem: SubsystemId) -> Self {
        self.requirements.insert(subsystem);
        self
    }

    /// Set the name used in logs.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Command for InstantCommand {
    fn initialize(&mut self) {
        self.has_run = false;
    }

    fn execute(&mut self) {
        if !self.has_run {
            (self.action)();
            self.has_run = true;
        }
    }

    fn is_finished(&self) -> bool {
        self.has_run
    }

    fn requirements(&self) -> Requirements {
        self.requirements.clone()
    }

    fn name(&self) -> String {
        self.name.clone().unwrap_or_else(|| "InstantCommand".to_string())
    }
}

/// Runs an action every tick and never finishes on its own.
pub struct RunCommand {
    action: Action,
    requirements: Requirements,
    name: Option<String>,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(action: impl FnMut() + 'static) -> Self {
        Self {
            action: Box::new(action),
            requirements: Requirements::new(),
            name: None,
        }
    }

    /// Declare a subsystem requirement.
    pub fn requiring(mut self, subsystem: SubsystemId) -> Self {
        self.requirements.insert(subsystem);
        self
    }

    /// Set the name used in logs.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Command for RunCommand {
    fn execute(&mut self) {
        (self.action)();
    }

    fn requirements(&self) -> Requirements {
        self.requirements.clone()
    }

    fn name(&self) -> String {
        self.name.clone().unwrap_or_else(|| "RunCommand".to_string())
    }
}

/// Runs one action on start and another on end; never finishes on its own.
pub struct StartEndCommand {
    on_start: Action,
    on_end: Action,
    requirements: Requirements,
    name: Option<String>,
}

impl StartEndCommand {
    /// Create a new start/end command.
    pub fn new(on_start: impl FnMut() + 'static, on_end: impl FnMut() + 'static) -> Self {
        Self {
            on_start: Box::new(on_start),
            on_end: Box::new(on_end),
            requirements: Requirements::new(),
            name: None,
        }
    }

    /// Declare a subsystem requirement.
    pub fn requiring(mut self, subsystem: SubsystemId) -> Self {
        self.requirements.insert(subsystem);
        self
    }

    /// Set the name used in logs.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Command for StartEndCommand {
    fn initialize(&mut self) {
        (self.on_start)();
    }

    fn end(&mut self, _interrupted: bool) {
        (self.on_end)();
    }

    fn requirements(&self) -> Requirements {
        self.requirements.clone()
    }

    fn name(&self) -> String {
        self.name.clone().unwrap_or_else(|| "StartEndCommand".to_string())
    }
}

/// A command whose four lifecycle calls are supplied as closures.
pub struct FunctionalCommand {
    on_init: Action,
    on_execute: Action,
    on_end: EndAction,
    is_finished: Predicate,
    requirements: Requirements,
    name: Option<String>,
}

impl FunctionalCommand {
    /// Create a new functional command.
    pub fn new(
        on_init: impl FnMut() + 'static,
        on_execute: impl FnMut() + 'static,
        on_end: impl FnMut(bool) + 'static,
        is_finished: impl Fn() -> bool + 'static,
    ) -> Self {
        Self {
            on_init: Box::new(on_init),
            on_execute: Box::new(on_execute),
            on_end: Box::new(on_end),
            is_finished: Box::new(is_finished),
            requirements: Requirements::new(),
            name: None,
        }
    }

    /// Declare a subsystem requirement.
    pub fn requiring(mut self, subsystem: SubsystemId) -> Self {
        self.requirements.insert(subsystem);
        self
    }

    /// Set the name used in logs.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Command for FunctionalCommand {
    fn initialize(&mut self) {
        (self.on_init)();
    }

    fn execute(&mut self) {
        (self.on_execute)();
    }

    fn is_finished(&self) -> bool {
        (self.is_finished)()
    }

    fn end(&mut self, interrupted: bool) {
        (self.on_end)(interrupted);
    }

    fn requirements(&self) -> Requirements {
        self.requirements.clone()
    }

    fn name(&self) -> String {
        self.name.clone().unwrap_or_else(|| "FunctionalCommand".to_string())
    }
}

/// Does nothing for a fixed duration.
///
/// Elapsed time is measured against the command's clock from the moment it
/// was initialized, so the result does not depend on how often it ticks.
pub struct WaitCommand {
    duration: Duration,
    clock: SharedClock,
    started: Option<Instant>,
    requirements: Requirements,
    name: Option<String>,
}

impl WaitCommand {
    /// Wait for `duration`.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            clock: system_clock(),
            started: None,
            requirements: Requirements::new(),
            name: None,
        }
    }

    /// Wait for a number of seconds. Negative or non-finite values wait zero.
    pub fn seconds(seconds: f64) -> Self {
        Self::new(Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO))
    }

    /// Measure time with `clock` instead of the system clock.
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    /// Declare a subsystem requirement.
    pub fn requiring(mut self, subsystem: SubsystemId) -> Self {
        self.requirements.insert(subsystem);
        self
    }

    /// Name used in logs.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Configured duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Command for WaitCommand {
    fn initialize(&mut self) {
        self.started = Some(self.clock.now());
    }

    fn is_finished(&self) -> bool {
        match self.started {
            Some(started) => self.clock.elapsed(started) >= self.duration,
            None => false,
        }
    }

    fn requirements(&self) -> Requirements {
        self.requirements.clone()
    }

    fn name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("Wait({:?})", self.duration),
        }
    }
}

/// Finishes as soon as a condition holds.
pub struct WaitUntilCommand {
    condition: Predicate,
    requirements: Requirements,
    name: Option<String>,
}

impl WaitUntilCommand {
    /// Create a new wait-until command.
    pub fn new(condition: impl Fn() -> bool + 'static) -> Self {
        Self {
            condition: Box::new(condition),
            requirements: Requirements::new(),
            name: None,
        }
    }

    /// Declare a subsystem requirement.
    pub fn requiring(mut self, subsystem: SubsystemId) -> Self {
        self.requirements.insert(subsystem);
        self
    }

    /// Name used in logs.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Command for WaitUntilCommand {
    fn is_finished(&self) -> bool {
        (self.condition)()
    }

    fn requirements(&self) -> Requirements {
        self.requirements.clone()
    }

    fn name(&self) -> String {
        self.name.clone().unwrap_or_else(|| "WaitUntil".to_string())
    }
}
