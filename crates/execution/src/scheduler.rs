//! The command scheduler - claims, fallbacks and the tick loop.

use crate::config::SchedulerConfig;
use crate::trigger::{Binding, BindingAction};
use cadence_core::{CommandHandle, CommandId, Requirements, SubsystemHandle, SubsystemId};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use tracing::{debug, trace};

/// A root command currently running, with the claims taken when it started.
struct ActiveCommand {
    handle: CommandHandle,
    requirements: Requirements,
}

/// A request queued through a [`SchedulerHandle`].
#[derive(Debug, Clone)]
enum Request {
    Schedule(CommandHandle),
    Cancel(CommandHandle),
    CancelAll,
}

/// Deferred access to a scheduler.
///
/// Commands, subsystem hooks and other code that runs *inside* a tick
/// cannot borrow the scheduler; they queue requests here instead. Queued
/// requests are applied at fixed points of each tick, or immediately with
/// [`Scheduler::flush_requests`].
#[derive(Clone, Default)]
pub struct SchedulerHandle {
    queue: Rc<RefCell<VecDeque<Request>>>,
}

impl SchedulerHandle {
    /// Queue a schedule request.
    pub fn schedule(&self, command: &CommandHandle) {
        self.push(Request::Schedule(command.clone()));
    }

    /// Queue a cancel request.
    pub fn cancel(&self, command: &CommandHandle) {
        self.push(Request::Cancel(command.clone()));
    }

    /// Queue a cancel-all request.
    pub fn cancel_all(&self) {
        self.push(Request::CancelAll);
    }

    /// Number of requests waiting to be applied.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    fn push(&self, request: Request) {
        self.queue.borrow_mut().push_back(request);
    }

    fn pop(&self) -> Option<Request> {
        self.queue.borrow_mut().pop_front()
    }
}

impl std::fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("pending", &self.pending())
            .finish()
    }
}

/// Owns the active command set and the subsystem claim map, and drives
/// everything one step per [`tick`](Scheduler::tick).
///
/// Each tick runs, in order:
///
/// ```text
/// 1. subsystem periodic hooks     (registration order)
/// 2. trigger bindings             (bind order)
/// 3. queued requests
/// 4. fallback commands for idle subsystems
/// 5. execute / is_finished / end for every active command
/// 6. queued requests
/// ```
///
/// Conflicts are resolved by preemption: scheduling a command interrupts
/// every current owner of the subsystems it requires, and the interrupted
/// command's `end(true)` always runs before the new command's `initialize`.
///
/// The scheduler is single-threaded. Lifecycle panics from commands
/// propagate to the caller of `tick`, with claims left as they were.
pub struct Scheduler {
    config: SchedulerConfig,
    subsystems: Vec<SubsystemHandle>,
    active: Vec<ActiveCommand>,
    owners: HashMap<SubsystemId, CommandHandle>,
    bindings: Vec<Binding>,
    requests: SchedulerHandle,
    ticks: u64,
}

impl Scheduler {
    /// Create a scheduler with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    /// Create a scheduler with the given configuration.
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            config,
            subsystems: Vec::new(),
            active: Vec::new(),
            owners: HashMap::new(),
            bindings: Vec::new(),
            requests: SchedulerHandle::default(),
            ticks: 0,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Replace the configuration.
    pub fn set_config(&mut self, config: SchedulerConfig) {
        self.config = config;
    }

    /// Handle for queueing requests from inside a tick.
    pub fn handle(&self) -> SchedulerHandle {
        self.requests.clone()
    }

    /// Register a subsystem so its periodic hook and fallback command are
    /// managed. Registering the same subsystem again does nothing.
    pub fn register_subsystem(&mut self, subsystem: impl Into<SubsystemHandle>) {
        let subsystem = subsystem.into();
        if self.subsystems.iter().any(|s| s.id() == subsystem.id()) {
            trace!(subsystem = subsystem.name(), "already registered");
            return;
        }
        debug!(subsystem = subsystem.name(), id = %subsystem.id(), "registered subsystem");
        self.subsystems.push(subsystem);
    }

    /// Stop managing a subsystem. Claims on it are left untouched.
    pub fn unregister_subsystem(&mut self, id: SubsystemId) -> Option<SubsystemHandle> {
        let index = self.subsystems.iter().position(|s| s.id() == id)?;
        let subsystem = self.subsystems.remove(index);
        debug!(subsystem = subsystem.name(), "unregistered subsystem");
        Some(subsystem)
    }

    /// Registered subsystems, in registration order.
    pub fn subsystems(&self) -> &[SubsystemHandle] {
        &self.subsystems
    }

    /// Register a trigger binding; it is polled every tick.
    pub fn bind(&mut self, binding: Binding) {
        debug!(command = binding.command().name(), kind = ?binding.kind(), "bound trigger");
        self.bindings.push(binding);
    }

    /// Number of registered bindings.
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Start a command.
    ///
    /// Does nothing if the command is already running. Otherwise every
    /// command owning one of its requirements is interrupted first, then
    /// the claims are recorded and the command is initialized.
    pub fn schedule(&mut self, command: &CommandHandle) {
        if self.is_scheduled(command) {
            trace!(command = command.name(), "already scheduled");
            return;
        }

        let requirements = command.requirements();

        let conflicting: Vec<CommandHandle> = requirements
            .iter()
            .filter_map(|subsystem| self.owners.get(subsystem).cloned())
            .collect();
        for owner in conflicting {
            if self.is_scheduled(&owner) {
                debug!(command = owner.name(), by = command.name(), "preempted");
                self.cancel(&owner);
            }
        }

        for subsystem in &requirements {
            self.owners.insert(*subsystem, command.clone());
        }

        command.initialize();
        debug!(command = command.name(), requirements = requirements.len(), "scheduled");
        self.active.push(ActiveCommand {
            handle: command.clone(),
            requirements,
        });
    }

    /// Interrupt a running command. Does nothing if it is not running.
    pub fn cancel(&mut self, command: &CommandHandle) {
        let Some(index) = self.position(command.id()) else {
            return;
        };

        command.end(true);
        self.retire(index);
        debug!(command = command.name(), "cancelled");
    }

    /// Interrupt every running command and drop every claim.
    pub fn cancel_all(&mut self) {
        for entry in &self.active {
            entry.handle.end(true);
        }
        debug!(count = self.active.len(), "cancelled all commands");
        self.active.clear();
        self.owners.clear();
    }

    /// Run one control cycle.
    pub fn tick(&mut self) {
        self.ticks += 1;
        if self.config.trace_ticks {
            trace!(tick = self.ticks, active = self.active.len(), "tick");
        }

        for subsystem in &self.subsystems {
            subsystem.periodic();
        }

        self.poll_bindings();
        self.flush_requests();
        self.schedule_defaults();
        self.run_commands();
        self.flush_requests();
    }

    /// Apply every queued request now.
    pub fn flush_requests(&mut self) {
        while let Some(request) = self.requests.pop() {
            match request {
                Request::Schedule(command) => self.schedule(&command),
                Request::Cancel(command) => self.cancel(&command),
                Request::CancelAll => self.cancel_all(),
            }
        }
    }

    /// Whether `command` is running.
    pub fn is_scheduled(&self, command: &CommandHandle) -> bool {
        self.position(command.id()).is_some()
    }

    /// The command currently owning `subsystem`, if any.
    pub fn owner_of(&self, subsystem: SubsystemId) -> Option<&CommandHandle> {
        self.owners.get(&subsystem)
    }

    /// Running commands, in the order they were scheduled.
    pub fn active_commands(&self) -> impl Iterator<Item = &CommandHandle> {
        self.active.iter().map(|entry| &entry.handle)
    }

    /// Names of running commands, in the order they were scheduled.
    pub fn active_names(&self) -> Vec<String> {
        self.active_commands().map(|c| c.name().to_string()).collect()
    }

    /// Number of running commands.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    fn position(&self, id: CommandId) -> Option<usize> {
        self.active.iter().position(|entry| entry.handle.id() == id)
    }

    /// Remove the entry at `index` and drop the claims it took when scheduled.
    fn retire(&mut self, index: usize) -> ActiveCommand {
        let entry = self.active.remove(index);
        for subsystem in &entry.requirements {
            let owned = self
                .owners
                .get(subsystem)
                .is_some_and(|owner| owner.id() == entry.handle.id());
            if owned {
                self.owners.remove(subsystem);
            }
        }
        entry
    }

    fn poll_bindings(&mut self) {
        let actions: Vec<BindingAction> = self
            .bindings
            .iter_mut()
            .filter_map(|binding| binding.poll())
            .collect();

        for action in actions {
            match action {
                BindingAction::Schedule(command) => self.schedule(&command),
                BindingAction::Cancel(command) => self.cancel(&command),
                BindingAction::Toggle(command) => {
                    if self.is_scheduled(&command) {
                        self.cancel(&command);
                    } else {
                        self.schedule(&command);
                    }
                }
            }
        }
    }

    fn schedule_defaults(&mut self) {
        let fallbacks: Vec<(SubsystemHandle, CommandHandle)> = self
            .subsystems
            .iter()
            .filter_map(|subsystem| {
                subsystem
                    .default_command()
                    .map(|command| (subsystem.clone(), command))
            })
            .collect();

        for (subsystem, command) in fallbacks {
            // Ownership is re-read each time: an earlier fallback this tick
            // may have claimed this subsystem too.
            if self.owners.contains_key(&subsystem.id()) || self.is_scheduled(&command) {
                continue;
            }
            debug!(subsystem = subsystem.name(), command = command.name(), "starting default command");
            self.schedule(&command);
        }
    }

    fn run_commands(&mut self) {
        let mut finished = Vec::new();

        for entry in &self.active {
            entry.handle.execute();
            if entry.handle.is_finished() {
                entry.handle.end(false);
                finished.push(entry.handle.id());
            }
        }

        for id in finished {
            if let Some(index) = self.position(id) {
                let entry = self.retire(index);
                debug!(command = entry.handle.name(), "finished");
            }
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("subsystems", &self.subsystems)
            .field("active", &self.active_names())
            .field("ticks", &self.ticks)
            .finish()
    }
}
