//! Command model - the unit of time-sliced work.

use crate::id::{CommandId, SubsystemId};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Set of subsystems a command needs exclusive access to.
pub type Requirements = HashSet<SubsystemId>;

/// A unit of work driven one step per tick.
///
/// Lifecycle, as seen by the owning group or the scheduler:
///
/// ```text
/// initialize → execute → is_finished? ─no─→ execute → ...
///                              │
///                             yes → end(false)
///
/// (forced stop at any point while active) → end(true)
/// ```
///
/// The lifecycle methods are only ever called by the owner of the command,
/// never by the command itself. `execute` must not block.
pub trait Command {
    /// Called once on the transition from idle to active.
    ///
    /// Implementations reset timers and counters here so the same value can
    /// be run again after it has ended.
    fn initialize(&mut self) {}

    /// Called once per tick while active.
    fn execute(&mut self) {}

    /// Whether the command has completed its work.
    fn is_finished(&self) -> bool {
        false
    }

    /// Called exactly once when the command stops.
    ///
    /// `interrupted` is true when the command was cancelled or preempted
    /// rather than finishing on its own.
    fn end(&mut self, _interrupted: bool) {}

    /// Subsystems this command needs exclusive access to.
    ///
    /// Must stay the same for the duration of one activation.
    fn requirements(&self) -> Requirements {
        Requirements::new()
    }

    /// Human readable name, used in logs.
    fn name(&self) -> String {
        short_type_name::<Self>().to_string()
    }
}

impl<C: Command + ?Sized> Command for Box<C> {
    fn initialize(&mut self) {
        (**self).initialize()
    }

    fn execute(&mut self) {
        (**self).execute()
    }

    fn is_finished(&self) -> bool {
        (**self).is_finished()
    }

    fn end(&mut self, interrupted: bool) {
        (**self).end(interrupted)
    }

    fn requirements(&self) -> Requirements {
        (**self).requirements()
    }

    fn name(&self) -> String {
        (**self).name()
    }
}

/// Last path segment of a type name, without generic arguments.
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Shared handle to a root command.
///
/// This is what the scheduler, subsystems (as fallback commands) and
/// trigger bindings hold. Clones share the same command state and the same
/// [`CommandId`]. Handles cannot be nested inside a command tree, so a tree
/// always owns its children exclusively.
///
/// Handles are single-threaded. Calling back into a handle from inside its
/// own lifecycle method is a programming error and panics.
#[derive(Clone)]
pub struct CommandHandle {
    id: CommandId,
    name: Rc<str>,
    inner: Rc<RefCell<Box<dyn Command>>>,
}

impl CommandHandle {
    /// Wrap a command, naming the handle after the command.
    pub fn new(command: impl Command + 'static) -> Self {
        let name = command.name();
        Self::named(name, command)
    }

    /// Wrap a command under an explicit name.
    pub fn named(name: impl Into<String>, command: impl Command + 'static) -> Self {
        Self::from_boxed(name, Box::new(command))
    }

    /// Wrap an already boxed command.
    pub fn from_boxed(name: impl Into<String>, command: Box<dyn Command>) -> Self {
        let name: String = name.into();
        Self {
            id: CommandId::new(),
            name: Rc::from(name),
            inner: Rc::new(RefCell::new(command)),
        }
    }

    /// Identity of this command.
    pub fn id(&self) -> CommandId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Forward to [`Command::initialize`].
    pub fn initialize(&self) {
        self.inner.borrow_mut().initialize();
    }

    /// Forward to [`Command::execute`].
    pub fn execute(&self) {
        self.inner.borrow_mut().execute();
    }

    /// Forward to [`Command::is_finished`].
    pub fn is_finished(&self) -> bool {
        self.inner.borrow().is_finished()
    }

    /// Forward to [`Command::end`].
    pub fn end(&self, interrupted: bool) {
        self.inner.borrow_mut().end(interrupted);
    }

    /// Forward to [`Command::requirements`].
    pub fn requirements(&self) -> Requirements {
        self.inner.borrow().requirements()
    }

    /// Whether `other` is the same command (identity, not structure).
    pub fn same_as(&self, other: &CommandHandle) -> bool {
        self.id == other.id
    }
}

impl PartialEq for CommandHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CommandHandle {}

impl std::hash::Hash for CommandHandle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Debug for CommandHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

impl std::fmt::Display for CommandHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
