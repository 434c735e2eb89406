//! Subsystem model - named exclusive resources.

use crate::command::CommandHandle;
use crate::id::SubsystemId;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

/// A piece of hardware or other resource that commands compete for.
///
/// `periodic` runs once per tick whether or not a command owns the
/// subsystem. Use it for sensor reads, state estimation and safety checks.
pub trait Subsystem {
    /// Background work run every tick.
    fn periodic(&mut self) {}
}

impl Subsystem for () {}

/// Identity, name and fallback slot shared by every clone of a handle.
struct SubsystemMeta {
    id: SubsystemId,
    name: String,
    default_command: RefCell<Option<CommandHandle>>,
}

/// Shared handle to a subsystem.
///
/// The type parameter keeps typed access to the subsystem state for the
/// commands that drive it; the scheduler works with the erased
/// `SubsystemHandle<dyn Subsystem>`. Equality is by [`SubsystemId`].
pub struct SubsystemHandle<S: ?Sized = dyn Subsystem> {
    meta: Rc<SubsystemMeta>,
    state: Rc<RefCell<S>>,
}

impl<S: Subsystem + 'static> SubsystemHandle<S> {
    /// Create a subsystem with a fresh identity.
    pub fn new(name: impl Into<String>, state: S) -> Self {
        Self {
            meta: Rc::new(SubsystemMeta {
                id: SubsystemId::new(),
                name: name.into(),
                default_command: RefCell::new(None),
            }),
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Type-erased view sharing the same identity and state.
    pub fn erase(&self) -> SubsystemHandle {
        let state: Rc<RefCell<dyn Subsystem>> = self.state.clone();
        SubsystemHandle {
            meta: Rc::clone(&self.meta),
            state,
        }
    }
}

impl<S: Subsystem + ?Sized> SubsystemHandle<S> {
    /// Identity of this subsystem.
    pub fn id(&self) -> SubsystemId {
        self.meta.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// Run the periodic hook.
    pub fn periodic(&self) {
        self.state.borrow_mut().periodic();
    }

    /// Borrow the subsystem state.
    ///
    /// # Panics
    ///
    /// Panics if the state is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, S> {
        self.state.borrow()
    }

    /// Mutably borrow the subsystem state.
    ///
    /// # Panics
    ///
    /// Panics if the state is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, S> {
        self.state.borrow_mut()
    }

    /// Set the command that runs whenever nothing else owns this subsystem.
    pub fn set_default_command(&self, command: CommandHandle) {
        *self.meta.default_command.borrow_mut() = Some(command);
    }

    /// Remove the fallback command.
    pub fn clear_default_command(&self) -> Option<CommandHandle> {
        self.meta.default_command.borrow_mut().take()
    }

    /// Current fallback command, if any.
    pub fn default_command(&self) -> Option<CommandHandle> {
        self.meta.default_command.borrow().clone()
    }
}

impl<S: ?Sized> Clone for SubsystemHandle<S> {
    fn clone(&self) -> Self {
        Self {
            meta: Rc::clone(&self.meta),
            state: Rc::clone(&self.state),
        }
    }
}

impl<S: ?Sized> PartialEq for SubsystemHandle<S> {
    fn eq(&self, other: &Self) -> bool {
        self.meta.id == other.meta.id
    }
}

impl<S: ?Sized> Eq for SubsystemHandle<S> {}

impl<S: ?Sized> std::fmt::Debug for SubsystemHandle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubsystemHandle")
            .field("id", &self.meta.id)
            .field("name", &self.meta.name)
            .finish()
    }
}

impl<S: Subsystem + 'static> From<&SubsystemHandle<S>> for SubsystemHandle {
    fn from(handle: &SubsystemHandle<S>) -> Self {
        handle.erase()
    }
}
