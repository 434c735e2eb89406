//! Unique identifiers for scheduled entities.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Identity of a root command handle.
///
/// Two handles refer to the same command iff their ids are equal. Cloning a
/// [`CommandHandle`](crate::CommandHandle) keeps its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CommandId(Ulid);

impl CommandId {
    /// Generate a new CommandId
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for CommandId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CommandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for CommandId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Identity of a subsystem, used as the key of the claim map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubsystemId(Ulid);

impl SubsystemId {
    /// Generate a new SubsystemId
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SubsystemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubsystemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for SubsystemId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}
