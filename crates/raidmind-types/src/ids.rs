//! Type-safe identifier wrappers.
//!
//! Agents and teams are identified by UUID v7 values generated by the host.
//! Targets and objectives use stable string identities derived from durable
//! external handles (world object ids, quest condition ids). They are never
//! derived from transient memory addresses, so the same world object keeps
//! the same identity across scan cycles.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

define_id! {
    /// Unique identifier for a bot agent evaluated by the behavior core.
    AgentId
}

define_id! {
    /// Unique identifier for one summoned support team instance.
    TeamId
}

/// Generates a newtype wrapper around a stable string identity.
macro_rules! define_stable_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Wrap an already-stable identity string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identity string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

define_stable_id! {
    /// Stable identity of a loot or interaction target.
    TargetId
}

define_stable_id! {
    /// Stable identity of a quest objective.
    ObjectiveId
}

impl TargetId {
    /// Derive a target identity from a durable world handle.
    ///
    /// The `kind` prefix keeps handles from different object tables
    /// (containers, corpses, loose items) from colliding.
    pub fn from_handle(kind: &str, handle: u64) -> Self {
        Self(format!("{kind}:{handle}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_ids_are_unique() {
        assert_ne!(AgentId::new(), AgentId::new());
        assert_ne!(AgentId::new().into_inner(), Uuid::nil());
    }

    #[test]
    fn target_id_from_handle_is_stable() {
        let a = TargetId::from_handle("container", 42);
        let b = TargetId::from_handle("container", 42);
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "container:42");
        assert_ne!(a, TargetId::from_handle("corpse", 42));
    }

    #[test]
    fn stable_id_serializes_as_plain_string() {
        let id = ObjectiveId::new("quest_5a27b");
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "\"quest_5a27b\"");
    }
}
