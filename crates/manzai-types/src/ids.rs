//! Typed identifiers for scripts and blocks.
//!
//! Both wrap UUIDv7 (time-ordered, globally unique) and serialize as standard
//! UUID text. Identity is always matched by id, never by position: blocks move
//! around under drag-and-drop and deletion, their ids do not.
//!
//! The `short()` form (first 8 hex chars) is for human-facing output only.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A script identifier.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScriptId(uuid::Uuid);

/// A block identifier, unique across the block sequence of a script.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(uuid::Uuid);

// Shared behavior

macro_rules! impl_typed_id {
    ($T:ident, $name:literal) => {
        impl $T {
            /// Create a fresh time-ordered ID (UUIDv7).
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            /// First 8 hex characters, for display only.
            pub fn short(&self) -> String {
                self.0.as_simple().to_string()[..8].to_string()
            }
        }

        impl Default for $T {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<uuid::Uuid> for $T {
            fn from(u: uuid::Uuid) -> Self {
                Self(u)
            }
        }

        impl From<$T> for uuid::Uuid {
            fn from(id: $T) -> uuid::Uuid {
                id.0
            }
        }

        impl fmt::Display for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                // Full UUID with hyphens for log readability
                write!(f, "{}", self.0)
            }
        }

        impl fmt::Debug for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $name, self.short())
            }
        }
    };
}

impl_typed_id!(ScriptId, "ScriptId");
impl_typed_id!(BlockId, "BlockId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_ids_differ() {
        assert_ne!(BlockId::new(), BlockId::new());
    }

    #[test]
    fn test_short_form() {
        let id = ScriptId::new();
        assert_eq!(id.short().len(), 8);
        assert!(id.to_string().starts_with(&id.short()));
        assert_eq!(format!("{id:?}"), format!("ScriptId({})", id.short()));
    }

    #[test]
    fn test_serializes_as_uuid_string() {
        let id = BlockId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let parsed: BlockId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_uuid_conversions() {
        let raw = uuid::Uuid::now_v7();
        let id = BlockId::from(raw);
        assert_eq!(uuid::Uuid::from(id), raw);
    }
}
