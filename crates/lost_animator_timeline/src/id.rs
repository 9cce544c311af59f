// SPDX-License-Identifier: MIT OR Apache-2.0
//! Identifiers for document entities.
//!
//! Ids are opaque strings on disk. Fresh ids are UUID v4, but any string
//! read from a file is accepted as-is.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Get the ID as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Unique identifier for a spritesheet
    SpritesheetId
);
string_id!(
    /// Unique identifier for an animation
    AnimationId
);
string_id!(
    /// Unique identifier for a track
    TrackId
);
string_id!(
    /// Unique identifier for a key
    KeyId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = KeyId::new();
        let b = KeyId::new();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = TrackId::from("track-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"track-1\"");
        let back: TrackId = serde_json::from_str("\"track-1\"").unwrap();
        assert_eq!(back, id);
    }
}
