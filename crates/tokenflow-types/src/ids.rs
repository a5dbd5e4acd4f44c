//! Type-safe identifier wrappers for registered places and events.
//!
//! Places and events are registered once, before the first step, into
//! per-engine vectors. Their identifiers are dense indices into those
//! vectors, wrapped in newtypes so the two cannot be mixed at compile
//! time.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around a dense index with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub usize);

        impl $name {
            /// Return the inner index value.
            pub const fn into_inner(self) -> usize {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Identifier of a registered place (token store).
    PlaceId
}

define_id! {
    /// Identifier of a registered event (action definition).
    EventId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let place = PlaceId(3);
        let event = EventId(3);
        // Different types -- the compiler enforces no mixing; the inner
        // values are still comparable after unwrapping.
        assert_eq!(place.into_inner(), event.into_inner());
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = PlaceId(7);
        let json = serde_json::to_string(&original).ok();
        assert!(json.is_some());
        let restored: Result<PlaceId, _> = serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(restored.ok(), Some(original));
    }

    #[test]
    fn id_display_matches_index() {
        let id = EventId(12);
        assert_eq!(id.to_string(), "12");
    }
}
