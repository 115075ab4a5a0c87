use std::fmt;

use serde::{Deserialize, Serialize};

/// Generates a transparent newtype over the database's `i64` row id.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

define_id!(
    /// Identifier of a text prompt.
    PromptId
);
define_id!(
    /// Identifier of one model-generated image candidate.
    ImageId
);
define_id!(
    /// Identifier of a recorded vote.
    VoteId
);
define_id!(
    /// Identifier of an impression-log row.
    ImpressionId
);
