use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Lowest value on the shared 1-5 scale used for skill, interest, importance
/// and difficulty levels.
pub const MIN_LEVEL: i32 = 1;
pub const MAX_LEVEL: i32 = 5;

pub(crate) fn level_in_range(value: i32) -> bool {
    (MIN_LEVEL..=MAX_LEVEL).contains(&value)
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

macro_rules! positive_id {
    ($name:ident, $kind:literal) => {
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $name(u32);

        impl $name {
            pub fn new(value: i64) -> Result<Self, DomainError> {
                u32::try_from(value)
                    .ok()
                    .filter(|id| *id > 0)
                    .map(Self)
                    .ok_or(DomainError::NonPositiveId { kind: $kind, value })
            }

            pub fn get(self) -> u32 {
                self.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = DomainError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                i64::from(id.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

positive_id!(CategoryId, "category");
positive_id!(ResourceId, "resource");
positive_id!(TagId, "tag");

pub mod category;
pub mod completion;
pub mod interest;
pub mod resource;
pub mod tag;
