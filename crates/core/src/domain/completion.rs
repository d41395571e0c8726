use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{is_blank, ResourceId};
use crate::errors::DomainError;

/// Satisfaction reported when a user completes a resource.
///
/// Ordering follows [`CompletionRating::value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionRating {
    ExtremelyDissatisfied,
    Dissatisfied,
    Neutral,
    Satisfied,
    ExtremelySatisfied,
}

impl CompletionRating {
    pub const ALL: [Self; 5] = [
        Self::ExtremelyDissatisfied,
        Self::Dissatisfied,
        Self::Neutral,
        Self::Satisfied,
        Self::ExtremelySatisfied,
    ];

    pub const fn value(self) -> i32 {
        match self {
            Self::ExtremelyDissatisfied => 0,
            Self::Dissatisfied => 1,
            Self::Neutral => 2,
            Self::Satisfied => 3,
            Self::ExtremelySatisfied => 4,
        }
    }

    pub fn from_value(value: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|rating| rating.value() == value)
    }
}

impl Ord for CompletionRating {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value().cmp(&other.value())
    }
}

impl PartialOrd for CompletionRating {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Average rating a resource must reach to be ranked on evidence.
pub const DEFAULT_MINIMUM_RATING: f64 = CompletionRating::Neutral.value() as f64;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompletedResource {
    pub user_id: String,
    pub resource_id: ResourceId,
    pub rating: CompletionRating,
    #[serde(default)]
    pub comment: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl CompletedResource {
    pub fn new(
        user_id: impl Into<String>,
        resource_id: ResourceId,
        rating: CompletionRating,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let user_id = user_id.into();
        if is_blank(&user_id) {
            return Err(DomainError::BlankUserId);
        }

        Ok(Self { user_id, resource_id, rating, comment: None, completed_at })
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}
