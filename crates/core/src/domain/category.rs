use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use super::{is_blank, level_in_range, CategoryId};
use crate::errors::DomainError;

/// A topical grouping of learning resources.
///
/// Identity is the id alone: two categories with the same id compare equal
/// even if their descriptive fields differ.
#[derive(Clone, Debug, Serialize)]
pub struct Category {
    id: CategoryId,
    name: String,
    description: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    resource_counts: BTreeMap<u8, u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    difficulty_level: Option<u8>,
}

impl Category {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let id = CategoryId::new(id)?;
        let name = name.into();
        if is_blank(&name) {
            return Err(DomainError::BlankField { field: "category name" });
        }
        let description = description.into();
        if is_blank(&description) {
            return Err(DomainError::BlankField { field: "category description" });
        }

        Ok(Self { id, name, description, resource_counts: BTreeMap::new(), difficulty_level: None })
    }

    /// Attach the number of resources available at each difficulty level.
    pub fn with_resource_counts(
        mut self,
        counts: impl IntoIterator<Item = (i32, i64)>,
    ) -> Result<Self, DomainError> {
        let mut validated = BTreeMap::new();
        for (level, count) in counts {
            if !level_in_range(level) {
                return Err(DomainError::DifficultyLevelOutOfRange { value: level });
            }
            let count = u32::try_from(count)
                .map_err(|_| DomainError::NegativeResourceCount { level, count })?;
            validated.insert(level as u8, count);
        }
        if validated.is_empty() {
            return Err(DomainError::EmptyResourceCounts);
        }

        self.resource_counts = validated;
        Ok(self)
    }

    pub fn with_difficulty_level(mut self, level: i32) -> Result<Self, DomainError> {
        if !level_in_range(level) {
            return Err(DomainError::DifficultyLevelOutOfRange { value: level });
        }
        self.difficulty_level = Some(level as u8);
        Ok(self)
    }

    pub fn id(&self) -> CategoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn resource_counts(&self) -> &BTreeMap<u8, u32> {
        &self.resource_counts
    }

    pub fn difficulty_level(&self) -> Option<u8> {
        self.difficulty_level
    }

    pub fn total_resources(&self) -> u32 {
        self.resource_counts.values().sum()
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Category {}

impl Hash for Category {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
