//! Category affinity scoring.
//!
//! Turns a user's skill level and a category's job importance into a single
//! priority score and orders categories by it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{level_in_range, CategoryId};
use crate::errors::DomainError;

/// Highest score `calculate_rating` can produce (5 x 5).
pub const MAX_AFFINITY_SCORE: u32 = 25;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category_id: CategoryId,
    pub score: u32,
}

impl CategoryScore {
    pub fn new(category_id: CategoryId, score: u32) -> Self {
        Self { category_id, score }
    }
}

/// Raw skill and importance signals for one category, as reported by a user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRelevance {
    pub category_id: CategoryId,
    pub skill_level: i32,
    pub job_importance: i32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryScorer;

impl CategoryScorer {
    pub fn new() -> Self {
        Self
    }

    /// Multiplicative affinity of a skill level and a job importance, both on
    /// the 1-5 scale. The skill level is checked first.
    pub fn calculate_rating(&self, skill_level: i32, job_importance: i32) -> Result<u32, DomainError> {
        if !level_in_range(skill_level) {
            return Err(DomainError::SkillLevelOutOfRange { value: skill_level });
        }
        if !level_in_range(job_importance) {
            return Err(DomainError::JobImportanceOutOfRange { value: job_importance });
        }

        Ok((skill_level * job_importance) as u32)
    }

    /// Order category scores by descending score.
    ///
    /// The input is treated as an insertion-ordered mapping: a repeated
    /// category keeps its first position and takes its last score. Ties keep
    /// insertion order. An empty mapping yields an empty result.
    pub fn sort_categories(
        &self,
        scores: Option<&[CategoryScore]>,
    ) -> Result<Vec<CategoryScore>, DomainError> {
        let scores = scores.ok_or(DomainError::MissingCategoryScores)?;

        let mut ordered: Vec<CategoryScore> = Vec::with_capacity(scores.len());
        let mut positions: HashMap<CategoryId, usize> = HashMap::with_capacity(scores.len());
        for entry in scores {
            match positions.get(&entry.category_id) {
                Some(&position) => ordered[position].score = entry.score,
                None => {
                    positions.insert(entry.category_id, ordered.len());
                    ordered.push(*entry);
                }
            }
        }

        // `sort_by` is stable, which is what keeps tied categories in place.
        ordered.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(ordered)
    }

    /// Score every relevance entry and return the highest-priority categories.
    ///
    /// `max_categories == 0` (or a value above the number of entries) keeps
    /// all of them.
    pub fn prioritize(
        &self,
        relevances: &[CategoryRelevance],
        max_categories: usize,
    ) -> Result<Vec<CategoryScore>, DomainError> {
        if relevances.is_empty() {
            return Err(DomainError::EmptyCategoryRelevances);
        }

        let scores = relevances
            .iter()
            .map(|relevance| {
                self.calculate_rating(relevance.skill_level, relevance.job_importance)
                    .map(|score| CategoryScore::new(relevance.category_id, score))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut sorted = self.sort_categories(Some(&scores))?;
        if max_categories > 0 {
            sorted.truncate(max_categories);
        }

        tracing::debug!(
            event_name = "affinity.prioritized",
            requested = relevances.len(),
            kept = sorted.len(),
            "category priorities computed"
        );
        Ok(sorted)
    }
}
