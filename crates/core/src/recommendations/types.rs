//! Types for the recommendation ranker

use serde::{Deserialize, Serialize};

use crate::domain::category::Category;
use crate::domain::resource::Resource;
use crate::errors::DomainError;

/// Rating statistics for one resource, aggregated by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceRatingAggregate {
    /// Mean completion rating value (0.0 when unrated)
    pub average_rating: f64,
    /// Number of completion ratings
    pub rating_count: u32,
}

impl ResourceRatingAggregate {
    pub fn new(average_rating: f64, rating_count: u32) -> Self {
        Self { average_rating, rating_count }
    }
}

/// A resource offered by the provider for a user, with the category it was
/// discovered through.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationCandidate {
    pub resource: Resource,
    pub category: Category,
    /// Difficulty of the resource within `category` (1-5)
    pub difficulty_level: u8,
    /// The user's interest in `category` (1-5)
    pub interest_level: u8,
    pub rating: ResourceRatingAggregate,
}

/// Which part of the ranked list a recommendation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationTier {
    /// Enough ratings, and rated well enough, to be ranked on evidence
    EvidenceBacked,
    /// Too few ratings or rated below threshold; shown after the evidence tier
    Unproven,
}

impl RecommendationTier {
    /// Position of the tier in the ranked list; lower comes first.
    pub fn rank(self) -> u8 {
        match self {
            Self::EvidenceBacked => 0,
            Self::Unproven => 1,
        }
    }
}

/// A ranked recommendation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendedResource {
    pub resource: Resource,
    pub category: Category,
    pub difficulty_level: u8,
    pub interest_level: u8,
    pub average_rating: f64,
    pub rating_count: u32,
    pub tier: RecommendationTier,
}

impl RecommendedResource {
    pub(crate) fn from_candidate(candidate: RecommendationCandidate, tier: RecommendationTier) -> Self {
        Self {
            resource: candidate.resource,
            category: candidate.category,
            difficulty_level: candidate.difficulty_level,
            interest_level: candidate.interest_level,
            average_rating: candidate.rating.average_rating,
            rating_count: candidate.rating.rating_count,
            tier,
        }
    }
}

/// Validated ranking thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingThresholds {
    pub minimum_rating: f64,
    pub minimum_rating_count: u64,
}

impl RatingThresholds {
    /// Validate raw thresholds; the rating threshold is checked first.
    pub fn new(minimum_rating: f64, minimum_rating_count: i64) -> Result<Self, DomainError> {
        if minimum_rating.is_nan() || minimum_rating < 0.0 {
            return Err(DomainError::NegativeMinimumRating { value: minimum_rating });
        }
        if minimum_rating_count < 0 {
            return Err(DomainError::NegativeMinimumRatingCount { value: minimum_rating_count });
        }

        Ok(Self {
            minimum_rating,
            minimum_rating_count: minimum_rating_count.unsigned_abs(),
        })
    }

    pub fn tier_for(&self, rating: &ResourceRatingAggregate) -> RecommendationTier {
        if u64::from(rating.rating_count) >= self.minimum_rating_count
            && rating.average_rating >= self.minimum_rating
        {
            RecommendationTier::EvidenceBacked
        } else {
            RecommendationTier::Unproven
        }
    }
}

/// A category reference as submitted by a caller, before validation.
///
/// Fields are unchecked here; the ranker reports a missing name or a
/// non-positive id with its own error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFilter {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

impl CategoryFilter {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self { id, name: Some(name.into()) }
    }
}

impl From<&Category> for CategoryFilter {
    fn from(category: &Category) -> Self {
        Self { id: i64::from(category.id()), name: Some(category.name().to_owned()) }
    }
}
