use async_trait::async_trait;

use super::types::RecommendationCandidate;
use crate::domain::category::Category;
use crate::domain::CategoryId;
use crate::errors::ProviderError;

/// Supplies recommendation candidates with their rating aggregates.
///
/// Implementations select the candidate set (available resources in
/// categories the user cares about, not yet completed by the user) and
/// return an empty collection, never an error, when nothing matches.
#[async_trait]
pub trait RatingStatisticsProvider: Send + Sync {
    async fn candidates_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<RecommendationCandidate>, ProviderError>;

    /// Candidates belonging to any of `categories`.
    async fn candidates_for_user_in_categories(
        &self,
        user_id: &str,
        categories: &[CategoryId],
    ) -> Result<Vec<RecommendationCandidate>, ProviderError>;
}

/// Resolves category ids to full categories.
#[async_trait]
pub trait CategoryDirectory: Send + Sync {
    async fn find_category(&self, id: CategoryId) -> Result<Option<Category>, ProviderError>;
}
