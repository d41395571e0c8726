use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::provider::{CategoryDirectory, RatingStatisticsProvider};
use super::types::{
    CategoryFilter, RatingThresholds, RecommendationCandidate, RecommendationTier,
    RecommendedResource,
};
use crate::domain::{is_blank, CategoryId};
use crate::errors::{ApplicationError, DomainError};

/// Orders a user's recommendation candidates into evidence-backed and
/// unproven tiers.
///
/// Holds no state between calls; concurrent requests share only the
/// provider handle.
#[derive(Clone)]
pub struct RecommendationRanker {
    provider: Arc<dyn RatingStatisticsProvider>,
}

impl RecommendationRanker {
    pub fn new(provider: Arc<dyn RatingStatisticsProvider>) -> Self {
        Self { provider }
    }

    /// Rank every candidate the provider offers for `user_id`.
    ///
    /// Validation order: user id, rating threshold, rating count threshold.
    pub async fn recommend_for_user(
        &self,
        user_id: &str,
        minimum_rating: f64,
        minimum_rating_count: i64,
    ) -> Result<Vec<RecommendedResource>, ApplicationError> {
        validate_user_id(user_id)?;
        let thresholds = RatingThresholds::new(minimum_rating, minimum_rating_count)?;

        debug!(
            event_name = "recommendation.requested",
            user_id,
            minimum_rating,
            minimum_rating_count,
            "ranking recommendations for user"
        );

        let candidates = self.provider.candidates_for_user(user_id).await.map_err(|error| {
            warn!(
                event_name = "recommendation.provider_failed",
                user_id,
                error = %error,
                "rating statistics provider failed"
            );
            ApplicationError::collaborator("recommend_for_user", user_id, error)
        })?;

        let ranked = rank_candidates(candidates, thresholds);
        log_ranked(user_id, &ranked);
        Ok(ranked)
    }

    /// Rank candidates from any of the given categories.
    ///
    /// Validation order: user id, missing list, empty list, then per item
    /// (missing item, id, missing name, blank name), then thresholds.
    pub async fn recommend_for_user_in_categories(
        &self,
        user_id: &str,
        categories: Option<&[Option<CategoryFilter>]>,
        minimum_rating: f64,
        minimum_rating_count: i64,
    ) -> Result<Vec<RecommendedResource>, ApplicationError> {
        validate_user_id(user_id)?;
        let category_ids = validate_category_filters(categories)?;
        let thresholds = RatingThresholds::new(minimum_rating, minimum_rating_count)?;

        debug!(
            event_name = "recommendation.requested",
            user_id,
            categories = category_ids.len(),
            minimum_rating,
            minimum_rating_count,
            "ranking recommendations for user in categories"
        );

        let candidates = self
            .provider
            .candidates_for_user_in_categories(user_id, &category_ids)
            .await
            .map_err(|error| {
                warn!(
                    event_name = "recommendation.provider_failed",
                    user_id,
                    categories = ?category_ids,
                    error = %error,
                    "rating statistics provider failed"
                );
                ApplicationError::collaborator("recommend_for_user_in_categories", user_id, error)
            })?;

        let ranked = rank_candidates(candidates, thresholds);
        log_ranked(user_id, &ranked);
        Ok(ranked)
    }

    /// Resolve `category_ids` through `directory`, then rank as
    /// [`Self::recommend_for_user_in_categories`].
    ///
    /// Arguments are checked before the directory is consulted.
    pub async fn recommend_for_user_in_category_ids(
        &self,
        directory: &dyn CategoryDirectory,
        user_id: &str,
        category_ids: &[CategoryId],
        minimum_rating: f64,
        minimum_rating_count: i64,
    ) -> Result<Vec<RecommendedResource>, ApplicationError> {
        validate_user_id(user_id)?;
        if category_ids.is_empty() {
            return Err(DomainError::EmptyCategoryList.into());
        }
        RatingThresholds::new(minimum_rating, minimum_rating_count)?;

        let mut filters = Vec::with_capacity(category_ids.len());
        for id in category_ids {
            let category = directory
                .find_category(*id)
                .await
                .map_err(|error| ApplicationError::collaborator("resolve_categories", user_id, error))?
                .ok_or(DomainError::CategoryNotFound { id: id.get() })?;
            filters.push(Some(CategoryFilter::from(&category)));
        }

        self.recommend_for_user_in_categories(
            user_id,
            Some(&filters),
            minimum_rating,
            minimum_rating_count,
        )
        .await
    }
}

/// Partition and order candidates.
///
/// Single stable sort over (tier, average rating descending, discovery
/// index). A resource offered more than once keeps its first discovery.
pub fn rank_candidates(
    candidates: Vec<RecommendationCandidate>,
    thresholds: RatingThresholds,
) -> Vec<RecommendedResource> {
    let mut seen = HashSet::with_capacity(candidates.len());
    let mut ranked: Vec<(usize, RecommendedResource)> = candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.resource.id()))
        .enumerate()
        .map(|(index, candidate)| {
            let tier = thresholds.tier_for(&candidate.rating);
            (index, RecommendedResource::from_candidate(candidate, tier))
        })
        .collect();

    ranked.sort_by(|(a_index, a), (b_index, b)| {
        a.tier
            .rank()
            .cmp(&b.tier.rank())
            .then_with(|| b.average_rating.total_cmp(&a.average_rating))
            .then_with(|| a_index.cmp(b_index))
    });

    ranked.into_iter().map(|(_, recommendation)| recommendation).collect()
}

fn validate_user_id(user_id: &str) -> Result<(), DomainError> {
    if is_blank(user_id) {
        return Err(DomainError::BlankUserId);
    }
    Ok(())
}

fn validate_category_filters(
    categories: Option<&[Option<CategoryFilter>]>,
) -> Result<Vec<CategoryId>, DomainError> {
    let categories = categories.ok_or(DomainError::MissingCategoryList)?;
    if categories.is_empty() {
        return Err(DomainError::EmptyCategoryList);
    }

    let mut ids = Vec::with_capacity(categories.len());
    for (index, category) in categories.iter().enumerate() {
        let category = category.as_ref().ok_or(DomainError::MissingCategoryItem { index })?;
        let id = CategoryId::new(category.id)
            .map_err(|_| DomainError::NonPositiveCategoryId { index, id: category.id })?;
        let name = category.name.as_deref().ok_or(DomainError::MissingCategoryName { index })?;
        if is_blank(name) {
            return Err(DomainError::BlankCategoryName { index });
        }
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    Ok(ids)
}

fn log_ranked(user_id: &str, ranked: &[RecommendedResource]) {
    let evidence_backed = ranked
        .iter()
        .filter(|recommendation| recommendation.tier == RecommendationTier::EvidenceBacked)
        .count();
    info!(
        event_name = "recommendation.ranked",
        user_id,
        total = ranked.len(),
        evidence_backed,
        unproven = ranked.len() - evidence_backed,
        "recommendations ranked"
    );
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::{rank_candidates, RecommendationRanker};
    use crate::domain::category::Category;
    use crate::domain::resource::Resource;
    use crate::domain::{CategoryId, ResourceId};
    use crate::errors::{ApplicationError, DomainError, ProviderError};
    use crate::recommendations::{
        CategoryDirectory, CategoryFilter, RatingStatisticsProvider, RatingThresholds,
        RecommendationCandidate, RecommendationTier, ResourceRatingAggregate,
    };

    fn category(id: i64) -> Category {
        Category::new(id, format!("Category {id}"), "Test category").expect("valid category")
    }

    fn candidate(resource: i64, category_id: i64, average: f64, count: u32) -> RecommendationCandidate {
        let resource = Resource::new(
            ResourceId::new(resource).expect("valid id"),
            format!("Resource {resource}"),
            "Test resource",
            &format!("https://learn.example.com/{resource}"),
            "AB1234",
            true,
        )
        .expect("valid resource");

        RecommendationCandidate {
            resource,
            category: category(category_id),
            difficulty_level: 2,
            interest_level: 4,
            rating: ResourceRatingAggregate::new(average, count),
        }
    }

    fn ids(ranked: &[crate::recommendations::RecommendedResource]) -> Vec<u32> {
        ranked.iter().map(|recommendation| recommendation.resource.id().get()).collect()
    }

    struct StaticProvider {
        candidates: Vec<RecommendationCandidate>,
    }

    #[async_trait]
    impl RatingStatisticsProvider for StaticProvider {
        async fn candidates_for_user(
            &self,
            _user_id: &str,
        ) -> Result<Vec<RecommendationCandidate>, ProviderError> {
            Ok(self.candidates.clone())
        }

        async fn candidates_for_user_in_categories(
            &self,
            _user_id: &str,
            categories: &[CategoryId],
        ) -> Result<Vec<RecommendationCandidate>, ProviderError> {
            Ok(self
                .candidates
                .iter()
                .filter(|candidate| categories.contains(&candidate.category.id()))
                .cloned()
                .collect())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl RatingStatisticsProvider for FailingProvider {
        async fn candidates_for_user(
            &self,
            _user_id: &str,
        ) -> Result<Vec<RecommendationCandidate>, ProviderError> {
            Err(ProviderError::Unavailable("database offline".to_owned()))
        }

        async fn candidates_for_user_in_categories(
            &self,
            _user_id: &str,
            _categories: &[CategoryId],
        ) -> Result<Vec<RecommendationCandidate>, ProviderError> {
            Err(ProviderError::Unavailable("database offline".to_owned()))
        }
    }

    struct Directory(Vec<Category>);

    #[async_trait]
    impl CategoryDirectory for Directory {
        async fn find_category(&self, id: CategoryId) -> Result<Option<Category>, ProviderError> {
            Ok(self.0.iter().find(|category| category.id() == id).cloned())
        }
    }

    #[derive(Default)]
    struct OfflineDirectory {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CategoryDirectory for OfflineDirectory {
        async fn find_category(&self, _id: CategoryId) -> Result<Option<Category>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::Unavailable("directory offline".to_owned()))
        }
    }

    fn ranker(candidates: Vec<RecommendationCandidate>) -> RecommendationRanker {
        RecommendationRanker::new(Arc::new(StaticProvider { candidates }))
    }

    fn sample() -> Vec<RecommendationCandidate> {
        vec![
            candidate(1, 1, 1.0, 10),
            candidate(2, 1, 3.5, 6),
            candidate(3, 2, 0.0, 0),
            candidate(4, 2, 3.5, 8),
            candidate(5, 3, 4.0, 1),
        ]
    }

    #[test]
    fn evidence_tier_comes_first_ordered_by_average() {
        let thresholds = RatingThresholds::new(2.0, 5).expect("thresholds");
        let ranked = rank_candidates(sample(), thresholds);

        assert_eq!(ids(&ranked), vec![2, 4, 5, 1, 3]);
        assert_eq!(ranked[0].tier, RecommendationTier::EvidenceBacked);
        assert_eq!(ranked[1].tier, RecommendationTier::EvidenceBacked);
        assert!(ranked[2..].iter().all(|r| r.tier == RecommendationTier::Unproven));
    }

    #[test]
    fn zero_thresholds_put_everything_in_evidence_tier() {
        let thresholds = RatingThresholds::new(0.0, 0).expect("thresholds");
        let ranked = rank_candidates(sample(), thresholds);

        assert_eq!(ids(&ranked), vec![5, 2, 4, 1, 3]);
        assert!(ranked.iter().all(|r| r.tier == RecommendationTier::EvidenceBacked));
    }

    #[test]
    fn duplicate_resources_keep_first_discovery() {
        let thresholds = RatingThresholds::new(0.0, 0).expect("thresholds");
        let ranked =
            rank_candidates(vec![candidate(7, 1, 2.0, 3), candidate(7, 2, 2.0, 3)], thresholds);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].category.id().get(), 1);
    }

    #[tokio::test]
    async fn blank_user_is_rejected_before_thresholds() {
        let error = ranker(sample())
            .recommend_for_user("", 2.0, 5)
            .await
            .expect_err("blank user id");
        assert_eq!(error, ApplicationError::Domain(DomainError::BlankUserId));

        let error = ranker(sample())
            .recommend_for_user("   ", -1.0, -1)
            .await
            .expect_err("whitespace user id");
        assert_eq!(error, ApplicationError::Domain(DomainError::BlankUserId));
    }

    #[tokio::test]
    async fn thresholds_are_validated_independently() {
        let error = ranker(sample())
            .recommend_for_user("U1", -1.0, 5)
            .await
            .expect_err("negative rating");
        assert_eq!(
            error,
            ApplicationError::Domain(DomainError::NegativeMinimumRating { value: -1.0 })
        );

        let error = ranker(sample())
            .recommend_for_user("U1", 2.0, -3)
            .await
            .expect_err("negative count");
        assert_eq!(
            error,
            ApplicationError::Domain(DomainError::NegativeMinimumRatingCount { value: -3 })
        );
    }

    #[tokio::test]
    async fn empty_provider_yields_empty_list() {
        let ranked = ranker(Vec::new()).recommend_for_user("U1", 2.0, 0).await.expect("ranked");
        assert!(ranked.is_empty());
    }

    #[tokio::test]
    async fn ranking_is_idempotent() {
        let ranker = ranker(sample());
        let first = ranker.recommend_for_user("U1", 2.0, 5).await.expect("ranked");
        let second = ranker.recommend_for_user("U1", 2.0, 5).await.expect("ranked");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn provider_failure_is_wrapped() {
        let ranker = RecommendationRanker::new(Arc::new(FailingProvider));

        let error = ranker.recommend_for_user("U7", 2.0, 0).await.expect_err("provider failure");
        assert_eq!(
            error,
            ApplicationError::Collaborator {
                operation: "recommend_for_user",
                user_id: "U7".to_owned(),
                source: ProviderError::Unavailable("database offline".to_owned()),
            }
        );

        let filters = [Some(CategoryFilter::new(1, "Rust"))];
        let error = ranker
            .recommend_for_user_in_categories("U7", Some(&filters), 2.0, 0)
            .await
            .expect_err("provider failure");
        assert!(matches!(
            error,
            ApplicationError::Collaborator { operation: "recommend_for_user_in_categories", .. }
        ));
    }

    #[tokio::test]
    async fn category_list_errors_are_distinct() {
        let ranker = ranker(sample());

        let missing = ranker
            .recommend_for_user_in_categories("U1", None, 2.0, 0)
            .await
            .expect_err("missing list");
        let empty = ranker
            .recommend_for_user_in_categories("U1", Some(&[]), 2.0, 0)
            .await
            .expect_err("empty list");

        assert_eq!(missing, ApplicationError::Domain(DomainError::MissingCategoryList));
        assert_eq!(empty, ApplicationError::Domain(DomainError::EmptyCategoryList));
        assert_ne!(missing, empty);
    }

    #[tokio::test]
    async fn category_item_errors_are_reported_per_field() {
        let ranker = ranker(sample());
        let cases: Vec<(Vec<Option<CategoryFilter>>, DomainError)> = vec![
            (
                vec![Some(CategoryFilter::new(1, "Rust")), None],
                DomainError::MissingCategoryItem { index: 1 },
            ),
            (
                vec![Some(CategoryFilter::new(1, "Rust")), Some(CategoryFilter::new(0, "Go"))],
                DomainError::NonPositiveCategoryId { index: 1, id: 0 },
            ),
            (
                vec![Some(CategoryFilter { id: 2, name: None })],
                DomainError::MissingCategoryName { index: 0 },
            ),
            (
                vec![Some(CategoryFilter::new(2, " \t"))],
                DomainError::BlankCategoryName { index: 0 },
            ),
            (
                vec![Some(CategoryFilter { id: -4, name: None })],
                DomainError::NonPositiveCategoryId { index: 0, id: -4 },
            ),
        ];

        for (filters, expected) in cases {
            let error = ranker
                .recommend_for_user_in_categories("U1", Some(&filters), 2.0, 0)
                .await
                .expect_err("invalid category");
            assert_eq!(error, ApplicationError::Domain(expected));
        }
    }

    #[tokio::test]
    async fn category_checks_precede_threshold_checks() {
        let filters = [Some(CategoryFilter::new(0, "Rust"))];
        let error = ranker(sample())
            .recommend_for_user_in_categories("U1", Some(&filters), -1.0, -1)
            .await
            .expect_err("invalid category");
        assert_eq!(
            error,
            ApplicationError::Domain(DomainError::NonPositiveCategoryId { index: 0, id: 0 })
        );

        let filters = [Some(CategoryFilter::new(1, "Rust"))];
        let error = ranker(sample())
            .recommend_for_user_in_categories("U1", Some(&filters), -1.0, 0)
            .await
            .expect_err("invalid threshold");
        assert_eq!(
            error,
            ApplicationError::Domain(DomainError::NegativeMinimumRating { value: -1.0 })
        );
    }

    #[tokio::test]
    async fn categories_select_a_union() {
        let filters = [Some(CategoryFilter::new(1, "One")), Some(CategoryFilter::new(3, "Three"))];
        let ranked = ranker(sample())
            .recommend_for_user_in_categories("U1", Some(&filters), 2.0, 5)
            .await
            .expect("ranked");

        assert_eq!(ids(&ranked), vec![2, 5, 1]);
    }

    #[tokio::test]
    async fn category_ids_are_resolved_through_directory() {
        let directory = Directory(vec![category(2)]);
        let ranker = ranker(sample());

        let ranked = ranker
            .recommend_for_user_in_category_ids(
                &directory,
                "U1",
                &[CategoryId::new(2).expect("id")],
                0.0,
                0,
            )
            .await
            .expect("ranked");
        assert_eq!(ids(&ranked), vec![4, 3]);

        let error = ranker
            .recommend_for_user_in_category_ids(
                &directory,
                "U1",
                &[CategoryId::new(9).expect("id")],
                0.0,
                0,
            )
            .await
            .expect_err("unknown category");
        assert_eq!(error, ApplicationError::Domain(DomainError::CategoryNotFound { id: 9 }));

        let error = ranker
            .recommend_for_user_in_category_ids(&directory, "U1", &[], 0.0, 0)
            .await
            .expect_err("no categories");
        assert_eq!(error, ApplicationError::Domain(DomainError::EmptyCategoryList));
    }

    #[tokio::test]
    async fn category_id_thresholds_are_checked_before_directory_lookup() {
        let directory = OfflineDirectory::default();
        let ranker = ranker(sample());
        let ids = [CategoryId::new(2).expect("id")];

        let error = ranker
            .recommend_for_user_in_category_ids(&directory, "U1", &ids, -1.0, 0)
            .await
            .expect_err("negative rating");
        assert_eq!(
            error,
            ApplicationError::Domain(DomainError::NegativeMinimumRating { value: -1.0 })
        );

        let error = ranker
            .recommend_for_user_in_category_ids(&directory, "U1", &ids, 2.0, -3)
            .await
            .expect_err("negative count");
        assert_eq!(
            error,
            ApplicationError::Domain(DomainError::NegativeMinimumRatingCount { value: -3 })
        );
        assert_eq!(directory.calls.load(Ordering::SeqCst), 0);

        let error = ranker
            .recommend_for_user_in_category_ids(&directory, "U1", &ids, 2.0, 0)
            .await
            .expect_err("directory offline");
        assert!(matches!(
            error,
            ApplicationError::Collaborator { operation: "resolve_categories", .. }
        ));
        assert_eq!(directory.calls.load(Ordering::SeqCst), 1);
    }
}
