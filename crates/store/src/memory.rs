use std::collections::{HashMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use skillrank_core::domain::category::Category;
use skillrank_core::domain::interest::UserCategoryAffinity;
use skillrank_core::domain::resource::Resource;
use skillrank_core::domain::tag::Tag;
use skillrank_core::domain::{CategoryId, ResourceId};
use skillrank_core::errors::ProviderError;
use skillrank_core::recommendations::{
    CategoryDirectory, RatingStatisticsProvider, RecommendationCandidate, ResourceRatingAggregate,
    DIFFICULTY_WINDOW, MIN_INTEREST_FOR_RECOMMENDATION,
};

use crate::snapshot::{CatalogSnapshot, SnapshotError};

/// Catalog held in memory, serving recommendation candidates and lookups.
#[derive(Default)]
pub struct InMemoryCatalog {
    snapshot: RwLock<CatalogSnapshot>,
    failure: RwLock<Option<String>>,
}

impl InMemoryCatalog {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self { snapshot: RwLock::new(snapshot), failure: RwLock::new(None) }
    }

    pub async fn from_path(path: &Path) -> Result<Self, SnapshotError> {
        Ok(Self::new(CatalogSnapshot::load(path).await?))
    }

    /// Make every collaborator call fail with `message` until [`Self::recover`].
    pub async fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write().await = Some(message.into());
    }

    pub async fn recover(&self) {
        *self.failure.write().await = None;
    }

    pub async fn available_resources(&self) -> Vec<Resource> {
        let snapshot = self.snapshot.read().await;
        snapshot
            .resources
            .iter()
            .filter(|entry| entry.resource.is_available())
            .map(|entry| entry.resource.clone())
            .collect()
    }

    pub async fn tags(&self) -> Vec<Tag> {
        self.snapshot.read().await.tags.clone()
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.snapshot.read().await.categories.clone()
    }

    /// The user's category affinities, in catalog order.
    pub async fn interests_for(&self, user_id: &str) -> Result<Vec<UserCategoryAffinity>, ProviderError> {
        self.check_available().await?;
        let snapshot = self.snapshot.read().await;
        Ok(snapshot
            .interests
            .iter()
            .filter(|interest| interest.user_id() == user_id)
            .cloned()
            .collect())
    }

    async fn check_available(&self) -> Result<(), ProviderError> {
        match self.failure.read().await.as_ref() {
            Some(message) => Err(ProviderError::Unavailable(message.clone())),
            None => Ok(()),
        }
    }

    async fn select_candidates(
        &self,
        user_id: &str,
        categories: Option<&[CategoryId]>,
    ) -> Result<Vec<RecommendationCandidate>, ProviderError> {
        self.check_available().await?;
        let snapshot = self.snapshot.read().await;

        let mut interests: Vec<&UserCategoryAffinity> = snapshot
            .interests
            .iter()
            .filter(|interest| interest.user_id() == user_id)
            .filter(|interest| interest.interest_level() > MIN_INTEREST_FOR_RECOMMENDATION)
            .filter(|interest| {
                categories.map_or(true, |wanted| wanted.contains(&interest.category().id()))
            })
            .collect();
        interests.sort_by(|a, b| b.interest_level().cmp(&a.interest_level()));

        let completed: HashSet<ResourceId> = snapshot
            .completions
            .iter()
            .filter(|completion| completion.user_id == user_id)
            .map(|completion| completion.resource_id)
            .collect();
        let aggregates = aggregate_ratings(&snapshot);

        let mut candidates = Vec::new();
        for interest in interests {
            let category_id = interest.category().id();
            let Some(category) = snapshot.category(category_id) else {
                return Err(ProviderError::Decode(format!(
                    "interest references missing category {category_id}"
                )));
            };
            let lowest = interest.skill_level().saturating_sub(DIFFICULTY_WINDOW);
            let highest = interest.skill_level().saturating_add(DIFFICULTY_WINDOW);

            for entry in &snapshot.resources {
                if !entry.resource.is_available() || completed.contains(&entry.resource.id()) {
                    continue;
                }
                let Some(&difficulty) = entry.difficulty_by_category.get(&category_id) else {
                    continue;
                };
                if difficulty < lowest || difficulty > highest {
                    continue;
                }

                candidates.push(RecommendationCandidate {
                    resource: entry.resource.clone(),
                    category: category.clone(),
                    difficulty_level: difficulty,
                    interest_level: interest.interest_level(),
                    rating: aggregates.get(&entry.resource.id()).copied().unwrap_or_default(),
                });
            }
        }

        debug!(
            event_name = "catalog.candidates_selected",
            user_id,
            candidates = candidates.len(),
            "recommendation candidates selected"
        );
        Ok(candidates)
    }
}

fn aggregate_ratings(snapshot: &CatalogSnapshot) -> HashMap<ResourceId, ResourceRatingAggregate> {
    let mut totals: HashMap<ResourceId, (i64, u32)> = HashMap::new();
    for completion in &snapshot.completions {
        let entry = totals.entry(completion.resource_id).or_default();
        entry.0 += i64::from(completion.rating.value());
        entry.1 += 1;
    }

    totals
        .into_iter()
        .map(|(resource_id, (sum, count))| {
            let average = sum as f64 / f64::from(count);
            (resource_id, ResourceRatingAggregate::new(average, count))
        })
        .collect()
}

#[async_trait]
impl RatingStatisticsProvider for InMemoryCatalog {
    async fn candidates_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<RecommendationCandidate>, ProviderError> {
        self.select_candidates(user_id, None).await
    }

    async fn candidates_for_user_in_categories(
        &self,
        user_id: &str,
        categories: &[CategoryId],
    ) -> Result<Vec<RecommendationCandidate>, ProviderError> {
        self.select_candidates(user_id, Some(categories)).await
    }
}

#[async_trait]
impl CategoryDirectory for InMemoryCatalog {
    async fn find_category(&self, id: CategoryId) -> Result<Option<Category>, ProviderError> {
        self.check_available().await?;
        Ok(self.snapshot.read().await.category(id).cloned())
    }
}
