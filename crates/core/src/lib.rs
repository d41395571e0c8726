pub mod affinity;
pub mod config;
pub mod domain;
pub mod errors;
pub mod proximity;
pub mod recommendations;

pub use affinity::{CategoryRelevance, CategoryScore, CategoryScorer};
pub use domain::category::Category;
pub use domain::completion::{CompletedResource, CompletionRating};
pub use domain::interest::UserCategoryAffinity;
pub use domain::resource::{Resource, ResourceStatus};
pub use domain::tag::Tag;
pub use domain::{CategoryId, ResourceId, TagId};
pub use errors::{ApplicationError, DomainError, InterfaceError, ProviderError};
pub use proximity::{rank_by_proximity, Named, TextProximityRanker};
pub use recommendations::{
    CategoryDirectory, CategoryFilter, RatingStatisticsProvider, RecommendationCandidate,
    RecommendationRanker, RecommendationTier, RecommendedResource, ResourceRatingAggregate,
};
