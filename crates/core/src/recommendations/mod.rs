//! Personalized resource recommendations.
//!
//! Candidates and their rating aggregates come from a
//! [`RatingStatisticsProvider`]; the ranker splits them into an
//! evidence-backed tier and an unproven tier and orders the result.

mod provider;
mod quota;
mod ranker;
mod types;

pub use provider::{CategoryDirectory, RatingStatisticsProvider};
pub use quota::{allocate_by_interest, interest_levels};
pub use ranker::{rank_candidates, RecommendationRanker};
pub use types::*;

/// Number of recommendations shown on a user's dashboard.
pub const DEFAULT_DASHBOARD_LIMIT: usize = 10;

/// Providers only offer resources from categories with an interest level
/// above this value.
pub const MIN_INTEREST_FOR_RECOMMENDATION: u8 = 2;

/// Providers only offer resources whose difficulty is within this distance
/// of the user's skill level.
pub const DIFFICULTY_WINDOW: u8 = 1;
