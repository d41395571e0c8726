use std::sync::Arc;

use skillrank_core::config::LoadOptions;
use skillrank_core::domain::CategoryId;
use skillrank_core::errors::{ApplicationError, DomainError};
use skillrank_core::recommendations::{
    allocate_by_interest, interest_levels, RecommendationRanker, RecommendedResource,
};

use crate::commands::{load_catalog, load_config, runtime, to_data, CommandResult};

const COMMAND: &str = "recommend";

#[derive(Debug, Clone, Default)]
pub struct RecommendArgs {
    pub user_id: String,
    /// Restrict to these category ids; empty means every category of interest
    pub categories: Vec<i64>,
    /// Apply the interest-weighted dashboard selection
    pub dashboard: bool,
}

pub fn run(options: LoadOptions, args: RecommendArgs) -> CommandResult {
    let config = match load_config(COMMAND, options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    runtime.block_on(async {
        let catalog = match load_catalog(COMMAND, &config).await {
            Ok(catalog) => Arc::new(catalog),
            Err(failure) => return failure,
        };
        let ranker = RecommendationRanker::new(catalog.clone());
        let minimum_rating = config.ranking.minimum_rating;
        let minimum_rating_count = i64::from(config.ranking.minimum_rating_count);

        let ranked = if args.categories.is_empty() {
            ranker.recommend_for_user(&args.user_id, minimum_rating, minimum_rating_count).await
        } else {
            match category_ids(&args.categories) {
                Ok(ids) => {
                    ranker
                        .recommend_for_user_in_category_ids(
                            catalog.as_ref(),
                            &args.user_id,
                            &ids,
                            minimum_rating,
                            minimum_rating_count,
                        )
                        .await
                }
                Err(error) => Err(error.into()),
            }
        };
        let mut ranked = match ranked {
            Ok(ranked) => ranked,
            Err(error) => return CommandResult::from_application_error(COMMAND, error),
        };

        if args.dashboard {
            let interests = match catalog.interests_for(&args.user_id).await {
                Ok(interests) => interests,
                Err(error) => {
                    return CommandResult::from_application_error(
                        COMMAND,
                        ApplicationError::collaborator("load_interests", &args.user_id, error),
                    )
                }
            };
            ranked = allocate_by_interest(
                &ranked,
                &interest_levels(&interests),
                config.ranking.dashboard_limit,
            );
        }

        render(&args.user_id, &ranked)
    })
}

fn category_ids(raw: &[i64]) -> Result<Vec<CategoryId>, DomainError> {
    raw.iter()
        .enumerate()
        .map(|(index, id)| {
            CategoryId::new(*id).map_err(|_| DomainError::NonPositiveCategoryId { index, id: *id })
        })
        .collect()
}

fn render(user_id: &str, ranked: &[RecommendedResource]) -> CommandResult {
    let data = match to_data(COMMAND, &ranked) {
        Ok(data) => data,
        Err(failure) => return failure,
    };
    CommandResult::success_with_data(
        COMMAND,
        format!("{} recommendations for `{user_id}`", ranked.len()),
        Some(data),
    )
}
