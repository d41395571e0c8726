use skillrank_core::affinity::{CategoryRelevance, CategoryScorer};
use skillrank_core::domain::CategoryId;
use skillrank_core::errors::{ApplicationError, DomainError};

use crate::commands::{to_data, CommandResult};

const COMMAND: &str = "prioritize";

/// Score `category:skill:importance` triples and print them best first.
pub fn run(ratings: &[String], max_categories: usize) -> CommandResult {
    let parsed = ratings.iter().map(|raw| parse_relevance(raw)).collect::<Result<Vec<_>, _>>();
    let relevances = match parsed {
        Ok(relevances) => relevances,
        Err(failure) => return failure,
    };

    let scores = match CategoryScorer::new().prioritize(&relevances, max_categories) {
        Ok(scores) => scores,
        Err(error) => {
            return CommandResult::from_application_error(COMMAND, ApplicationError::from(error))
        }
    };

    let data = match to_data(COMMAND, &scores) {
        Ok(data) => data,
        Err(failure) => return failure,
    };
    CommandResult::success_with_data(
        COMMAND,
        format!("{} of {} categories prioritized", scores.len(), relevances.len()),
        Some(data),
    )
}

fn parse_relevance(raw: &str) -> Result<CategoryRelevance, CommandResult> {
    let malformed = || {
        CommandResult::failure(
            COMMAND,
            "invalid_argument",
            format!("expected `category:skill:importance`, got `{raw}`"),
            5,
        )
    };

    let mut parts = raw.split(':').map(str::trim);
    let (Some(category), Some(skill), Some(importance), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed());
    };

    let category = category.parse::<i64>().map_err(|_| malformed())?;
    let skill_level = skill.parse::<i32>().map_err(|_| malformed())?;
    let job_importance = importance.parse::<i32>().map_err(|_| malformed())?;
    let category_id = CategoryId::new(category).map_err(|error: DomainError| {
        CommandResult::from_application_error(COMMAND, error.into())
    })?;

    Ok(CategoryRelevance { category_id, skill_level, job_importance })
}
