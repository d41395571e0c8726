use std::collections::HashMap;

use super::types::RecommendedResource;
use crate::domain::interest::UserCategoryAffinity;
use crate::domain::CategoryId;

/// Interest level per category, taken from a user's affinities.
pub fn interest_levels(affinities: &[UserCategoryAffinity]) -> HashMap<CategoryId, u8> {
    affinities
        .iter()
        .map(|affinity| (affinity.category().id(), affinity.interest_level()))
        .collect()
}

/// Pick at most `limit` recommendations, giving each category a share of the
/// slots proportional to the user's interest in it.
///
/// A list that already fits is returned unchanged. Otherwise each category
/// gets `ceil(interest / total_interest * limit)` slots, categories are
/// visited in the order they first appear in `ranked`, and selection stops
/// once `limit` is reached. Within a category the ranked order is kept.
/// Categories with no known interest level get no slots.
pub fn allocate_by_interest(
    ranked: &[RecommendedResource],
    interest: &HashMap<CategoryId, u8>,
    limit: usize,
) -> Vec<RecommendedResource> {
    if ranked.len() <= limit {
        return ranked.to_vec();
    }

    let mut groups: Vec<(CategoryId, Vec<&RecommendedResource>)> = Vec::new();
    for recommendation in ranked {
        let category_id = recommendation.category.id();
        match groups.iter_mut().find(|(id, _)| *id == category_id) {
            Some((_, members)) => members.push(recommendation),
            None => groups.push((category_id, vec![recommendation])),
        }
    }

    let total_interest: u32 = groups
        .iter()
        .filter_map(|(id, _)| interest.get(id))
        .map(|level| u32::from(*level))
        .sum();
    if total_interest == 0 {
        return Vec::new();
    }

    let mut selected = Vec::with_capacity(limit);
    for (category_id, members) in groups {
        let Some(level) = interest.get(&category_id) else {
            continue;
        };
        let quota = (usize::from(*level) * limit).div_ceil(total_interest as usize);
        for recommendation in members.into_iter().take(quota) {
            if selected.len() == limit {
                return selected;
            }
            selected.push(recommendation.clone());
        }
    }

    selected
}
