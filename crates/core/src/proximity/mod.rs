//! Text proximity ranking for autocomplete and search.
//!
//! Candidates are ordered by how close their name is to a typed fragment:
//! exact matches first, then prefix matches, then substring matches, then
//! everything else, each group ordered by edit distance. Ties keep their
//! input order. The ranker never drops candidates; callers cap the list.

mod distance;

use serde::Serialize;

use crate::domain::category::Category;
use crate::domain::resource::Resource;
use crate::domain::tag::Tag;
use crate::domain::is_blank;
use crate::errors::DomainError;

pub use distance::{levenshtein, MatchClass};
use distance::normalize;

/// Number of suggestions shown by autocomplete callers.
pub const AUTOCOMPLETE_LIMIT: usize = 10;

/// Something with a display name that can be ranked against a query.
pub trait Named {
    fn name(&self) -> &str;

    /// Extra text used to break ties between equally close names.
    fn secondary_text(&self) -> Option<&str> {
        None
    }
}

impl Named for str {
    fn name(&self) -> &str {
        self
    }
}

impl Named for String {
    fn name(&self) -> &str {
        self
    }
}

impl<T: Named + ?Sized> Named for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn secondary_text(&self) -> Option<&str> {
        (**self).secondary_text()
    }
}

impl Named for Resource {
    fn name(&self) -> &str {
        Resource::name(self)
    }

    fn secondary_text(&self) -> Option<&str> {
        Some(self.description())
    }
}

impl Named for Tag {
    fn name(&self) -> &str {
        Tag::name(self)
    }
}

impl Named for Category {
    fn name(&self) -> &str {
        Category::name(self)
    }
}

/// Sort key for one candidate; smaller is closer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Proximity {
    pub class: MatchClass,
    pub name_distance: usize,
    /// 0 for candidates without secondary text
    pub secondary_distance: usize,
}

#[derive(Clone, Debug)]
pub struct TextProximityRanker {
    query: String,
}

impl TextProximityRanker {
    /// Fails on an empty or whitespace-only query.
    pub fn new(query: &str) -> Result<Self, DomainError> {
        if is_blank(query) {
            return Err(DomainError::BlankSearchQuery);
        }
        Ok(Self { query: normalize(query) })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn proximity<T: Named + ?Sized>(&self, candidate: &T) -> Proximity {
        let name = normalize(candidate.name());
        let secondary_distance = candidate
            .secondary_text()
            .map(|text| levenshtein(&normalize(text), &self.query))
            .unwrap_or(0);

        Proximity {
            class: MatchClass::classify(&name, &self.query),
            name_distance: levenshtein(&name, &self.query),
            secondary_distance,
        }
    }

    /// Stable ascending sort by [`Proximity`].
    pub fn rank<T: Named>(&self, candidates: Vec<T>) -> Vec<T> {
        let mut keyed: Vec<(Proximity, T)> = candidates
            .into_iter()
            .map(|candidate| (self.proximity(&candidate), candidate))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.into_iter().map(|(_, candidate)| candidate).collect()
    }
}

/// Order `candidates` by closeness to `query`.
pub fn rank_by_proximity<T: Named>(candidates: Vec<T>, query: &str) -> Result<Vec<T>, DomainError> {
    let ranker = TextProximityRanker::new(query)?;
    let ranked = ranker.rank(candidates);
    tracing::debug!(
        event_name = "proximity.ranked",
        query = ranker.query(),
        candidates = ranked.len(),
        "candidates ranked by proximity"
    );
    Ok(ranked)
}
