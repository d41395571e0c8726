use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use skillrank_core::domain::category::Category;
use skillrank_core::domain::completion::CompletedResource;
use skillrank_core::domain::interest::UserCategoryAffinity;
use skillrank_core::domain::resource::{Resource, ResourceStatus};
use skillrank_core::domain::tag::Tag;
use skillrank_core::domain::{CategoryId, ResourceId, TagId, MAX_LEVEL, MIN_LEVEL};
use skillrank_core::errors::DomainError;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("could not read catalog snapshot `{path}`: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not parse catalog snapshot: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid {record}: {source}")]
    InvalidRecord { record: String, source: DomainError },
    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: u32 },
    #[error("{record} references unknown {kind} {id}")]
    UnknownReference { record: String, kind: &'static str, id: u32 },
}

/// A resource together with where it sits in the catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogResource {
    pub resource: Resource,
    /// Difficulty of the resource in each category it belongs to
    pub difficulty_by_category: BTreeMap<CategoryId, u8>,
    pub tags: Vec<TagId>,
}

/// Validated catalog contents, in file order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogSnapshot {
    pub categories: Vec<Category>,
    pub resources: Vec<CatalogResource>,
    pub tags: Vec<Tag>,
    pub interests: Vec<UserCategoryAffinity>,
    pub completions: Vec<CompletedResource>,
}

impl CatalogSnapshot {
    pub async fn load(path: &Path) -> Result<Self, SnapshotError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SnapshotError::Read { path: path.to_path_buf(), source })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, SnapshotError> {
        let document: SnapshotDocument = serde_json::from_str(raw)?;
        document.validate()
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| category.id() == id)
    }
}

#[derive(Debug, Deserialize)]
struct SnapshotDocument {
    #[serde(default)]
    categories: Vec<CategoryRecord>,
    #[serde(default)]
    resources: Vec<ResourceRecord>,
    #[serde(default)]
    tags: Vec<TagRecord>,
    #[serde(default)]
    interests: Vec<InterestRecord>,
    #[serde(default)]
    completions: Vec<CompletedResource>,
}

#[derive(Debug, Deserialize)]
struct CategoryRecord {
    id: i64,
    name: String,
    description: String,
    #[serde(default)]
    difficulty_level: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct ResourceRecord {
    id: i64,
    name: String,
    description: String,
    link: String,
    owner: String,
    #[serde(default = "available")]
    status: ResourceStatus,
    #[serde(default)]
    categories: Vec<ResourceCategoryRecord>,
    #[serde(default)]
    tags: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct ResourceCategoryRecord {
    category_id: i64,
    difficulty_level: i32,
}

#[derive(Debug, Deserialize)]
struct TagRecord {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct InterestRecord {
    user_id: String,
    category_id: i64,
    skill_level: i32,
    interest_level: i32,
}

fn available() -> ResourceStatus {
    ResourceStatus::Available
}

fn invalid(record: impl Into<String>) -> impl FnOnce(DomainError) -> SnapshotError {
    let record = record.into();
    move |source| SnapshotError::InvalidRecord { record, source }
}

impl SnapshotDocument {
    fn validate(self) -> Result<CatalogSnapshot, SnapshotError> {
        let mut categories = Vec::with_capacity(self.categories.len());
        for record in self.categories {
            let label = format!("category {}", record.id);
            let mut category =
                Category::new(record.id, record.name, record.description).map_err(invalid(&label))?;
            if let Some(level) = record.difficulty_level {
                category = category.with_difficulty_level(level).map_err(invalid(&label))?;
            }
            if categories.iter().any(|known: &Category| known.id() == category.id()) {
                return Err(SnapshotError::DuplicateId { kind: "category", id: category.id().get() });
            }
            categories.push(category);
        }

        let mut tags = Vec::with_capacity(self.tags.len());
        for record in self.tags {
            let label = format!("tag {}", record.id);
            let id = TagId::new(record.id).map_err(invalid(&label))?;
            let tag = Tag::new(id, record.name).map_err(invalid(&label))?;
            if tags.iter().any(|known: &Tag| known.id() == id) {
                return Err(SnapshotError::DuplicateId { kind: "tag", id: id.get() });
            }
            tags.push(tag);
        }

        let category_ids: HashSet<CategoryId> = categories.iter().map(Category::id).collect();
        let tag_ids: HashSet<TagId> = tags.iter().map(Tag::id).collect();

        let mut resources: Vec<CatalogResource> = Vec::with_capacity(self.resources.len());
        for record in self.resources {
            let label = format!("resource {}", record.id);
            let id = ResourceId::new(record.id).map_err(invalid(&label))?;
            if resources.iter().any(|known| known.resource.id() == id) {
                return Err(SnapshotError::DuplicateId { kind: "resource", id: id.get() });
            }
            let resource = Resource::new(
                id,
                record.name,
                record.description,
                &record.link,
                record.owner,
                false,
            )
            .map_err(invalid(&label))?
            .with_status(record.status);

            let mut difficulty_by_category = BTreeMap::new();
            for placement in record.categories {
                let category_id = CategoryId::new(placement.category_id).map_err(invalid(&label))?;
                if !category_ids.contains(&category_id) {
                    return Err(SnapshotError::UnknownReference {
                        record: label,
                        kind: "category",
                        id: category_id.get(),
                    });
                }
                if !(MIN_LEVEL..=MAX_LEVEL).contains(&placement.difficulty_level) {
                    return Err(SnapshotError::InvalidRecord {
                        record: label,
                        source: DomainError::DifficultyLevelOutOfRange {
                            value: placement.difficulty_level,
                        },
                    });
                }
                difficulty_by_category.insert(category_id, placement.difficulty_level as u8);
            }

            let mut resource_tags = Vec::with_capacity(record.tags.len());
            for raw in record.tags {
                let tag_id = TagId::new(raw).map_err(invalid(&label))?;
                if !tag_ids.contains(&tag_id) {
                    return Err(SnapshotError::UnknownReference {
                        record: label,
                        kind: "tag",
                        id: tag_id.get(),
                    });
                }
                resource_tags.push(tag_id);
            }

            resources.push(CatalogResource { resource, difficulty_by_category, tags: resource_tags });
        }

        let categories = with_resource_counts(categories, &resources)?;

        let mut interests = Vec::with_capacity(self.interests.len());
        for record in self.interests {
            let label = format!("interest of `{}` in category {}", record.user_id, record.category_id);
            let category_id = CategoryId::new(record.category_id).map_err(invalid(&label))?;
            let category = categories
                .iter()
                .find(|category| category.id() == category_id)
                .cloned()
                .ok_or_else(|| SnapshotError::UnknownReference {
                    record: label.clone(),
                    kind: "category",
                    id: category_id.get(),
                })?;
            let interest = UserCategoryAffinity::new(
                record.user_id,
                category,
                record.skill_level,
                record.interest_level,
            )
            .map_err(invalid(&label))?;
            interests.push(interest);
        }

        for completion in &self.completions {
            if completion.user_id.trim().is_empty() {
                return Err(SnapshotError::InvalidRecord {
                    record: format!("completion of resource {}", completion.resource_id),
                    source: DomainError::BlankUserId,
                });
            }
            let known = resources.iter().any(|entry| entry.resource.id() == completion.resource_id);
            if !known {
                return Err(SnapshotError::UnknownReference {
                    record: format!("completion by `{}`", completion.user_id),
                    kind: "resource",
                    id: completion.resource_id.get(),
                });
            }
        }

        Ok(CatalogSnapshot {
            categories,
            resources,
            tags,
            interests,
            completions: self.completions,
        })
    }
}

/// Attach per-difficulty counts of available resources to each category.
fn with_resource_counts(
    categories: Vec<Category>,
    resources: &[CatalogResource],
) -> Result<Vec<Category>, SnapshotError> {
    let mut counts: HashMap<CategoryId, BTreeMap<i32, i64>> = HashMap::new();
    for entry in resources.iter().filter(|entry| entry.resource.is_available()) {
        for (category_id, level) in &entry.difficulty_by_category {
            *counts.entry(*category_id).or_default().entry(i32::from(*level)).or_default() += 1;
        }
    }

    categories
        .into_iter()
        .map(|category| match counts.remove(&category.id()) {
            Some(per_level) => {
                let label = format!("category {}", category.id());
                category.with_resource_counts(per_level).map_err(invalid(label))
            }
            None => Ok(category),
        })
        .collect()
}
