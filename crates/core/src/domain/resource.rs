use serde::{Deserialize, Serialize};
use url::Url;

use super::{is_blank, ResourceId};
use crate::errors::DomainError;

pub const MAX_OWNER_LENGTH: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    Pending,
    Available,
    Deleted,
}

impl ResourceStatus {
    /// Elevated submitters publish immediately; everyone else waits for review.
    pub fn for_submitter(elevated: bool) -> Self {
        if elevated {
            Self::Available
        } else {
            Self::Pending
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Resource {
    id: ResourceId,
    name: String,
    description: String,
    link: Url,
    owner: String,
    status: ResourceStatus,
}

impl Resource {
    pub fn new(
        id: ResourceId,
        name: impl Into<String>,
        description: impl Into<String>,
        link: &str,
        owner: impl Into<String>,
        submitter_is_elevated: bool,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if is_blank(&name) {
            return Err(DomainError::BlankField { field: "resource name" });
        }
        let description = description.into();
        if is_blank(&description) {
            return Err(DomainError::BlankField { field: "resource description" });
        }
        let link = parse_link(link)?;
        let owner = owner.into();
        if is_blank(&owner) {
            return Err(DomainError::BlankField { field: "resource owner" });
        }
        let owner_length = owner.chars().count();
        if owner_length > MAX_OWNER_LENGTH {
            return Err(DomainError::ResourceOwnerTooLong { length: owner_length });
        }

        Ok(Self {
            id,
            name,
            description,
            link,
            owner,
            status: ResourceStatus::for_submitter(submitter_is_elevated),
        })
    }

    /// Replace the lifecycle status, e.g. when restoring a stored resource.
    pub fn with_status(mut self, status: ResourceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> ResourceStatus {
        self.status
    }

    pub fn is_available(&self) -> bool {
        self.status == ResourceStatus::Available
    }
}

fn parse_link(raw: &str) -> Result<Url, DomainError> {
    let invalid = |reason: String| DomainError::InvalidResourceLink { link: raw.to_owned(), reason };

    let url = Url::parse(raw.trim()).map_err(|error| invalid(error.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}` (expected http|https)", url.scheme())));
    }
    if url.host_str().map(str::is_empty).unwrap_or(true) {
        return Err(invalid("missing host".to_owned()));
    }

    Ok(url)
}
