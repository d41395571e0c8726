use serde::Serialize;

use super::{is_blank, TagId};
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Tag {
    id: TagId,
    name: String,
}

impl Tag {
    pub fn new(id: TagId, name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        if is_blank(&name) {
            return Err(DomainError::BlankField { field: "tag name" });
        }
        Ok(Self { id, name })
    }

    pub fn id(&self) -> TagId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
