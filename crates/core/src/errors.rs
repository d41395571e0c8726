use thiserror::Error;

/// Invalid-argument failures. Each condition has its own variant so callers
/// and tests can tell causes apart.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("skill level must be in the range 1-5, got {value}")]
    SkillLevelOutOfRange { value: i32 },
    #[error("job importance must be in the range 1-5, got {value}")]
    JobImportanceOutOfRange { value: i32 },
    #[error("interest level must be in the range 1-5, got {value}")]
    InterestLevelOutOfRange { value: i32 },
    #[error("difficulty level must be in the range 1-5, got {value}")]
    DifficultyLevelOutOfRange { value: i32 },
    #[error("category scores must be provided")]
    MissingCategoryScores,
    #[error("category relevance list is empty")]
    EmptyCategoryRelevances,
    #[error("user id cannot be empty or whitespace")]
    BlankUserId,
    #[error("minimum rating required must be non-negative, got {value}")]
    NegativeMinimumRating { value: f64 },
    #[error("minimum number of ratings required must be non-negative, got {value}")]
    NegativeMinimumRatingCount { value: i64 },
    #[error("the list of categories to filter by is missing")]
    MissingCategoryList,
    #[error("the list of categories to filter by is empty")]
    EmptyCategoryList,
    #[error("the category list contains a missing item at position {index}")]
    MissingCategoryItem { index: usize },
    #[error("the id for the category at position {index} must be positive, got {id}")]
    NonPositiveCategoryId { index: usize, id: i64 },
    #[error("the category name at position {index} is missing")]
    MissingCategoryName { index: usize },
    #[error("the category name at position {index} cannot be empty or blank")]
    BlankCategoryName { index: usize },
    #[error("category {id} was not found")]
    CategoryNotFound { id: u32 },
    #[error("{kind} id must be positive, got {value}")]
    NonPositiveId { kind: &'static str, value: i64 },
    #[error("{field} cannot be empty or blank")]
    BlankField { field: &'static str },
    #[error("resource owner must be at most 8 characters, got {length}")]
    ResourceOwnerTooLong { length: usize },
    #[error("resource link `{link}` is invalid: {reason}")]
    InvalidResourceLink { link: String, reason: String },
    #[error("resource counts per difficulty level cannot be empty")]
    EmptyResourceCounts,
    #[error("resource count for difficulty level {level} cannot be negative, got {count}")]
    NegativeResourceCount { level: i32, count: i64 },
    #[error("search query cannot be empty or blank")]
    BlankSearchQuery,
}

/// Data-access failure raised by a collaborator.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("data source unavailable: {0}")]
    Unavailable(String),
    #[error("decode error: {0}")]
    Decode(String),
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("{operation} failed for user `{user_id}`: {source}")]
    Collaborator {
        operation: &'static str,
        user_id: String,
        #[source]
        source: ProviderError,
    },
}

impl ApplicationError {
    pub fn collaborator(
        operation: &'static str,
        user_id: impl Into<String>,
        source: ProviderError,
    ) -> Self {
        Self::Collaborator { operation, user_id: user_id.into(), source }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::ServiceUnavailable { .. } => {
                "Recommendations are temporarily unavailable. Please retry shortly."
            }
        }
    }

    pub fn error_class(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "invalid_argument",
            Self::ServiceUnavailable { .. } => "collaborator",
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = "unassigned".to_owned();
        match value {
            ApplicationError::Domain(error) => {
                Self::BadRequest { message: error.to_string(), correlation_id }
            }
            error @ ApplicationError::Collaborator { .. } => {
                Self::ServiceUnavailable { message: error.to_string(), correlation_id }
            }
        }
    }
}
