//! Subject domain model.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned subject identifier.
pub type SubjectId = i64;

/// A course or topic under which labs are grouped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub title: String,
}

/// Validation error for subject creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectValidationError {
    EmptyTitle,
}

impl Display for SubjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "subject title cannot be empty"),
        }
    }
}

impl Error for SubjectValidationError {}

/// Trims a subject title and rejects blank input.
pub fn normalize_subject_title(title: &str) -> Result<String, SubjectValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(SubjectValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}
