//! Lab domain model.
//!
//! # Responsibility
//! - Define the lab record, its status lifecycle and the add/edit input.
//! - Provide trimming and validation shared by services and repositories.
//!
//! # Invariants
//! - `title` is never persisted empty.
//! - `id` and `subject_id` never change after insert.
//! - New labs start as `LabStatus::NotStarted` unless told otherwise.

use crate::model::subject::SubjectId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Storage-assigned lab identifier.
pub type LabId = i64;

/// Progress state of a lab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LabStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl LabStatus {
    /// All statuses in picker order.
    pub const ALL: [LabStatus; 3] = [Self::NotStarted, Self::InProgress, Self::Completed];

    /// Stable code used in storage and across FFI.
    pub fn code(self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.code().eq_ignore_ascii_case(code.trim()))
    }
}

impl Display for LabStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when parsing an unknown status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabStatus(pub String);

impl Display for UnknownLabStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown lab status `{}`; expected NOT_STARTED|IN_PROGRESS|COMPLETED",
            self.0
        )
    }
}

impl Error for UnknownLabStatus {}

impl FromStr for LabStatus {
    type Err = UnknownLabStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_code(value).ok_or_else(|| UnknownLabStatus(value.to_string()))
    }
}

/// A trackable task belonging to one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lab {
    pub id: LabId,
    pub subject_id: SubjectId,
    pub title: String,
    pub description: String,
    pub comment: String,
    pub status: LabStatus,
}

/// Validation error for persisted lab state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabValidationError {
    EmptyTitle,
}

impl Display for LabValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "lab title cannot be empty"),
        }
    }
}

impl Error for LabValidationError {}

impl Lab {
    /// Checks the invariants every stored lab must hold.
    pub fn validate(&self) -> Result<(), LabValidationError> {
        if self.title.trim().is_empty() {
            return Err(LabValidationError::EmptyTitle);
        }
        Ok(())
    }

    /// Returns a copy with all mutable fields replaced by `input`.
    ///
    /// `id` and `subject_id` are carried over unchanged. The input is used
    /// as given; callers normalize it first.
    pub fn with_input(&self, input: LabInput) -> Self {
        Self {
            id: self.id,
            subject_id: self.subject_id,
            title: input.title,
            description: input.description,
            comment: input.comment,
            status: input.status,
        }
    }
}

/// User-entered fields for adding or editing a lab.
///
/// Defaults: empty description and comment, `LabStatus::NotStarted`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabInput {
    pub title: String,
    pub description: String,
    pub comment: String,
    pub status: LabStatus,
}

impl LabInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn status(mut self, status: LabStatus) -> Self {
        self.status = status;
        self
    }

    /// Pre-fills an input from an existing lab for editing.
    pub fn from_lab(lab: &Lab) -> Self {
        Self {
            title: lab.title.clone(),
            description: lab.description.clone(),
            comment: lab.comment.clone(),
            status: lab.status,
        }
    }

    /// Trims all text fields.
    pub fn normalized(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            comment: self.comment.trim().to_string(),
            status: self.status,
        }
    }

    /// Whether the title is blank after trimming.
    pub fn has_blank_title(&self) -> bool {
        self.title.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Lab, LabInput, LabStatus, LabValidationError};

    fn sample_lab() -> Lab {
        Lab {
            id: 5,
            subject_id: 1,
            title: "Matrices".to_string(),
            description: "Gauss elimination".to_string(),
            comment: String::new(),
            status: LabStatus::NotStarted,
        }
    }

    #[test]
    fn status_defaults_to_not_started() {
        assert_eq!(LabStatus::default(), LabStatus::NotStarted);
        assert_eq!(LabInput::new("x").status, LabStatus::NotStarted);
    }

    #[test]
    fn status_codes_parse_case_insensitively() {
        assert_eq!(
            "in_progress".parse::<LabStatus>().unwrap(),
            LabStatus::InProgress
        );
        assert_eq!(
            " COMPLETED ".parse::<LabStatus>().unwrap(),
            LabStatus::Completed
        );
        let err = "DONE".parse::<LabStatus>().unwrap_err();
        assert!(err.to_string().contains("DONE"));
    }

    #[test]
    fn status_labels_are_human_readable() {
        let labels = LabStatus::ALL.map(LabStatus::label);
        assert_eq!(labels, ["Not Started", "In Progress", "Completed"]);
    }

    #[test]
    fn normalized_trims_every_text_field() {
        let input = LabInput::new("  Matrix Algebra  ")
            .description(" rows ")
            .comment("\tcheck pivots\n")
            .status(LabStatus::InProgress)
            .normalized();

        assert_eq!(input.title, "Matrix Algebra");
        assert_eq!(input.description, "rows");
        assert_eq!(input.comment, "check pivots");
        assert_eq!(input.status, LabStatus::InProgress);
    }

    #[test]
    fn with_input_keeps_identity() {
        let updated = sample_lab().with_input(
            LabInput::new("New Title").status(LabStatus::Completed),
        );
        assert_eq!(updated.id, 5);
        assert_eq!(updated.subject_id, 1);
        assert_eq!(updated.title, "New Title");
        assert_eq!(updated.description, "");
        assert_eq!(updated.status, LabStatus::Completed);
    }

    #[test]
    fn validate_rejects_blank_title() {
        let mut lab = sample_lab();
        lab.title = "   ".to_string();
        assert_eq!(lab.validate(), Err(LabValidationError::EmptyTitle));
    }

    #[test]
    fn status_serializes_as_storage_code() {
        let json = serde_json::to_string(&LabStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
    }
}
