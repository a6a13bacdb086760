//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define the storage contracts the lab manager consumes.
//! - Isolate SQL details from service orchestration.
//!
//! # Invariants
//! - Lab writes call `Lab::validate()` (or the input equivalent) before SQL.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::lab::{LabId, LabValidationError};
use crate::model::subject::{SubjectId, SubjectValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod lab_repo;
pub mod subject_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by subject and lab persistence.
#[derive(Debug)]
pub enum RepoError {
    InvalidLab(LabValidationError),
    InvalidSubject(SubjectValidationError),
    Db(DbError),
    LabNotFound(LabId),
    SubjectNotFound(SubjectId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLab(err) => write!(f, "{err}"),
            Self::InvalidSubject(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::LabNotFound(id) => write!(f, "lab not found: {id}"),
            Self::SubjectNotFound(id) => write!(f, "subject not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidLab(err) => Some(err),
            Self::InvalidSubject(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::LabNotFound(_) | Self::SubjectNotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<LabValidationError> for RepoError {
    fn from(value: LabValidationError) -> Self {
        Self::InvalidLab(value)
    }
}

impl From<SubjectValidationError> for RepoError {
    fn from(value: SubjectValidationError) -> Self {
        Self::InvalidSubject(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
