//! Lab repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the per-subject fetch/insert/replace/remove primitives.
//! - Keep SQL and status code mapping inside the persistence boundary.
//!
//! # Invariants
//! - Labs are listed in insertion order (`id ASC`).
//! - `replace_lab` never moves a lab to another subject.
//! - `remove_lab` is idempotent.

use crate::model::lab::{Lab, LabId, LabInput, LabStatus, LabValidationError};
use crate::model::subject::SubjectId;
use crate::repo::{RepoError, RepoResult};
use rusqlite::{ffi, params, Connection, ErrorCode, Row};

const LAB_SELECT_SQL: &str = "SELECT
    id,
    subject_id,
    title,
    description,
    comment,
    status
FROM subject_labs";

/// Storage contract consumed by the lab manager.
pub trait LabRepository {
    fn get_lab(&self, id: LabId) -> RepoResult<Option<Lab>>;
    fn list_labs_for_subject(&self, subject_id: SubjectId) -> RepoResult<Vec<Lab>>;
    /// Inserts a new lab and returns it with its storage-assigned id.
    fn insert_lab(&self, subject_id: SubjectId, input: &LabInput) -> RepoResult<Lab>;
    /// Replaces all mutable fields of the lab with the same id.
    fn replace_lab(&self, lab: &Lab) -> RepoResult<()>;
    fn remove_lab(&self, id: LabId) -> RepoResult<()>;
}

/// SQLite-backed lab repository.
pub struct SqliteLabRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLabRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl LabRepository for SqliteLabRepository<'_> {
    fn get_lab(&self, id: LabId) -> RepoResult<Option<Lab>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LAB_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_lab_row(row)?));
        }

        Ok(None)
    }

    fn list_labs_for_subject(&self, subject_id: SubjectId) -> RepoResult<Vec<Lab>> {
        let mut stmt = self.conn.prepare(&format!(
            "{LAB_SELECT_SQL} WHERE subject_id = ?1 ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query(params![subject_id])?;
        let mut labs = Vec::new();

        while let Some(row) = rows.next()? {
            labs.push(parse_lab_row(row)?);
        }

        Ok(labs)
    }

    fn insert_lab(&self, subject_id: SubjectId, input: &LabInput) -> RepoResult<Lab> {
        if input.has_blank_title() {
            return Err(LabValidationError::EmptyTitle.into());
        }

        self.conn
            .execute(
                "INSERT INTO subject_labs (
                    subject_id,
                    title,
                    description,
                    comment,
                    status
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    subject_id,
                    input.title.as_str(),
                    input.description.as_str(),
                    input.comment.as_str(),
                    input.status.code(),
                ],
            )
            .map_err(|err| map_missing_subject(err, subject_id))?;

        let lab = Lab {
            id: self.conn.last_insert_rowid(),
            subject_id,
            title: input.title.clone(),
            description: input.description.clone(),
            comment: input.comment.clone(),
            status: input.status,
        };
        Ok(lab)
    }

    fn replace_lab(&self, lab: &Lab) -> RepoResult<()> {
        lab.validate()?;

        let changed = self.conn.execute(
            "UPDATE subject_labs
             SET
                title = ?1,
                description = ?2,
                comment = ?3,
                status = ?4
             WHERE id = ?5 AND subject_id = ?6;",
            params![
                lab.title.as_str(),
                lab.description.as_str(),
                lab.comment.as_str(),
                lab.status.code(),
                lab.id,
                lab.subject_id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::LabNotFound(lab.id));
        }

        Ok(())
    }

    fn remove_lab(&self, id: LabId) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM subject_labs WHERE id = ?1;", params![id])?;
        Ok(())
    }
}

fn parse_lab_row(row: &Row<'_>) -> RepoResult<Lab> {
    let status_text: String = row.get("status")?;
    let status = LabStatus::from_code(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid lab status `{status_text}` in subject_labs.status"
        ))
    })?;

    let lab = Lab {
        id: row.get("id")?,
        subject_id: row.get("subject_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        comment: row.get("comment")?,
        status,
    };
    lab.validate()?;
    Ok(lab)
}

fn map_missing_subject(err: rusqlite::Error, subject_id: SubjectId) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        if failure.code == ErrorCode::ConstraintViolation
            && failure.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY
        {
            return RepoError::SubjectNotFound(subject_id);
        }
    }
    err.into()
}
