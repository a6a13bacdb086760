//! Subject repository contract and SQLite implementation.

use crate::model::subject::{normalize_subject_title, Subject, SubjectId};
use crate::repo::RepoResult;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Read access to subjects plus the creation path used by seeding callers.
pub trait SubjectRepository {
    fn create_subject(&self, title: &str) -> RepoResult<Subject>;
    fn get_subject(&self, id: SubjectId) -> RepoResult<Option<Subject>>;
    fn list_subjects(&self) -> RepoResult<Vec<Subject>>;
}

/// SQLite-backed subject repository.
pub struct SqliteSubjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSubjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SubjectRepository for SqliteSubjectRepository<'_> {
    fn create_subject(&self, title: &str) -> RepoResult<Subject> {
        let title = normalize_subject_title(title)?;
        self.conn.execute(
            "INSERT INTO subjects (title) VALUES (?1);",
            params![title.as_str()],
        )?;

        Ok(Subject {
            id: self.conn.last_insert_rowid(),
            title,
        })
    }

    fn get_subject(&self, id: SubjectId) -> RepoResult<Option<Subject>> {
        let subject = self
            .conn
            .query_row(
                "SELECT id, title FROM subjects WHERE id = ?1;",
                params![id],
                parse_subject_row,
            )
            .optional()?;
        Ok(subject)
    }

    fn list_subjects(&self) -> RepoResult<Vec<Subject>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title FROM subjects ORDER BY id ASC;")?;
        let subjects = stmt
            .query_map([], parse_subject_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(subjects)
    }
}

fn parse_subject_row(row: &Row<'_>) -> rusqlite::Result<Subject> {
    Ok(Subject {
        id: row.get("id")?,
        title: row.get("title")?,
    })
}

