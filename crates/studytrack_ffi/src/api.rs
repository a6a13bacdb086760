//! FFI use-case API for the subject labs screen.
//!
//! # Responsibility
//! - Expose lab list/add/update/delete to Dart via FRB.
//! - Map core results into flat envelopes the UI can render directly.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - A blank-title submit returns `ok=true, applied=false` with no message.
//! - Status values cross the boundary as `NOT_STARTED|IN_PROGRESS|COMPLETED`.

use log::warn;
use studytrack_core::db::open_db;
use studytrack_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CoreConfig, Lab, LabInput, LabMutation, LabRecordsManager, LabRepository, LabStatus,
    SqliteLabRepository, SqliteSubjectRepository, SubjectRepository,
};
use std::path::PathBuf;
use std::sync::OnceLock;

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Lab row as rendered by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabItem {
    pub id: i64,
    pub subject_id: i64,
    pub title: String,
    pub description: String,
    pub comment: String,
    /// Storage code, e.g. `IN_PROGRESS`.
    pub status: String,
    /// Display label, e.g. `In Progress`.
    pub status_label: String,
}

/// Response for list and mutation calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabActionResponse {
    /// `false` only when the call failed.
    pub ok: bool,
    /// Whether storage changed. `ok && !applied` is a silent reject.
    pub applied: bool,
    /// Current list for the subject; empty on failure or reject.
    pub labs: Vec<LabItem>,
    /// Diagnostic message on failure, empty otherwise.
    pub message: String,
}

impl LabActionResponse {
    fn from_mutation(mutation: LabMutation) -> Self {
        match mutation {
            LabMutation::Applied { labs } => Self::listed(labs, true),
            LabMutation::Rejected => Self {
                ok: true,
                applied: false,
                labs: Vec::new(),
                message: String::new(),
            },
        }
    }

    fn listed(labs: Vec<Lab>, applied: bool) -> Self {
        Self {
            ok: true,
            applied,
            labs: labs.into_iter().map(to_lab_item).collect(),
            message: String::new(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            applied: false,
            labs: Vec::new(),
            message: message.into(),
        }
    }
}

/// Response for subject creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectResponse {
    pub ok: bool,
    pub subject_id: Option<i64>,
    pub message: String,
}

/// Creates a subject so labs can be attached to it.
#[flutter_rust_bridge::frb(sync)]
pub fn subject_create(title: String) -> SubjectResponse {
    let result = with_manager_conn(|conn| {
        SqliteSubjectRepository::new(conn)
            .create_subject(&title)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(subject) => SubjectResponse {
            ok: true,
            subject_id: Some(subject.id),
            message: String::new(),
        },
        Err(err) => SubjectResponse {
            ok: false,
            subject_id: None,
            message: format!("subject_create failed: {err}"),
        },
    }
}

/// Lists labs of `subject_id` in insertion order.
#[flutter_rust_bridge::frb(sync)]
pub fn labs_list(subject_id: i64) -> LabActionResponse {
    let result = with_manager(|manager| {
        manager
            .list_labs(subject_id)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(labs) => LabActionResponse::listed(labs, false),
        Err(err) => LabActionResponse::failure(format!("labs_list failed: {err}")),
    }
}

/// Adds a lab; `status=None` means `NOT_STARTED`.
#[flutter_rust_bridge::frb(sync)]
pub fn lab_add(
    subject_id: i64,
    title: String,
    description: String,
    comment: String,
    status: Option<String>,
) -> LabActionResponse {
    let status = match parse_status(status) {
        Ok(status) => status,
        Err(err) => return LabActionResponse::failure(format!("lab_add failed: {err}")),
    };
    let input = LabInput::new(title)
        .description(description)
        .comment(comment)
        .status(status);

    respond("lab_add", with_manager(|manager| {
        manager
            .add_lab(subject_id, &input)
            .map_err(|err| err.to_string())
    }))
}

/// Replaces title/description/comment/status of lab `lab_id`.
///
/// `status` is mandatory: a blank code fails instead of resetting the lab.
#[flutter_rust_bridge::frb(sync)]
pub fn lab_update(
    lab_id: i64,
    title: String,
    description: String,
    comment: String,
    status: String,
) -> LabActionResponse {
    let status = match parse_required_status(&status) {
        Ok(status) => status,
        Err(err) => return LabActionResponse::failure(format!("lab_update failed: {err}")),
    };
    let input = LabInput::new(title)
        .description(description)
        .comment(comment)
        .status(status);

    respond("lab_update", with_manager_conn(|conn| {
        let existing = SqliteLabRepository::new(conn)
            .get_lab(lab_id)
            .map_err(|err| err.to_string())?
            .ok_or_else(|| format!("lab not found: {lab_id}"))?;
        manager_for(conn)
            .update_lab(&existing, &input)
            .map_err(|err| err.to_string())
    }))
}

/// Deletes lab `lab_id`; confirmation happens in the UI before this call.
///
/// An unknown id fails with `ok=false`: without the lab there is no subject
/// whose list could be returned.
#[flutter_rust_bridge::frb(sync)]
pub fn lab_delete(lab_id: i64) -> LabActionResponse {
    respond("lab_delete", with_manager_conn(|conn| {
        let existing = SqliteLabRepository::new(conn)
            .get_lab(lab_id)
            .map_err(|err| err.to_string())?
            .ok_or_else(|| format!("lab not found: {lab_id}"))?;
        manager_for(conn)
            .delete_lab(&existing)
            .map_err(|err| err.to_string())
    }))
}

fn respond(operation: &str, result: Result<LabMutation, String>) -> LabActionResponse {
    match result {
        Ok(mutation) => LabActionResponse::from_mutation(mutation),
        Err(err) => {
            warn!("event={operation} module=ffi status=error error={err}");
            LabActionResponse::failure(format!("{operation} failed: {err}"))
        }
    }
}

// Add only: an absent or blank code means the default status.
fn parse_status(status: Option<String>) -> Result<LabStatus, String> {
    match status {
        Some(code) if !code.trim().is_empty() => parse_required_status(&code),
        _ => Ok(LabStatus::default()),
    }
}

fn parse_required_status(code: &str) -> Result<LabStatus, String> {
    code.parse::<LabStatus>().map_err(|err| err.to_string())
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| CoreConfig::from_env().db_path)
        .clone()
}

type Manager<'conn> =
    LabRecordsManager<SqliteLabRepository<'conn>, SqliteSubjectRepository<'conn>>;

fn manager_for(conn: &rusqlite::Connection) -> Manager<'_> {
    LabRecordsManager::new(
        SqliteLabRepository::new(conn),
        SqliteSubjectRepository::new(conn),
    )
}

fn with_manager_conn<T>(
    f: impl FnOnce(&rusqlite::Connection) -> Result<T, String>,
) -> Result<T, String> {
    let conn =
        open_db(resolve_db_path()).map_err(|err| format!("study DB open failed: {err}"))?;
    f(&conn)
}

fn with_manager<T>(f: impl FnOnce(&Manager<'_>) -> Result<T, String>) -> Result<T, String> {
    with_manager_conn(|conn| f(&manager_for(conn)))
}

fn to_lab_item(lab: Lab) -> LabItem {
    LabItem {
        id: lab.id,
        subject_id: lab.subject_id,
        status: lab.status.code().to_string(),
        status_label: lab.status.label().to_string(),
        title: lab.title,
        description: lab.description,
        comment: lab.comment,
    }
}
