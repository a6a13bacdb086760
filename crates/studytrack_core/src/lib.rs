//! Core domain logic for StudyTrack.
//! Subjects, their lab tasks and the rules that guard them live here.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod queue;
pub mod repo;
pub mod service;

pub use config::CoreConfig;
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::lab::{Lab, LabId, LabInput, LabStatus, LabValidationError, UnknownLabStatus};
pub use model::subject::{Subject, SubjectId, SubjectValidationError};
pub use queue::{LabWriteQueue, LabsSnapshot, PendingWrite, QueueError};
pub use repo::lab_repo::{LabRepository, SqliteLabRepository};
pub use repo::subject_repo::{SqliteSubjectRepository, SubjectRepository};
pub use repo::{RepoError, RepoResult};
pub use service::lab_service::{LabMutation, LabRecordsManager};
pub use service::labs_view::{EditSession, LabsViewState};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
