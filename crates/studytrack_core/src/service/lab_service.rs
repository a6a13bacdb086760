//! Lab Records Manager.
//!
//! # Responsibility
//! - Mediate between UI intent and storage for one subject's labs.
//! - Enforce the non-empty title rule before any mutation.
//! - Reload the full list after every applied mutation.
//!
//! # Invariants
//! - A blank title is a silent reject: storage is not touched and no error
//!   is returned.
//! - Returned lists always come from storage, never from in-memory patches.
//! - Storage failures are propagated unchanged.

use crate::model::lab::{Lab, LabInput};
use crate::model::subject::{Subject, SubjectId};
use crate::repo::lab_repo::LabRepository;
use crate::repo::subject_repo::SubjectRepository;
use crate::repo::RepoResult;
use log::{debug, info};

/// Outcome of a mutating manager call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabMutation {
    /// The change was persisted; `labs` is the reloaded list of the subject.
    Applied { labs: Vec<Lab> },
    /// Blank title; nothing changed.
    Rejected,
}

impl LabMutation {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    /// Reloaded list when the mutation took effect.
    pub fn into_labs(self) -> Option<Vec<Lab>> {
        match self {
            Self::Applied { labs } => Some(labs),
            Self::Rejected => None,
        }
    }
}

/// Use-case facade over subject and lab repositories.
pub struct LabRecordsManager<L: LabRepository, S: SubjectRepository> {
    labs: L,
    subjects: S,
}

impl<L: LabRepository, S: SubjectRepository> LabRecordsManager<L, S> {
    pub fn new(labs: L, subjects: S) -> Self {
        Self { labs, subjects }
    }

    /// Fetches the subject shown in the screen header.
    pub fn load_subject(&self, subject_id: SubjectId) -> RepoResult<Option<Subject>> {
        self.subjects.get_subject(subject_id)
    }

    /// Lists a subject's labs in insertion order; empty when there are none.
    pub fn list_labs(&self, subject_id: SubjectId) -> RepoResult<Vec<Lab>> {
        self.labs.list_labs_for_subject(subject_id)
    }

    /// Adds a lab to `subject_id`.
    ///
    /// # Contract
    /// - All text fields are trimmed before persistence.
    /// - Blank title returns `LabMutation::Rejected` without a storage call.
    /// - Status is taken from `input` (`NotStarted` by default).
    pub fn add_lab(&self, subject_id: SubjectId, input: &LabInput) -> RepoResult<LabMutation> {
        let input = input.normalized();
        if input.has_blank_title() {
            debug!("event=lab_add module=service status=rejected reason=empty_title subject_id={subject_id}");
            return Ok(LabMutation::Rejected);
        }

        let lab = self.labs.insert_lab(subject_id, &input)?;
        info!(
            "event=lab_add module=service status=ok subject_id={subject_id} lab_id={} lab_status={}",
            lab.id, lab.status
        );
        self.reload(subject_id)
    }

    /// Replaces title/description/comment/status of `existing`.
    ///
    /// # Contract
    /// - `id` and `subject_id` of `existing` are kept.
    /// - Blank title returns `LabMutation::Rejected` and leaves the lab as is.
    /// - A lab that no longer exists yields `RepoError::LabNotFound`.
    pub fn update_lab(&self, existing: &Lab, input: &LabInput) -> RepoResult<LabMutation> {
        let input = input.normalized();
        if input.has_blank_title() {
            debug!(
                "event=lab_update module=service status=rejected reason=empty_title lab_id={}",
                existing.id
            );
            return Ok(LabMutation::Rejected);
        }

        let updated = existing.with_input(input);
        self.labs.replace_lab(&updated)?;
        info!(
            "event=lab_update module=service status=ok subject_id={} lab_id={} lab_status={}",
            updated.subject_id, updated.id, updated.status
        );
        self.reload(updated.subject_id)
    }

    /// Removes `lab` unconditionally; confirmation belongs to the caller.
    pub fn delete_lab(&self, lab: &Lab) -> RepoResult<LabMutation> {
        self.labs.remove_lab(lab.id)?;
        info!(
            "event=lab_delete module=service status=ok subject_id={} lab_id={}",
            lab.subject_id, lab.id
        );
        self.reload(lab.subject_id)
    }

    fn reload(&self, subject_id: SubjectId) -> RepoResult<LabMutation> {
        let labs = self.labs.list_labs_for_subject(subject_id)?;
        Ok(LabMutation::Applied { labs })
    }
}
