//! Presentation state for the subject labs screen.
//!
//! # Responsibility
//! - Hold dialog visibility, form text and the selected lab explicitly.
//! - Drive `LabRecordsManager` and adopt the lists it reloads.
//!
//! # Invariants
//! - `labs` only ever changes to a list returned by the manager.
//! - A rejected submit keeps its dialog open with the entered text.
//! - Delete only happens through `confirm_delete` of a pending lab.

use crate::model::lab::{Lab, LabInput};
use crate::model::subject::{Subject, SubjectId};
use crate::repo::lab_repo::LabRepository;
use crate::repo::subject_repo::SubjectRepository;
use crate::repo::RepoResult;
use crate::service::lab_service::{LabMutation, LabRecordsManager};

/// An open edit dialog and the lab it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub lab: Lab,
    pub form: LabInput,
}

/// View state owned by the UI for one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabsViewState {
    pub subject_id: SubjectId,
    pub subject: Option<Subject>,
    pub labs: Vec<Lab>,
    pub add_dialog: Option<LabInput>,
    pub edit_dialog: Option<EditSession>,
    pub pending_delete: Option<Lab>,
}

impl LabsViewState {
    /// Empty state for `subject_id`, before anything is loaded.
    pub fn new(subject_id: SubjectId) -> Self {
        Self {
            subject_id,
            subject: None,
            labs: Vec::new(),
            add_dialog: None,
            edit_dialog: None,
            pending_delete: None,
        }
    }

    /// Builds the initial state by fetching the subject and its labs.
    pub fn load<L, S>(manager: &LabRecordsManager<L, S>, subject_id: SubjectId) -> RepoResult<Self>
    where
        L: LabRepository,
        S: SubjectRepository,
    {
        let mut state = Self::new(subject_id);
        state.subject = manager.load_subject(subject_id)?;
        state.labs = manager.list_labs(subject_id)?;
        Ok(state)
    }

    pub fn open_add_dialog(&mut self) {
        self.add_dialog = Some(LabInput::default());
    }

    pub fn cancel_add(&mut self) {
        self.add_dialog = None;
    }

    /// Submits the add form. Returns whether a lab was created.
    ///
    /// Without an open add dialog this does nothing.
    pub fn submit_add<L, S>(&mut self, manager: &LabRecordsManager<L, S>) -> RepoResult<bool>
    where
        L: LabRepository,
        S: SubjectRepository,
    {
        let Some(form) = self.add_dialog.as_ref() else {
            return Ok(false);
        };

        let outcome = manager.add_lab(self.subject_id, form)?;
        if self.adopt(outcome) {
            self.add_dialog = None;
            return Ok(true);
        }
        Ok(false)
    }

    /// Opens the edit dialog pre-filled from `lab`.
    pub fn begin_edit(&mut self, lab: &Lab) {
        self.edit_dialog = Some(EditSession {
            lab: lab.clone(),
            form: LabInput::from_lab(lab),
        });
    }

    pub fn cancel_edit(&mut self) {
        self.edit_dialog = None;
    }

    /// Submits the edit form. Returns whether the lab was updated.
    pub fn submit_edit<L, S>(&mut self, manager: &LabRecordsManager<L, S>) -> RepoResult<bool>
    where
        L: LabRepository,
        S: SubjectRepository,
    {
        let Some(session) = self.edit_dialog.as_ref() else {
            return Ok(false);
        };

        let outcome = manager.update_lab(&session.lab, &session.form)?;
        if self.adopt(outcome) {
            self.edit_dialog = None;
            return Ok(true);
        }
        Ok(false)
    }

    /// Marks `lab` for deletion; the UI asks for confirmation next.
    pub fn request_delete(&mut self, lab: &Lab) {
        self.pending_delete = Some(lab.clone());
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Deletes the pending lab. Returns `false` when nothing was pending.
    pub fn confirm_delete<L, S>(&mut self, manager: &LabRecordsManager<L, S>) -> RepoResult<bool>
    where
        L: LabRepository,
        S: SubjectRepository,
    {
        let Some(lab) = self.pending_delete.as_ref() else {
            return Ok(false);
        };

        let outcome = manager.delete_lab(lab)?;
        self.pending_delete = None;
        Ok(self.adopt(outcome))
    }

    /// Replaces `labs` with a reloaded list; returns whether it applied.
    fn adopt(&mut self, outcome: LabMutation) -> bool {
        match outcome.into_labs() {
            Some(labs) => {
                self.labs = labs;
                true
            }
            None => false,
        }
    }
}
