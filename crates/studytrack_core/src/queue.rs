//! Per-subject single-writer queue for lab mutations.
//!
//! # Responsibility
//! - Run lab persistence off the caller's thread on one blocking worker.
//! - Apply mutations strictly in submission order.
//! - Publish revisioned list snapshots after every applied mutation.
//!
//! # Invariants
//! - One worker owns the connection; there is no other writer for the subject.
//! - Snapshot revisions increase by one per applied mutation.
//! - Dropping a `PendingWrite` never cancels the write.
//! - Rejected (blank title) mutations publish nothing.

use crate::model::lab::{Lab, LabInput};
use crate::model::subject::SubjectId;
use crate::repo::lab_repo::SqliteLabRepository;
use crate::repo::subject_repo::SqliteSubjectRepository;
use crate::repo::RepoError;
use crate::service::lab_service::{LabMutation, LabRecordsManager};
use log::{info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

/// Errors surfaced by the write queue.
#[derive(Debug)]
pub enum QueueError {
    /// The worker has stopped and accepts no more commands.
    Closed,
    /// The lab belongs to another subject than the queue.
    SubjectMismatch {
        expected: SubjectId,
        found: SubjectId,
    },
    /// The worker panicked while processing.
    WorkerPanicked,
    Repo(RepoError),
}

impl Display for QueueError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "lab write queue is closed"),
            Self::SubjectMismatch { expected, found } => write!(
                f,
                "lab belongs to subject {found}, queue serves subject {expected}"
            ),
            Self::WorkerPanicked => write!(f, "lab write worker panicked"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for QueueError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for QueueError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// A subject's lab list as of one revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabsSnapshot {
    pub revision: u64,
    pub labs: Vec<Lab>,
}

enum LabCommand {
    Add(LabInput),
    Update { existing: Lab, input: LabInput },
    Delete(Lab),
    Refresh,
}

struct Envelope {
    command: LabCommand,
    reply: oneshot::Sender<Result<LabMutation, QueueError>>,
}

/// Completion handle of a submitted command.
///
/// Await `outcome()` to observe the result or drop it to fire and forget.
pub struct PendingWrite {
    reply: oneshot::Receiver<Result<LabMutation, QueueError>>,
}

impl PendingWrite {
    pub async fn outcome(self) -> Result<LabMutation, QueueError> {
        self.reply.await.map_err(|_| QueueError::Closed)?
    }
}

/// Handle to the single writer of one subject.
pub struct LabWriteQueue {
    subject_id: SubjectId,
    commands: mpsc::UnboundedSender<Envelope>,
    snapshots: watch::Receiver<LabsSnapshot>,
    worker: JoinHandle<()>,
}

impl LabWriteQueue {
    /// Starts the worker for `subject_id` on the current tokio runtime.
    ///
    /// The connection must already be bootstrapped (see `db::open_db`).
    /// The worker loads the initial snapshot (revision 0) before this
    /// resolves; the calling task only awaits it.
    ///
    /// # Panics
    /// - When called outside a tokio runtime.
    pub async fn spawn(conn: Connection, subject_id: SubjectId) -> Result<Self, QueueError> {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();

        let worker = tokio::task::spawn_blocking(move || {
            run_worker(conn, subject_id, command_rx, ready_tx);
        });

        let snapshots = match ready_rx.await {
            Ok(Ok(snapshots)) => snapshots,
            Ok(Err(err)) => {
                warn!("event=lab_queue_start module=queue status=error subject_id={subject_id} error={err}");
                return Err(err.into());
            }
            Err(_) => {
                return Err(worker
                    .await
                    .map_or(QueueError::WorkerPanicked, |()| QueueError::Closed));
            }
        };
        info!("event=lab_queue_start module=queue status=ok subject_id={subject_id}");

        Ok(Self {
            subject_id,
            commands,
            snapshots,
            worker,
        })
    }

    pub fn subject_id(&self) -> SubjectId {
        self.subject_id
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> LabsSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<LabsSnapshot> {
        self.snapshots.clone()
    }

    pub fn add(&self, input: LabInput) -> Result<PendingWrite, QueueError> {
        self.submit(LabCommand::Add(input))
    }

    pub fn update(&self, existing: Lab, input: LabInput) -> Result<PendingWrite, QueueError> {
        self.ensure_subject(&existing)?;
        self.submit(LabCommand::Update { existing, input })
    }

    pub fn delete(&self, lab: Lab) -> Result<PendingWrite, QueueError> {
        self.ensure_subject(&lab)?;
        self.submit(LabCommand::Delete(lab))
    }

    /// Reloads the list from storage and publishes it as a new revision.
    pub fn refresh(&self) -> Result<PendingWrite, QueueError> {
        self.submit(LabCommand::Refresh)
    }

    /// Stops accepting commands and waits until queued ones are applied.
    pub async fn shutdown(self) -> Result<(), QueueError> {
        let Self {
            subject_id,
            commands,
            worker,
            ..
        } = self;
        drop(commands);
        worker.await.map_err(|_| QueueError::WorkerPanicked)?;
        info!("event=lab_queue_stop module=queue status=ok subject_id={subject_id}");
        Ok(())
    }

    fn ensure_subject(&self, lab: &Lab) -> Result<(), QueueError> {
        if lab.subject_id != self.subject_id {
            return Err(QueueError::SubjectMismatch {
                expected: self.subject_id,
                found: lab.subject_id,
            });
        }
        Ok(())
    }

    fn submit(&self, command: LabCommand) -> Result<PendingWrite, QueueError> {
        let (reply, reply_rx) = oneshot::channel();
        self.commands
            .send(Envelope { command, reply })
            .map_err(|_| QueueError::Closed)?;
        Ok(PendingWrite { reply: reply_rx })
    }
}

fn run_worker(
    conn: Connection,
    subject_id: SubjectId,
    mut commands: mpsc::UnboundedReceiver<Envelope>,
    ready: oneshot::Sender<Result<watch::Receiver<LabsSnapshot>, RepoError>>,
) {
    let manager = LabRecordsManager::new(
        SqliteLabRepository::new(&conn),
        SqliteSubjectRepository::new(&conn),
    );
    let initial = match manager.list_labs(subject_id) {
        Ok(labs) => labs,
        Err(err) => {
            let _ = ready.send(Err(err));
            return;
        }
    };
    let (snapshots, snapshot_rx) = watch::channel(LabsSnapshot {
        revision: 0,
        labs: initial,
    });
    if ready.send(Ok(snapshot_rx)).is_err() {
        return;
    }
    let mut revision = 0_u64;

    while let Some(Envelope { command, reply }) = commands.blocking_recv() {
        let result = execute(&manager, subject_id, command).map_err(QueueError::from);
        match &result {
            Ok(LabMutation::Applied { labs }) => {
                revision += 1;
                snapshots.send_replace(LabsSnapshot {
                    revision,
                    labs: labs.clone(),
                });
            }
            Ok(LabMutation::Rejected) => {}
            Err(err) => warn!(
                "event=lab_queue_write module=queue status=error subject_id={subject_id} error={err}"
            ),
        }
        // The submitter may have dropped its handle; the write stands either way.
        let _ = reply.send(result);
    }
}

fn execute(
    manager: &LabRecordsManager<SqliteLabRepository<'_>, SqliteSubjectRepository<'_>>,
    subject_id: SubjectId,
    command: LabCommand,
) -> Result<LabMutation, RepoError> {
    match command {
        LabCommand::Add(input) => manager.add_lab(subject_id, &input),
        LabCommand::Update { existing, input } => manager.update_lab(&existing, &input),
        LabCommand::Delete(lab) => manager.delete_lab(&lab),
        LabCommand::Refresh => Ok(LabMutation::Applied {
            labs: manager.list_labs(subject_id)?,
        }),
    }
}
