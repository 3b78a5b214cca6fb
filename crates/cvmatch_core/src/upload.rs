use bytes::Bytes;
use cvmatch_logging::{cvm_debug, cvm_warn};

use crate::Collection;

/// Index of a task within its batch.
pub type TaskId = usize;

/// Progress value reported for failed tasks; never a valid percent.
pub const FAILED_PROGRESS: i16 = -1;

/// Word documents, the only type the backend can extract text from.
pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Where a batch of files is posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UploadTarget {
    Cvs,
    Jobs,
}

impl UploadTarget {
    pub fn collection(self) -> Collection {
        match self {
            UploadTarget::Cvs => Collection::Candidates,
            UploadTarget::Jobs => Collection::Jobs,
        }
    }
}

/// A file picked by the user, with its declared MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub contents: Bytes,
    /// Extra form fields sent next to the file, such as a display name.
    pub fields: Vec<(String, String)>,
}

impl SelectedFile {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        contents: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            contents: contents.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Compares the declared type against `allowed`, ignoring parameters and case.
    pub fn has_type_in(&self, allowed: &[String]) -> bool {
        let declared = self
            .mime_type
            .split(';')
            .next()
            .unwrap_or(&self.mime_type)
            .trim();
        allowed
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(declared))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    Pending,
    InProgress(u8),
    Succeeded,
    Failed(String),
}

impl UploadState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadState::Succeeded | UploadState::Failed(_))
    }

    /// `None` while pending, 0..=100 while running or done, [`FAILED_PROGRESS`] on failure.
    pub fn progress(&self) -> Option<i16> {
        match self {
            UploadState::Pending => None,
            UploadState::InProgress(percent) => Some(i16::from(*percent)),
            UploadState::Succeeded => Some(100),
            UploadState::Failed(_) => Some(FAILED_PROGRESS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    id: TaskId,
    file: SelectedFile,
    state: UploadState,
}

impl UploadTask {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn file(&self) -> &SelectedFile {
        &self.file
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    /// Progress only moves forward and never past 100.
    fn record_progress(&mut self, percent: u8) -> bool {
        let percent = percent.min(100);
        match self.state {
            UploadState::InProgress(current) if percent > current => {
                self.state = UploadState::InProgress(percent);
                true
            }
            _ => false,
        }
    }

    fn finish(&mut self, outcome: Result<(), String>) -> bool {
        if !matches!(self.state, UploadState::InProgress(_)) {
            return false;
        }
        self.state = match outcome {
            Ok(()) => UploadState::Succeeded,
            Err(reason) => UploadState::Failed(reason),
        };
        true
    }
}

/// Fan-in result of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    /// True when any task failed, even if others succeeded.
    pub fn has_errors(&self) -> bool {
        self.failed > 0
    }

    pub fn message(&self) -> String {
        format!(
            "Upload complete. {} successful, {} failed.",
            self.succeeded, self.failed
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPhase {
    #[default]
    Idle,
    Running {
        pending: usize,
    },
    Completed(BatchSummary),
}

/// Counts from the type filter applied to a new selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub admitted: usize,
    pub ignored: usize,
}

impl Selection {
    /// User-facing summary, if the filter dropped anything.
    pub fn message(&self) -> Option<(String, bool)> {
        if self.admitted == 0 && self.ignored > 0 {
            Some(("No valid files selected.".to_string(), true))
        } else if self.ignored > 0 {
            Some((
                format!(
                    "Selected {} valid file(s). {} file(s) were ignored.",
                    self.admitted, self.ignored
                ),
                false,
            ))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UploadRejection {
    #[error("An upload is already running.")]
    Busy,
    #[error("Please select valid files first.")]
    NothingSelected,
}

/// Files submitted together and the state of each upload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadBatch {
    tasks: Vec<UploadTask>,
    phase: BatchPhase,
    ignored: usize,
}

impl UploadBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[UploadTask] {
        &self.tasks
    }

    pub fn phase(&self) -> BatchPhase {
        self.phase
    }

    pub fn ignored(&self) -> usize {
        self.ignored
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, BatchPhase::Running { .. })
    }

    /// Replaces the selection with the files whose type is allowed.
    pub fn select(
        &mut self,
        files: Vec<SelectedFile>,
        allowed_types: &[String],
    ) -> Result<Selection, UploadRejection> {
        if self.is_running() {
            return Err(UploadRejection::Busy);
        }
        self.tasks.clear();
        self.phase = BatchPhase::Idle;
        self.ignored = 0;

        for file in files {
            if file.has_type_in(allowed_types) {
                let id = self.tasks.len();
                self.tasks.push(UploadTask {
                    id,
                    file,
                    state: UploadState::Pending,
                });
            } else {
                cvm_warn!(
                    "Skipping file with disallowed type: {} ({})",
                    file.name,
                    file.mime_type
                );
                self.ignored += 1;
            }
        }

        Ok(Selection {
            admitted: self.tasks.len(),
            ignored: self.ignored,
        })
    }

    /// Moves every pending task to `InProgress(0)` and hands out the work.
    pub fn start(&mut self) -> Result<Vec<(TaskId, SelectedFile)>, UploadRejection> {
        if self.is_running() {
            return Err(UploadRejection::Busy);
        }
        let mut work = Vec::new();
        for task in self
            .tasks
            .iter_mut()
            .filter(|task| task.state == UploadState::Pending)
        {
            task.state = UploadState::InProgress(0);
            work.push((task.id, task.file.clone()));
        }
        if work.is_empty() {
            return Err(UploadRejection::NothingSelected);
        }
        self.phase = BatchPhase::Running {
            pending: work.len(),
        };
        Ok(work)
    }

    pub fn record_progress(&mut self, task_id: TaskId, percent: u8) -> bool {
        match self.tasks.get_mut(task_id) {
            Some(task) => task.record_progress(percent),
            None => false,
        }
    }

    /// Marks a task terminal; returns the summary once the last one lands.
    pub fn record_done(
        &mut self,
        task_id: TaskId,
        outcome: Result<(), String>,
    ) -> Option<BatchSummary> {
        let BatchPhase::Running { pending } = self.phase else {
            cvm_debug!("Ignoring completion for task {} outside a running batch", task_id);
            return None;
        };
        let finished = self
            .tasks
            .get_mut(task_id)
            .is_some_and(|task| task.finish(outcome));
        if !finished {
            return None;
        }

        let pending = pending.saturating_sub(1);
        if pending > 0 {
            self.phase = BatchPhase::Running { pending };
            return None;
        }

        let summary = self.summarize();
        self.phase = BatchPhase::Completed(summary);
        Some(summary)
    }

    fn summarize(&self) -> BatchSummary {
        self.tasks
            .iter()
            .fold(BatchSummary::default(), |mut summary, task| {
                match task.state {
                    UploadState::Succeeded => summary.succeeded += 1,
                    UploadState::Failed(_) => summary.failed += 1,
                    UploadState::Pending | UploadState::InProgress(_) => {}
                }
                summary
            })
    }
}
