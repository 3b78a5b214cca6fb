use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use cvmatch_core::{BatchSummary, SelectedFile, TaskId, UploadTarget};
use cvmatch_logging::{cvm_debug, cvm_info, cvm_warn};
use futures_util::FutureExt;
use tokio::task::{self, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::client::{ApiClient, ProgressSink};
use crate::{ApiError, EngineEvent, FailureKind};

/// Runs every file of a batch concurrently and waits for all of them.
pub struct UploadOrchestrator {
    client: Arc<dyn ApiClient>,
}

impl UploadOrchestrator {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    /// Emits one `UploadCompleted` per task, in completion order, and returns the
    /// counts once the last task is terminal.
    pub async fn run_batch(
        &self,
        target: UploadTarget,
        files: Vec<(TaskId, SelectedFile)>,
        sink: Arc<dyn ProgressSink>,
        cancel: CancellationToken,
    ) -> BatchSummary {
        cvm_info!("Starting upload batch of {} file(s) to {:?}", files.len(), target);
        let mut set = JoinSet::new();
        let mut spawned = HashMap::with_capacity(files.len());
        for (task_id, file) in files {
            let client = Arc::clone(&self.client);
            let sink = Arc::clone(&sink);
            let cancel = cancel.clone();
            let handle = set.spawn(async move {
                let upload = async {
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            Err(ApiError::new(FailureKind::Cancelled, "cancelled"))
                        }
                        result = client.upload(target, task_id, &file, sink.as_ref()) => result,
                    }
                };
                let result = match AssertUnwindSafe(upload).catch_unwind().await {
                    Ok(result) => result,
                    Err(_) => Err(ApiError::new(
                        FailureKind::ProcessingError,
                        format!("upload of {} panicked", file.name),
                    )),
                };
                (task_id, result)
            });
            spawned.insert(handle.id(), task_id);
        }

        let mut summary = BatchSummary::default();
        while let Some(joined) = set.join_next().await {
            let Some((task_id, result)) = resolve_joined(joined, &spawned) else {
                continue;
            };
            match &result {
                Ok(()) => {
                    cvm_debug!("Upload task {} succeeded", task_id);
                    summary.succeeded += 1;
                }
                Err(err) => {
                    cvm_warn!("Upload task {} failed: {}", task_id, err);
                    summary.failed += 1;
                }
            }
            sink.emit(EngineEvent::UploadCompleted {
                target,
                task_id,
                result,
            });
        }

        cvm_info!(
            "Upload batch to {:?} finished: {} succeeded, {} failed",
            target,
            summary.succeeded,
            summary.failed
        );
        summary
    }
}

type Completion = (TaskId, Result<(), ApiError>);

/// Maps a joined task back to its upload; a task that failed to join counts as failed.
fn resolve_joined(
    joined: Result<Completion, JoinError>,
    spawned: &HashMap<task::Id, TaskId>,
) -> Option<Completion> {
    match joined {
        Ok(done) => Some(done),
        Err(err) => match spawned.get(&err.id()) {
            Some(&task_id) => Some((
                task_id,
                Err(ApiError::new(FailureKind::ProcessingError, err.to_string())),
            )),
            None => {
                cvm_warn!("Unknown upload task did not complete: {}", err);
                None
            }
        },
    }
}
