use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use cvmatch_core::{
    Collection, FetchRequest, ItemId, JobDraft, MatchLookup, SelectedFile, TaskId, UploadTarget,
};
use cvmatch_logging::{cvm_debug, cvm_info};
use tokio_util::sync::CancellationToken;

use crate::client::{ApiClient, ChannelProgressSink, ClientSettings, ProgressSink, ReqwestApiClient};
use crate::upload::UploadOrchestrator;
use crate::{ApiError, EngineEvent};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to build the async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build the http client: {0}")]
    Client(#[from] ApiError),
    #[error("failed to start the engine thread: {0}")]
    Thread(String),
}

#[derive(Debug)]
enum EngineCommand {
    FetchPage {
        collection: Collection,
        request: FetchRequest,
    },
    FetchLookup(MatchLookup),
    FetchCandidate(ItemId),
    CreateJob(JobDraft),
    FetchStatistics,
    Delete {
        collection: Collection,
        id: ItemId,
    },
    RunUploads {
        target: UploadTarget,
        files: Vec<(TaskId, SelectedFile)>,
    },
    CancelUploads(UploadTarget),
}

/// Owns a background thread with a tokio runtime; commands go in, events come out.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, EngineError> {
        let client = ReqwestApiClient::new(settings)?;
        Self::with_client(Arc::new(client))
    }

    pub fn with_client(client: Arc<dyn ApiClient>) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;

        thread::Builder::new()
            .name("cvmatch-engine".to_string())
            .spawn(move || run_loop(runtime, client, cmd_rx, event_tx))
            .map_err(|err| EngineError::Thread(err.to_string()))?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn fetch_page(&self, collection: Collection, request: FetchRequest) {
        self.send(EngineCommand::FetchPage {
            collection,
            request,
        });
    }

    pub fn fetch_lookup(&self, lookup: MatchLookup) {
        self.send(EngineCommand::FetchLookup(lookup));
    }

    pub fn fetch_candidate(&self, id: ItemId) {
        self.send(EngineCommand::FetchCandidate(id));
    }

    pub fn create_job(&self, draft: JobDraft) {
        self.send(EngineCommand::CreateJob(draft));
    }

    pub fn fetch_statistics(&self) {
        self.send(EngineCommand::FetchStatistics);
    }

    pub fn delete(&self, collection: Collection, id: ItemId) {
        self.send(EngineCommand::Delete { collection, id });
    }

    pub fn run_uploads(&self, target: UploadTarget, files: Vec<(TaskId, SelectedFile)>) {
        self.send(EngineCommand::RunUploads { target, files });
    }

    /// Running uploads of `target` end as `Failed("cancelled")`.
    pub fn cancel_uploads(&self, target: UploadTarget) {
        self.send(EngineCommand::CancelUploads(target));
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            cvm_debug!("Engine thread is gone; command dropped");
        }
    }
}

fn run_loop(
    runtime: tokio::runtime::Runtime,
    client: Arc<dyn ApiClient>,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let mut batches: HashMap<UploadTarget, CancellationToken> = HashMap::new();
    while let Ok(command) = cmd_rx.recv() {
        match command {
            EngineCommand::RunUploads { target, files } => {
                let token = CancellationToken::new();
                if let Some(previous) = batches.insert(target, token.clone()) {
                    previous.cancel();
                }
                let orchestrator = UploadOrchestrator::new(Arc::clone(&client));
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    let sink: Arc<dyn ProgressSink> =
                        Arc::new(ChannelProgressSink::new(event_tx.clone()));
                    let summary = orchestrator.run_batch(target, files, sink, token).await;
                    let _ = event_tx.send(EngineEvent::BatchFinished { target, summary });
                });
            }
            EngineCommand::CancelUploads(target) => {
                if let Some(token) = batches.remove(&target) {
                    cvm_info!("Cancelling uploads to {:?}", target);
                    token.cancel();
                }
            }
            command => {
                let client = Arc::clone(&client);
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    let event = handle_request(client.as_ref(), command).await;
                    if let Some(event) = event {
                        let _ = event_tx.send(event);
                    }
                });
            }
        }
    }
    cvm_debug!("Engine command channel closed");
}

async fn handle_request(client: &dyn ApiClient, command: EngineCommand) -> Option<EngineEvent> {
    let event = match command {
        EngineCommand::FetchPage {
            collection,
            request,
        } => EngineEvent::PageFetched {
            collection,
            request_id: request.request_id,
            result: client.fetch_page(collection, &request.params).await,
        },
        EngineCommand::FetchLookup(lookup) => EngineEvent::LookupFetched {
            lookup,
            result: client.fetch_lookup(lookup).await,
        },
        EngineCommand::FetchCandidate(id) => EngineEvent::CandidateFetched {
            id,
            result: client.fetch_candidate(id).await,
        },
        EngineCommand::CreateJob(draft) => EngineEvent::JobCreated(client.create_job(&draft).await),
        EngineCommand::FetchStatistics => {
            EngineEvent::StatisticsFetched(client.fetch_statistics().await)
        }
        EngineCommand::Delete { collection, id } => EngineEvent::Deleted {
            collection,
            id,
            result: client.delete(collection, id).await,
        },
        EngineCommand::RunUploads { .. } | EngineCommand::CancelUploads(_) => return None,
    };
    Some(event)
}
