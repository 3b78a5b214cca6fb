use std::fmt;

use cvmatch_core::{
    BatchSummary, Collection, ItemId, LoadError, MatchLookup, RequestId, TaskId, UploadTarget,
};
use serde_json::Value;

/// Upload progress for one task, in percent of body bytes handed to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub target: UploadTarget,
    pub task_id: TaskId,
    pub percent: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    PageFetched {
        collection: Collection,
        request_id: RequestId,
        result: Result<Value, ApiError>,
    },
    LookupFetched {
        lookup: MatchLookup,
        result: Result<Value, ApiError>,
    },
    CandidateFetched {
        id: ItemId,
        result: Result<Value, ApiError>,
    },
    JobCreated(Result<Value, ApiError>),
    StatisticsFetched(Result<Value, ApiError>),
    Deleted {
        collection: Collection,
        id: ItemId,
        result: Result<(), ApiError>,
    },
    UploadProgress(UploadProgress),
    UploadCompleted {
        target: UploadTarget,
        task_id: TaskId,
        result: Result<(), ApiError>,
    },
    /// Every task of the batch has reached a terminal state.
    BatchFinished {
        target: UploadTarget,
        summary: BatchSummary,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Body decoding problems are format errors, 404 is its own case, everything else is transport.
    pub fn into_load_error(self) -> LoadError {
        match self.kind {
            FailureKind::Decode => LoadError::Format(self.message),
            FailureKind::HttpStatus(404) => LoadError::NotFound(self.to_string()),
            _ => LoadError::Transport(self.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Cancelled,
    Decode,
    ProcessingError,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::Decode => write!(f, "invalid response body"),
            FailureKind::ProcessingError => write!(f, "processing error"),
        }
    }
}
