//! CV matcher engine: REST client, concurrent uploads, CSV export and effect execution.
mod client;
mod engine;
mod export;
mod persist;
mod types;
mod upload;

pub use client::{ApiClient, ChannelProgressSink, ClientSettings, ProgressSink, ReqwestApiClient};
pub use engine::{EngineError, EngineHandle};
pub use export::{
    encode_matches_csv, export_matches, ExportError, ExportSummary, EXPORT_FILENAME,
    EXPORT_HEADERS,
};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use types::{ApiError, EngineEvent, FailureKind, UploadProgress};
pub use upload::UploadOrchestrator;
