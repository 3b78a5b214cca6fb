//! CV matcher core: pure state machine, list sessions, upload batches and score statistics.
mod aggregate;
mod config;
mod effect;
mod items;
mod list;
mod msg;
mod page;
mod query;
mod state;
mod update;
mod upload;
mod view_model;

pub use aggregate::{
    aggregate_by, aggregate_for_candidate, aggregate_for_job, format_score, AggregateStats,
    BandCounts, ScoreBand, HIGH_SCORE_THRESHOLD, MEDIUM_SCORE_THRESHOLD,
};
pub use config::{KeyValueStore, MemoryStore, Preferences, SessionConfig, Theme, ViewMode};
pub use effect::Effect;
pub use items::{
    Activity, Candidate, CandidateDetail, CandidateRef, Collection, DraftError, ItemId, Job,
    JobDraft, JobRef, ListItem, MatchLookup, MatchResult, Statistics, SKILL_WEIGHT_RANGE,
};
pub use list::{ApplyOutcome, FetchRequest, ListSession, RequestId};
pub use msg::Msg;
pub use page::{
    decode_list_or_single, navigable_pages, total_pages_for, LoadError, PageResult, Paged,
};
pub use query::{FetchParams, QueryState, SortDirection};
pub use state::{AppState, LookupResults, Notice};
pub use update::update;
pub use upload::{
    BatchPhase, BatchSummary, SelectedFile, Selection, TaskId, UploadBatch, UploadRejection,
    UploadState, UploadTarget, UploadTask, DOCX_MIME_TYPE, FAILED_PROGRESS,
};
pub use view_model::{
    AppViewModel, ListView, LookupView, UploadRowView, UploadView, PAGER_WINDOW,
};
