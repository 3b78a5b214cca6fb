use crate::{
    Collection, FetchRequest, ItemId, JobDraft, MatchLookup, MatchResult, Preferences,
    SelectedFile, TaskId, UploadTarget,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchPage {
        collection: Collection,
        request: FetchRequest,
    },
    Delete {
        collection: Collection,
        id: ItemId,
    },
    /// Start every upload of a batch concurrently; each reports back on its own.
    RunUploads {
        target: UploadTarget,
        files: Vec<(TaskId, SelectedFile)>,
    },
    /// Ends the running uploads of `target` as failed.
    CancelUploads(UploadTarget),
    FetchMatchLookup(MatchLookup),
    FetchCandidateDetail(ItemId),
    CreateJob(JobDraft),
    FetchStatistics,
    ExportMatches { items: Vec<MatchResult> },
    SavePreferences(Preferences),
}
