use serde_json::Value;

use crate::{
    Collection, ItemId, JobDraft, LoadError, MatchLookup, Preferences, RequestId, SelectedFile,
    TaskId, UploadTarget,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// A list view was opened or asked to reload its current page.
    ListOpened { collection: Collection },
    /// User picked a page number.
    PageRequested { collection: Collection, page: u32 },
    /// User clicked a sortable column header.
    SortRequested {
        collection: Collection,
        field: String,
    },
    /// User submitted the search box.
    SearchSubmitted {
        collection: Collection,
        term: String,
    },
    /// Engine answered a page fetch.
    PageLoaded {
        collection: Collection,
        request_id: RequestId,
        result: Result<Value, LoadError>,
    },
    /// User confirmed deletion of a record.
    DeleteRequested { collection: Collection, id: ItemId },
    /// Engine finished a delete.
    DeleteDone {
        collection: Collection,
        id: ItemId,
        result: Result<(), String>,
    },
    /// User picked files in the upload dialog; replaces any earlier selection.
    FilesSelected {
        target: UploadTarget,
        files: Vec<SelectedFile>,
    },
    /// User clicked Upload.
    UploadClicked { target: UploadTarget },
    /// Engine progress for one upload.
    UploadProgress {
        target: UploadTarget,
        task_id: TaskId,
        percent: u8,
    },
    /// User abandoned the running batch.
    UploadCancelRequested { target: UploadTarget },
    /// Engine completion for one upload.
    UploadDone {
        target: UploadTarget,
        task_id: TaskId,
        result: Result<(), String>,
    },
    /// User asked the backend to score one side of a pairing.
    MatchLookupRequested(MatchLookup),
    /// Engine answered a match lookup.
    MatchLookupLoaded {
        lookup: MatchLookup,
        result: Result<Value, LoadError>,
    },
    /// User opened the detail page of one candidate.
    CandidateDetailRequested(ItemId),
    CandidateDetailLoaded {
        id: ItemId,
        result: Result<Value, LoadError>,
    },
    /// User submitted the new-job form.
    JobCreateRequested(JobDraft),
    /// Engine answered the job creation; carries the stored job.
    JobCreated(Result<Value, LoadError>),
    /// Dashboard opened.
    StatisticsRequested,
    /// Engine answered the statistics call.
    StatisticsLoaded(Result<Value, LoadError>),
    /// User clicked Export on the match list.
    ExportClicked,
    /// Engine finished writing the export; carries the written path.
    ExportDone(Result<String, String>),
    /// User changed theme or layout.
    PreferencesChanged(Preferences),
}
