use crate::aggregate::AggregateStats;
use crate::list::ListSession;
use crate::query::SortDirection;
use crate::state::Notice;
use crate::upload::{BatchPhase, TaskId, UploadState};
use crate::{
    Candidate, CandidateDetail, Collection, Job, ListItem, MatchLookup, MatchResult, Preferences,
    Statistics,
};

/// Page numbers shown in the pager.
pub const PAGER_WINDOW: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct AppViewModel {
    pub candidates: ListView<Candidate>,
    pub jobs: ListView<Job>,
    pub matches: ListView<MatchResult>,
    pub cv_uploads: UploadView,
    pub job_uploads: UploadView,
    pub lookup: Option<LookupView>,
    pub candidate_detail: Option<CandidateDetail>,
    pub statistics: Option<Statistics>,
    pub preferences: Preferences,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListView<T> {
    pub collection: Collection,
    pub items: Vec<T>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub page_numbers: Vec<u32>,
    pub sort_field: String,
    pub sort_direction: SortDirection,
    pub search_term: Option<String>,
    pub loading: bool,
}

impl<T: ListItem> ListView<T> {
    pub(crate) fn from_session(session: &ListSession<T>) -> Self {
        let query = session.query();
        Self {
            collection: session.collection(),
            items: session.items().to_vec(),
            current_page: session.current_page(),
            total_pages: session.total_pages(),
            total_count: session.total_count(),
            page_numbers: session.visible_page_numbers(PAGER_WINDOW),
            sort_field: query.sort_field().to_string(),
            sort_direction: query.sort_direction(),
            search_term: query.search_term().map(ToOwned::to_owned),
            loading: session.is_loading(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadView {
    pub rows: Vec<UploadRowView>,
    pub phase: BatchPhase,
    pub ignored: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRowView {
    pub task_id: TaskId,
    pub file_name: String,
    pub state: UploadState,
    pub progress: Option<i16>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupView {
    pub lookup: MatchLookup,
    pub results: Vec<MatchResult>,
    pub stats: Option<AggregateStats>,
}
