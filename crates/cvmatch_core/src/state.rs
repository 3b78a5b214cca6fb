use serde_json::Value;

use crate::aggregate::{aggregate_by, aggregate_for_candidate, aggregate_for_job, AggregateStats};
use crate::list::{ApplyOutcome, FetchRequest, ListSession, RequestId};
use crate::page::LoadError;
use crate::view_model::{AppViewModel, ListView, LookupView, UploadRowView, UploadView};
use crate::{
    Candidate, CandidateDetail, Collection, ItemId, Job, ListItem, MatchLookup, MatchResult,
    Preferences, SessionConfig, Statistics, UploadBatch, UploadTarget,
};

/// Message shown above the views until replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Results of the last server-side match lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupResults {
    pub lookup: MatchLookup,
    pub results: Vec<MatchResult>,
}

/// Type-erased operations over the three list sessions.
pub(crate) trait ListControl {
    fn refresh(&mut self) -> FetchRequest;
    fn set_page(&mut self, page: u32) -> Option<FetchRequest>;
    fn set_sort(&mut self, field: &str) -> FetchRequest;
    fn set_search_term(&mut self, term: &str) -> FetchRequest;
    fn apply_response(
        &mut self,
        request_id: RequestId,
        response: Result<Value, LoadError>,
    ) -> ApplyOutcome;
    fn remove_item(&mut self, id: ItemId) -> bool;
}

impl<T: ListItem> ListControl for ListSession<T> {
    fn refresh(&mut self) -> FetchRequest {
        ListSession::refresh(self)
    }

    fn set_page(&mut self, page: u32) -> Option<FetchRequest> {
        ListSession::set_page(self, page)
    }

    fn set_sort(&mut self, field: &str) -> FetchRequest {
        ListSession::set_sort(self, field)
    }

    fn set_search_term(&mut self, term: &str) -> FetchRequest {
        ListSession::set_search_term(self, term)
    }

    fn apply_response(
        &mut self,
        request_id: RequestId,
        response: Result<Value, LoadError>,
    ) -> ApplyOutcome {
        ListSession::apply_response(self, request_id, response)
    }

    fn remove_item(&mut self, id: ItemId) -> bool {
        ListSession::remove_item(self, id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    config: SessionConfig,
    candidates: ListSession<Candidate>,
    jobs: ListSession<Job>,
    matches: ListSession<MatchResult>,
    cv_uploads: UploadBatch,
    job_uploads: UploadBatch,
    lookup: Option<LookupResults>,
    candidate_detail: Option<CandidateDetail>,
    statistics: Option<Statistics>,
    preferences: Preferences,
    notice: Option<Notice>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_config(SessionConfig::default(), Preferences::default())
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SessionConfig, preferences: Preferences) -> Self {
        let page_size = config.page_size;
        Self {
            candidates: ListSession::new(Collection::Candidates, page_size),
            jobs: ListSession::new(Collection::Jobs, page_size),
            matches: ListSession::new(Collection::Matches, page_size),
            config,
            cv_uploads: UploadBatch::new(),
            job_uploads: UploadBatch::new(),
            lookup: None,
            candidate_detail: None,
            statistics: None,
            preferences,
            notice: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn candidates(&self) -> &ListSession<Candidate> {
        &self.candidates
    }

    pub fn jobs(&self) -> &ListSession<Job> {
        &self.jobs
    }

    pub fn matches(&self) -> &ListSession<MatchResult> {
        &self.matches
    }

    pub fn uploads(&self, target: UploadTarget) -> &UploadBatch {
        match target {
            UploadTarget::Cvs => &self.cv_uploads,
            UploadTarget::Jobs => &self.job_uploads,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    pub fn candidate_detail(&self) -> Option<&CandidateDetail> {
        self.candidate_detail.as_ref()
    }

    /// Statistics over the matches of `job_id` on the current match page.
    pub fn match_stats_for_job(&self, job_id: ItemId) -> Option<AggregateStats> {
        aggregate_for_job(self.matches.items(), job_id)
    }

    /// Statistics over the matches of `cv_id` on the current match page.
    pub fn match_stats_for_candidate(&self, cv_id: ItemId) -> Option<AggregateStats> {
        aggregate_for_candidate(self.matches.items(), cv_id)
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            candidates: ListView::from_session(&self.candidates),
            jobs: ListView::from_session(&self.jobs),
            matches: ListView::from_session(&self.matches),
            cv_uploads: upload_view(&self.cv_uploads),
            job_uploads: upload_view(&self.job_uploads),
            lookup: self.lookup.as_ref().map(|found| LookupView {
                lookup: found.lookup,
                // Every result shares the key the lookup was made for.
                stats: aggregate_by(&found.results, |_| true),
                results: found.results.clone(),
            }),
            candidate_detail: self.candidate_detail.clone(),
            statistics: self.statistics.clone(),
            preferences: self.preferences,
            notice: self.notice.clone(),
        }
    }

    pub(crate) fn list_mut(&mut self, collection: Collection) -> &mut dyn ListControl {
        match collection {
            Collection::Candidates => &mut self.candidates,
            Collection::Jobs => &mut self.jobs,
            Collection::Matches => &mut self.matches,
        }
    }

    pub(crate) fn uploads_mut(&mut self, target: UploadTarget) -> &mut UploadBatch {
        match target {
            UploadTarget::Cvs => &mut self.cv_uploads,
            UploadTarget::Jobs => &mut self.job_uploads,
        }
    }

    pub(crate) fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub(crate) fn clear_notice(&mut self) {
        self.notice = None;
    }

    pub(crate) fn set_lookup(&mut self, lookup: LookupResults) {
        self.lookup = Some(lookup);
    }

    pub(crate) fn set_candidate_detail(&mut self, detail: Option<CandidateDetail>) {
        self.candidate_detail = detail;
    }

    pub(crate) fn set_statistics(&mut self, statistics: Statistics) {
        self.statistics = Some(statistics);
    }

    pub(crate) fn set_preferences(&mut self, preferences: Preferences) {
        self.preferences = preferences;
    }
}

fn upload_view(batch: &UploadBatch) -> UploadView {
    UploadView {
        rows: batch
            .tasks()
            .iter()
            .map(|task| UploadRowView {
                task_id: task.id(),
                file_name: task.file().name.clone(),
                state: task.state().clone(),
                progress: task.state().progress(),
            })
            .collect(),
        phase: batch.phase(),
        ignored: batch.ignored(),
    }
}
