use cvmatch_logging::{cvm_debug, cvm_info, cvm_warn};

use crate::list::{ApplyOutcome, FetchRequest};
use crate::page::{decode_list_or_single, LoadError};
use crate::state::{LookupResults, Notice};
use crate::{
    AppState, CandidateDetail, Collection, Effect, Job, MatchLookup, MatchResult, Msg, Statistics,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::ListOpened { collection } => {
            let request = state.list_mut(collection).refresh();
            vec![fetch(collection, request)]
        }
        Msg::PageRequested { collection, page } => {
            match state.list_mut(collection).set_page(page) {
                Some(request) => vec![fetch(collection, request)],
                None => {
                    cvm_debug!("Ignoring out-of-range page {} for {}", page, collection);
                    Vec::new()
                }
            }
        }
        Msg::SortRequested { collection, field } => {
            let request = state.list_mut(collection).set_sort(&field);
            vec![fetch(collection, request)]
        }
        Msg::SearchSubmitted { collection, term } => {
            let request = state.list_mut(collection).set_search_term(&term);
            vec![fetch(collection, request)]
        }
        Msg::PageLoaded {
            collection,
            request_id,
            result,
        } => match state.list_mut(collection).apply_response(request_id, result) {
            ApplyOutcome::Stale | ApplyOutcome::Applied => Vec::new(),
            ApplyOutcome::Clamped(request) => vec![fetch(collection, request)],
            ApplyOutcome::FormatError(_) => {
                state.set_notice(Notice::error(format!(
                    "Unexpected {collection} data format."
                )));
                Vec::new()
            }
            ApplyOutcome::TransportError(_) => {
                state.set_notice(Notice::error(format!(
                    "Failed to load {collection}. Please try again."
                )));
                Vec::new()
            }
        },
        Msg::DeleteRequested { collection, id } => {
            cvm_info!("Deleting {} {}", collection.item_label(), id);
            vec![Effect::Delete { collection, id }]
        }
        Msg::DeleteDone {
            collection,
            id,
            result,
        } => match result {
            Ok(()) => {
                let list = state.list_mut(collection);
                list.remove_item(id);
                let request = list.refresh();
                vec![fetch(collection, request)]
            }
            Err(reason) => {
                cvm_warn!(
                    "Failed to delete {} {}: {}",
                    collection.item_label(),
                    id,
                    reason
                );
                state.set_notice(Notice::error(format!(
                    "Failed to delete {}. Please try again.",
                    collection.item_label()
                )));
                Vec::new()
            }
        },
        Msg::FilesSelected { target, files } => {
            let allowed = state.config().allowed_upload_types.clone();
            match state.uploads_mut(target).select(files, &allowed) {
                Ok(selection) => {
                    match selection.message() {
                        Some((text, true)) => state.set_notice(Notice::error(text)),
                        Some((text, false)) => state.set_notice(Notice::info(text)),
                        None => state.clear_notice(),
                    }
                }
                Err(rejection) => state.set_notice(Notice::error(rejection.to_string())),
            }
            Vec::new()
        }
        Msg::UploadClicked { target } => match state.uploads_mut(target).start() {
            Ok(files) => {
                state.set_notice(Notice::info(format!(
                    "Uploading {} file(s)...",
                    files.len()
                )));
                vec![Effect::RunUploads { target, files }]
            }
            Err(rejection) => {
                state.set_notice(Notice::error(rejection.to_string()));
                Vec::new()
            }
        },
        Msg::UploadProgress {
            target,
            task_id,
            percent,
        } => {
            if !state.uploads_mut(target).record_progress(task_id, percent) {
                cvm_debug!("Ignoring progress {} for upload task {}", percent, task_id);
            }
            Vec::new()
        }
        Msg::UploadDone {
            target,
            task_id,
            result,
        } => {
            if let Err(reason) = &result {
                cvm_warn!("Upload task {} failed: {}", task_id, reason);
            }
            let summary = state.uploads_mut(target).record_done(task_id, result);
            if let Some(summary) = summary {
                cvm_info!(
                    "Upload batch finished succeeded={} failed={}",
                    summary.succeeded,
                    summary.failed
                );
                let notice = if summary.has_errors() {
                    Notice::error(summary.message())
                } else {
                    Notice::info(summary.message())
                };
                state.set_notice(notice);
            }
            Vec::new()
        }
        Msg::UploadCancelRequested { target } => {
            if state.uploads(target).is_running() {
                cvm_info!("Cancelling uploads to {:?}", target);
                vec![Effect::CancelUploads(target)]
            } else {
                Vec::new()
            }
        }
        Msg::MatchLookupRequested(lookup) => vec![Effect::FetchMatchLookup(lookup)],
        Msg::MatchLookupLoaded { lookup, result } => {
            let decoded = result.and_then(decode_list_or_single::<MatchResult>);
            match decoded {
                Ok(mut results) => {
                    results.sort_by(|a, b| b.total_score.total_cmp(&a.total_score));
                    state.set_lookup(LookupResults { lookup, results });
                }
                Err(err) => {
                    cvm_warn!("Match lookup {:?} failed: {}", lookup, err);
                    // Remember the empty answer so the view does not retry in a loop.
                    state.set_lookup(LookupResults {
                        lookup,
                        results: Vec::new(),
                    });
                    state.set_notice(Notice::error(lookup_failure_text(lookup)));
                }
            }
            Vec::new()
        }
        Msg::CandidateDetailRequested(id) => {
            state.set_candidate_detail(None);
            vec![Effect::FetchCandidateDetail(id)]
        }
        Msg::CandidateDetailLoaded { id, result } => {
            let decoded = result.and_then(|raw| {
                serde_json::from_value::<CandidateDetail>(raw)
                    .map_err(|err| LoadError::Format(err.to_string()))
            });
            match decoded {
                Ok(detail) => state.set_candidate_detail(Some(detail)),
                Err(LoadError::NotFound(_)) => {
                    cvm_warn!("Candidate {} does not exist", id);
                    state.set_notice(Notice::error("Candidate CV not found."));
                }
                Err(err) => {
                    cvm_warn!("Failed to load candidate {}: {}", id, err);
                    state.set_notice(Notice::error(
                        "Failed to load candidate details. Please try again later.",
                    ));
                }
            }
            Vec::new()
        }
        Msg::JobCreateRequested(draft) => match draft.validate() {
            Ok(()) => {
                cvm_info!("Creating job {:?}", draft.title);
                vec![Effect::CreateJob(draft)]
            }
            Err(err) => {
                state.set_notice(Notice::error(format!("Cannot create job: {err}.")));
                Vec::new()
            }
        },
        Msg::JobCreated(result) => {
            let decoded = result.and_then(|raw| {
                serde_json::from_value::<Job>(raw).map_err(|err| LoadError::Format(err.to_string()))
            });
            match decoded {
                Ok(job) => {
                    state.set_notice(Notice::info(format!("Created job #{} {}", job.id, job.title)));
                    // A new posting is scored against the stored candidates straight away.
                    vec![Effect::FetchMatchLookup(MatchLookup::MatchingCvs(job.id))]
                }
                Err(err) => {
                    cvm_warn!("Failed to create job: {}", err);
                    state.set_notice(Notice::error("Error creating job. Please try again."));
                    Vec::new()
                }
            }
        }
        Msg::StatisticsRequested => vec![Effect::FetchStatistics],
        Msg::StatisticsLoaded(result) => {
            let decoded = result.and_then(|raw| {
                serde_json::from_value::<Statistics>(raw)
                    .map_err(|err| LoadError::Format(err.to_string()))
            });
            match decoded {
                Ok(statistics) => state.set_statistics(statistics),
                Err(err) => {
                    cvm_warn!("Failed to load statistics: {}", err);
                    state.set_notice(Notice::error("Failed to load statistics."));
                }
            }
            Vec::new()
        }
        Msg::ExportClicked => {
            let items = state.matches().items().to_vec();
            if items.is_empty() {
                cvm_debug!("Export skipped: no matches on the current page");
                Vec::new()
            } else {
                vec![Effect::ExportMatches { items }]
            }
        }
        Msg::ExportDone(result) => {
            match result {
                Ok(path) => state.set_notice(Notice::info(format!("Exported matches to {path}"))),
                Err(reason) => {
                    cvm_warn!("Export failed: {}", reason);
                    state.set_notice(Notice::error("Failed to export match results."));
                }
            }
            Vec::new()
        }
        Msg::PreferencesChanged(preferences) => {
            if preferences == state.preferences() {
                Vec::new()
            } else {
                state.set_preferences(preferences);
                vec![Effect::SavePreferences(preferences)]
            }
        }
    };

    (state, effects)
}

fn fetch(collection: Collection, request: FetchRequest) -> Effect {
    Effect::FetchPage {
        collection,
        request,
    }
}

fn lookup_failure_text(lookup: MatchLookup) -> &'static str {
    match lookup {
        MatchLookup::MatchingCvs(_) => "Error finding matching candidates. Please try again.",
        MatchLookup::BestJob(_) => "Error finding the best job. Please try again.",
        MatchLookup::TopCandidates(_) => "Error fetching top candidates. Please try again.",
    }
}
