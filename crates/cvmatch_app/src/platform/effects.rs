use std::path::PathBuf;
use std::time::Duration;

use cvmatch_core::{Effect, KeyValueStore, Msg};
use cvmatch_engine::{export_matches, EngineEvent, EngineHandle};
use cvmatch_logging::{cvm_debug, cvm_info, cvm_warn};

/// Executes effects: network work goes to the engine, file work runs inline.
pub(crate) struct EffectRunner {
    engine: EngineHandle,
    output_dir: PathBuf,
    store: Box<dyn KeyValueStore>,
}

/// What the runner produced for one batch of effects.
#[derive(Debug, Default)]
pub(crate) struct Dispatched {
    /// Messages that are already available, such as a finished export.
    pub immediate: Vec<Msg>,
    /// Engine replies that will arrive later.
    pub awaited: usize,
}

/// One engine event seen from the update loop.
#[derive(Debug, PartialEq)]
pub(crate) struct EngineReply {
    pub msg: Option<Msg>,
    /// True when this event answers an awaited request.
    pub settles: bool,
}

impl EffectRunner {
    pub(crate) fn new(
        engine: EngineHandle,
        output_dir: PathBuf,
        store: Box<dyn KeyValueStore>,
    ) -> Self {
        Self {
            engine,
            output_dir,
            store,
        }
    }

    pub(crate) fn run(&mut self, effects: Vec<Effect>) -> Dispatched {
        let mut dispatched = Dispatched::default();
        for effect in effects {
            match effect {
                Effect::FetchPage {
                    collection,
                    request,
                } => {
                    cvm_debug!(
                        "FetchPage {} request_id={} page={}",
                        collection,
                        request.request_id,
                        request.params.page
                    );
                    self.engine.fetch_page(collection, request);
                    dispatched.awaited += 1;
                }
                Effect::Delete { collection, id } => {
                    self.engine.delete(collection, id);
                    dispatched.awaited += 1;
                }
                Effect::RunUploads { target, files } => {
                    cvm_info!("RunUploads {:?} files={}", target, files.len());
                    self.engine.run_uploads(target, files);
                    dispatched.awaited += 1;
                }
                Effect::CancelUploads(target) => {
                    // The batch already counts as awaited; its BatchFinished settles it.
                    self.engine.cancel_uploads(target);
                }
                Effect::FetchMatchLookup(lookup) => {
                    self.engine.fetch_lookup(lookup);
                    dispatched.awaited += 1;
                }
                Effect::FetchCandidateDetail(id) => {
                    self.engine.fetch_candidate(id);
                    dispatched.awaited += 1;
                }
                Effect::CreateJob(draft) => {
                    self.engine.create_job(draft);
                    dispatched.awaited += 1;
                }
                Effect::FetchStatistics => {
                    self.engine.fetch_statistics();
                    dispatched.awaited += 1;
                }
                Effect::ExportMatches { items } => {
                    let result = match export_matches(&self.output_dir, &items) {
                        Ok(Some(summary)) => Ok(summary.output_path.display().to_string()),
                        Ok(None) => continue,
                        Err(err) => Err(err.to_string()),
                    };
                    dispatched.immediate.push(Msg::ExportDone(result));
                }
                Effect::SavePreferences(preferences) => {
                    preferences.save(self.store.as_mut());
                }
            }
        }
        dispatched
    }

    pub(crate) fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub(crate) fn next_reply(&self, timeout: Duration) -> Option<EngineReply> {
        self.engine.recv_timeout(timeout).map(translate)
    }
}

pub(crate) fn translate(event: EngineEvent) -> EngineReply {
    let (msg, settles) = match event {
        EngineEvent::PageFetched {
            collection,
            request_id,
            result,
        } => (
            Some(Msg::PageLoaded {
                collection,
                request_id,
                result: result.map_err(|err| err.into_load_error()),
            }),
            true,
        ),
        EngineEvent::LookupFetched { lookup, result } => (
            Some(Msg::MatchLookupLoaded {
                lookup,
                result: result.map_err(|err| err.into_load_error()),
            }),
            true,
        ),
        EngineEvent::CandidateFetched { id, result } => (
            Some(Msg::CandidateDetailLoaded {
                id,
                result: result.map_err(|err| err.into_load_error()),
            }),
            true,
        ),
        EngineEvent::JobCreated(result) => (
            Some(Msg::JobCreated(result.map_err(|err| err.into_load_error()))),
            true,
        ),
        EngineEvent::StatisticsFetched(result) => (
            Some(Msg::StatisticsLoaded(
                result.map_err(|err| err.into_load_error()),
            )),
            true,
        ),
        EngineEvent::Deleted {
            collection,
            id,
            result,
        } => (
            Some(Msg::DeleteDone {
                collection,
                id,
                result: result.map_err(|err| err.to_string()),
            }),
            true,
        ),
        EngineEvent::UploadProgress(progress) => (
            Some(Msg::UploadProgress {
                target: progress.target,
                task_id: progress.task_id,
                percent: progress.percent,
            }),
            false,
        ),
        EngineEvent::UploadCompleted {
            target,
            task_id,
            result,
        } => (
            Some(Msg::UploadDone {
                target,
                task_id,
                result: result.map_err(|err| err.to_string()),
            }),
            false,
        ),
        EngineEvent::BatchFinished { target, summary } => {
            if summary.has_errors() {
                cvm_warn!("Batch to {:?} had {} failure(s)", target, summary.failed);
            }
            (None, true)
        }
    };
    EngineReply { msg, settles }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvmatch_core::{BatchSummary, Collection, LoadError, UploadTarget};
    use cvmatch_engine::{ApiError, FailureKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn decode_failures_become_format_errors() {
        let reply = translate(EngineEvent::PageFetched {
            collection: Collection::Jobs,
            request_id: 3,
            result: Err(ApiError::new(FailureKind::Decode, "expected value")),
        });

        assert!(reply.settles);
        assert_eq!(
            reply.msg,
            Some(Msg::PageLoaded {
                collection: Collection::Jobs,
                request_id: 3,
                result: Err(LoadError::Format("expected value".to_string())),
            })
        );
    }

    #[test]
    fn missing_candidate_keeps_its_status() {
        let reply = translate(EngineEvent::CandidateFetched {
            id: 8,
            result: Err(ApiError::new(FailureKind::HttpStatus(404), "404 Not Found")),
        });

        assert!(reply.settles);
        assert!(matches!(
            reply.msg,
            Some(Msg::CandidateDetailLoaded {
                id: 8,
                result: Err(LoadError::NotFound(_)),
            })
        ));
    }

    #[test]
    fn upload_completions_do_not_settle_but_the_batch_does() {
        let done = translate(EngineEvent::UploadCompleted {
            target: UploadTarget::Cvs,
            task_id: 1,
            result: Err(ApiError::new(FailureKind::HttpStatus(500), "500")),
        });
        assert!(!done.settles);
        assert!(matches!(
            done.msg,
            Some(Msg::UploadDone {
                task_id: 1,
                result: Err(_),
                ..
            })
        ));

        let finished = translate(EngineEvent::BatchFinished {
            target: UploadTarget::Cvs,
            summary: BatchSummary {
                succeeded: 2,
                failed: 1,
            },
        });
        assert_eq!(
            finished,
            EngineReply {
                msg: None,
                settles: true
            }
        );
    }
}
