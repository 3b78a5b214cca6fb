mod app;
mod effects;
mod logging;
mod persistence;
mod render;
mod settings;

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use cvmatch_core::{
    Collection, JobDraft, Msg, SelectedFile, SortDirection, UploadTarget, DOCX_MIME_TYPE,
};
use cvmatch_engine::EngineHandle;
use cvmatch_logging::{cvm_info, level_for_verbosity};

use crate::cli::{Cli, Command, QueryArgs};
use app::Session;
use effects::EffectRunner;
use logging::LogDestination;
use persistence::RonFileStore;
use settings::{AppSettings, SettingsOverrides};

pub(crate) fn run_app(cli: Cli) -> Result<()> {
    let settings = AppSettings::load(&cli.config)?;
    let resolved = settings.resolve(SettingsOverrides {
        base_url: cli.base_url.clone(),
        page_size: cli.page_size,
        output_dir: cli.output_dir.clone(),
    });

    let destination = if cli.log_to_terminal {
        LogDestination::Both(resolved.log_file.clone())
    } else {
        LogDestination::File(resolved.log_file.clone())
    };
    logging::initialize(destination, level_for_verbosity(cli.verbose));
    cvm_info!("Using backend {}", resolved.client.base_url);

    let engine = EngineHandle::new(resolved.client.clone()).context("starting engine")?;
    let store = RonFileStore::open(&resolved.output_dir);
    let runner = EffectRunner::new(engine, resolved.output_dir.clone(), Box::new(store));
    let mut session = Session::with_stored_preferences(resolved.session.clone(), runner);

    match cli.command {
        Command::List { collection, query } => {
            let collection = Collection::from(collection);
            open_list(&mut session, collection, &query);
            print_list(&session, collection);
        }
        Command::Delete { collection, id } => {
            let collection = Collection::from(collection);
            session.dispatch_and_settle(Msg::ListOpened { collection });
            session.dispatch_and_settle(Msg::DeleteRequested { collection, id });
            print_list(&session, collection);
        }
        Command::Upload {
            target,
            files,
            fields,
            timeout_secs,
        } => {
            let target = UploadTarget::from(target);
            let selected = files
                .iter()
                .map(|path| read_selected_file(path, &fields))
                .collect::<Result<Vec<_>>>()?;
            session.dispatch(Msg::FilesSelected {
                target,
                files: selected,
            });
            if !session.state().uploads(target).tasks().is_empty() {
                session.dispatch(Msg::UploadClicked { target });
                let finished = match timeout_secs {
                    Some(secs) => session.settle_for(Duration::from_secs(secs)),
                    None => {
                        session.settle();
                        true
                    }
                };
                if !finished {
                    session.dispatch_and_settle(Msg::UploadCancelRequested { target });
                }
            }
            let view = session.view();
            let uploads = match target {
                UploadTarget::Cvs => &view.cv_uploads,
                UploadTarget::Jobs => &view.job_uploads,
            };
            print_lines(render::render_uploads(uploads));
        }
        Command::Lookup { kind, id } => {
            session.dispatch_and_settle(Msg::MatchLookupRequested(kind.with_id(id)));
            if let Some(lookup) = &session.view().lookup {
                print_lines(render::render_lookup(lookup));
            }
        }
        Command::Show { id } => {
            session.dispatch_and_settle(Msg::CandidateDetailRequested(id));
            if let Some(detail) = &session.view().candidate_detail {
                print_lines(render::render_candidate_detail(detail));
            }
        }
        Command::CreateJob {
            title,
            content,
            industry,
            skills,
        } => {
            session.dispatch_and_settle(Msg::JobCreateRequested(JobDraft {
                title,
                content,
                industry,
                technical_skills: skills.into_iter().collect(),
            }));
            if let Some(lookup) = &session.view().lookup {
                print_lines(render::render_lookup(lookup));
            }
        }
        Command::Stats => {
            session.dispatch_and_settle(Msg::StatisticsRequested);
            if let Some(statistics) = &session.view().statistics {
                print_lines(render::render_statistics(statistics));
            }
        }
        Command::Export { query } => {
            open_list(&mut session, Collection::Matches, &query);
            if session.state().matches().items().is_empty() {
                println!("No match results to export.");
            } else {
                session.dispatch(Msg::ExportClicked);
            }
        }
        Command::Prefs { theme, view } => {
            let mut preferences = session.state().preferences();
            if let Some(theme) = theme {
                preferences.theme = theme.into();
            }
            if let Some(view) = view {
                preferences.view_mode = view.into();
            }
            session.dispatch(Msg::PreferencesChanged(preferences));
            println!("{}", render::render_preferences(&session.state().preferences()));
        }
    }

    if let Some(notice) = session.notice() {
        let line = render::render_notice(notice);
        if notice.is_error {
            bail!(line);
        }
        println!("{line}");
    }
    Ok(())
}

/// Loads the requested page, applying search and sort on the way.
fn open_list(session: &mut Session, collection: Collection, query: &QueryArgs) {
    let mut loaded = false;
    if let Some(term) = &query.search {
        session.dispatch_and_settle(Msg::SearchSubmitted {
            collection,
            term: term.clone(),
        });
        loaded = true;
    }
    let field = query
        .sort
        .clone()
        .unwrap_or_else(|| collection.default_sort_field().to_string());
    let wanted = if query.asc {
        SortDirection::Asc
    } else {
        SortDirection::Desc
    };
    // A new field starts descending; one more click flips it.
    for _ in 0..2 {
        if active_sort(session, collection) == (field.clone(), wanted) {
            break;
        }
        session.dispatch_and_settle(Msg::SortRequested {
            collection,
            field: field.clone(),
        });
        loaded = true;
    }
    if !loaded {
        session.dispatch_and_settle(Msg::ListOpened { collection });
    }
    if query.page > 1 {
        session.dispatch_and_settle(Msg::PageRequested {
            collection,
            page: query.page,
        });
    }
}

fn active_sort(session: &Session, collection: Collection) -> (String, SortDirection) {
    let state = session.state();
    let query = match collection {
        Collection::Candidates => state.candidates().query(),
        Collection::Jobs => state.jobs().query(),
        Collection::Matches => state.matches().query(),
    };
    (query.sort_field().to_string(), query.sort_direction())
}

fn print_list(session: &Session, collection: Collection) {
    let view = session.view();
    let lines = match collection {
        Collection::Candidates => render::render_list(&view.candidates, render::candidate_row),
        Collection::Jobs => render::render_list(&view.jobs, render::job_row),
        Collection::Matches => render::render_list(&view.matches, render::match_row),
    };
    print_lines(lines);
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

fn read_selected_file(path: &Path, fields: &[(String, String)]) -> Result<SelectedFile> {
    let contents = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mut file = SelectedFile::new(name, mime_type_for(path), contents);
    for (key, value) in fields {
        file = file.with_field(key.clone(), value.clone());
    }
    Ok(file)
}

/// Declared type from the extension; unknown extensions are left for the type filter to reject.
fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("docx") => DOCX_MIME_TYPE,
        Some("doc") => "application/msword",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}
