use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use cvmatch_core::{Collection, ItemId, MatchLookup, Theme, UploadTarget, ViewMode};

/// Command-line client for the CV matching backend.
#[derive(Debug, Parser)]
#[command(name = "cvmatch", version, about)]
pub(crate) struct Cli {
    /// Settings file in RON format
    #[arg(long, default_value = "cvmatch.ron")]
    pub config: PathBuf,

    /// Backend base URL, e.g. http://localhost:8000
    #[arg(long)]
    pub base_url: Option<String>,

    /// Items per page used to compute the page count
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Directory for exports and stored preferences
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Also log to the terminal
    #[arg(long)]
    pub log_to_terminal: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Show one page of a collection
    List {
        collection: CollectionArg,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Delete one record and show the refreshed page
    Delete {
        collection: CollectionArg,
        id: ItemId,
    },
    /// Upload documents concurrently
    Upload {
        target: TargetArg,
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Extra form field sent with every file, as key=value
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
        /// Cancel whatever is still uploading after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Show the full record of one candidate
    Show { id: ItemId },
    /// Create a job posting and list the candidates matching it
    CreateJob {
        #[arg(long)]
        title: String,
        /// Job description; may contain markup
        #[arg(long)]
        content: String,
        #[arg(long)]
        industry: String,
        /// Required skill with its weight (1-100), as name=weight
        #[arg(long = "skill", value_parser = parse_skill)]
        skills: Vec<(String, f64)>,
    },
    /// Ask the backend to score one side of a pairing
    Lookup { kind: LookupKind, id: ItemId },
    /// Show dashboard totals and recent activity
    Stats,
    /// Write one page of matches to match_results.csv
    Export {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Show or change stored preferences
    Prefs {
        #[arg(long)]
        theme: Option<ThemeArg>,
        #[arg(long)]
        view: Option<ViewArg>,
    },
}

#[derive(Debug, Clone, Args)]
pub(crate) struct QueryArgs {
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    /// Field to order by
    #[arg(long)]
    pub sort: Option<String>,
    /// Sort ascending instead of descending
    #[arg(long)]
    pub asc: bool,
    /// Search term
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum CollectionArg {
    Candidates,
    Jobs,
    Matches,
}

impl From<CollectionArg> for Collection {
    fn from(arg: CollectionArg) -> Self {
        match arg {
            CollectionArg::Candidates => Collection::Candidates,
            CollectionArg::Jobs => Collection::Jobs,
            CollectionArg::Matches => Collection::Matches,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum TargetArg {
    Cvs,
    Jobs,
}

impl From<TargetArg> for UploadTarget {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Cvs => UploadTarget::Cvs,
            TargetArg::Jobs => UploadTarget::Jobs,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum LookupKind {
    /// Candidates matching a job
    MatchingCvs,
    /// Best job for a candidate
    BestJob,
    /// Stored top candidates of a job
    TopCandidates,
}

impl LookupKind {
    pub(crate) fn with_id(self, id: ItemId) -> MatchLookup {
        match self {
            LookupKind::MatchingCvs => MatchLookup::MatchingCvs(id),
            LookupKind::BestJob => MatchLookup::BestJob(id),
            LookupKind::TopCandidates => MatchLookup::TopCandidates(id),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum ViewArg {
    Grid,
    List,
}

impl From<ViewArg> for ViewMode {
    fn from(arg: ViewArg) -> Self {
        match arg {
            ViewArg::Grid => ViewMode::Grid,
            ViewArg::List => ViewMode::List,
        }
    }
}

fn parse_skill(raw: &str) -> Result<(String, f64), String> {
    let (name, weight) = parse_field(raw)?;
    let weight = weight
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid weight in `{raw}`: {err}"))?;
    Ok((name, weight))
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}
