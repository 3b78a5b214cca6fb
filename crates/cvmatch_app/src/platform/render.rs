//! Plain-text rendering of view models for the terminal.

use cvmatch_core::{
    format_score, AggregateStats, Candidate, CandidateDetail, Job, ListView, LookupView,
    MatchLookup, MatchResult, Notice, Preferences, ScoreBand, Statistics, UploadRowView,
    UploadState, UploadView,
};

const DESCRIPTION_CHARS: usize = 60;
const SKILLS_SHOWN: usize = 3;

pub(crate) fn render_list<T>(view: &ListView<T>, row: impl Fn(&T) -> String) -> Vec<String> {
    let mut lines = Vec::with_capacity(view.items.len() + 3);
    let mut header = format!(
        "{}: page {}/{} ({} total), sorted by {} {}",
        view.collection,
        view.current_page,
        view.total_pages.max(1),
        view.total_count,
        view.sort_field,
        view.sort_direction.indicator()
    );
    if let Some(term) = &view.search_term {
        header.push_str(&format!(", search \"{term}\""));
    }
    lines.push(header);

    if view.items.is_empty() {
        lines.push(format!("  no {} found", view.collection));
    }
    lines.extend(view.items.iter().map(|item| format!("  {}", row(item))));

    if view.page_numbers.len() > 1 {
        let pager = view
            .page_numbers
            .iter()
            .map(|page| {
                if *page == view.current_page {
                    format!("[{page}]")
                } else {
                    page.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(format!("  pages: {pager}"));
    }
    lines
}

pub(crate) fn candidate_row(candidate: &Candidate) -> String {
    format!(
        "#{} {} (processed {})",
        candidate.id,
        candidate.name,
        candidate.processed_at.as_deref().unwrap_or("N/A")
    )
}

pub(crate) fn job_row(job: &Job) -> String {
    let skills = job.top_skills(SKILLS_SHOWN).join(", ");
    format!(
        "#{} {} [{}] skills: {} | {}",
        job.id,
        job.title,
        job.industry,
        if skills.is_empty() { "-" } else { &skills },
        job.short_description(DESCRIPTION_CHARS)
    )
}

pub(crate) fn match_row(item: &MatchResult) -> String {
    let candidate = item.cv.as_ref().map_or("?", |cv| cv.name.as_str());
    let job = item.job.as_ref().map_or("?", |job| job.title.as_str());
    format!(
        "{} -> {}: {} ({}) industry {} skills {} description {}",
        candidate,
        job,
        format_score(item.total_score),
        ScoreBand::classify(item.total_score).label(),
        format_score(item.industry_score),
        format_score(item.tech_skills_score),
        format_score(item.description_match_score)
    )
}

pub(crate) fn render_uploads(view: &UploadView) -> Vec<String> {
    let mut lines: Vec<String> = view.rows.iter().map(upload_row).collect();
    if view.ignored > 0 {
        lines.push(format!("  {} file(s) ignored", view.ignored));
    }
    lines
}

fn upload_row(row: &UploadRowView) -> String {
    let status = match &row.state {
        UploadState::Pending => "pending".to_string(),
        UploadState::InProgress(percent) => format!("{percent}%"),
        UploadState::Succeeded => "done".to_string(),
        UploadState::Failed(reason) => format!("failed ({reason})"),
    };
    format!("  {} {}", row.file_name, status)
}

pub(crate) fn render_lookup(view: &LookupView) -> Vec<String> {
    let title = match view.lookup {
        MatchLookup::MatchingCvs(id) => format!("Matching candidates for job #{id}"),
        MatchLookup::BestJob(id) => format!("Best job for candidate #{id}"),
        MatchLookup::TopCandidates(id) => format!("Top candidates for job #{id}"),
    };
    let mut lines = vec![title];
    if view.results.is_empty() {
        lines.push("  no matches".to_string());
    }
    lines.extend(view.results.iter().map(|item| format!("  {}", match_row(item))));
    if let Some(stats) = &view.stats {
        lines.push(render_stats(stats));
    }
    lines
}

fn render_stats(stats: &AggregateStats) -> String {
    format!(
        "  average {} over {} match(es): {} high, {} medium, {} low",
        format_score(stats.average_score),
        stats.total_count,
        stats.band_counts.high,
        stats.band_counts.medium,
        stats.band_counts.low
    )
}

pub(crate) fn render_statistics(statistics: &Statistics) -> Vec<String> {
    let mut lines = vec![
        format!("Candidates: {}", statistics.total_cvs),
        format!("Jobs: {}", statistics.total_jobs),
        format!("Matches: {}", statistics.total_matches),
    ];
    if !statistics.recent_activity.is_empty() {
        lines.push("Recent activity:".to_string());
        lines.extend(
            statistics
                .recent_activity
                .iter()
                .map(|activity| format!("  {} {}", activity.time, activity.description)),
        );
    }
    lines
}

pub(crate) fn render_candidate_detail(detail: &CandidateDetail) -> Vec<String> {
    let mut lines = vec![
        format!("#{} {}", detail.id, detail.name),
        format!("Processed: {}", detail.processed_at.as_deref().unwrap_or("N/A")),
    ];
    if let Some(file) = &detail.file {
        lines.push(format!("File: {file}"));
    }
    if !detail.content.is_empty() {
        lines.push(String::new());
        lines.extend(detail.content.lines().map(str::to_string));
    }
    lines
}

pub(crate) fn render_preferences(preferences: &Preferences) -> String {
    format!(
        "theme: {}, view: {}",
        preferences.theme.as_str(),
        preferences.view_mode.as_str()
    )
}

pub(crate) fn render_notice(notice: &Notice) -> String {
    if notice.is_error {
        format!("error: {}", notice.text)
    } else {
        notice.text.clone()
    }
}
