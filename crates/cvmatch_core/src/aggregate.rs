use crate::{ItemId, MatchResult};

/// Lower bound (inclusive) of the high band.
pub const HIGH_SCORE_THRESHOLD: f64 = 0.7;
/// Lower bound (inclusive) of the medium band.
pub const MEDIUM_SCORE_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

impl ScoreBand {
    pub fn classify(score: f64) -> Self {
        if score >= HIGH_SCORE_THRESHOLD {
            ScoreBand::High
        } else if score >= MEDIUM_SCORE_THRESHOLD {
            ScoreBand::Medium
        } else {
            ScoreBand::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::High => "high",
            ScoreBand::Medium => "medium",
            ScoreBand::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BandCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl BandCounts {
    fn record(&mut self, band: ScoreBand) {
        match band {
            ScoreBand::High => self.high += 1,
            ScoreBand::Medium => self.medium += 1,
            ScoreBand::Low => self.low += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateStats {
    pub average_score: f64,
    pub total_count: usize,
    pub band_counts: BandCounts,
}

/// Summarises the scores of every item accepted by `belongs`.
///
/// Returns `None` when nothing matches.
pub fn aggregate_by<'a, I, F>(items: I, mut belongs: F) -> Option<AggregateStats>
where
    I: IntoIterator<Item = &'a MatchResult>,
    F: FnMut(&MatchResult) -> bool,
{
    let mut sum = 0.0;
    let mut total_count = 0usize;
    let mut band_counts = BandCounts::default();
    for item in items.into_iter().filter(|item| belongs(item)) {
        sum += item.total_score;
        total_count += 1;
        band_counts.record(ScoreBand::classify(item.total_score));
    }
    if total_count == 0 {
        return None;
    }
    Some(AggregateStats {
        average_score: sum / total_count as f64,
        total_count,
        band_counts,
    })
}

/// Statistics over all matches that belong to `job_id`.
pub fn aggregate_for_job<'a, I>(items: I, job_id: ItemId) -> Option<AggregateStats>
where
    I: IntoIterator<Item = &'a MatchResult>,
{
    aggregate_by(items, |item| item.job_id() == Some(job_id))
}

/// Statistics over all matches that belong to `cv_id`.
pub fn aggregate_for_candidate<'a, I>(items: I, cv_id: ItemId) -> Option<AggregateStats>
where
    I: IntoIterator<Item = &'a MatchResult>,
{
    aggregate_by(items, |item| item.cv_id() == Some(cv_id))
}

/// `score × 100`, rounded, with a percent sign.
pub fn format_score(score: f64) -> String {
    format!("{}%", (score * 100.0).round() as i64)
}
