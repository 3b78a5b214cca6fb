use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Markup tags in job descriptions.
static TAG_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"<[^>]*>").ok());

pub type ItemId = u64;

/// The three paginated collections served under `/api/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Candidates,
    Jobs,
    Matches,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Candidates, Collection::Jobs, Collection::Matches];

    /// Path segment under `/api/`.
    pub fn path_segment(self) -> &'static str {
        match self {
            Collection::Candidates => "cvs",
            Collection::Jobs => "jobs",
            Collection::Matches => "matches",
        }
    }

    pub fn default_sort_field(self) -> &'static str {
        match self {
            Collection::Candidates => "processed_at",
            Collection::Jobs => "created_at",
            Collection::Matches => "total_score",
        }
    }

    pub fn item_label(self) -> &'static str {
        match self {
            Collection::Candidates => "candidate",
            Collection::Jobs => "job",
            Collection::Matches => "match",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Collection::Candidates => "candidates",
            Collection::Jobs => "jobs",
            Collection::Matches => "matches",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub processed_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub technical_skills: BTreeMap<String, f64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Job {
    /// Plain-text excerpt of the description, tags stripped, at most `max_chars` characters.
    ///
    /// Only closed tags are removed; a lone `<` stays in the text.
    pub fn short_description(&self, max_chars: usize) -> String {
        let plain = match TAG_PATTERN.as_ref() {
            Some(pattern) => pattern.replace_all(&self.content, ""),
            None => Cow::Borrowed(self.content.as_str()),
        };
        if plain.chars().count() > max_chars {
            let mut cut: String = plain.chars().take(max_chars).collect();
            cut.push_str("...");
            cut
        } else {
            plain.into_owned()
        }
    }

    pub fn top_skills(&self, count: usize) -> Vec<&str> {
        self.technical_skills
            .keys()
            .take(count)
            .map(String::as_str)
            .collect()
    }
}

/// Reduced candidate record nested in match results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRef {
    pub id: ItemId,
    #[serde(default)]
    pub name: String,
}

/// Reduced job record nested in match results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRef {
    pub id: ItemId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub industry: Option<String>,
}

/// A scored pairing of a candidate and a job.
///
/// Lookup endpoints omit whichever side was queried, so both are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(default)]
    pub id: Option<ItemId>,
    #[serde(default)]
    pub cv: Option<CandidateRef>,
    #[serde(default)]
    pub job: Option<JobRef>,
    pub total_score: f64,
    #[serde(default)]
    pub industry_score: f64,
    #[serde(default)]
    pub tech_skills_score: f64,
    #[serde(default)]
    pub description_match_score: f64,
    #[serde(default)]
    pub matched_at: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl MatchResult {
    pub fn job_id(&self) -> Option<ItemId> {
        self.job.as_ref().map(|job| job.id)
    }

    pub fn cv_id(&self) -> Option<ItemId> {
        self.cv.as_ref().map(|cv| cv.id)
    }
}

/// Records that can live in a list session.
pub trait ListItem: Clone + fmt::Debug + for<'de> Deserialize<'de> {
    fn item_id(&self) -> Option<ItemId>;
}

impl ListItem for Candidate {
    fn item_id(&self) -> Option<ItemId> {
        Some(self.id)
    }
}

impl ListItem for Job {
    fn item_id(&self) -> Option<ItemId> {
        Some(self.id)
    }
}

impl ListItem for MatchResult {
    fn item_id(&self) -> Option<ItemId> {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub time: String,
    pub description: String,
}

/// Dashboard counters from `/api/statistics/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(rename = "totalCVs")]
    pub total_cvs: u64,
    #[serde(rename = "totalJobs")]
    pub total_jobs: u64,
    #[serde(rename = "totalMatches")]
    pub total_matches: u64,
    #[serde(rename = "recentActivity", default)]
    pub recent_activity: Vec<Activity>,
}

/// Server-side match lookups keyed by one side of the pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchLookup {
    MatchingCvs(ItemId),
    BestJob(ItemId),
    TopCandidates(ItemId),
}

impl MatchLookup {
    /// Path under `/api/`, with trailing slash.
    pub fn path(self) -> String {
        match self {
            MatchLookup::MatchingCvs(job_id) => format!("jobs/{job_id}/find_matching_cvs/"),
            MatchLookup::BestJob(cv_id) => format!("cvs/{cv_id}/find_best_job/"),
            MatchLookup::TopCandidates(job_id) => format!("jobs/{job_id}/top_candidates/"),
        }
    }
}

/// Full candidate record from `/api/cvs/{id}/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateDetail {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub processed_at: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
}

/// Lowest and highest accepted skill weight.
pub const SKILL_WEIGHT_RANGE: std::ops::RangeInclusive<f64> = 1.0..=100.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DraftError {
    #[error("job {0} is required")]
    MissingField(&'static str),
    #[error("skill names must not be empty")]
    UnnamedSkill,
    #[error("weight {weight} for skill {skill} must be between 1 and 100")]
    SkillWeight { skill: String, weight: f64 },
}

/// A job posting to be created, serialised as the JSON body of `POST /api/jobs/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDraft {
    pub title: String,
    pub content: String,
    pub industry: String,
    pub technical_skills: BTreeMap<String, f64>,
}

impl JobDraft {
    pub fn validate(&self) -> Result<(), DraftError> {
        for (name, value) in [
            ("title", &self.title),
            ("content", &self.content),
            ("industry", &self.industry),
        ] {
            if value.trim().is_empty() {
                return Err(DraftError::MissingField(name));
            }
        }
        for (skill, weight) in &self.technical_skills {
            if skill.trim().is_empty() {
                return Err(DraftError::UnnamedSkill);
            }
            if !SKILL_WEIGHT_RANGE.contains(weight) {
                return Err(DraftError::SkillWeight {
                    skill: skill.clone(),
                    weight: *weight,
                });
            }
        }
        Ok(())
    }
}
