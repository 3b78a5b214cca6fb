use std::collections::BTreeMap;

use cvmatch_core::{Job, MatchLookup};
use pretty_assertions::assert_eq;

fn job(content: &str) -> Job {
    Job {
        id: 1,
        title: "Engineer".to_string(),
        content: content.to_string(),
        industry: "IT".to_string(),
        technical_skills: BTreeMap::from([
            ("python".to_string(), 40.0),
            ("docker".to_string(), 30.0),
            ("sql".to_string(), 20.0),
            ("rust".to_string(), 10.0),
        ]),
        created_at: None,
    }
}

#[test]
fn closed_tags_are_stripped() {
    let job = job("<p>Build <b>fast</b> services</p>");
    assert_eq!(job.short_description(150), "Build fast services");
}

#[test]
fn bare_less_than_is_kept() {
    assert_eq!(job("Salary < 50k").short_description(150), "Salary < 50k");
    assert_eq!(job("<p>Salary < 50k").short_description(150), "Salary < 50k");
}

#[test]
fn long_descriptions_are_cut_on_characters() {
    let job = job("<div>ÅÄÖ engineering role</div>");
    assert_eq!(job.short_description(3), "ÅÄÖ...");
    assert_eq!(job.short_description(21), "ÅÄÖ engineering role");
}

#[test]
fn top_skills_follow_name_order() {
    assert_eq!(job("").top_skills(3), vec!["docker", "python", "rust"]);
}

#[test]
fn lookups_address_their_item_routes() {
    assert_eq!(
        MatchLookup::MatchingCvs(4).path(),
        "jobs/4/find_matching_cvs/"
    );
    assert_eq!(MatchLookup::BestJob(9).path(), "cvs/9/find_best_job/");
    assert_eq!(
        MatchLookup::TopCandidates(4).path(),
        "jobs/4/top_candidates/"
    );
}
