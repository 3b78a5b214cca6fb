use cvmatch_core::{
    aggregate_by, aggregate_for_candidate, aggregate_for_job, format_score, BandCounts,
    CandidateRef, JobRef, MatchResult, ScoreBand,
};

fn scored(job_id: u64, cv_id: u64, total_score: f64) -> MatchResult {
    MatchResult {
        id: None,
        cv: Some(CandidateRef {
            id: cv_id,
            name: format!("cv-{cv_id}"),
        }),
        job: Some(JobRef {
            id: job_id,
            title: format!("job-{job_id}"),
            industry: None,
        }),
        total_score,
        industry_score: 0.0,
        tech_skills_score: 0.0,
        description_match_score: 0.0,
        matched_at: None,
        explanation: None,
    }
}

#[test]
fn stats_for_one_job_cover_all_bands() {
    let items = vec![
        scored(1, 10, 0.8),
        scored(1, 11, 0.6),
        scored(2, 12, 0.95),
        scored(1, 12, 0.3),
    ];

    let stats = aggregate_for_job(&items, 1).expect("job 1 has matches");

    assert_eq!(stats.total_count, 3);
    assert!((stats.average_score - 0.5667).abs() < 1e-4);
    assert_eq!(
        stats.band_counts,
        BandCounts {
            high: 1,
            medium: 1,
            low: 1
        }
    );
}

#[test]
fn no_matching_items_means_no_statistics() {
    let items = vec![scored(1, 10, 0.8)];

    assert!(aggregate_for_job(&items, 99).is_none());
    assert!(aggregate_for_job(&Vec::<MatchResult>::new(), 1).is_none());
}

#[test]
fn candidate_stats_use_the_cv_side() {
    let items = vec![scored(1, 10, 0.4), scored(2, 10, 0.6), scored(3, 11, 1.0)];

    let stats = aggregate_for_candidate(&items, 10).expect("cv 10 has matches");

    assert_eq!(stats.total_count, 2);
    assert!((stats.average_score - 0.5).abs() < 1e-9);
}

#[test]
fn result_does_not_depend_on_order() {
    let forward = vec![scored(1, 1, 0.2), scored(1, 2, 0.75), scored(1, 3, 0.5)];
    let mut reversed = forward.clone();
    reversed.reverse();

    let a = aggregate_by(&forward, |_| true).expect("non-empty");
    let b = aggregate_by(&reversed, |_| true).expect("non-empty");

    assert_eq!(a.band_counts, b.band_counts);
    assert!((a.average_score - b.average_score).abs() < 1e-12);
}

#[test]
fn band_lower_bounds_are_inclusive() {
    assert_eq!(ScoreBand::classify(0.7), ScoreBand::High);
    assert_eq!(ScoreBand::classify(0.69), ScoreBand::Medium);
    assert_eq!(ScoreBand::classify(0.5), ScoreBand::Medium);
    assert_eq!(ScoreBand::classify(0.49), ScoreBand::Low);
    assert_eq!(ScoreBand::classify(0.0), ScoreBand::Low);
    assert_eq!(ScoreBand::classify(1.0).label(), "high");
}

#[test]
fn scores_render_as_rounded_percentages() {
    assert_eq!(format_score(0.8), "80%");
    assert_eq!(format_score(0.456), "46%");
    assert_eq!(format_score(0.0), "0%");
}
