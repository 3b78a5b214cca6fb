use cvmatch_core::{
    navigable_pages, total_pages_for, ApplyOutcome, Collection, Job, ListSession, LoadError,
    SortDirection,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn init_logging() {
    cvmatch_logging::initialize_for_tests();
}

fn job(id: u64, title: &str) -> Value {
    json!({ "id": id, "title": title, "content": "", "industry": "IT" })
}

fn counted(ids: &[u64], count: u64) -> Value {
    let results: Vec<Value> = ids.iter().map(|id| job(*id, "Engineer")).collect();
    json!({ "results": results, "count": count })
}

fn loaded_session(count: u64) -> ListSession<Job> {
    let mut session = ListSession::<Job>::new(Collection::Jobs, 10);
    let request = session.refresh();
    let outcome = session.apply_response(request.request_id, Ok(counted(&[1, 2], count)));
    assert_eq!(outcome, ApplyOutcome::Applied);
    session
}

#[test]
fn total_pages_is_ceiling_of_count_over_page_size() {
    for page_size in 1..=12u32 {
        for count in 0..=40u64 {
            let expected = (count + u64::from(page_size) - 1) / u64::from(page_size);
            assert_eq!(u64::from(total_pages_for(count, page_size)), expected);
        }
    }
    assert_eq!(navigable_pages(0), 1);
    assert_eq!(navigable_pages(4), 4);
}

#[test]
fn counted_response_sets_totals() {
    init_logging();
    let session = loaded_session(25);

    assert_eq!(session.items().len(), 2);
    assert_eq!(session.total_count(), 25);
    assert_eq!(session.total_pages(), 3);
    assert!(!session.is_loading());
}

#[test]
fn bare_list_is_a_single_page() {
    init_logging();
    let mut session = ListSession::<Job>::new(Collection::Jobs, 10);
    let request = session.refresh();
    let body = json!([job(1, "a"), job(2, "b"), job(3, "c")]);

    assert_eq!(
        session.apply_response(request.request_id, Ok(body)),
        ApplyOutcome::Applied
    );
    assert_eq!(session.total_pages(), 1);
    assert_eq!(session.total_count(), 3);
    assert_eq!(session.current_page(), 1);
}

#[test]
fn unknown_shape_clears_items_and_reports_format_error() {
    init_logging();
    let mut session = loaded_session(25);
    let request = session.refresh();

    let outcome = session.apply_response(request.request_id, Ok(json!({ "detail": "oops" })));

    assert!(matches!(outcome, ApplyOutcome::FormatError(_)));
    assert!(session.items().is_empty());
    assert_eq!(session.total_pages(), 0);
}

#[test]
fn transport_error_keeps_previous_page() {
    init_logging();
    let mut session = loaded_session(25);
    let request = session.set_page(2).expect("page 2 exists");

    let outcome = session.apply_response(
        request.request_id,
        Err(LoadError::Transport("connection refused".into())),
    );

    assert_eq!(
        outcome,
        ApplyOutcome::TransportError("connection refused".into())
    );
    assert_eq!(session.items().len(), 2);
    assert_eq!(session.total_pages(), 3);
}

#[test]
fn set_page_ignores_out_of_range() {
    init_logging();
    let mut session = loaded_session(25);

    assert!(session.set_page(0).is_none());
    assert!(session.set_page(4).is_none());
    assert_eq!(session.current_page(), 1);

    let request = session.set_page(3).expect("in range");
    assert_eq!(request.params.page, 3);
    assert_eq!(session.current_page(), 3);
}

#[test]
fn empty_collection_still_navigates_to_page_one() {
    init_logging();
    let mut session = ListSession::<Job>::new(Collection::Jobs, 10);
    let request = session.refresh();
    session.apply_response(request.request_id, Ok(counted(&[], 0)));

    assert_eq!(session.total_pages(), 0);
    assert!(session.set_page(1).is_some());
    assert!(session.set_page(2).is_none());
}

#[test]
fn sorting_same_field_toggles_and_new_field_resets() {
    init_logging();
    let mut session = loaded_session(50);
    session.set_page(4).expect("in range");

    let request = session.set_sort("created_at");
    assert_eq!(session.query().sort_direction(), SortDirection::Asc);
    assert_eq!(request.params.ordering, "created_at");
    assert_eq!(request.params.page, 1);

    let request = session.set_sort("created_at");
    assert_eq!(request.params.ordering, "-created_at");

    session.set_sort("created_at");
    let request = session.set_sort("title");
    assert_eq!(session.query().sort_direction(), SortDirection::Desc);
    assert_eq!(request.params.ordering, "-title");
    assert_eq!(session.sort_indicator("title"), Some(SortDirection::Desc));
    assert_eq!(session.sort_indicator("created_at"), None);
}

#[test]
fn search_resets_page_and_is_sent() {
    init_logging();
    let mut session = loaded_session(50);
    session.set_page(3).expect("in range");

    let request = session.set_search_term("rust");

    assert_eq!(request.params.page, 1);
    assert_eq!(request.params.search.as_deref(), Some("rust"));
}

#[test]
fn only_latest_request_is_applied() {
    init_logging();
    let mut session = ListSession::<Job>::new(Collection::Jobs, 10);
    let first = session.set_sort("title");
    let second = session.set_search_term("data");
    assert!(second.request_id > first.request_id);

    let applied = session.apply_response(second.request_id, Ok(counted(&[9], 1)));
    assert_eq!(applied, ApplyOutcome::Applied);

    let late = session.apply_response(first.request_id, Ok(counted(&[1, 2, 3], 30)));
    assert_eq!(late, ApplyOutcome::Stale);
    assert_eq!(session.items()[0].id, 9);
    assert_eq!(session.total_count(), 1);
}

#[test]
fn shrunken_collection_refetches_last_valid_page() {
    init_logging();
    let mut session = loaded_session(50);
    let request = session.set_page(3).expect("in range");

    let outcome = session.apply_response(request.request_id, Ok(counted(&[], 5)));

    let ApplyOutcome::Clamped(refetch) = outcome else {
        panic!("expected a clamped refetch, got {outcome:?}");
    };
    assert_eq!(refetch.params.page, 1);
    assert!(refetch.request_id > request.request_id);
    assert_eq!(session.current_page(), 1);
    assert!(session.items().is_empty());

    let outcome = session.apply_response(refetch.request_id, Ok(counted(&[1, 2, 3, 4, 5], 5)));
    assert_eq!(outcome, ApplyOutcome::Applied);
    assert_eq!(session.items().len(), 5);
}

#[test]
fn empty_result_on_later_page_refetches_page_one() {
    init_logging();
    let mut session = loaded_session(30);
    let request = session.set_page(2).expect("in range");

    let outcome = session.apply_response(request.request_id, Ok(counted(&[], 0)));

    let ApplyOutcome::Clamped(refetch) = outcome else {
        panic!("expected a clamped refetch, got {outcome:?}");
    };
    assert_eq!(refetch.params.page, 1);
}

#[test]
fn pager_window_is_centered_and_shifted_near_the_end() {
    init_logging();
    let mut session = loaded_session(100);
    assert_eq!(session.visible_page_numbers(5), vec![1, 2, 3, 4, 5]);

    let request = session.set_page(6).expect("in range");
    session.apply_response(request.request_id, Ok(counted(&[1], 100)));
    assert_eq!(session.visible_page_numbers(5), vec![4, 5, 6, 7, 8]);

    let request = session.set_page(10).expect("in range");
    session.apply_response(request.request_id, Ok(counted(&[1], 100)));
    assert_eq!(session.visible_page_numbers(5), vec![6, 7, 8, 9, 10]);
}

#[test]
fn removing_an_item_updates_count() {
    init_logging();
    let mut session = loaded_session(2);

    assert!(session.remove_item(1));
    assert!(!session.remove_item(1));
    assert_eq!(session.items().len(), 1);
    assert_eq!(session.total_count(), 1);
}
