use std::sync::{Arc, Mutex};
use std::time::Duration;

use std::collections::BTreeMap;

use cvmatch_core::{
    Collection, FetchParams, JobDraft, LoadError, MatchLookup, SelectedFile, UploadTarget,
    DOCX_MIME_TYPE,
};
use cvmatch_engine::{
    ApiClient, ClientSettings, EngineEvent, FailureKind, ProgressSink, ReqwestApiClient,
    UploadProgress,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn client_for(server: &MockServer) -> ReqwestApiClient {
    ReqwestApiClient::new(ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    })
    .expect("client")
}

fn params(page: u32) -> FetchParams {
    FetchParams {
        page,
        ordering: "-processed_at".to_string(),
        search: None,
    }
}

#[tokio::test]
async fn page_request_sends_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cvs/"))
        .and(query_param("page", "2"))
        .and(query_param("ordering", "-processed_at"))
        .and(query_param("search", "rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 11,
            "results": [{ "id": 11, "name": "Ada" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut request = params(2);
    request.search = Some("rust".to_string());

    let body = client
        .fetch_page(Collection::Candidates, &request)
        .await
        .expect("page");
    assert_eq!(body["count"], json!(11));
}

#[tokio::test]
async fn http_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_page(Collection::Jobs, &params(1))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
}

#[tokio::test]
async fn non_json_body_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/matches/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_page(Collection::Matches, &params(1))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/statistics/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({})),
        )
        .mount(&server)
        .await;

    let client = ReqwestApiClient::new(ClientSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..ClientSettings::default()
    })
    .expect("client");

    let err = client.fetch_statistics().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn lookup_hits_the_lookup_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cvs/4/find_best_job/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total_score": 0.9 })))
        .expect(1)
        .mount(&server)
        .await;

    let body = client_for(&server)
        .fetch_lookup(MatchLookup::BestJob(4))
        .await
        .expect("lookup");
    assert_eq!(body["total_score"], json!(0.9));
}

#[tokio::test]
async fn delete_targets_the_item_path() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/jobs/9/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .delete(Collection::Jobs, 9)
        .await
        .expect("deleted");
}

#[tokio::test]
async fn upload_posts_multipart_and_reports_rising_progress() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/cvs/"))
        .and(body_string_contains("name=\"file\"; filename=\"ada.docx\""))
        .and(body_string_contains("name=\"name\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ReqwestApiClient::new(ClientSettings {
        base_url: server.uri(),
        upload_chunk_size: 4,
        ..ClientSettings::default()
    })
    .expect("client");
    let file = SelectedFile::new("ada.docx", DOCX_MIME_TYPE, b"0123456789".to_vec())
        .with_field("name", "Ada");
    let sink = TestSink::new();

    client
        .upload(UploadTarget::Cvs, 0, &file, &sink)
        .await
        .expect("uploaded");

    let percents = sink
        .take()
        .into_iter()
        .filter_map(|event| match event {
            EngineEvent::UploadProgress(UploadProgress { task_id: 0, percent, .. }) => {
                Some(percent)
            }
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(percents, vec![40, 80, 100]);
}

#[tokio::test]
async fn rejected_upload_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jobs/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "bad file" })))
        .mount(&server)
        .await;

    let file = SelectedFile::new("job.docx", DOCX_MIME_TYPE, b"job".to_vec());
    let err = client_for(&server)
        .upload(UploadTarget::Jobs, 3, &file, &TestSink::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(400));
}

#[test]
fn malformed_base_url_is_rejected() {
    let err = ReqwestApiClient::new(ClientSettings {
        base_url: "not a url".to_string(),
        ..ClientSettings::default()
    })
    .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}

#[tokio::test]
async fn candidate_detail_reads_the_item_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cvs/5/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5,
            "name": "Ada",
            "content": "Analytical engines"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let body = client_for(&server).fetch_candidate(5).await.expect("candidate");
    assert_eq!(body["name"], json!("Ada"));
}

#[tokio::test]
async fn missing_candidate_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cvs/404/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_candidate(404)
        .await
        .expect_err("404");
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
    assert!(matches!(err.into_load_error(), LoadError::NotFound(_)));
}

#[tokio::test]
async fn job_creation_posts_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jobs/"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "title": "Engineer",
            "content": "Build APIs",
            "industry": "IT",
            "technical_skills": { "rust": 80.0 }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 42,
            "title": "Engineer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let draft = JobDraft {
        title: "Engineer".to_string(),
        content: "Build APIs".to_string(),
        industry: "IT".to_string(),
        technical_skills: BTreeMap::from([("rust".to_string(), 80.0)]),
    };
    let stored = client_for(&server).create_job(&draft).await.expect("created");
    assert_eq!(stored["id"], json!(42));
}
