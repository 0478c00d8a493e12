#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::sync::Mutex;

use insight_client::ApiError;
use insight_client::EntityKind;
use insight_client::InsightClient;
use insight_client::JobListQuery;
use insight_client::Navigation;
use insight_client::Navigator;
use insight_client::PageRequest;
use insight_client::StageListQuery;
use insight_client::TaskListQuery;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::matchers::query_param;
use wiremock::matchers::query_param_is_missing;

/// Keeps every redirect the guard raises.
#[derive(Default)]
struct RecordingNavigator {
    seen: Mutex<Vec<Navigation>>,
}

impl RecordingNavigator {
    fn navigations(&self) -> Vec<Navigation> {
        self.seen.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, navigation: Navigation) {
        self.seen.lock().unwrap().push(navigation);
    }
}

async fn client(server: &MockServer) -> (Arc<RecordingNavigator>, InsightClient) {
    let navigator = Arc::new(RecordingNavigator::default());
    let client = InsightClient::new(&server.uri(), navigator.clone());
    (navigator, client)
}

#[tokio::test]
async fn service_unavailable_redirects_and_still_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/apps/app-1/jobs"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "status": 503,
            "error": "Service Unavailable",
            "message": "Still parsing event log",
            "code": "APP_PARSING",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (navigator, client) = client(&server).await;
    let err = client
        .list_jobs("app-1", &JobListQuery::default())
        .await
        .unwrap_err();

    match err {
        ApiError::ServiceUnavailable { message, .. } => {
            assert_eq!(message, "Still parsing event log");
        }
        other => panic!("expected ServiceUnavailable, got {other:?}"),
    }
    assert_eq!(
        navigator.navigations(),
        vec![Navigation {
            path: "/".to_string(),
            message: "Still parsing event log".to_string(),
        }]
    );
}

#[tokio::test]
async fn not_found_passes_through_without_navigation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/apps/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such app"))
        .mount(&server)
        .await;

    let (navigator, client) = client(&server).await;
    let err = client.get_app("missing").await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(!err.is_processing());
    assert!(navigator.navigations().is_empty());
}

#[tokio::test]
async fn list_stages_sends_filters_and_decodes_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/apps/app-1/stages"))
        .and(query_param("page", "2"))
        .and(query_param("size", "50"))
        .and(query_param("sort", "-duration"))
        .and(query_param("jobId", "7"))
        .and(query_param_is_missing("stageId"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"appId": "app-1", "stageId": 12, "jobId": 7, "attemptId": 0, "duration": 4200},
                {"appId": "app-1", "stageId": 13, "jobId": 7, "attemptId": 1}
            ],
            "total": 52,
            "page": 2,
            "size": 50,
            "totalPages": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (_, client) = client(&server).await;
    let query = StageListQuery {
        page: PageRequest::new(2, 50).with_sort("-duration"),
        job_id: Some(7),
        stage_id: None,
    };
    let page = client.list_stages("app-1", &query).await.unwrap();

    assert_eq!(page.total, 52);
    assert!(!page.has_next());
    let ids: Vec<i64> = page.items.iter().map(|s| s.stage_id).collect();
    assert_eq!(ids, vec![12, 13]);
    assert_eq!(page.items[0].duration, Some(4200));
}

#[tokio::test]
async fn job_group_is_sent_encoded_and_attempt_omitted_when_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/apps/app-1/jobs"))
        .and(query_param("jobGroup", "nightly etl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [], "total": 0})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/apps/app-1/stages/4/tasks"))
        .and(query_param_is_missing("attemptId"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [], "total": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let (_, client) = client(&server).await;
    let jobs = JobListQuery {
        job_group: Some("nightly etl".to_string()),
        ..Default::default()
    };
    assert!(client.list_jobs("app-1", &jobs).await.unwrap().items.is_empty());
    assert!(
        client
            .list_tasks("app-1", 4, &TaskListQuery::default())
            .await
            .unwrap()
            .items
            .is_empty()
    );
}

#[tokio::test]
async fn report_is_returned_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/apps/app-1/report"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# Diagnosis\n\nAll good."))
        .mount(&server)
        .await;

    let (_, client) = client(&server).await;
    assert_eq!(client.report("app-1").await.unwrap(), "# Diagnosis\n\nAll good.");
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/apps/app-1/executors"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let (navigator, client) = client(&server).await;
    let err = client.executors("app-1").await.unwrap_err();

    match err {
        ApiError::Parse { target, .. } => assert_eq!(target, "/apps/app-1/executors"),
        other => panic!("expected Parse, got {other:?}"),
    }
    assert!(navigator.navigations().is_empty());
}

#[tokio::test]
async fn compare_items_uses_result_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/compare/result"))
        .and(query_param("type", "stage"))
        .and(query_param("app1", "app-1"))
        .and(query_param("id1", "3"))
        .and(query_param("app2", "app-2"))
        .and(query_param("id2", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "STAGE",
            "conclusionType": "IMPROVED",
            "keyMetrics": [{"name": "duration", "sourceValue": 10.0, "targetValue": 5.0}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (_, client) = client(&server).await;
    let result = client
        .compare_items(EntityKind::Stage, ("app-1", "3"), ("app-2", "5"))
        .await
        .unwrap();
    assert_eq!(result.conclusion_type.as_deref(), Some("IMPROVED"));
    assert_eq!(result.key_metrics.len(), 1);
}

#[tokio::test]
async fn compare_apps_returns_diff() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/compare"))
        .and(query_param("appId1", "app-1"))
        .and(query_param("appId2", "app-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "app",
            "source": {"id": "app-1", "appId": "app-1", "duration": 60000},
            "target": {"id": "app-2", "appId": "app-2", "duration": 45000},
            "conclusion": "Performance Improved by 25%",
            "keyMetrics": null,
            "configDiffs": [{"category": "spark", "key": "spark.executor.memory", "sourceValue": "4g", "targetValue": "8g"}],
            "skewDiff": null,
            "stageListDiff": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (_, client) = client(&server).await;
    let result = client.compare("app-1", "app-2").await.unwrap();
    assert_eq!(result.kind.as_deref(), Some("app"));
    assert_eq!(
        result.target.and_then(|t| t.app_id).as_deref(),
        Some("app-2")
    );
    assert_eq!(result.config_diffs[0].target_value.as_deref(), Some("8g"));
    assert!(result.key_metrics.is_empty());
    assert!(result.stage_list_diff.is_empty());
}
