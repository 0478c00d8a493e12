use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::{ApiError, ApiResult};
use crate::guard::{Navigator, TransportGuard};
use crate::models::{
    App, ComparisonResult, EntityKind, EnvironmentConfig, Executor, ExecutorSummaryRow, Job,
    PageResponse, SqlExecution, Stage, StageStatistics, StorageBlock, StorageRdd, Task,
};
use crate::query::{
    AppListQuery, JobListQuery, RequestTarget, SqlListQuery, StageListQuery, TaskListQuery,
};
use crate::routes;

/// Prefix every REST resource lives under.
pub const API_PREFIX: &str = "/api";

/// Async client for the Spark Insight REST API.
///
/// Requests are sent as-is with no retries. A 503 from any endpoint goes
/// through the [`TransportGuard`] before the error reaches the caller.
#[derive(Debug, Clone)]
pub struct InsightClient {
    http: reqwest::Client,
    api_base: String,
    guard: TransportGuard,
}

impl InsightClient {
    /// Client for the backend at `base_url` (e.g. `http://localhost:8080`).
    pub fn new(base_url: &str, navigator: Arc<dyn Navigator>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, navigator)
    }

    /// Client with a caller-provided HTTP client.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            http,
            api_base: format!("{}{API_PREFIX}", base_url.trim_end_matches('/')),
            guard: TransportGuard::new(navigator),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Absolute URL for a request target.
    pub fn url_for(&self, target: &RequestTarget) -> String {
        format!("{}{target}", self.api_base)
    }

    async fn get_text(&self, target: &RequestTarget) -> ApiResult<String> {
        let url = self.url_for(target);
        tracing::debug!(request = %target, "GET");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.guard.reject(status.as_u16(), body));
        }
        Ok(response.text().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, target: &RequestTarget) -> ApiResult<T> {
        let text = self.get_text(target).await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Parse {
            target: target.to_string(),
            message: e.to_string(),
        })
    }

    pub async fn list_apps(&self, query: &AppListQuery) -> ApiResult<PageResponse<App>> {
        self.get_json(&routes::list_apps(query)).await
    }

    pub async fn get_app(&self, app_id: &str) -> ApiResult<App> {
        self.get_json(&routes::app(app_id)).await
    }

    pub async fn list_jobs(
        &self,
        app_id: &str,
        query: &JobListQuery,
    ) -> ApiResult<PageResponse<Job>> {
        self.get_json(&routes::list_jobs(app_id, query)).await
    }

    pub async fn get_job(&self, app_id: &str, job_id: i64) -> ApiResult<Job> {
        self.get_json(&routes::job(app_id, job_id)).await
    }

    pub async fn job_stages(&self, app_id: &str, job_id: i64) -> ApiResult<Vec<Stage>> {
        self.get_json(&routes::job_stages(app_id, job_id)).await
    }

    pub async fn job_executor_summary(
        &self,
        app_id: &str,
        job_id: i64,
    ) -> ApiResult<Vec<ExecutorSummaryRow>> {
        self.get_json(&routes::job_executor_summary(app_id, job_id))
            .await
    }

    pub async fn list_stages(
        &self,
        app_id: &str,
        query: &StageListQuery,
    ) -> ApiResult<PageResponse<Stage>> {
        self.get_json(&routes::list_stages(app_id, query)).await
    }

    pub async fn get_stage(
        &self,
        app_id: &str,
        stage_id: i64,
        attempt_id: Option<u32>,
    ) -> ApiResult<Stage> {
        self.get_json(&routes::stage(app_id, stage_id, attempt_id))
            .await
    }

    pub async fn list_tasks(
        &self,
        app_id: &str,
        stage_id: i64,
        query: &TaskListQuery,
    ) -> ApiResult<PageResponse<Task>> {
        self.get_json(&routes::list_tasks(app_id, stage_id, query))
            .await
    }

    pub async fn stage_stats(
        &self,
        app_id: &str,
        stage_id: i64,
        attempt_id: u32,
    ) -> ApiResult<Vec<StageStatistics>> {
        self.get_json(&routes::stage_stats(app_id, stage_id, attempt_id))
            .await
    }

    pub async fn stage_executor_summary(
        &self,
        app_id: &str,
        stage_id: i64,
        attempt_id: Option<u32>,
    ) -> ApiResult<Vec<ExecutorSummaryRow>> {
        self.get_json(&routes::stage_executor_summary(
            app_id, stage_id, attempt_id,
        ))
        .await
    }

    /// Task rows for the stage's timeline view.
    pub async fn stage_timeline(
        &self,
        app_id: &str,
        stage_id: i64,
        attempt_id: Option<u32>,
    ) -> ApiResult<Vec<Task>> {
        self.get_json(&routes::stage_timeline(app_id, stage_id, attempt_id))
            .await
    }

    pub async fn executors(&self, app_id: &str) -> ApiResult<Vec<Executor>> {
        self.get_json(&routes::executors(app_id)).await
    }

    pub async fn environment(&self, app_id: &str) -> ApiResult<Vec<EnvironmentConfig>> {
        self.get_json(&routes::environment(app_id)).await
    }

    /// Diagnosis report as markdown.
    pub async fn report(&self, app_id: &str) -> ApiResult<String> {
        self.get_text(&routes::report(app_id)).await
    }

    /// LLM-written diagnosis as markdown.
    pub async fn llm_report(&self, app_id: &str, force: bool) -> ApiResult<String> {
        self.get_text(&routes::llm_report(app_id, force)).await
    }

    pub async fn list_sql(
        &self,
        app_id: &str,
        query: &SqlListQuery,
    ) -> ApiResult<PageResponse<SqlExecution>> {
        self.get_json(&routes::list_sql(app_id, query)).await
    }

    pub async fn get_sql(&self, app_id: &str, execution_id: i64) -> ApiResult<SqlExecution> {
        self.get_json(&routes::sql_execution(app_id, execution_id))
            .await
    }

    pub async fn storage(&self, app_id: &str) -> ApiResult<Vec<StorageRdd>> {
        self.get_json(&routes::storage(app_id)).await
    }

    pub async fn storage_blocks(&self, app_id: &str, rdd_id: i64) -> ApiResult<Vec<StorageBlock>> {
        self.get_json(&routes::storage_blocks(app_id, rdd_id)).await
    }

    /// Backend diff of two whole applications.
    pub async fn compare(&self, app_id1: &str, app_id2: &str) -> ApiResult<ComparisonResult> {
        self.get_json(&routes::compare(app_id1, app_id2)).await
    }

    /// Backend diff of two apps, jobs or stages. Each side is `(app_id, item_id)`.
    pub async fn compare_items(
        &self,
        kind: EntityKind,
        source: (&str, &str),
        target: (&str, &str),
    ) -> ApiResult<ComparisonResult> {
        self.get_json(&routes::compare_items(kind, source, target))
            .await
    }
}
