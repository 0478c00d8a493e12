//! Request targets for every REST resource, relative to the `/api` base.
//!
//! These are pure functions: the same arguments always yield the same
//! target. Path segments taken from caller input are percent-encoded.

use urlencoding::encode;

use crate::models::EntityKind;
use crate::query::{
    AppListQuery, Filter, JobListQuery, QueryParams, RequestTarget, SqlListQuery, StageListQuery,
    TaskListQuery,
};

fn app_path(app_id: &str) -> String {
    format!("/apps/{}", encode(app_id))
}

fn stage_path(app_id: &str, stage_id: i64) -> String {
    format!("{}/stages/{stage_id}", app_path(app_id))
}

fn job_path(app_id: &str, job_id: i64) -> String {
    format!("{}/jobs/{job_id}", app_path(app_id))
}

fn attempt_query(attempt_id: Option<u32>) -> QueryParams {
    QueryParams::new().filters(&[Filter::Attempt("attemptId", attempt_id)])
}

pub fn list_apps(query: &AppListQuery) -> RequestTarget {
    RequestTarget::new("/apps").with_query(query.params())
}

pub fn app(app_id: &str) -> RequestTarget {
    RequestTarget::new(app_path(app_id))
}

pub fn list_jobs(app_id: &str, query: &JobListQuery) -> RequestTarget {
    RequestTarget::new(format!("{}/jobs", app_path(app_id))).with_query(query.params())
}

pub fn job(app_id: &str, job_id: i64) -> RequestTarget {
    RequestTarget::new(job_path(app_id, job_id))
}

pub fn job_stages(app_id: &str, job_id: i64) -> RequestTarget {
    RequestTarget::new(format!("{}/stages", job_path(app_id, job_id)))
}

pub fn job_executor_summary(app_id: &str, job_id: i64) -> RequestTarget {
    RequestTarget::new(format!("{}/executor-summary", job_path(app_id, job_id)))
}

pub fn list_stages(app_id: &str, query: &StageListQuery) -> RequestTarget {
    RequestTarget::new(format!("{}/stages", app_path(app_id))).with_query(query.params())
}

/// A single stage. Without `attempt_id` the backend returns the latest attempt.
pub fn stage(app_id: &str, stage_id: i64, attempt_id: Option<u32>) -> RequestTarget {
    RequestTarget::new(stage_path(app_id, stage_id)).with_query(attempt_query(attempt_id))
}

pub fn list_tasks(app_id: &str, stage_id: i64, query: &TaskListQuery) -> RequestTarget {
    RequestTarget::new(format!("{}/tasks", stage_path(app_id, stage_id)))
        .with_query(query.params())
}

/// Summary statistics; the attempt is part of the path and always required.
pub fn stage_stats(app_id: &str, stage_id: i64, attempt_id: u32) -> RequestTarget {
    RequestTarget::new(format!(
        "{}/{attempt_id}/stats",
        stage_path(app_id, stage_id)
    ))
}

pub fn stage_executor_summary(
    app_id: &str,
    stage_id: i64,
    attempt_id: Option<u32>,
) -> RequestTarget {
    RequestTarget::new(format!(
        "{}/executor-summary",
        stage_path(app_id, stage_id)
    ))
    .with_query(attempt_query(attempt_id))
}

pub fn stage_timeline(app_id: &str, stage_id: i64, attempt_id: Option<u32>) -> RequestTarget {
    RequestTarget::new(format!("{}/timeline", stage_path(app_id, stage_id)))
        .with_query(attempt_query(attempt_id))
}

pub fn executors(app_id: &str) -> RequestTarget {
    RequestTarget::new(format!("{}/executors", app_path(app_id)))
}

pub fn environment(app_id: &str) -> RequestTarget {
    RequestTarget::new(format!("{}/environment", app_path(app_id)))
}

pub fn report(app_id: &str) -> RequestTarget {
    RequestTarget::new(format!("{}/report", app_path(app_id)))
}

/// LLM-generated diagnosis. `force` bypasses the backend's cached report.
pub fn llm_report(app_id: &str, force: bool) -> RequestTarget {
    RequestTarget::new(format!("{}/llm-report", app_path(app_id)))
        .with_query(QueryParams::new().filters(&[Filter::Flag("force", force)]))
}

pub fn list_sql(app_id: &str, query: &SqlListQuery) -> RequestTarget {
    RequestTarget::new(format!("{}/sql", app_path(app_id))).with_query(query.params())
}

pub fn sql_execution(app_id: &str, execution_id: i64) -> RequestTarget {
    RequestTarget::new(format!("{}/sql/{execution_id}", app_path(app_id)))
}

pub fn storage(app_id: &str) -> RequestTarget {
    RequestTarget::new(format!("{}/storage", app_path(app_id)))
}

pub fn storage_blocks(app_id: &str, rdd_id: i64) -> RequestTarget {
    RequestTarget::new(format!("{}/storage/{rdd_id}", app_path(app_id)))
}

/// Application-level comparison of exactly two runs.
pub fn compare(app_id1: &str, app_id2: &str) -> RequestTarget {
    let mut query = QueryParams::new();
    query.push("appId1", encode(app_id1));
    query.push("appId2", encode(app_id2));
    RequestTarget::new("/compare").with_query(query)
}

/// Item-level comparison of two apps, jobs or stages.
pub fn compare_items(
    kind: EntityKind,
    source: (&str, &str),
    target: (&str, &str),
) -> RequestTarget {
    let mut query = QueryParams::new();
    query.push("type", kind.as_str());
    query.push("app1", encode(source.0));
    query.push("id1", encode(source.1));
    query.push("app2", encode(target.0));
    query.push("id2", encode(target.1));
    RequestTarget::new("/compare/result").with_query(query)
}
