//! Response shapes served by the Spark Insight backend.
//!
//! Field names follow the backend's camelCase JSON. Every struct tolerates
//! missing fields so older backends keep deserializing.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

pub use insight_metrics::EntityKind;

/// Reads an explicit `null` as the type's default.
///
/// The backend serializes unset fields as `null` rather than omitting them,
/// and `#[serde(default)]` only covers omitted ones.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub total_pages: u32,
}

impl<T> Default for PageResponse<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            size: 0,
            total_pages: 0,
        }
    }
}

impl<T> PageResponse<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// One monitored run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct App {
    #[serde(deserialize_with = "null_as_default")]
    pub app_id: String,
    pub app_name: Option<String>,
    pub user_name: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub duration: Option<i64>,
    pub spark_version: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Job {
    #[serde(deserialize_with = "null_as_default")]
    pub app_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub job_id: i64,
    pub submission_time: Option<NaiveDateTime>,
    pub completion_time: Option<NaiveDateTime>,
    pub duration: Option<i64>,
    pub status: Option<String>,
    pub num_stages: Option<i64>,
    pub num_tasks: Option<i64>,
    /// Comma-separated stage ids.
    pub stage_ids: Option<String>,
    pub description: Option<String>,
    pub job_group: Option<String>,
    pub sql_execution_id: Option<i64>,
    pub num_completed_stages: Option<i64>,
    pub num_failed_stages: Option<i64>,
    pub num_skipped_stages: Option<i64>,
    pub num_completed_tasks: Option<i64>,
    pub num_failed_tasks: Option<i64>,
    pub num_active_tasks: Option<i64>,
    pub num_skipped_tasks: Option<i64>,
    pub stage_list: Option<Vec<Stage>>,
}

impl Job {
    /// Parsed `stage_ids`, skipping blanks and garbage.
    pub fn stage_id_list(&self) -> Vec<i64> {
        self.stage_ids
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Stage {
    #[serde(deserialize_with = "null_as_default")]
    pub app_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub stage_id: i64,
    pub job_id: Option<i64>,
    pub attempt_id: Option<u32>,
    pub stage_name: Option<String>,
    pub status: Option<String>,
    pub num_tasks: Option<i64>,
    pub num_completed_tasks: Option<i64>,
    pub num_failed_tasks: Option<i64>,
    pub submission_time: Option<NaiveDateTime>,
    pub completion_time: Option<NaiveDateTime>,
    pub duration: Option<i64>,
    pub input_bytes: Option<i64>,
    pub input_records: Option<i64>,
    pub output_bytes: Option<i64>,
    pub output_records: Option<i64>,
    pub shuffle_read_bytes: Option<i64>,
    pub shuffle_read_records: Option<i64>,
    pub shuffle_write_bytes: Option<i64>,
    pub shuffle_write_records: Option<i64>,
    pub gc_time_sum: Option<i64>,
    pub tasks_duration_sum: Option<i64>,
    pub peak_execution_memory_max: Option<i64>,
    pub memory_bytes_spilled_sum: Option<i64>,
    pub disk_bytes_spilled_sum: Option<i64>,
    pub shuffle_write_time_sum: Option<i64>,
    pub duration_p50: Option<i64>,
    pub duration_p75: Option<i64>,
    pub duration_p95: Option<i64>,
    pub duration_p99: Option<i64>,
    pub max_task_duration: Option<i64>,
    pub is_skewed: Option<bool>,
    pub parent_stage_ids: Option<String>,
    pub locality_summary: Option<String>,
    /// JSON-encoded diagnosis, left opaque.
    pub diagnosis_info: Option<String>,
    pub performance_score: Option<f64>,
}

/// One task attempt with its raw metric values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Task {
    #[serde(deserialize_with = "null_as_default")]
    pub app_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub stage_id: i64,
    pub attempt_id: Option<u32>,
    #[serde(deserialize_with = "null_as_default")]
    pub task_id: i64,
    pub task_index: Option<i64>,
    pub executor_id: Option<String>,
    pub host: Option<String>,
    /// Epoch milliseconds.
    pub launch_time: Option<i64>,
    /// Epoch milliseconds.
    pub finish_time: Option<i64>,
    pub duration: Option<i64>,
    pub gc_time: Option<i64>,
    pub scheduler_delay: Option<i64>,
    pub getting_result_time: Option<i64>,
    pub executor_deserialize_time: Option<i64>,
    pub executor_run_time: Option<i64>,
    pub result_serialization_time: Option<i64>,
    pub executor_cpu_time: Option<i64>,
    pub peak_execution_memory: Option<i64>,
    pub input_bytes: Option<i64>,
    pub input_records: Option<i64>,
    pub output_bytes: Option<i64>,
    pub output_records: Option<i64>,
    pub memory_bytes_spilled: Option<i64>,
    pub disk_bytes_spilled: Option<i64>,
    pub shuffle_read_bytes: Option<i64>,
    pub shuffle_read_records: Option<i64>,
    pub shuffle_fetch_wait_time: Option<i64>,
    pub shuffle_write_bytes: Option<i64>,
    /// Nanoseconds.
    pub shuffle_write_time: Option<i64>,
    pub shuffle_write_records: Option<i64>,
    pub shuffle_remote_read: Option<i64>,
    pub speculative: Option<bool>,
    pub status: Option<String>,
}

impl Task {
    /// Value of a catalog field (scalar key or composite sub-key).
    pub fn metric(&self, field: &str) -> Option<f64> {
        let raw = match field {
            "task_deserialization_time" => self.executor_deserialize_time,
            "duration" => self.duration,
            "gc_time" => self.gc_time,
            "result_serialization_time" => self.result_serialization_time,
            "getting_result_time" => self.getting_result_time,
            "scheduler_delay" => self.scheduler_delay,
            "peak_execution_memory" => self.peak_execution_memory,
            "memory_spill" => self.memory_bytes_spilled,
            "disk_spill" => self.disk_bytes_spilled,
            "input_bytes" => self.input_bytes,
            "input_records" => self.input_records,
            "output_bytes" => self.output_bytes,
            "output_records" => self.output_records,
            "shuffle_read_bytes" => self.shuffle_read_bytes,
            "shuffle_read_records" => self.shuffle_read_records,
            "shuffle_write_bytes" => self.shuffle_write_bytes,
            "shuffle_write_records" => self.shuffle_write_records,
            "shuffle_write_time" => self.shuffle_write_time,
            _ => None,
        };
        raw.map(|v| v as f64)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Executor {
    #[serde(deserialize_with = "null_as_default")]
    pub app_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub executor_id: String,
    pub host: Option<String>,
    pub total_cores: Option<i64>,
    pub memory: Option<i64>,
    pub is_active: Option<bool>,
}

/// Aggregated per-executor row; columns vary by backend version.
pub type ExecutorSummaryRow = BTreeMap<String, serde_json::Value>;

/// Distribution of one metric across a stage attempt's tasks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StageStatistics {
    #[serde(deserialize_with = "null_as_default")]
    pub app_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub stage_id: i64,
    pub attempt_id: Option<u32>,
    /// Catalog field name (scalar key or composite sub-key).
    #[serde(deserialize_with = "null_as_default")]
    pub metric_name: String,
    pub min_value: Option<i64>,
    pub p25: Option<i64>,
    pub p50: Option<i64>,
    pub p75: Option<i64>,
    pub p95: Option<i64>,
    pub max_value: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnvironmentConfig {
    #[serde(deserialize_with = "null_as_default")]
    pub app_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub param_key: String,
    pub param_value: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SqlExecution {
    #[serde(deserialize_with = "null_as_default")]
    pub app_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub execution_id: i64,
    pub description: Option<String>,
    pub details: Option<String>,
    pub physical_plan: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub duration: Option<i64>,
    pub status: Option<String>,
    pub job_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageRdd {
    #[serde(deserialize_with = "null_as_default")]
    pub app_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub rdd_id: i64,
    pub name: Option<String>,
    pub storage_level: Option<String>,
    pub num_partitions: Option<i64>,
    #[serde(rename = "numCached_partitions", alias = "numCachedPartitions")]
    pub num_cached_partitions: Option<i64>,
    pub memory_size: Option<i64>,
    pub disk_size: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageBlock {
    #[serde(deserialize_with = "null_as_default")]
    pub app_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub rdd_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub block_name: String,
    pub storage_level: Option<String>,
    pub memory_size: Option<i64>,
    pub disk_size: Option<i64>,
    pub executor_id: Option<String>,
    pub host: Option<String>,
}

/// Backend-computed diff between two apps, jobs or stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComparisonResult {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub source: Option<ItemMeta>,
    pub target: Option<ItemMeta>,
    pub conclusion: Option<String>,
    /// `IMPROVED`, `REGRESSED` or `SIMILAR`.
    pub conclusion_type: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub key_metrics: Vec<MetricDiff>,
    #[serde(deserialize_with = "null_as_default")]
    pub config_diffs: Vec<ConfigDiff>,
    pub skew_diff: Option<TaskSkewDiff>,
    #[serde(deserialize_with = "null_as_default")]
    pub stage_list_diff: Vec<StageRefDiff>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemMeta {
    pub id: Option<String>,
    pub name: Option<String>,
    pub app_id: Option<String>,
    pub duration: Option<i64>,
    pub start_time: Option<i64>,
    pub stage_count: Option<i64>,
    pub task_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetricDiff {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub label: Option<String>,
    /// `ms`, `bytes` or `count`.
    pub unit: Option<String>,
    pub source_value: Option<f64>,
    pub target_value: Option<f64>,
    pub delta: Option<f64>,
    pub pct_change: Option<f64>,
    /// `CRITICAL`, `WARNING`, `GOOD` or `NEUTRAL`.
    pub severity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigDiff {
    pub category: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub key: String,
    pub source_value: Option<String>,
    pub target_value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaskSkewDiff {
    pub source_p75: Option<f64>,
    pub target_p75: Option<f64>,
    pub source_p95: Option<f64>,
    pub target_p95: Option<f64>,
    pub source_max: Option<f64>,
    pub target_max: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StageRefDiff {
    pub stage_id: Option<i64>,
    pub name: Option<String>,
    pub source_duration: Option<i64>,
    pub target_duration: Option<i64>,
    pub duration_delta: Option<f64>,
}
