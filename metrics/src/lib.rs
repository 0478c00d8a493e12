//! Metric catalog for Spark Insight.
//!
//! The catalog is the single source of truth for which numeric fields the
//! query layer may request and how renderers interpret them. Composite
//! metrics are display groupings only: expand them with
//! [`request_fields`] before using them as field names.
//!
//! [`EntityKind`] also lives here so the comparison workspace can key on it
//! without depending on the HTTP client.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod catalog;
pub mod entity;
pub mod format;

pub use catalog::{
    AVAILABLE_METRICS, DEFAULT_METRICS, MetricDef, MetricKind, find, is_requestable,
    request_fields,
};
pub use entity::EntityKind;
pub use format::{
    format_bytes, format_compact_num, format_date_time, format_epoch_millis, format_metric,
    format_num, format_time, format_value,
};
