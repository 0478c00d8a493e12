//! Declarative registry of task/stage metrics.

use std::sync::LazyLock;

use serde::Serialize;

/// How a metric value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MetricKind {
    /// Milliseconds.
    Time,
    /// Byte count.
    Bytes,
    /// Nanoseconds.
    Nanos,
    /// Plain count.
    Number,
    /// Label over a byte-count field and a record-count field. Has no value
    /// of its own.
    Composite {
        bytes: &'static str,
        records: &'static str,
    },
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Bytes => "bytes",
            Self::Nanos => "nanos",
            Self::Number => "number",
            Self::Composite { .. } => "composite",
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Composite { .. })
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricDef {
    pub key: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub kind: MetricKind,
}

impl MetricDef {
    const fn scalar(key: &'static str, label: &'static str, kind: MetricKind) -> Self {
        Self { key, label, kind }
    }

    const fn composite(
        key: &'static str,
        label: &'static str,
        bytes: &'static str,
        records: &'static str,
    ) -> Self {
        Self {
            key,
            label,
            kind: MetricKind::Composite { bytes, records },
        }
    }

    /// Sub-fields of a composite metric with the kind each resolves to.
    /// `None` for scalar metrics.
    pub fn sub_keys(&self) -> Option<[(&'static str, MetricKind); 2]> {
        match self.kind {
            MetricKind::Composite { bytes, records } => {
                Some([(bytes, MetricKind::Bytes), (records, MetricKind::Number)])
            }
            MetricKind::Time | MetricKind::Bytes | MetricKind::Nanos | MetricKind::Number => None,
        }
    }

    /// Field names this metric occupies in backend requests and responses.
    pub fn field_keys(&self) -> Vec<&'static str> {
        match self.kind {
            MetricKind::Composite { bytes, records } => vec![bytes, records],
            MetricKind::Time | MetricKind::Bytes | MetricKind::Nanos | MetricKind::Number => {
                vec![self.key]
            }
        }
    }
}

/// Every metric the backend knows about, in display order.
pub const AVAILABLE_METRICS: &[MetricDef] = &[
    MetricDef::scalar(
        "task_deserialization_time",
        "Task Deserialization Time",
        MetricKind::Time,
    ),
    MetricDef::scalar("duration", "Duration", MetricKind::Time),
    MetricDef::scalar("gc_time", "GC Time", MetricKind::Time),
    MetricDef::scalar(
        "result_serialization_time",
        "Result Serialization Time",
        MetricKind::Time,
    ),
    MetricDef::scalar("getting_result_time", "Getting Result Time", MetricKind::Time),
    MetricDef::scalar("scheduler_delay", "Scheduler Delay", MetricKind::Time),
    MetricDef::scalar(
        "peak_execution_memory",
        "Peak Execution Memory",
        MetricKind::Bytes,
    ),
    MetricDef::scalar("memory_spill", "Spill (memory)", MetricKind::Bytes),
    MetricDef::scalar("disk_spill", "Spill (disk)", MetricKind::Bytes),
    MetricDef::composite("input", "Input Size / Records", "input_bytes", "input_records"),
    MetricDef::composite(
        "output",
        "Output Size / Records",
        "output_bytes",
        "output_records",
    ),
    MetricDef::composite(
        "shuffle_read",
        "Shuffle Read Size / Records",
        "shuffle_read_bytes",
        "shuffle_read_records",
    ),
    MetricDef::composite(
        "shuffle_write",
        "Shuffle Write Size / Records",
        "shuffle_write_bytes",
        "shuffle_write_records",
    ),
    MetricDef::scalar("shuffle_write_time", "Shuffle Write Time", MetricKind::Nanos),
];

/// All catalog keys in catalog order.
pub static DEFAULT_METRICS: LazyLock<Vec<&'static str>> =
    LazyLock::new(|| AVAILABLE_METRICS.iter().map(|m| m.key).collect());

/// Look up a catalog entry by key.
pub fn find(key: &str) -> Option<&'static MetricDef> {
    AVAILABLE_METRICS.iter().find(|m| m.key == key)
}

/// Whether `key` may be sent to or read from the backend as a field name.
///
/// Scalar catalog keys and composite sub-keys are requestable; composite
/// keys themselves and unknown keys are not.
pub fn is_requestable(key: &str) -> bool {
    AVAILABLE_METRICS
        .iter()
        .any(|m| m.field_keys().contains(&key))
}

/// Resolve a user-facing metric selection into backend field names.
///
/// Composites expand to their sub-keys, unknown keys are dropped (they are
/// local/derived-only), order is preserved and duplicates collapse.
pub fn request_fields<'a, I>(keys: I) -> Vec<&'static str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut fields: Vec<&'static str> = Vec::new();
    for key in keys {
        let resolved = match find(key) {
            Some(def) => def.field_keys(),
            None => match sub_key(key) {
                Some(field) => vec![field],
                None => {
                    tracing::debug!(key, "dropping metric key unknown to the catalog");
                    continue;
                }
            },
        };
        for field in resolved {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
    }
    fields
}

fn sub_key(key: &str) -> Option<&'static str> {
    AVAILABLE_METRICS
        .iter()
        .filter_map(MetricDef::sub_keys)
        .flatten()
        .map(|(field, _)| field)
        .find(|field| *field == key)
}
