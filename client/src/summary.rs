//! Ordering of per-stage metric distributions for the summary table.

use insight_metrics::{MetricDef, MetricKind, find, request_fields};

use crate::models::StageStatistics;

/// One row of the stage summary table.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow<'a> {
    /// Field name the row was matched on.
    pub field: &'static str,
    pub label: String,
    /// Kind used to render each quantile.
    pub kind: MetricKind,
    pub stats: &'a StageStatistics,
}

/// Arrange `stats` in the order of `metric_keys`.
///
/// Composite keys expand to their bytes and records rows. Keys unknown to the
/// catalog and metrics the backend did not return are skipped.
pub fn summary_rows<'a, 'k, I>(stats: &'a [StageStatistics], metric_keys: I) -> Vec<SummaryRow<'a>>
where
    I: IntoIterator<Item = &'k str>,
{
    request_fields(metric_keys)
        .into_iter()
        .filter_map(|field| {
            let row = stats.iter().find(|s| s.metric_name == field)?;
            let (label, kind) = describe(field)?;
            Some(SummaryRow {
                field,
                label,
                kind,
                stats: row,
            })
        })
        .collect()
}

fn describe(field: &str) -> Option<(String, MetricKind)> {
    if let Some(def) = find(field) {
        return Some((def.label.to_string(), def.kind));
    }
    insight_metrics::AVAILABLE_METRICS
        .iter()
        .find_map(|def: &MetricDef| {
            let [(bytes, bytes_kind), (records, records_kind)] = def.sub_keys()?;
            if field == bytes {
                Some((format!("{} (size)", def.label), bytes_kind))
            } else if field == records {
                Some((format!("{} (records)", def.label), records_kind))
            } else {
                None
            }
        })
}
