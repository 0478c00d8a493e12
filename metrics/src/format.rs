//! Human-readable rendering of metric values.
//!
//! Absent values render as `-` (or the empty string for compact numbers) so
//! tables stay aligned when the backend omits a field.

use chrono::{DateTime, NaiveDateTime};

use crate::catalog::{MetricDef, MetricKind};

const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a millisecond duration.
pub fn format_time(ms: Option<f64>) -> String {
    let Some(ms) = ms else {
        return "-".to_string();
    };
    if ms < 1.0 {
        return "0 ms".to_string();
    }
    if ms < 1000.0 {
        return format!("{} ms", ms.round());
    }
    let s = ms / 1000.0;
    if s < 60.0 {
        return format!("{s:.2} s");
    }
    if s < 3600.0 {
        let m = (s / 60.0).floor();
        let rs = s % 60.0;
        return format!("{m} min {rs:.2} s");
    }
    let h = (s / 3600.0).floor();
    let m = ((s % 3600.0) / 60.0).floor();
    let rs = s % 60.0;
    format!("{h} h {m} min {rs:.1} s")
}

/// Format a byte count with a 1024 base.
pub fn format_bytes(bytes: Option<f64>) -> String {
    let bytes = match bytes {
        Some(b) if b != 0.0 => b,
        _ => return "-".to_string(),
    };
    let exponent = (bytes.abs().ln() / 1024_f64.ln()).floor();
    let idx = exponent.clamp(0.0, (BYTE_UNITS.len() - 1) as f64) as usize;
    let scaled = bytes / 1024_f64.powi(idx as i32);
    let rendered = format!("{scaled:.1}");
    let rendered = rendered.strip_suffix(".0").unwrap_or(&rendered);
    format!("{rendered} {}", BYTE_UNITS[idx])
}

/// Compact a count to `K`/`M` form. Zero and absent values render empty.
pub fn format_compact_num(num: Option<f64>) -> String {
    match num {
        None => String::new(),
        Some(n) if n == 0.0 => String::new(),
        Some(n) if n >= 1_000_000.0 => format!("{:.1} M", n / 1_000_000.0),
        Some(n) if n >= 1000.0 => format!("{:.1} K", n / 1000.0),
        Some(n) => n.to_string(),
    }
}

/// Format a count with thousands separators, suffixed with the compact form
/// once it reaches four digits.
pub fn format_num(num: Option<f64>) -> String {
    let n = match num {
        Some(n) if n != 0.0 => n,
        _ => return "-".to_string(),
    };
    let exact = group_thousands(n);
    let compact = format_compact_num(Some(n));
    if !compact.is_empty() && n >= 1000.0 {
        format!("{exact} ({compact})")
    } else {
        exact
    }
}

/// Format a backend timestamp.
pub fn format_date_time(t: Option<NaiveDateTime>) -> String {
    match t {
        Some(dt) => dt.format(DATE_TIME_FORMAT).to_string(),
        None => "-".to_string(),
    }
}

/// Format an epoch-millisecond timestamp in UTC. Zero counts as absent.
pub fn format_epoch_millis(ms: Option<i64>) -> String {
    match ms.filter(|ms| *ms != 0).and_then(DateTime::from_timestamp_millis) {
        Some(dt) => dt.format(DATE_TIME_FORMAT).to_string(),
        None => "-".to_string(),
    }
}

/// Render a single raw value of the given kind.
///
/// Composites have no value of their own, so a lone value passed with a
/// composite kind is shown as a plain count.
pub fn format_value(kind: MetricKind, value: Option<f64>) -> String {
    match kind {
        MetricKind::Time => format_time(value),
        MetricKind::Nanos => format_time(value.map(|ns| ns / 1_000_000.0)),
        MetricKind::Bytes => format_bytes(value),
        MetricKind::Number | MetricKind::Composite { .. } => format_num(value),
    }
}

/// Render one catalog metric, reading raw values through `value_of`.
///
/// `value_of` is called with backend field names, so composites look up
/// their two sub-keys rather than their own key.
pub fn format_metric<F>(def: &MetricDef, value_of: F) -> String
where
    F: Fn(&str) -> Option<f64>,
{
    match def.kind {
        MetricKind::Composite { bytes, records } => format!(
            "{} / {}",
            format_bytes(value_of(bytes)),
            format_num(value_of(records))
        ),
        kind @ (MetricKind::Time | MetricKind::Nanos | MetricKind::Bytes | MetricKind::Number) => {
            format_value(kind, value_of(def.key))
        }
    }
}

fn group_thousands(n: f64) -> String {
    let rounded = (n * 1000.0).round() / 1000.0;
    let sign = if rounded < 0.0 { "-" } else { "" };
    let text = format!("{:.3}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find;
    use pretty_assertions::assert_eq;

    #[test]
    fn time_thresholds() {
        assert_eq!(format_time(None), "-");
        assert_eq!(format_time(Some(0.4)), "0 ms");
        assert_eq!(format_time(Some(250.0)), "250 ms");
        assert_eq!(format_time(Some(1500.0)), "1.50 s");
        assert_eq!(format_time(Some(125_000.0)), "2 min 5.00 s");
        assert_eq!(format_time(Some(3_725_000.0)), "1 h 2 min 5.0 s");
    }

    #[test]
    fn bytes_use_binary_units() {
        assert_eq!(format_bytes(None), "-");
        assert_eq!(format_bytes(Some(0.0)), "-");
        assert_eq!(format_bytes(Some(512.0)), "512 B");
        assert_eq!(format_bytes(Some(1024.0)), "1 KB");
        assert_eq!(format_bytes(Some(1536.0)), "1.5 KB");
        assert_eq!(format_bytes(Some(3.0 * 1024.0 * 1024.0 * 1024.0)), "3 GB");
    }

    #[test]
    fn numbers_group_and_compact() {
        assert_eq!(format_num(None), "-");
        assert_eq!(format_num(Some(0.0)), "-");
        assert_eq!(format_num(Some(999.0)), "999");
        assert_eq!(format_num(Some(1234.0)), "1,234 (1.2 K)");
        assert_eq!(format_num(Some(2_500_000.0)), "2,500,000 (2.5 M)");
        assert_eq!(format_compact_num(Some(0.0)), "");
        assert_eq!(format_compact_num(Some(42.0)), "42");
    }

    #[test]
    fn date_times() {
        assert_eq!(format_date_time(None), "-");
        let parsed = NaiveDateTime::parse_from_str("2024-03-01T10:15:30.123", "%Y-%m-%dT%H:%M:%S%.f")
            .ok();
        assert_eq!(format_date_time(parsed), "2024-03-01 10:15:30");
        assert_eq!(format_epoch_millis(Some(0)), "-");
        assert_eq!(format_epoch_millis(Some(1_700_000_000_000)), "2023-11-14 22:13:20");
    }

    #[test]
    fn metric_rendering_matches_kind() {
        let values = |key: &str| match key {
            "duration" => Some(1500.0),
            "shuffle_write_time" => Some(2_000_000.0),
            "input_bytes" => Some(2048.0),
            "input_records" => Some(1200.0),
            _ => None,
        };

        let render = |key: &str| match find(key) {
            Some(def) => format_metric(def, values),
            None => panic!("{key} missing from catalog"),
        };

        assert_eq!(render("duration"), "1.50 s");
        assert_eq!(render("shuffle_write_time"), "2 ms");
        assert_eq!(render("input"), "2 KB / 1,200 (1.2 K)");
        assert_eq!(render("gc_time"), "-");
    }

    #[test]
    fn lone_values_follow_kind() {
        assert_eq!(format_value(MetricKind::Nanos, Some(5_000_000_000.0)), "5.00 s");
        assert_eq!(format_value(MetricKind::Bytes, Some(2048.0)), "2 KB");
        assert_eq!(format_value(MetricKind::Number, Some(12.0)), "12");
    }
}
