//! Plain-text tables for terminal output.

use std::io::{self, Write};

use insight_client::models::{
    App, ComparisonResult, EnvironmentConfig, Executor, ExecutorSummaryRow, ItemMeta, Job,
    SqlExecution, Stage, StorageBlock, StorageRdd, Task,
};
use insight_client::{PageResponse, SummaryRow};
use insight_compare::ComparisonWorkspace;
use insight_compare::StateStorage;
use insight_metrics::{
    AVAILABLE_METRICS, MetricDef, format_bytes, format_date_time, format_epoch_millis,
    format_metric, format_num, format_time, format_value,
};

/// Left-aligned columns padded to the widest cell.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }

        write_line(out, &self.headers, &widths)?;
        for row in &self.rows {
            write_line(out, row, &widths)?;
        }
        Ok(())
    }
}

fn write_line<W: Write>(out: &mut W, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", line.trim_end())
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

fn id<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn ms(value: Option<i64>) -> String {
    format_time(value.map(|v| v as f64))
}

fn bytes(value: Option<i64>) -> String {
    format_bytes(value.map(|v| v as f64))
}

fn count(value: Option<i64>) -> String {
    format_num(value.map(|v| v as f64))
}

pub fn page_footer<W: Write, T>(out: &mut W, page: &PageResponse<T>) -> io::Result<()> {
    writeln!(
        out,
        "page {}/{} ({} total)",
        page.page,
        page.total_pages.max(1),
        page.total
    )
}

pub fn apps<W: Write>(out: &mut W, page: &PageResponse<App>) -> io::Result<()> {
    let mut table = Table::new(["APP ID", "NAME", "USER", "STATUS", "START", "DURATION"]);
    for app in &page.items {
        table.row([
            app.app_id.clone(),
            text(app.app_name.as_deref()),
            text(app.user_name.as_deref()),
            text(app.status.as_deref()),
            format_date_time(app.start_time),
            ms(app.duration),
        ]);
    }
    table.write_to(out)?;
    page_footer(out, page)
}

pub fn app<W: Write>(out: &mut W, app: &App) -> io::Result<()> {
    let mut table = Table::new(["FIELD", "VALUE"]);
    table.row(["app_id".to_string(), app.app_id.clone()]);
    table.row(["name".to_string(), text(app.app_name.as_deref())]);
    table.row(["user".to_string(), text(app.user_name.as_deref())]);
    table.row(["spark_version".to_string(), text(app.spark_version.as_deref())]);
    table.row(["status".to_string(), text(app.status.as_deref())]);
    table.row(["start".to_string(), format_date_time(app.start_time)]);
    table.row(["end".to_string(), format_date_time(app.end_time)]);
    table.row(["duration".to_string(), ms(app.duration)]);
    table.write_to(out)
}

pub fn jobs<W: Write>(out: &mut W, jobs: &[Job]) -> io::Result<()> {
    let mut table = Table::new([
        "JOB", "STATUS", "STAGES", "TASKS", "SUBMITTED", "DURATION", "GROUP", "DESCRIPTION",
    ]);
    for job in jobs {
        table.row([
            job.job_id.to_string(),
            text(job.status.as_deref()),
            id(job.num_stages),
            count(job.num_tasks),
            format_date_time(job.submission_time),
            ms(job.duration),
            text(job.job_group.as_deref()),
            text(job.description.as_deref()),
        ]);
    }
    table.write_to(out)
}

pub fn stages<W: Write>(out: &mut W, stages: &[Stage]) -> io::Result<()> {
    let mut table = Table::new([
        "STAGE", "ATTEMPT", "JOB", "STATUS", "TASKS", "DURATION", "INPUT", "SHUFFLE READ",
        "SHUFFLE WRITE", "NAME",
    ]);
    for stage in stages {
        table.row([
            stage.stage_id.to_string(),
            id(stage.attempt_id),
            id(stage.job_id),
            text(stage.status.as_deref()),
            count(stage.num_tasks),
            ms(stage.duration),
            bytes(stage.input_bytes),
            bytes(stage.shuffle_read_bytes),
            bytes(stage.shuffle_write_bytes),
            text(stage.stage_name.as_deref()),
        ]);
    }
    table.write_to(out)
}

/// Tasks with one column per selected catalog metric.
pub fn tasks<W: Write>(out: &mut W, tasks: &[Task], metrics: &[&MetricDef]) -> io::Result<()> {
    let mut headers = vec![
        "TASK".to_string(),
        "EXECUTOR".to_string(),
        "HOST".to_string(),
        "STATUS".to_string(),
        "LAUNCHED".to_string(),
    ];
    headers.extend(metrics.iter().map(|m| m.label.to_uppercase()));
    let mut table = Table::new(headers);
    for task in tasks {
        let mut row = vec![
            task.task_id.to_string(),
            text(task.executor_id.as_deref()),
            text(task.host.as_deref()),
            text(task.status.as_deref()),
            format_epoch_millis(task.launch_time),
        ];
        row.extend(
            metrics
                .iter()
                .map(|def| format_metric(def, |field| task.metric(field))),
        );
        table.row(row);
    }
    table.write_to(out)
}

pub fn stage_summary<W: Write>(out: &mut W, rows: &[SummaryRow<'_>]) -> io::Result<()> {
    let mut table = Table::new(["METRIC", "MIN", "25TH", "MEDIAN", "75TH", "95TH", "MAX"]);
    for row in rows {
        let s = row.stats;
        let cell = |v: Option<i64>| format_value(row.kind, v.map(|v| v as f64));
        table.row([
            row.label.clone(),
            cell(s.min_value),
            cell(s.p25),
            cell(s.p50),
            cell(s.p75),
            cell(s.p95),
            cell(s.max_value),
        ]);
    }
    table.write_to(out)
}

/// Executor summary columns are backend-defined, so take them from the first row.
pub fn executor_summary<W: Write>(out: &mut W, rows: &[ExecutorSummaryRow]) -> io::Result<()> {
    let Some(first) = rows.first() else {
        return writeln!(out, "no executors");
    };
    let headers: Vec<&String> = first.keys().collect();
    let mut table = Table::new(headers.iter().map(|h| h.to_uppercase()));
    for row in rows {
        table.row(headers.iter().map(|h| match row.get(*h) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => "-".to_string(),
            Some(other) => other.to_string(),
        }));
    }
    table.write_to(out)
}

pub fn executors<W: Write>(out: &mut W, executors: &[Executor]) -> io::Result<()> {
    let mut table = Table::new(["EXECUTOR", "HOST", "CORES", "MEMORY", "ACTIVE"]);
    for e in executors {
        table.row([
            e.executor_id.clone(),
            text(e.host.as_deref()),
            id(e.total_cores),
            bytes(e.memory),
            id(e.is_active),
        ]);
    }
    table.write_to(out)
}

pub fn environment<W: Write>(out: &mut W, entries: &[EnvironmentConfig]) -> io::Result<()> {
    let mut table = Table::new(["CATEGORY", "KEY", "VALUE"]);
    for entry in entries {
        table.row([
            text(entry.category.as_deref()),
            entry.param_key.clone(),
            text(entry.param_value.as_deref()),
        ]);
    }
    table.write_to(out)
}

pub fn sql_executions<W: Write>(out: &mut W, executions: &[SqlExecution]) -> io::Result<()> {
    let mut table = Table::new(["EXECUTION", "STATUS", "START", "DURATION", "JOBS", "DESCRIPTION"]);
    for exec in executions {
        let jobs = exec
            .job_ids
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        table.row([
            exec.execution_id.to_string(),
            text(exec.status.as_deref()),
            format_date_time(exec.start_time),
            ms(exec.duration),
            if jobs.is_empty() { "-".to_string() } else { jobs },
            text(exec.description.as_deref()),
        ]);
    }
    table.write_to(out)
}

pub fn storage<W: Write>(out: &mut W, rdds: &[StorageRdd]) -> io::Result<()> {
    let mut table = Table::new(["RDD", "NAME", "LEVEL", "CACHED", "MEMORY", "DISK"]);
    for rdd in rdds {
        table.row([
            rdd.rdd_id.to_string(),
            text(rdd.name.as_deref()),
            text(rdd.storage_level.as_deref()),
            format!(
                "{}/{}",
                id(rdd.num_cached_partitions),
                id(rdd.num_partitions)
            ),
            bytes(rdd.memory_size),
            bytes(rdd.disk_size),
        ]);
    }
    table.write_to(out)
}

pub fn storage_blocks<W: Write>(out: &mut W, blocks: &[StorageBlock]) -> io::Result<()> {
    let mut table = Table::new(["BLOCK", "LEVEL", "MEMORY", "DISK", "EXECUTOR", "HOST"]);
    for block in blocks {
        table.row([
            block.block_name.clone(),
            text(block.storage_level.as_deref()),
            bytes(block.memory_size),
            bytes(block.disk_size),
            text(block.executor_id.as_deref()),
            text(block.host.as_deref()),
        ]);
    }
    table.write_to(out)
}

fn signed_time(delta: Option<f64>) -> String {
    match delta {
        Some(d) if d < 0.0 => format!("-{}", format_time(Some(-d))),
        Some(d) => format!("+{}", format_time(Some(d))),
        None => "-".to_string(),
    }
}

fn item_meta(meta: Option<&ItemMeta>) -> String {
    let Some(meta) = meta else {
        return "-".to_string();
    };
    let id = meta.id.as_deref().unwrap_or("-");
    match (&meta.app_id, &meta.name) {
        (Some(app), Some(name)) if app != id => format!("{app}/{id} {name}"),
        (Some(app), None) if app != id => format!("{app}/{id}"),
        (_, Some(name)) => format!("{id} {name}"),
        _ => id.to_string(),
    }
}

pub fn comparison<W: Write>(out: &mut W, result: &ComparisonResult) -> io::Result<()> {
    writeln!(
        out,
        "source: {} ({})",
        item_meta(result.source.as_ref()),
        ms(result.source.as_ref().and_then(|m| m.duration))
    )?;
    writeln!(
        out,
        "target: {} ({})",
        item_meta(result.target.as_ref()),
        ms(result.target.as_ref().and_then(|m| m.duration))
    )?;
    if let Some(conclusion) = &result.conclusion {
        writeln!(
            out,
            "{}: {conclusion}",
            result.conclusion_type.as_deref().unwrap_or("RESULT")
        )?;
    }

    if !result.key_metrics.is_empty() {
        writeln!(out)?;
        let mut metrics = Table::new(["METRIC", "SOURCE", "TARGET", "CHANGE", "SEVERITY"]);
        for diff in &result.key_metrics {
            let render = |v: Option<f64>| match diff.unit.as_deref() {
                Some("ms") => format_time(v),
                Some("bytes") => format_bytes(v),
                _ => format_num(v),
            };
            metrics.row([
                diff.label.clone().unwrap_or_else(|| diff.name.clone()),
                render(diff.source_value),
                render(diff.target_value),
                diff.pct_change
                    .map_or_else(|| "-".to_string(), |p| format!("{p:+.1}%")),
                text(diff.severity.as_deref()),
            ]);
        }
        metrics.write_to(out)?;
    }

    if !result.config_diffs.is_empty() {
        writeln!(out)?;
        let mut configs = Table::new(["KEY", "SOURCE", "TARGET"]);
        for diff in &result.config_diffs {
            configs.row([
                diff.key.clone(),
                text(diff.source_value.as_deref()),
                text(diff.target_value.as_deref()),
            ]);
        }
        configs.write_to(out)?;
    }

    if let Some(skew) = &result.skew_diff {
        writeln!(out)?;
        let mut table = Table::new(["TASK DURATION", "SOURCE", "TARGET"]);
        table.row([
            "p75".to_string(),
            format_time(skew.source_p75),
            format_time(skew.target_p75),
        ]);
        table.row([
            "p95".to_string(),
            format_time(skew.source_p95),
            format_time(skew.target_p95),
        ]);
        table.row([
            "max".to_string(),
            format_time(skew.source_max),
            format_time(skew.target_max),
        ]);
        table.write_to(out)?;
    }

    if !result.stage_list_diff.is_empty() {
        writeln!(out)?;
        let mut stages = Table::new(["STAGE", "NAME", "SOURCE", "TARGET", "DELTA"]);
        for diff in &result.stage_list_diff {
            stages.row([
                id(diff.stage_id),
                text(diff.name.as_deref()),
                ms(diff.source_duration),
                ms(diff.target_duration),
                signed_time(diff.duration_delta),
            ]);
        }
        stages.write_to(out)?;
    }
    Ok(())
}

pub fn workspace<W: Write, S: StateStorage>(
    out: &mut W,
    ws: &ComparisonWorkspace<S>,
) -> io::Result<()> {
    writeln!(
        out,
        "compare mode: {}",
        if ws.is_compare_mode() { "on" } else { "off" }
    )?;
    if ws.selected_items().is_empty() {
        return writeln!(out, "no items selected");
    }
    let mut table = Table::new(["", "ID", "TYPE", "NAME"]);
    for item in ws.selected_items() {
        table.row([
            if ws.is_item_selected(item.id()) { "*" } else { " " }.to_string(),
            item.id().to_string(),
            item.kind().to_string(),
            item.display_name(),
        ]);
    }
    table.write_to(out)
}

pub fn catalog<W: Write>(out: &mut W) -> io::Result<()> {
    let mut table = Table::new(["KEY", "LABEL", "KIND", "FIELDS"]);
    for def in AVAILABLE_METRICS {
        table.row([
            def.key.to_string(),
            def.label.to_string(),
            def.kind.to_string(),
            def.field_keys().join(", "),
        ]);
    }
    table.write_to(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insight_client::EntityKind;
    use insight_compare::{MemoryStorage, NewComparisonItem};
    use pretty_assertions::assert_eq;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).expect("write to vec");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn table_pads_columns() {
        let mut table = Table::new(["A", "LONGER"]);
        table.row(["xyz", "1"]);
        let out = render(|w| table.write_to(w));
        assert_eq!(out, "A    LONGER\nxyz  1\n");
    }

    #[test]
    fn tasks_render_selected_metrics() {
        let task = Task {
            task_id: 7,
            duration: Some(1500),
            input_bytes: Some(2048),
            input_records: Some(3),
            ..Default::default()
        };
        let metrics: Vec<&MetricDef> = ["duration", "input"]
            .into_iter()
            .filter_map(insight_metrics::find)
            .collect();
        let out = render(|w| tasks(w, &[task], &metrics));
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].ends_with("DURATION  INPUT SIZE / RECORDS"), "{}", lines[0]);
        assert!(lines[1].ends_with("1.50 s    2 KB / 3"), "{}", lines[1]);
    }

    #[test]
    fn workspace_marks_checked_items() {
        let mut ws = ComparisonWorkspace::load(MemoryStorage::new());
        ws.add_item(NewComparisonItem::new(EntityKind::Stage, "app-1", 3).named("Stage 3"));
        ws.add_item(NewComparisonItem::new(EntityKind::Stage, "app-2", 3));
        ws.toggle_comparison_item("app-2:stage:3", None);

        let out = render(|w| workspace(w, &ws));
        assert_eq!(
            out,
            concat!(
                "compare mode: off\n",
                "   ID             TYPE   NAME\n",
                "   app-1:stage:3  stage  Stage 3\n",
                "*  app-2:stage:3  stage  stage 3\n",
            )
        );
    }

    #[test]
    fn comparison_shows_sides_and_stage_deltas() {
        use insight_client::models::StageRefDiff;

        let result = ComparisonResult {
            kind: Some("job".to_string()),
            source: Some(ItemMeta {
                id: Some("4".to_string()),
                app_id: Some("app-1".to_string()),
                duration: Some(2000),
                ..Default::default()
            }),
            target: Some(ItemMeta {
                id: Some("4".to_string()),
                app_id: Some("app-2".to_string()),
                duration: Some(1500),
                ..Default::default()
            }),
            stage_list_diff: vec![StageRefDiff {
                stage_id: Some(9),
                name: Some("map".to_string()),
                source_duration: Some(800),
                target_duration: Some(300),
                duration_delta: Some(-500.0),
            }],
            ..Default::default()
        };

        let out = render(|w| comparison(w, &result));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "source: app-1/4 (2.00 s)");
        assert_eq!(lines[1], "target: app-2/4 (1.50 s)");
        assert!(out.contains("-500 ms"), "{out}");
        assert!(!out.contains("SEVERITY"), "{out}");
    }
}
