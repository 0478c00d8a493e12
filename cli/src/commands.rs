//! `insight` subcommands.
//!
//! ## Commands
//!
//! - `insight apps|app|jobs|job|stages|stage|tasks ...` browse the hierarchy
//! - `insight stage-stats|stage-executors|timeline ...` stage drill-downs
//! - `insight executors|environment|report|llm-report|sql|storage ...`
//! - `insight compare <APP1> <APP2>`
//! - `insight metrics` prints the metric catalog
//! - `insight workspace show|toggle-mode|add|remove|has|check|clear|compare`

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, bail};
use clap::{Args, Parser, Subcommand};
use insight_client::{
    AppListQuery, EntityKind, InsightClient, JobListQuery, PageRequest, SqlListQuery,
    StageListQuery, TaskListQuery, summary_rows,
};
use insight_compare::{
    ComparisonWorkspace, FileStorage, ItemId, NewComparisonItem, default_state_dir,
};
use insight_metrics::{DEFAULT_METRICS, MetricDef};
use serde::Serialize;

use crate::config::InsightConfig;
use crate::navigator::TerminalNavigator;
use crate::render;

/// Browse Spark Insight execution history and build comparisons.
#[derive(Debug, Parser)]
#[command(name = "insight", version)]
pub struct Cli {
    /// Config file (defaults to `$SPARK_INSIGHT_CONFIG` or
    /// `~/.config/spark-insight/insight.toml`).
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Backend origin, e.g. `http://localhost:8080`.
    #[arg(long = "base-url", global = true)]
    pub base_url: Option<String>,

    /// Directory holding the comparison workspace.
    #[arg(long = "state-dir", global = true)]
    pub state_dir: Option<PathBuf>,

    /// Print raw JSON instead of tables.
    #[arg(long = "json", short = 'j', global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List applications.
    Apps(AppsArgs),
    /// Show one application.
    App(AppArg),
    /// List jobs of an application.
    Jobs(JobsArgs),
    /// Show one job.
    Job(JobArg),
    /// Stages belonging to a job.
    JobStages(JobArg),
    /// Per-executor aggregates for a job.
    JobExecutors(JobArg),
    /// List stages of an application.
    Stages(StagesArgs),
    /// Show one stage attempt.
    Stage(StageArg),
    /// List tasks of a stage.
    Tasks(TasksArgs),
    /// Metric distribution summary for a stage attempt.
    StageStats(StageStatsArgs),
    /// Per-executor aggregates for a stage.
    StageExecutors(StageArg),
    /// Task timeline of a stage.
    Timeline(StageArg),
    /// Executors of an application.
    Executors(AppArg),
    /// Spark configuration of an application.
    Environment(AppArg),
    /// Diagnosis report (markdown).
    Report(AppArg),
    /// LLM-written diagnosis report (markdown).
    LlmReport(LlmReportArgs),
    /// List SQL executions of an application.
    Sql(SqlArgs),
    /// Show one SQL execution.
    SqlExecution(SqlExecutionArg),
    /// Cached RDDs of an application.
    Storage(AppArg),
    /// Blocks of one cached RDD.
    StorageBlocks(StorageBlocksArg),
    /// Compare two applications side by side.
    Compare(CompareArgs),
    /// Print the metric catalog.
    Metrics,
    /// Manage the comparison workspace.
    Workspace(WorkspaceCli),
}

#[derive(Debug, Args)]
pub struct PageArgs {
    /// Page number, starting at 1.
    #[arg(long = "page", default_value_t = insight_client::DEFAULT_PAGE)]
    pub page: u32,

    /// Page size (defaults to the configured size for this listing).
    #[arg(long = "size")]
    pub size: Option<u32>,

    /// Sort spec, e.g. `duration,desc;stageId,asc`.
    #[arg(long = "sort", allow_hyphen_values = true)]
    pub sort: Option<String>,
}

impl PageArgs {
    fn request(&self, default_size: u32) -> PageRequest {
        PageRequest {
            page: self.page,
            size: self.size.unwrap_or(default_size),
            sort: self.sort.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct AppsArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// Match on name, id or user.
    #[arg(long = "search", short = 's')]
    pub search: Option<String>,
}

#[derive(Debug, Args)]
pub struct AppArg {
    pub app_id: String,
}

#[derive(Debug, Args)]
pub struct JobsArgs {
    pub app_id: String,

    #[command(flatten)]
    pub page: PageArgs,

    #[arg(long = "job")]
    pub job_id: Option<i64>,

    #[arg(long = "group")]
    pub job_group: Option<String>,

    #[arg(long = "sql-execution")]
    pub sql_execution_id: Option<i64>,
}

#[derive(Debug, Args)]
pub struct JobArg {
    pub app_id: String,
    pub job_id: i64,
}

#[derive(Debug, Args)]
pub struct StagesArgs {
    pub app_id: String,

    #[command(flatten)]
    pub page: PageArgs,

    #[arg(long = "job")]
    pub job_id: Option<i64>,

    #[arg(long = "stage")]
    pub stage_id: Option<i64>,
}

#[derive(Debug, Args)]
pub struct StageArg {
    pub app_id: String,
    pub stage_id: i64,

    /// Attempt number; latest when omitted.
    #[arg(long = "attempt")]
    pub attempt_id: Option<u32>,
}

#[derive(Debug, Args)]
pub struct TasksArgs {
    pub app_id: String,
    pub stage_id: i64,

    #[arg(long = "attempt")]
    pub attempt_id: Option<u32>,

    #[command(flatten)]
    pub page: PageArgs,

    /// Catalog metric to show; repeatable. Defaults to the whole catalog.
    #[arg(long = "metric", short = 'm')]
    pub metrics: Vec<String>,
}

#[derive(Debug, Args)]
pub struct StageStatsArgs {
    pub app_id: String,
    pub stage_id: i64,

    #[arg(long = "attempt", default_value_t = 0)]
    pub attempt_id: u32,

    /// Catalog metric to show; repeatable. Defaults to the whole catalog.
    #[arg(long = "metric", short = 'm')]
    pub metrics: Vec<String>,
}

#[derive(Debug, Args)]
pub struct LlmReportArgs {
    pub app_id: String,

    /// Regenerate instead of returning the cached report.
    #[arg(long = "force")]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct SqlArgs {
    pub app_id: String,

    #[command(flatten)]
    pub page: PageArgs,

    #[arg(long = "job")]
    pub job_id: Option<i64>,
}

#[derive(Debug, Args)]
pub struct SqlExecutionArg {
    pub app_id: String,
    pub execution_id: i64,
}

#[derive(Debug, Args)]
pub struct StorageBlocksArg {
    pub app_id: String,
    pub rdd_id: i64,
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    pub app_id1: String,
    pub app_id2: String,
}

#[derive(Debug, Parser)]
pub struct WorkspaceCli {
    #[command(subcommand)]
    pub command: WorkspaceSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum WorkspaceSubcommand {
    /// Show compare mode and the selected items.
    Show,
    /// Flip compare mode.
    ToggleMode,
    /// Add an item; existing ids are left as they are.
    Add(ItemArgs),
    /// Remove an item by id.
    Remove(IdArg),
    /// Whether an item is selected.
    Has(ItemRef),
    /// Check or uncheck ids for this invocation and show the result.
    Check(CheckArgs),
    /// Remove every item.
    Clear,
    /// Compare two selected items of the same type.
    Compare(PairArgs),
}

#[derive(Debug, Args)]
pub struct ItemRef {
    /// app, job or stage.
    pub kind: EntityKind,
    pub app_id: String,
    /// Job or stage id; the app id again for apps.
    pub item_id: String,
}

impl ItemRef {
    fn item_id(&self) -> ItemId {
        match self.kind {
            EntityKind::App => ItemId::Text(self.item_id.clone()),
            EntityKind::Job | EntityKind::Stage => match self.item_id.parse::<i64>() {
                Ok(n) => ItemId::Num(n),
                Err(_) => ItemId::Text(self.item_id.clone()),
            },
        }
    }
}

#[derive(Debug, Args)]
pub struct ItemArgs {
    #[command(flatten)]
    pub item: ItemRef,

    #[arg(long = "name")]
    pub name: Option<String>,

    /// Extra JSON kept with the item.
    #[arg(long = "details")]
    pub details: Option<String>,
}

#[derive(Debug, Args)]
pub struct IdArg {
    /// Composite id, `{appId}:{type}:{itemId}`.
    pub id: String,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    pub ids: Vec<String>,

    /// Uncheck instead of check.
    #[arg(long = "off", conflicts_with = "toggle")]
    pub off: bool,

    /// Flip each id instead of checking it.
    #[arg(long = "toggle")]
    pub toggle: bool,
}

#[derive(Debug, Args)]
pub struct PairArgs {
    pub first: String,
    pub second: String,
}

/// Everything a command needs once flags and config are resolved.
pub struct Context {
    pub config: InsightConfig,
    pub client: InsightClient,
    pub json: bool,
}

impl Context {
    pub fn new(config: InsightConfig, json: bool) -> Self {
        let client = InsightClient::new(&config.base_url, Arc::new(TerminalNavigator));
        Self {
            config,
            client,
            json,
        }
    }

    fn workspace(&self) -> anyhow::Result<ComparisonWorkspace<FileStorage>> {
        let dir = match self.config.resolved_state_dir() {
            Some(dir) => dir,
            None => default_state_dir()?,
        };
        tracing::debug!(dir = %dir.display(), "opening comparison workspace");
        Ok(ComparisonWorkspace::load(FileStorage::with_dir(dir)))
    }

    /// Print `value` as JSON when `--json` was given, otherwise render it.
    fn emit<T, F>(&self, value: &T, table: F) -> anyhow::Result<()>
    where
        T: Serialize,
        F: FnOnce(&mut std::io::StdoutLock<'static>, &T) -> std::io::Result<()>,
    {
        let mut out = std::io::stdout().lock();
        if self.json {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        } else {
            table(&mut out, value)?;
        }
        Ok(())
    }
}

fn resolve_metrics(keys: &[String]) -> Vec<&'static MetricDef> {
    if keys.is_empty() {
        return DEFAULT_METRICS
            .iter()
            .copied()
            .filter_map(insight_metrics::find)
            .collect();
    }
    keys.iter()
        .filter_map(|key| {
            let def = insight_metrics::find(key);
            if def.is_none() {
                tracing::warn!(key = %key, "unknown metric, skipping");
            }
            def
        })
        .collect()
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = InsightConfig::load(cli.config.as_deref())
        .context("loading insight config")?
        .with_overrides(cli.base_url, cli.state_dir)
        .context("applying command-line overrides")?;
    let ctx = Context::new(config, cli.json);
    dispatch(&ctx, cli.command).await
}

pub async fn dispatch(ctx: &Context, command: Command) -> anyhow::Result<()> {
    let client = &ctx.client;
    let sizes = &ctx.config.page_sizes;
    match command {
        Command::Apps(args) => {
            let query = AppListQuery {
                page: args.page.request(sizes.apps),
                search: args.search,
            };
            let page = client.list_apps(&query).await?;
            ctx.emit(&page, render::apps)
        }
        Command::App(args) => {
            let app = client.get_app(&args.app_id).await?;
            ctx.emit(&app, render::app)
        }
        Command::Jobs(args) => {
            let query = JobListQuery {
                page: args.page.request(sizes.jobs),
                job_id: args.job_id,
                job_group: args.job_group,
                sql_execution_id: args.sql_execution_id,
            };
            let page = client.list_jobs(&args.app_id, &query).await?;
            ctx.emit(&page, |out, page| {
                render::jobs(out, &page.items)?;
                render::page_footer(out, page)
            })
        }
        Command::Job(args) => {
            let job = client.get_job(&args.app_id, args.job_id).await?;
            ctx.emit(&job, |out, job| render::jobs(out, std::slice::from_ref(job)))
        }
        Command::JobStages(args) => {
            let stages = client.job_stages(&args.app_id, args.job_id).await?;
            ctx.emit(&stages, |out, stages| render::stages(out, stages))
        }
        Command::JobExecutors(args) => {
            let rows = client
                .job_executor_summary(&args.app_id, args.job_id)
                .await?;
            ctx.emit(&rows, |out, rows| render::executor_summary(out, rows))
        }
        Command::Stages(args) => {
            let query = StageListQuery {
                page: args.page.request(sizes.stages),
                job_id: args.job_id,
                stage_id: args.stage_id,
            };
            let page = client.list_stages(&args.app_id, &query).await?;
            ctx.emit(&page, |out, page| {
                render::stages(out, &page.items)?;
                render::page_footer(out, page)
            })
        }
        Command::Stage(args) => {
            let stage = client
                .get_stage(&args.app_id, args.stage_id, args.attempt_id)
                .await?;
            ctx.emit(&stage, |out, stage| {
                render::stages(out, std::slice::from_ref(stage))
            })
        }
        Command::Tasks(args) => {
            let query = TaskListQuery {
                page: args.page.request(sizes.tasks),
                attempt_id: args.attempt_id,
            };
            let page = client
                .list_tasks(&args.app_id, args.stage_id, &query)
                .await?;
            let metrics = resolve_metrics(&args.metrics);
            ctx.emit(&page, |out, page| {
                render::tasks(out, &page.items, &metrics)?;
                render::page_footer(out, page)
            })
        }
        Command::StageStats(args) => {
            let stats = client
                .stage_stats(&args.app_id, args.stage_id, args.attempt_id)
                .await?;
            let keys: Vec<&str> = if args.metrics.is_empty() {
                DEFAULT_METRICS.clone()
            } else {
                args.metrics.iter().map(String::as_str).collect()
            };
            ctx.emit(&stats, |out, stats| {
                render::stage_summary(out, &summary_rows(stats, keys))
            })
        }
        Command::StageExecutors(args) => {
            let rows = client
                .stage_executor_summary(&args.app_id, args.stage_id, args.attempt_id)
                .await?;
            ctx.emit(&rows, |out, rows| render::executor_summary(out, rows))
        }
        Command::Timeline(args) => {
            let tasks = client
                .stage_timeline(&args.app_id, args.stage_id, args.attempt_id)
                .await?;
            let metrics = resolve_metrics(&["duration".to_string()]);
            ctx.emit(&tasks, |out, tasks| render::tasks(out, tasks, &metrics))
        }
        Command::Executors(args) => {
            let executors = client.executors(&args.app_id).await?;
            ctx.emit(&executors, |out, e| render::executors(out, e))
        }
        Command::Environment(args) => {
            let entries = client.environment(&args.app_id).await?;
            ctx.emit(&entries, |out, e| render::environment(out, e))
        }
        Command::Report(args) => {
            let report = client.report(&args.app_id).await?;
            ctx.emit(&report, |out, report| writeln!(out, "{report}"))
        }
        Command::LlmReport(args) => {
            let report = client.llm_report(&args.app_id, args.force).await?;
            ctx.emit(&report, |out, report| writeln!(out, "{report}"))
        }
        Command::Sql(args) => {
            let query = SqlListQuery {
                page: args.page.request(sizes.sql),
                job_id: args.job_id,
            };
            let page = client.list_sql(&args.app_id, &query).await?;
            ctx.emit(&page, |out, page| {
                render::sql_executions(out, &page.items)?;
                render::page_footer(out, page)
            })
        }
        Command::SqlExecution(args) => {
            let exec = client.get_sql(&args.app_id, args.execution_id).await?;
            ctx.emit(&exec, |out, exec| {
                render::sql_executions(out, std::slice::from_ref(exec))?;
                if let Some(plan) = &exec.physical_plan {
                    writeln!(out, "\n{plan}")?;
                }
                Ok(())
            })
        }
        Command::Storage(args) => {
            let rdds = client.storage(&args.app_id).await?;
            ctx.emit(&rdds, |out, rdds| render::storage(out, rdds))
        }
        Command::StorageBlocks(args) => {
            let blocks = client.storage_blocks(&args.app_id, args.rdd_id).await?;
            ctx.emit(&blocks, |out, blocks| render::storage_blocks(out, blocks))
        }
        Command::Compare(args) => {
            let result = client.compare(&args.app_id1, &args.app_id2).await?;
            ctx.emit(&result, render::comparison)
        }
        Command::Metrics => {
            let defs: Vec<&MetricDef> = insight_metrics::AVAILABLE_METRICS.iter().collect();
            ctx.emit(&defs, |out, _| render::catalog(out))
        }
        Command::Workspace(ws) => workspace(ctx, ws.command).await,
    }
}

fn show(ws: &ComparisonWorkspace<FileStorage>) -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    render::workspace(&mut out, ws)
}

async fn workspace(ctx: &Context, command: WorkspaceSubcommand) -> anyhow::Result<()> {
    let mut ws = ctx.workspace()?;
    match command {
        WorkspaceSubcommand::Show => show(&ws)?,
        WorkspaceSubcommand::ToggleMode => {
            ws.toggle_compare_mode();
            show(&ws)?;
        }
        WorkspaceSubcommand::Clear => {
            ws.clear();
            show(&ws)?;
        }
        WorkspaceSubcommand::Add(args) => {
            let details = args
                .details
                .as_deref()
                .map(serde_json::from_str)
                .transpose()
                .context("--details must be valid JSON")?;
            let mut item = NewComparisonItem::new(
                args.item.kind,
                args.item.app_id.as_str(),
                args.item.item_id(),
            );
            item.name = args.name;
            item.details = details;
            ws.add_item(item);
            show(&ws)?;
        }
        WorkspaceSubcommand::Remove(args) => {
            ws.remove_item(&args.id);
            show(&ws)?;
        }
        WorkspaceSubcommand::Has(item) => {
            let found = ws.has_item(item.kind, &item.app_id, &item.item_id());
            println!("{found}");
        }
        WorkspaceSubcommand::Check(args) => {
            let force = if args.toggle { None } else { Some(!args.off) };
            for id in &args.ids {
                ws.toggle_comparison_item(id, force);
            }
            let mut out = std::io::stdout().lock();
            render::workspace(&mut out, &ws)?;
            for id in ws.comparison_selection() {
                if !ws.selected_items().iter().any(|item| item.id() == id) {
                    writeln!(out, "checked but not selected: {id}")?;
                }
            }
        }
        WorkspaceSubcommand::Compare(args) => {
            ws.toggle_comparison_item(&args.first, Some(true));
            ws.toggle_comparison_item(&args.second, Some(true));
            let Some((a, b)) = ws.comparison_pair() else {
                bail!(
                    "{} and {} must both be selected and of the same type",
                    args.first,
                    args.second
                );
            };
            let result = match a.kind() {
                EntityKind::App => ctx.client.compare(a.app_id(), b.app_id()).await?,
                kind @ (EntityKind::Job | EntityKind::Stage) => {
                    let (id_a, id_b) = (a.item_id().to_string(), b.item_id().to_string());
                    ctx.client
                        .compare_items(kind, (a.app_id(), &id_a), (b.app_id(), &id_b))
                        .await?
                }
            };
            ctx.emit(&result, render::comparison)?;
        }
    }
    Ok(())
}
