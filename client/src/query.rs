//! Browsing parameters and their request-target encoding.
//!
//! Parameters are emitted in a fixed order (page, size, sort, then each
//! query's filters in declared order) so identical inputs always produce
//! byte-identical targets. Absent filters are skipped entirely, and string
//! filters are skipped when blank.

use std::fmt;

/// First page; pages are 1-based.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Pagination and ordering shared by every list operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    /// Opaque sort spec, passed through verbatim. `None` or blank leaves
    /// ordering to the backend.
    pub sort: Option<String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
            sort: None,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            sort: None,
        }
    }

    /// First page with the given size.
    pub fn sized(size: u32) -> Self {
        Self::new(DEFAULT_PAGE, size)
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Builder for the backend's multi-column sort syntax
/// (`field,asc;field,desc`).
///
/// The result is still handed to [`PageRequest::with_sort`] as an opaque
/// string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    columns: Vec<(String, SortDirection)>,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self::default().then(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::default().then(field, SortDirection::Desc)
    }

    pub fn then(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.columns.push((field.into(), direction));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, direction)) in self.columns.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{field},{}", direction.as_str())?;
        }
        Ok(())
    }
}

impl From<SortSpec> for String {
    fn from(spec: SortSpec) -> Self {
        spec.to_string()
    }
}

/// One optional filter and how it is encoded when present.
#[derive(Debug, Clone, Copy)]
pub enum Filter<'a> {
    /// Integer id; appended when `Some`.
    Id(&'static str, Option<i64>),
    /// Attempt number; appended when `Some`.
    Attempt(&'static str, Option<u32>),
    /// Text appended verbatim when non-blank.
    Text(&'static str, Option<&'a str>),
    /// Text percent-encoded when non-blank.
    Encoded(&'static str, Option<&'a str>),
    /// Flag appended only when `true`.
    Flag(&'static str, bool),
}

/// Ordered `name=value` pairs of a request target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditionally append a parameter. `value` must already be encoded.
    pub fn push(&mut self, name: &'static str, value: impl fmt::Display) {
        self.pairs.push((name, value.to_string()));
    }

    /// Append `page`, `size` and a non-blank `sort`.
    pub fn page(mut self, page: &PageRequest) -> Self {
        self.push("page", page.page);
        self.push("size", page.size);
        self.filters(&[Filter::Text("sort", page.sort.as_deref())])
    }

    /// Append each present filter, in slice order.
    pub fn filters(mut self, filters: &[Filter<'_>]) -> Self {
        for filter in filters {
            match *filter {
                Filter::Id(name, Some(value)) => self.push(name, value),
                Filter::Attempt(name, Some(value)) => self.push(name, value),
                Filter::Text(name, Some(value)) if !value.trim().is_empty() => {
                    self.push(name, value)
                }
                Filter::Encoded(name, Some(value)) if !value.trim().is_empty() => {
                    self.push(name, urlencoding::encode(value))
                }
                Filter::Flag(name, true) => self.push(name, true),
                Filter::Id(..)
                | Filter::Attempt(..)
                | Filter::Text(..)
                | Filter::Encoded(..)
                | Filter::Flag(..) => {}
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

/// Path plus query, relative to the `/api` base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    path: String,
    query: QueryParams,
}

impl RequestTarget {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: QueryParams::new(),
        }
    }

    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }
}

impl fmt::Display for RequestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if !self.query.is_empty() {
            write!(f, "?{}", self.query)?;
        }
        Ok(())
    }
}

/// Application listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppListQuery {
    pub page: PageRequest,
    /// Free-text match on name, id or user.
    pub search: Option<String>,
}

impl AppListQuery {
    pub fn params(&self) -> QueryParams {
        QueryParams::new()
            .page(&self.page)
            .filters(&[Filter::Encoded("search", self.search.as_deref())])
    }
}

/// Job listing within one application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobListQuery {
    pub page: PageRequest,
    pub job_id: Option<i64>,
    /// Substring match on the job group label.
    pub job_group: Option<String>,
    pub sql_execution_id: Option<i64>,
}

impl JobListQuery {
    pub fn params(&self) -> QueryParams {
        QueryParams::new().page(&self.page).filters(&[
            Filter::Id("jobId", self.job_id),
            Filter::Encoded("jobGroup", self.job_group.as_deref()),
            Filter::Id("sqlExecutionId", self.sql_execution_id),
        ])
    }
}

/// Stage listing within one application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageListQuery {
    pub page: PageRequest,
    pub job_id: Option<i64>,
    pub stage_id: Option<i64>,
}

impl StageListQuery {
    pub fn params(&self) -> QueryParams {
        QueryParams::new().page(&self.page).filters(&[
            Filter::Id("jobId", self.job_id),
            Filter::Id("stageId", self.stage_id),
        ])
    }
}

/// Task listing within one stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListQuery {
    pub page: PageRequest,
    /// `None` lets the backend pick across attempts.
    pub attempt_id: Option<u32>,
}

impl TaskListQuery {
    pub fn params(&self) -> QueryParams {
        QueryParams::new()
            .page(&self.page)
            .filters(&[Filter::Attempt("attemptId", self.attempt_id)])
    }
}

/// SQL execution listing within one application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlListQuery {
    pub page: PageRequest,
    /// Only executions that spawned this job.
    pub job_id: Option<i64>,
}

impl SqlListQuery {
    pub fn params(&self) -> QueryParams {
        QueryParams::new()
            .page(&self.page)
            .filters(&[Filter::Id("jobId", self.job_id)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn page_defaults() {
        let params = QueryParams::new().page(&PageRequest::default());
        assert_eq!(params.to_string(), "page=1&size=20");
    }

    #[test]
    fn blank_sort_is_omitted() {
        let page = PageRequest::new(3, 10).with_sort("   ");
        assert_eq!(QueryParams::new().page(&page).to_string(), "page=3&size=10");
    }

    #[test]
    fn job_group_is_encoded_and_blank_is_dropped() {
        let mut query = JobListQuery {
            job_group: Some("a b".to_string()),
            ..Default::default()
        };
        assert_eq!(query.params().to_string(), "page=1&size=20&jobGroup=a%20b");

        query.job_group = Some(String::new());
        assert_eq!(query.params().to_string(), "page=1&size=20");
        assert_eq!(query.params().get("jobGroup"), None);
    }

    #[test]
    fn filters_keep_declared_order() {
        let query = JobListQuery {
            page: PageRequest::new(2, 5).with_sort("duration,desc"),
            job_id: Some(4),
            job_group: Some("nightly".to_string()),
            sql_execution_id: Some(9),
        };
        assert_eq!(
            query.params().to_string(),
            "page=2&size=5&sort=duration,desc&jobId=4&jobGroup=nightly&sqlExecutionId=9"
        );
    }

    #[test]
    fn absent_attempt_is_omitted() {
        let latest = TaskListQuery::default();
        assert_eq!(latest.params().get("attemptId"), None);

        let pinned = TaskListQuery {
            attempt_id: Some(0),
            ..Default::default()
        };
        assert_eq!(pinned.params().get("attemptId"), Some("0"));
    }

    #[test]
    fn app_search_is_encoded() {
        let query = AppListQuery {
            search: Some("etl job".to_string()),
            ..Default::default()
        };
        assert_eq!(query.params().to_string(), "page=1&size=20&search=etl%20job");
    }

    #[test]
    fn sort_spec_renders_backend_syntax() {
        let spec = SortSpec::desc("duration").then("stageId", SortDirection::Asc);
        assert_eq!(spec.to_string(), "duration,desc;stageId,asc");
        assert!(SortSpec::default().is_empty());
    }

    #[test]
    fn target_without_query_has_no_question_mark() {
        assert_eq!(RequestTarget::new("/apps/a").to_string(), "/apps/a");
    }
}
