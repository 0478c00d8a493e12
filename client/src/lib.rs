//! Spark Insight REST client.
//!
//! - [`query`] and [`routes`] turn typed browsing parameters into request
//!   targets under `/api`. They are pure and never touch the network.
//! - [`InsightClient`] sends those targets with `reqwest` and decodes the
//!   [`models`].
//! - [`guard`] intercepts `503 Service Unavailable` (backend still parsing)
//!   and redirects navigation before the error is returned.

#![deny(clippy::print_stdout, clippy::print_stderr)]

mod client;
pub mod error;
pub mod guard;
pub mod models;
pub mod query;
pub mod routes;
pub mod summary;

pub use client::{API_PREFIX, InsightClient};
pub use error::{ApiError, ApiResult};
pub use guard::{
    DEFAULT_PROCESSING_MESSAGE, Navigation, Navigator, NoopNavigator, ROOT_ROUTE, TransportGuard,
};
pub use models::{EntityKind, PageResponse};
pub use query::{
    AppListQuery, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, JobListQuery, PageRequest, RequestTarget,
    SortDirection, SortSpec, SqlListQuery, StageListQuery, TaskListQuery,
};
pub use summary::{SummaryRow, summary_rows};
