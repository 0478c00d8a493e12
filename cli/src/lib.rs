//! Library half of the `insight` binary: config loading, argument parsing,
//! command dispatch and terminal rendering.

pub mod commands;
pub mod config;
pub mod navigator;
pub mod render;

pub use commands::{Cli, run};
pub use config::{ConfigError, InsightConfig};
