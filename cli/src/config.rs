//! `insight` configuration loading
//!
//! Loads configuration from `~/.config/spark-insight/insight.toml` (or the
//! `SPARK_INSIGHT_CONFIG` env var). A missing file means defaults.

use std::path::{Path, PathBuf};

use insight_client::DEFAULT_PAGE_SIZE;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Root configuration for the `insight` CLI.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct InsightConfig {
    /// Backend origin; `/api` is appended by the client.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Directory holding the persisted comparison workspace. `~/` is
    /// expanded. Unset means the platform data dir.
    #[serde(default)]
    pub state_dir: Option<String>,

    /// Default page size per listing.
    #[serde(default)]
    pub page_sizes: PageSizes,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// Page sizes used when a listing command gets no `--size`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PageSizes {
    #[serde(default = "default_page_size")]
    pub apps: u32,
    #[serde(default = "default_page_size")]
    pub jobs: u32,
    #[serde(default = "default_page_size")]
    pub stages: u32,
    #[serde(default = "default_page_size")]
    pub tasks: u32,
    #[serde(default = "default_page_size")]
    pub sql: u32,
}

impl Default for PageSizes {
    fn default() -> Self {
        Self {
            apps: default_page_size(),
            jobs: default_page_size(),
            stages: default_page_size(),
            tasks: default_page_size(),
            sql: default_page_size(),
        }
    }
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            state_dir: None,
            page_sizes: PageSizes::default(),
        }
    }
}

impl InsightConfig {
    /// Environment variable for config path override
    pub const ENV_CONFIG_PATH: &'static str = "SPARK_INSIGHT_CONFIG";

    /// Default config filename
    pub const DEFAULT_CONFIG_FILENAME: &'static str = "insight.toml";

    /// Load configuration.
    ///
    /// Resolution order:
    /// 1. `explicit` (the `--config` flag)
    /// 2. `SPARK_INSIGHT_CONFIG`
    /// 3. `~/.config/spark-insight/insight.toml`
    ///
    /// A missing file at the resolved path yields the defaults, except when
    /// it was named explicitly.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }

        let path = Self::resolve_config_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "insight config not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let cfg: InsightConfig = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn resolve_config_path() -> PathBuf {
        if let Ok(path) = std::env::var(Self::ENV_CONFIG_PATH) {
            return PathBuf::from(path);
        }

        dirs::home_dir()
            .map(|h| {
                h.join(".config")
                    .join("spark-insight")
                    .join(Self::DEFAULT_CONFIG_FILENAME)
            })
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_CONFIG_FILENAME))
    }

    fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }

        let sizes = &self.page_sizes;
        for (name, size) in [
            ("apps", sizes.apps),
            ("jobs", sizes.jobs),
            ("stages", sizes.stages),
            ("tasks", sizes.tasks),
            ("sql", sizes.sql),
        ] {
            if size == 0 {
                return Err(ConfigError::Invalid(format!(
                    "page_sizes.{name} must be positive"
                )));
            }
        }
        Ok(())
    }

    /// Apply command-line overrides on top of the loaded file. The result is
    /// validated again, so a bad `--base-url` fails like a bad file value.
    pub fn with_overrides(
        mut self,
        base_url: Option<String>,
        state_dir: Option<PathBuf>,
    ) -> Result<Self> {
        if let Some(base_url) = base_url {
            self.base_url = base_url;
        }
        if let Some(dir) = state_dir {
            self.state_dir = Some(dir.to_string_lossy().into_owned());
        }
        self.validate()?;
        Ok(self)
    }

    /// Workspace state directory with `~/` expanded, if one is configured.
    pub fn resolved_state_dir(&self) -> Option<PathBuf> {
        let path = self.state_dir.as_deref()?;
        if let Some(stripped) = path.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return Some(home.join(stripped));
        }
        Some(PathBuf::from(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let cfg = InsightConfig::default();
        assert_eq!(cfg.base_url, "http://localhost:8080");
        assert_eq!(cfg.state_dir, None);
        assert_eq!(cfg.page_sizes.apps, 20);
        assert_eq!(cfg.page_sizes.tasks, 20);
    }

    #[test]
    fn partial_page_sizes_keep_defaults() {
        let cfg = InsightConfig::parse(
            r#"
            base_url = "http://spark-insight:9090"

            [page_sizes]
            tasks = 100
            "#,
        )
        .expect("should parse");
        assert_eq!(cfg.base_url, "http://spark-insight:9090");
        assert_eq!(cfg.page_sizes.tasks, 100);
        assert_eq!(cfg.page_sizes.stages, 20);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            InsightConfig::parse(r#"base_url = "localhost:8080""#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            InsightConfig::parse("[page_sizes]\njobs = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            InsightConfig::parse("base_url = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_from_explicit_path() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("insight.toml");
        std::fs::write(&path, "state_dir = \"/var/lib/insight\"\n").expect("write");

        let cfg = InsightConfig::load(Some(&path)).expect("should load");
        assert_eq!(cfg.resolved_state_dir(), Some(PathBuf::from("/var/lib/insight")));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let tmp = TempDir::new().expect("tempdir");
        let missing = tmp.path().join("nope.toml");
        assert!(matches!(
            InsightConfig::load(Some(&missing)),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn overrides_win() {
        let cfg = InsightConfig::default()
            .with_overrides(
                Some("https://insight.example".to_string()),
                Some(PathBuf::from("/tmp/state")),
            )
            .expect("valid overrides");
        assert_eq!(cfg.base_url, "https://insight.example");
        assert_eq!(cfg.resolved_state_dir(), Some(PathBuf::from("/tmp/state")));
    }

    #[test]
    fn overrides_are_validated() {
        assert!(matches!(
            InsightConfig::default().with_overrides(Some("localhost:8080".to_string()), None),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            InsightConfig::default().with_overrides(Some(String::new()), None),
            Err(ConfigError::Invalid(_))
        ));
    }
}
