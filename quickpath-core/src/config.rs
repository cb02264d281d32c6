//! src/config.rs
//! ============================================================================
//! # Config: Engine Configuration Loader and Saver
//!
//! Loads and saves settings as TOML from the platform config path resolved
//! by the [`directories`](https://docs.rs/directories) crate. Every field
//! falls back to its default, so partial files load cleanly.
//!
//! ## Example
//! ```rust,ignore
//! let (config, source) = Config::load().await?;
//! config.save().await?;
//! ```

use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs as TokioFs;

/// Completion engine tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Quiet interval before a burst of keystrokes becomes a query
    #[serde(with = "humantime_serde")]
    pub debounce: Duration,

    /// Maximum number of entries in a result set
    pub max_results: usize,

    /// Entries accumulated before a partial batch is delivered
    pub batch_size: usize,

    /// Recognise `<command> <path>` input
    pub command_prefixes: bool,

    /// Include dot-files in enumeration
    pub show_hidden: bool,

    /// Keep cache keys case-sensitive (false folds case)
    pub case_sensitive_keys: bool,

    /// Warm the cache with common locations at startup
    pub preload: bool,

    /// Extra directories to warm besides the defaults
    pub extra_preload_paths: Vec<PathBuf>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(150),
            max_results: 15,
            batch_size: 20,
            command_prefixes: true,
            show_hidden: true,
            case_sensitive_keys: !cfg!(any(windows, target_os = "macos")),
            preload: true,
            extra_preload_paths: Vec::new(),
        }
    }
}

/// Logging sink settings consumed by [`crate::logging::Logger`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_dir: PathBuf,

    pub file_prefix: String,

    /// Default `EnvFilter` directive, overridden by `RUST_LOG`
    pub level: String,

    /// Mirror events to stderr
    pub stderr: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            file_prefix: "quickpath".to_string(),
            level: "info".to_string(),
            stderr: false,
        }
    }
}

/// Main configuration struct for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub completion: CompletionConfig,

    pub logging: LoggingConfig,
}

/// Where a loaded [`Config`] came from. Config loads before logging is up,
/// so the caller reports this once tracing is installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from an existing file
    Loaded(PathBuf),
    /// No file existed; defaults were written here
    Created(PathBuf),
}

impl ConfigSource {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Loaded(path) | Self::Created(path) => path,
        }
    }
}

impl Config {
    /// Read the user's config, creating it with defaults on first run.
    pub async fn load() -> anyhow::Result<(Self, ConfigSource)> {
        Self::load_from(&Self::config_path()?).await
    }

    /// Read `path`, or write the defaults there when it does not exist yet.
    pub async fn load_from(path: &Path) -> anyhow::Result<(Self, ConfigSource)> {
        let exists = TokioFs::try_exists(path)
            .await
            .with_context(|| format!("checking {}", path.display()))?;

        if !exists {
            let defaults = Self::default();
            defaults.save_to(path).await?;
            return Ok((defaults, ConfigSource::Created(path.to_path_buf())));
        }

        let text = TokioFs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;

        Ok((config, ConfigSource::Loaded(path.to_path_buf())))
    }

    /// Write to the user's config file.
    pub async fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path()?).await
    }

    pub async fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            TokioFs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }

        let body = toml::to_string_pretty(self)?;
        TokioFs::write(path, body)
            .await
            .with_context(|| format!("writing {}", path.display()))
    }

    /// Returns the canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "quickpath", "QuickPath")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory."))?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }
}
