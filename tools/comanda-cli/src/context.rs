//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use chrono::{Local, NaiveDateTime};
use comanda_store::{Connection, ConnectionConfig};

use crate::config::CliConfig;
use crate::output::Output;

/// Config file names searched from the working directory upward.
pub const CONFIG_NAMES: [&str; 3] = ["comanda.toml", ".comanda.toml", "comanda.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Where `config` came from, if a file was found.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = if let Some(path) = config_path {
            (CliConfig::load(path)?, Some(PathBuf::from(path)))
        } else {
            match Self::find_config(&cwd) {
                Some((path, config)) => (config, Some(path)),
                None => (CliConfig::default(), None),
            }
        };

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<(PathBuf, CliConfig)> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = CliConfig::load(config_path.to_str()?) {
                        return Some((config_path, config));
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Directory relative store paths are resolved against.
    pub fn base_dir(&self) -> PathBuf {
        self.config_path
            .as_ref()
            .and_then(|p| p.parent())
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.cwd.clone())
    }

    /// Store connection settings with the path made absolute.
    pub fn store_config(&self) -> ConnectionConfig {
        let mut store = self.config.store.clone();
        if let Some(path) = store.path.take() {
            store.path = Some(if path.is_absolute() {
                path
            } else {
                self.base_dir().join(path)
            });
        }
        store
    }

    /// Open the configured store.
    pub fn connect(&self) -> Result<Connection> {
        let config = self.store_config();
        if config.path.is_none() {
            self.output
                .warn("No store configured; using an empty in-memory store (run `comanda config init`)");
        }
        Connection::open(config).context("Failed to open the store")
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if PathBuf::from(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }
}

/// Parse `--at` as restaurant-local time, defaulting to now.
pub fn local_time(at: Option<&str>) -> Result<NaiveDateTime> {
    match at {
        Some(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
            .with_context(|| format!("Invalid time '{}', expected YYYY-MM-DD HH:MM", s)),
        None => Ok(Local::now().naive_local()),
    }
}
