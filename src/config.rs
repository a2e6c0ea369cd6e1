//! Layered settings: defaults, then `employee-db.toml`, then `EMPLOYEE_DB_*`
//! environment variables, then command-line flags (applied by `main`).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_DATABASE: &str = "employees.db";
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
const ENV_PREFIX: &str = "EMPLOYEE_DB_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("unknown log format {other:?} (expected text or json)"),
        }
    }
}

/// Contents of `employee-db.toml`. Every key is optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub database: Option<PathBuf>,
    pub remote: Option<String>,
    pub bind: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

/// Resolved settings
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database: PathBuf,
    /// Server URL; `Some` routes every mode through the HTTP API
    pub remote: Option<String>,
    pub bind: String,
    /// `None` leaves the per-command default in place
    pub log_level: Option<String>,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            remote: None,
            bind: DEFAULT_BIND.to_string(),
            log_level: None,
            log_format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    /// Defaults, the config file (if any), then the process environment
    pub fn load(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = Self::default();
        if let Some(file) = load_config(config_path)? {
            config.apply_file(file);
        }
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn apply_file(&mut self, file: FileConfig) {
        if let Some(database) = file.database {
            self.database = database;
        }
        if file.remote.is_some() {
            self.remote = file.remote;
        }
        if let Some(bind) = file.bind {
            self.bind = bind;
        }
        if file.log_level.is_some() {
            self.log_level = file.log_level;
        }
        if let Some(format) = file.log_format {
            self.log_format = format;
        }
    }

    /// Apply `EMPLOYEE_DB_*` variables; empty values are ignored
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}")).filter(|v| !v.trim().is_empty());

        if let Some(database) = var("DATABASE") {
            self.database = PathBuf::from(database);
        }
        if let Some(remote) = var("REMOTE") {
            self.remote = Some(remote);
        }
        if let Some(bind) = var("BIND") {
            self.bind = bind;
        }
        if let Some(level) = var("LOG_LEVEL") {
            self.log_level = Some(level);
        }
        if let Some(format) = var("LOG_FORMAT") {
            self.log_format = format.parse()?;
        }
        Ok(())
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("employee-db.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<FileConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file");
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: FileConfig = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
