//! Start-up configuration.
//!
//! Precedence, highest first: JSON input file, command-line flags, environment, defaults.
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use psx_observe::{LogConfig, LogFormat, ObserveError};
use psx_platform::PlatformConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_PLATFORM_HOST: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_JSON_INPUT_FILE: &str = "/input/inputs.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("argument '{0}' is required but not provided")]
    Missing(&'static str),
    #[error("timeout must be at least one second")]
    InvalidTimeout,
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    ParseFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Logging(#[from] ObserveError),
}

/// Runs one platform service execution and reports its outcome.
#[derive(Debug, Parser)]
#[command(name = "psx-agentd", version, about)]
pub struct Cli {
    /// Service execution ID.
    #[arg(
        long = "serviceexecution-id",
        alias = "serviceexecution_id",
        env = "SERVICEEXECUTION_ID"
    )]
    pub serviceexecution_id: Option<String>,

    /// Platform host URL.
    #[arg(long, env = "PLATFORM_HOST", default_value = DEFAULT_PLATFORM_HOST)]
    pub platform_host: String,

    /// Platform preshared key for authentication.
    #[arg(long, env = "PLATFORM_PRESHARED_KEY", hide_env_values = true)]
    pub platform_preshared_key: Option<String>,

    /// Timeout for the execution in seconds.
    #[arg(long, env = "TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Path to a JSON file whose keys override every other source.
    #[arg(long, env = "JSON_INPUT_FILE", default_value = DEFAULT_JSON_INPUT_FILE)]
    pub json_input_file: PathBuf,

    /// Log filter directive.
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format: text, json or journald.
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    pub log_format: String,
}

impl Cli {
    pub fn log_config(&self) -> Result<LogConfig, ConfigError> {
        let format: LogFormat = self.log_format.parse()?;
        Ok(LogConfig::new(self.log_level.clone(), format))
    }
}

/// Keys the JSON input file may override. Other keys in the file are ignored.
#[derive(Debug, Default, Deserialize)]
struct FileOverrides {
    serviceexecution_id: Option<String>,
    platform_host: Option<String>,
    platform_preshared_key: Option<String>,
    timeout: Option<u64>,
}

/// Fully resolved settings for one run.
#[derive(Clone)]
pub struct AgentConfig {
    pub execution_id: String,
    pub platform_host: String,
    pub preshared_key: String,
    pub timeout: Duration,
}

impl AgentConfig {
    pub fn platform(&self) -> PlatformConfig {
        PlatformConfig {
            host: self.platform_host.clone(),
            preshared_key: self.preshared_key.clone(),
            execution_id: self.execution_id.clone(),
            request_timeout: None,
        }
    }
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("execution_id", &self.execution_id)
            .field("platform_host", &self.platform_host)
            .field("preshared_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Merge flags/environment with the JSON input file and check required values.
pub fn resolve(cli: &Cli) -> Result<AgentConfig, ConfigError> {
    let file = read_overrides(&cli.json_input_file)?;

    let execution_id = file
        .serviceexecution_id
        .or_else(|| cli.serviceexecution_id.clone())
        .ok_or(ConfigError::Missing("serviceexecution_id"))?;
    let platform_host = file
        .platform_host
        .unwrap_or_else(|| cli.platform_host.clone());
    let preshared_key = file
        .platform_preshared_key
        .or_else(|| cli.platform_preshared_key.clone())
        .ok_or(ConfigError::Missing("platform_preshared_key"))?;
    let timeout = file.timeout.unwrap_or(cli.timeout);
    if timeout == 0 {
        return Err(ConfigError::InvalidTimeout);
    }

    let cfg = AgentConfig {
        execution_id,
        platform_host,
        preshared_key,
        timeout: Duration::from_secs(timeout),
    };
    debug!(config = ?cfg, "resolved config");
    Ok(cfg)
}

fn read_overrides(path: &Path) -> Result<FileOverrides, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "JSON input file not found; skipping");
            return Ok(FileOverrides::default());
        }
        Err(source) => {
            return Err(ConfigError::ReadFile {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&raw).map_err(|source| ConfigError::ParseFile {
        path: path.to_path_buf(),
        source,
    })
}
