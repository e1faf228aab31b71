use std::fmt;
use std::io::IsTerminal;
use std::str::FromStr;

use crate::ObserveError;

/// Where and how log records are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines on stderr.
    #[default]
    Text,
    /// One JSON object per line on stderr.
    Json,
    /// Native journald records (linux + `journald` feature).
    Journald,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
            LogFormat::Journald => "journald",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = ObserveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "journald" | "journal" if cfg!(all(target_os = "linux", feature = "journald")) => {
                Ok(LogFormat::Journald)
            }
            "journald" | "journal" => Err(ObserveError::JournaldUnavailable),
            _ => Err(ObserveError::UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `psx_agent=debug,info`.
    pub filter: String,
    pub format: LogFormat,
    /// Show the event target (module path) in text and json output.
    pub targets: bool,
    /// ANSI colors for text output; defaults to whether stderr is a terminal.
    pub ansi: bool,
}

impl LogConfig {
    pub fn new(filter: impl Into<String>, format: LogFormat) -> Self {
        Self {
            filter: filter.into(),
            format,
            ..Default::default()
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Text,
            targets: true,
            ansi: std::io::stderr().is_terminal(),
        }
    }
}
