//! Log severity levels
//!
//! `LogSeverity` is the severity vocabulary shared with settings files and the
//! command line. It maps onto `tracing` levels; `Critical` has no dedicated
//! tracing level and is emitted as `ERROR`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log message, from most to least verbose
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LogSeverity {
    Verbose,
    Debug,
    #[default]
    Information,
    Warning,
    Error,
    Critical,
}

impl LogSeverity {
    pub fn name(&self) -> &'static str {
        match self {
            LogSeverity::Verbose => "verbose",
            LogSeverity::Debug => "debug",
            LogSeverity::Information => "information",
            LogSeverity::Warning => "warning",
            LogSeverity::Error => "error",
            LogSeverity::Critical => "critical",
        }
    }
}

impl From<LogSeverity> for tracing::Level {
    fn from(severity: LogSeverity) -> Self {
        match severity {
            LogSeverity::Verbose => tracing::Level::TRACE,
            LogSeverity::Debug => tracing::Level::DEBUG,
            LogSeverity::Information => tracing::Level::INFO,
            LogSeverity::Warning => tracing::Level::WARN,
            LogSeverity::Error | LogSeverity::Critical => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for LogSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verbose" | "trace" => Ok(LogSeverity::Verbose),
            "debug" => Ok(LogSeverity::Debug),
            "information" | "info" => Ok(LogSeverity::Information),
            "warning" | "warn" => Ok(LogSeverity::Warning),
            "error" => Ok(LogSeverity::Error),
            "critical" => Ok(LogSeverity::Critical),
            other => Err(format!("unknown log severity: {}", other)),
        }
    }
}
