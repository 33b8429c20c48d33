// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Logging setup for the zk-packet tools
//!
//! Binaries flatten [`CliLoggingArgs`] into their clap parser and call
//! [`CliLoggingArgs::init`]. `RUST_LOG` overrides the level chosen on the
//! command line. Library crates only emit `tracing` events.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use tracing::Level;

/// Crates whose events follow the requested level; everything else logs at warn
pub const WORKSPACE_TARGETS: &[&str] = &[
    "zk_packet",
    "zkp_cli",
    "zkp_proto",
    "zkp_correlate",
    "zkp_capture",
    "zkp_metrics",
];

/// Output format for log messages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable plaintext format
    #[default]
    Plaintext,
    /// One JSON object per event
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Plaintext => write!(f, "plaintext"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plaintext" => Ok(LogFormat::Plaintext),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!(
                "Invalid log format: {}. Use 'plaintext' or 'json'",
                s
            )),
        }
    }
}

/// Log level accepted on the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CliLogLevel {
    Error,
    Warn,
    #[default]
    Info,
    /// Every classified packet
    Debug,
    /// Pings and skipped frames as well
    Trace,
}

impl From<CliLogLevel> for Level {
    fn from(level: CliLogLevel) -> Self {
        match level {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }
}

/// Logging flags shared by every binary, for `#[command(flatten)]`
#[derive(Clone, Debug, Default, clap::Args, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CliLoggingArgs {
    /// Log verbosity level
    #[arg(long, value_enum, help = "Log verbosity level (default: info)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<CliLogLevel>,

    /// Log output format
    #[arg(long, value_enum, help = "Log output format (default: plaintext)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_format: Option<LogFormat>,

    /// Write logs to this file instead of stderr; a bare name lands in the
    /// standard log directory
    #[arg(long, help = "Log file path")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl CliLoggingArgs {
    /// Install the global subscriber described by these arguments
    pub fn init(&self, component: &str) -> anyhow::Result<()> {
        let level = self.log_level.unwrap_or_default().into();
        let format = self.log_format.unwrap_or_default();
        match &self.log_file {
            Some(file) => init_to_file(level, format, &resolve_log_path(component, file)),
            None => init(level, format),
        }
    }
}

/// Resolve a `--log-file` value; bare file names go under [`standard_log_dir`]
pub fn resolve_log_path(component: &str, file: &Path) -> PathBuf {
    let has_dir = file
        .parent()
        .map(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(false);
    if has_dir || file.is_absolute() {
        file.to_path_buf()
    } else {
        standard_log_dir(component).join(file)
    }
}

/// Platform data directory for `component`'s logs
///
/// `~/.local/share/<component>` on Linux, `/tmp/<component>` when no home
/// directory is known.
pub fn standard_log_dir(component: &str) -> PathBuf {
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("/tmp"));
    path.push(component);
    path
}

/// Default filter: dependencies at warn, workspace crates at `level`
pub fn default_directives(level: Level) -> String {
    let mut directives = String::from("warn");
    for target in WORKSPACE_TARGETS {
        directives.push_str(&format!(",{target}={level}"));
    }
    directives
}

/// Log to stderr, keeping stdout free for `--dump-metrics`
pub fn init(default_level: Level, format: LogFormat) -> anyhow::Result<()> {
    init_with_writer(default_level, format, io::stderr)
}

/// Append logs to `log_path`, creating its directory if needed
pub fn init_to_file(default_level: Level, format: LogFormat, log_path: &Path) -> anyhow::Result<()> {
    use std::fs;

    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let log_file = fs::OpenOptions::new().create(true).append(true).open(log_path)?;
    init_with_writer(default_level, format, std::sync::Mutex::new(log_file))
}

/// Install the global subscriber writing to `writer`
pub fn init_with_writer<W>(default_level: Level, format: LogFormat, writer: W) -> anyhow::Result<()>
where
    W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(default_level)));

    match format {
        LogFormat::Json => {
            let layer = tracing_subscriber::fmt::layer().with_writer(writer).json();
            tracing_subscriber::registry().with(filter).with(layer).try_init()?;
        }
        LogFormat::Plaintext => {
            let layer = tracing_subscriber::fmt::layer().with_writer(writer);
            #[cfg(debug_assertions)]
            let layer = layer.with_file(true).with_line_number(true);

            tracing_subscriber::registry().with(filter).with(layer).try_init()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("plaintext".parse::<LogFormat>().unwrap(), LogFormat::Plaintext);
        assert!("yaml".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_level_mapping() {
        assert_eq!(Level::from(CliLogLevel::default()), Level::INFO);
        assert_eq!(Level::from(CliLogLevel::Trace), Level::TRACE);
    }

    #[test]
    fn test_default_directives() {
        let directives = default_directives(Level::DEBUG);
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("zkp_correlate=DEBUG"));
        assert!(directives.contains("zk_packet=DEBUG"));
        // The string must parse as a filter
        EnvFilter::try_new(&directives).unwrap();
    }

    #[test]
    fn test_log_path_resolution() {
        let absolute = Path::new("/var/log/zk.log");
        assert_eq!(resolve_log_path("zk-packet", absolute), absolute);

        let relative = Path::new("logs/zk.log");
        assert_eq!(resolve_log_path("zk-packet", relative), relative);

        let bare = resolve_log_path("zk-packet", Path::new("zk.log"));
        assert!(bare.ends_with("zk-packet/zk.log"));
    }

    #[test]
    fn test_file_logging_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("zk.log");
        init_to_file(Level::INFO, LogFormat::Json, &path).unwrap();

        tracing::info!(target: "zkp_proto", operation = "GetData", "request observed");

        let contents = std::fs::read_to_string(&path).unwrap();
        let line = contents.lines().next().unwrap();
        let event: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(event["fields"]["operation"], "GetData");
        assert_eq!(event["fields"]["message"], "request observed");
    }
}
