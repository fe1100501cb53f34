//! Server configuration.
//!
//! Sources, lowest to highest precedence: built-in defaults, an optional
//! YAML file, the `LISTEN` environment variable, command-line flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;

/// Port the server listens on unless told otherwise
pub const DEFAULT_PORT: u16 = 4221;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 5;

/// Command-line arguments
#[derive(Parser, Debug, Default)]
#[command(name = "pylon")]
#[command(version)]
#[command(about = "A minimal HTTP/1.1 server with echo and file routes", long_about = None)]
pub struct CliArgs {
    /// Directory that /files/ requests read from and write to
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Path to a YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind to (e.g. 127.0.0.1:4221)
    #[arg(short, long)]
    pub listen: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

/// YAML configuration file structure. Every field is optional.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub listen: Option<String>,
    pub directory: Option<PathBuf>,
    pub log_level: Option<String>,
    pub shutdown_grace_secs: Option<u64>,
}

impl FileConfig {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml(&contents)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_yaml(contents: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }
}

/// Final resolved configuration, read-only for the life of the process.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    /// Serving directory for /files/ routes; `None` makes them fail per request
    pub directory: Option<PathBuf>,
    pub log_level: String,
    /// How long shutdown waits for in-flight connections
    pub shutdown_grace: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            directory: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            shutdown_grace: Duration::from_secs(DEFAULT_SHUTDOWN_GRACE_SECS),
        }
    }
}

impl Config {
    /// Resolves the full configuration from parsed command-line arguments.
    pub fn from_args(args: CliArgs) -> anyhow::Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::from_path(path)?,
            None => FileConfig::default(),
        };

        Ok(Self::merge(file, args))
    }

    fn merge(file: FileConfig, args: CliArgs) -> Self {
        let mut config = Self::default();

        if let Some(listen) = file.listen {
            config.listen_addr = listen;
        }
        if let Some(directory) = file.directory {
            config.directory = Some(directory);
        }
        if let Some(level) = file.log_level {
            config.log_level = level;
        }
        if let Some(secs) = file.shutdown_grace_secs {
            config.shutdown_grace = Duration::from_secs(secs);
        }

        if let Ok(listen) = std::env::var("LISTEN") {
            config.listen_addr = listen;
        }

        if let Some(listen) = args.listen {
            config.listen_addr = listen;
        }
        if let Some(directory) = args.directory {
            config.directory = Some(directory);
        }
        if let Some(level) = args.log_level {
            config.log_level = level;
        }

        config
    }
}
