//! CLI argument definitions for the unicorn chatbot.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Unicorn: ask questions about a catalog of startup companies.
#[derive(Parser, Debug)]
#[command(name = "unicorn", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Path to the company CSV dataset.
    #[arg(short = 'd', long = "data")]
    pub data: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > UNICORN_CONFIG env var > ~/.unicorn/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("UNICORN_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Dataset path override, if given.
    pub fn resolve_data_path(&self) -> Option<String> {
        self.data
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
    }

    /// Log level override, if given.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".unicorn").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".unicorn").join("config.toml");
    }
    PathBuf::from("config.toml")
}
