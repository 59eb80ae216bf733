//! CLI argument definitions for ironwall-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Ironwall firewall simulator daemon.
///
/// Serves the rule management, packet simulation and audit log API
/// consumed by the browser dashboard.
#[derive(Parser, Debug)]
#[command(name = "ironwall-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to ironwall.toml configuration file.
    ///
    /// A missing file is not an error; built-in defaults are used instead.
    #[arg(short, long, default_value = "ironwall.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Override the rules file loaded at startup.
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Override the API listen port.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Validate configuration and rules, then exit without serving.
    #[arg(long)]
    pub validate: bool,
}
