//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Ironwall -- firewall rule simulator.
///
/// Use `ironwall <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "ironwall", version, about, long_about = None)]
pub struct Cli {
    /// Path to the ironwall.toml configuration file.
    #[arg(short, long, default_value = "ironwall.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect and validate rule files.
    Rules(RulesArgs),

    /// Evaluate one packet against the configured rules.
    Simulate(SimulateArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- rules ----

/// Inspect and validate rule files.
#[derive(Args, Debug)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub action: RulesAction,
}

#[derive(Subcommand, Debug)]
pub enum RulesAction {
    /// List rules in evaluation order.
    List {
        /// Rules file to read (default: `engine.rules_path` from the configuration).
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Validate a rules file without starting the daemon.
    Validate {
        /// TOML file containing [[rules]] tables.
        path: PathBuf,
    },
}

// ---- simulate ----

/// Evaluate one packet against the configured rules.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Packet protocol (TCP, UDP, ICMP).
    #[arg(long)]
    pub protocol: String,

    /// Source IP address.
    #[arg(long)]
    pub src: String,

    /// Destination IP address.
    #[arg(long)]
    pub dst: String,

    /// Destination port (0-65535).
    #[arg(long)]
    pub port: String,

    /// Rules file to evaluate against (default: `engine.rules_path`).
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Override the default policy (ALLOW, BLOCK).
    #[arg(long)]
    pub default_action: Option<String>,
}

// ---- config ----

/// Manage ironwall configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, engine, api, metrics).
        #[arg(long)]
        section: Option<String>,
    },
}
