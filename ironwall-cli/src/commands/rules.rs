//! `ironwall rules` command handler

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use ironwall_rule_engine::{Rule, RuleEngineError, SimulatorBuilder, load_rules_from_file};

use crate::cli::{RulesAction, RulesArgs};
use crate::commands::load_config_or_default;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `rules` command.
pub async fn execute(
    args: RulesArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        RulesAction::List { rules } => execute_list(config_path, rules, writer).await,
        RulesAction::Validate { path } => execute_validate(&path, writer),
    }
}

async fn execute_list(
    config_path: &Path,
    rules_override: Option<PathBuf>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = load_config_or_default(config_path).await?;

    let path = match rules_override {
        Some(path) => path,
        None if config.engine.rules_path.trim().is_empty() => {
            return Err(CliError::Command(
                "no rules file configured: set engine.rules_path or pass --rules".to_owned(),
            ));
        }
        None => PathBuf::from(config.engine.rules_path.trim()),
    };

    let report = build_list_report(&path, config.engine.max_rules)?;
    writer.render(&report)?;
    Ok(())
}

/// Load a rules file and normalize it the way the daemon would at startup.
pub fn build_list_report(path: &Path, max_rules: usize) -> Result<RuleListReport, CliError> {
    info!(path = %path.display(), "loading rules");

    let specs = load_rules_from_file(path)?;
    let simulator = SimulatorBuilder::new()
        .config(ironwall_rule_engine::RuleEngineConfig {
            max_rules,
            ..Default::default()
        })
        .seed_rules(specs)
        .build()?;

    let rules: Vec<RuleEntry> = simulator
        .list_rules()
        .iter()
        .enumerate()
        .map(|(index, rule)| RuleEntry::new(index + 1, rule))
        .collect();

    Ok(RuleListReport {
        source: path.display().to_string(),
        total: rules.len(),
        rules,
    })
}

fn execute_validate(path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    let report = build_validation_report(path);
    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Rule(format!(
            "{} is not a valid rules file",
            report.path
        )));
    }
    Ok(())
}

/// Validate a rules file without failing the command early.
pub fn build_validation_report(path: &Path) -> RuleValidationReport {
    info!(path = %path.display(), "validating rules");

    match load_rules_from_file(path) {
        Ok(specs) => RuleValidationReport {
            path: path.display().to_string(),
            valid: true,
            rules: specs.len(),
            error: None,
        },
        Err(e) => RuleValidationReport {
            path: path.display().to_string(),
            valid: false,
            rules: 0,
            error: Some(match e {
                RuleEngineError::RuleLoad { reason, .. } => reason,
                other => other.to_string(),
            }),
        },
    }
}

#[derive(Serialize)]
pub struct RuleListReport {
    pub source: String,
    pub total: usize,
    pub rules: Vec<RuleEntry>,
}

#[derive(Serialize)]
pub struct RuleEntry {
    /// 1-based evaluation order
    pub position: usize,
    pub action: String,
    pub protocol: String,
    pub source_ip: String,
    pub destination_ip: String,
    pub port: u16,
}

impl RuleEntry {
    fn new(position: usize, rule: &Rule) -> Self {
        Self {
            position,
            action: rule.action.to_string(),
            protocol: rule.protocol.to_string(),
            source_ip: rule.source_ip.to_string(),
            destination_ip: rule.destination_ip.to_string(),
            port: rule.port,
        }
    }
}

impl Render for RuleListReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Firewall Rules ({} total, source: {})",
            self.total.to_string().bold(),
            self.source
        )?;
        writeln!(w)?;
        writeln!(
            w,
            "{:<4} {:<7} {:<9} {:<20} {:<20} Port",
            "#", "Action", "Protocol", "Source", "Destination"
        )?;
        writeln!(w, "{}", "-".repeat(70))?;

        for r in &self.rules {
            let action = match r.action.as_str() {
                "ALLOW" => r.action.green(),
                "BLOCK" => r.action.red(),
                _ => r.action.normal(),
            };
            let port = if r.port == 0 {
                "ANY".to_owned()
            } else {
                r.port.to_string()
            };

            writeln!(
                w,
                "{:<4} {:<7} {:<9} {:<20} {:<20} {}",
                r.position, action, r.protocol, r.source_ip, r.destination_ip, port
            )?;
        }

        Ok(())
    }
}

#[derive(Serialize)]
pub struct RuleValidationReport {
    pub path: String,
    pub valid: bool,
    pub rules: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Render for RuleValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Rule Validation: {}", self.path.bold())?;
        if self.valid {
            writeln!(
                w,
                "  Result: {} ({} rules)",
                "VALID".green().bold(),
                self.rules
            )?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            if let Some(ref error) = self.error {
                writeln!(w, "  Error: {}", error.red())?;
            }
        }

        Ok(())
    }
}
