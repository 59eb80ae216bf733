//! `ironwall simulate` command handler
//!
//! Evaluates a single packet offline: the rules file is loaded into a fresh
//! simulator, so nothing is shared with a running daemon.

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use ironwall_core::config::IronwallConfig;
use ironwall_rule_engine::{
    LogEntry, PacketSpec, Rule, RuleEngineConfig, Simulator, SimulatorBuilder,
    load_rules_from_file,
};

use crate::cli::SimulateArgs;
use crate::commands::load_config_or_default;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `simulate` command.
pub async fn execute(
    args: SimulateArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let mut config = load_config_or_default(config_path).await?;
    if let Some(ref rules) = args.rules {
        config.engine.rules_path = rules.display().to_string();
    }
    if let Some(ref action) = args.default_action {
        config.engine.default_action = action.clone();
    }

    let report = run(&config, &args)?;
    writer.render(&report)?;
    Ok(())
}

/// Build a simulator from `config` and evaluate the packet described by `args`.
pub fn run(config: &IronwallConfig, args: &SimulateArgs) -> Result<SimulationReport, CliError> {
    let simulator = build_simulator(config)?;

    let packet = PacketSpec::new(
        args.protocol.as_str(),
        args.src.as_str(),
        args.dst.as_str(),
        args.port.as_str(),
    );
    let entry = simulator.simulate(&packet)?;

    let matched_rule = entry.matched_rule_id.as_ref().and_then(|id| {
        simulator
            .list_rules()
            .into_iter()
            .enumerate()
            .find(|(_, rule)| &rule.id == id)
            .map(|(index, rule)| MatchedRule::new(index + 1, &rule))
    });

    Ok(SimulationReport {
        default_action: simulator.default_action().to_string(),
        rules_evaluated: simulator.stats().rules,
        entry,
        matched_rule,
    })
}

fn build_simulator(config: &IronwallConfig) -> Result<Simulator, CliError> {
    let engine = RuleEngineConfig::from_core(&config.engine)?;

    let specs = match engine.rules_path {
        Some(ref path) => {
            info!(path = %path.display(), "loading rules");
            load_rules_from_file(path)?
        }
        None => Vec::new(),
    };

    Ok(SimulatorBuilder::new().config(engine).seed_rules(specs).build()?)
}

#[derive(Serialize)]
pub struct SimulationReport {
    pub default_action: String,
    pub rules_evaluated: usize,
    pub entry: LogEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<MatchedRule>,
}

/// The rule that decided the verdict, with its 1-based position.
#[derive(Serialize)]
pub struct MatchedRule {
    pub position: usize,
    pub description: String,
}

impl MatchedRule {
    fn new(position: usize, rule: &Rule) -> Self {
        Self {
            position,
            description: rule.to_string(),
        }
    }
}

impl Render for SimulationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let verdict = self.entry.action.as_str();
        let verdict = if verdict == "ALLOWED" {
            verdict.green().bold()
        } else {
            verdict.red().bold()
        };

        writeln!(w, "Packet:  {}", self.entry.packet)?;
        writeln!(w, "Verdict: {verdict}")?;
        match self.matched_rule {
            Some(ref rule) => {
                writeln!(w, "Matched: rule #{} ({})", rule.position, rule.description)?;
            }
            None => {
                writeln!(
                    w,
                    "Matched: {} (default policy {}, {} rules evaluated)",
                    "none".dimmed(),
                    self.default_action,
                    self.rules_evaluated
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(protocol: &str, src: &str, dst: &str, port: &str) -> SimulateArgs {
        SimulateArgs {
            protocol: protocol.to_owned(),
            src: src.to_owned(),
            dst: dst.to_owned(),
            port: port.to_owned(),
            rules: None,
            default_action: None,
        }
    }

    fn config_with_rules(content: &str) -> (IronwallConfig, tempfile::NamedTempFile) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let mut config = IronwallConfig::default();
        config.engine.rules_path = file.path().display().to_string();
        (config, file)
    }

    #[test]
    fn test_no_rules_uses_default_block() {
        let report = run(
            &IronwallConfig::default(),
            &args("TCP", "10.0.0.1", "10.0.0.2", "22"),
        )
        .unwrap();

        assert_eq!(report.entry.action.as_str(), "BLOCKED");
        assert!(report.matched_rule.is_none());
        assert_eq!(report.rules_evaluated, 0);
    }

    #[test]
    fn test_matching_rule_is_reported_with_position() {
        let (config, _file) = config_with_rules(
            "[[rules]]\naction = \"ALLOW\"\nprotocol = \"UDP\"\n\n[[rules]]\naction = \"BLOCK\"\nprotocol = \"TCP\"\nsource_ip = \"192.168.1.100\"\nport = 80\n",
        );
        let report = run(&config, &args("tcp", "192.168.1.100", "10.0.0.5", "80")).unwrap();

        assert_eq!(report.entry.action.as_str(), "BLOCKED");
        let matched = report.matched_rule.expect("matched rule");
        assert_eq!(matched.position, 2);
        assert!(matched.description.contains("192.168.1.100"));
    }

    #[test]
    fn test_default_action_override() {
        let mut config = IronwallConfig::default();
        config.engine.default_action = "allow".to_owned();
        let report = run(&config, &args("ICMP", "1.1.1.1", "2.2.2.2", "0")).unwrap();
        assert_eq!(report.entry.action.as_str(), "ALLOWED");
        assert_eq!(report.default_action, "ALLOW");
    }

    #[test]
    fn test_invalid_packet_is_rule_error() {
        let err = run(
            &IronwallConfig::default(),
            &args("TCP", "10.0.0.1", "10.0.0.2", "99999"),
        )
        .err()
        .expect("should fail");
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("port"));
    }

    #[test]
    fn test_render_text_default_policy() {
        let report = run(
            &IronwallConfig::default(),
            &args("UDP", "10.0.0.1", "10.0.0.2", "53"),
        )
        .unwrap();

        let mut buffer = Vec::new();
        report.render_text(&mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("BLOCKED"));
        assert!(output.contains("default policy BLOCK"));
    }

    #[test]
    fn test_json_report_shape() {
        let report = run(
            &IronwallConfig::default(),
            &args("UDP", "10.0.0.1", "10.0.0.2", "53"),
        )
        .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["entry"]["action"], "BLOCKED");
        assert!(json["entry"]["timestamp"].is_u64());
        assert!(json.get("matched_rule").is_none());
    }
}
