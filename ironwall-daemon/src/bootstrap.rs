//! Simulator construction from configuration.

use std::path::Path;

use anyhow::{Context, Result};

use ironwall_core::config::EngineConfig;
use ironwall_rule_engine::{RuleEngineConfig, Simulator, SimulatorBuilder, load_rules_from_file};

/// Build the simulator described by the `[engine]` section.
///
/// When `rules_path` is set, its rules are created in file order before
/// the simulator is returned. Any invalid rule aborts startup.
pub fn build_simulator(engine: &EngineConfig) -> Result<Simulator> {
    let config = RuleEngineConfig::from_core(engine).context("invalid [engine] configuration")?;

    let seed = match &config.rules_path {
        Some(path) => load_seed_rules(path)?,
        None => {
            tracing::info!("no rules file configured, starting with an empty rule set");
            Vec::new()
        }
    };

    SimulatorBuilder::new()
        .config(config)
        .seed_rules(seed)
        .build()
        .context("failed to build simulator")
}

fn load_seed_rules(path: &Path) -> Result<Vec<ironwall_rule_engine::RuleSpec>> {
    let rules = load_rules_from_file(path)
        .with_context(|| format!("failed to load rules from {}", path.display()))?;
    tracing::info!(path = %path.display(), count = rules.len(), "rules file loaded");
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use ironwall_rule_engine::Action;

    use super::*;

    #[test]
    fn empty_rules_path_starts_empty() {
        let sim = build_simulator(&EngineConfig::default()).unwrap();
        assert!(sim.list_rules().is_empty());
        assert_eq!(sim.default_action(), Action::Block);
    }

    #[test]
    fn seeds_rules_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[[rules]]\naction = \"BLOCK\"\nprotocol = \"TCP\"\nsource_ip = \"192.168.1.100\"\nport = 80"
        )
        .unwrap();

        let engine = EngineConfig {
            rules_path: file.path().display().to_string(),
            ..EngineConfig::default()
        };
        let sim = build_simulator(&engine).unwrap();
        assert_eq!(sim.list_rules().len(), 1);
    }

    #[test]
    fn missing_rules_file_fails() {
        let engine = EngineConfig {
            rules_path: "/nonexistent/rules.toml".to_owned(),
            ..EngineConfig::default()
        };
        assert!(build_simulator(&engine).is_err());
    }
}
