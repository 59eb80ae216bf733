use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use ironwall_core::config::IronwallConfig;
use ironwall_core::error::{ConfigError, IronwallError};
use ironwall_daemon::cli::DaemonCli;
use ironwall_daemon::{api, bootstrap, logging, metrics_server};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    // 설정 로드: 파일이 없으면 기본값 + 환경변수
    let (mut config, config_found) = match IronwallConfig::load(&cli.config).await {
        Ok(config) => (config, true),
        Err(IronwallError::Config(ConfigError::FileNotFound { .. })) => {
            let mut config = IronwallConfig::default();
            config.apply_env_overrides();
            (config, false)
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!("failed to load configuration from {}", cli.config.display())
            });
        }
    };

    // CLI 인자가 최우선
    if let Some(level) = cli.log_level {
        config.general.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.general.log_format = format;
    }
    if let Some(rules) = cli.rules {
        config.engine.rules_path = rules.display().to_string();
    }
    if let Some(port) = cli.port {
        config.api.port = port;
    }
    config.validate().context("invalid configuration")?;

    logging::init_tracing(&config.general)?;

    if !config_found {
        tracing::warn!(
            path = %cli.config.display(),
            "configuration file not found, using defaults"
        );
    }

    // --validate: 규칙 파일까지 로드해 본 뒤 종료
    if cli.validate {
        let simulator = bootstrap::build_simulator(&config.engine)?;
        tracing::info!(rules = simulator.stats().rules, "configuration is valid");
        println!("configuration is valid");
        return Ok(());
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "ironwall-daemon starting");

    if config.metrics.enabled {
        metrics_server::install_metrics_recorder(&config.metrics)?;
    }

    let simulator = Arc::new(bootstrap::build_simulator(&config.engine)?);

    api::serve(&config.api, simulator, shutdown_signal()).await?;

    tracing::info!("ironwall-daemon shut down");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(e) => tracing::error!(error = %e, "failed to listen for shutdown signal"),
    }
}
