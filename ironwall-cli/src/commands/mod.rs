//! Command handlers -- one module per subcommand

pub mod config;
pub mod rules;
pub mod simulate;

use std::path::Path;

use tracing::warn;

use ironwall_core::config::IronwallConfig;
use ironwall_core::error::{ConfigError, IronwallError};

/// Load the configuration, falling back to defaults when the file is absent.
///
/// Environment overrides apply in both cases. Any other load failure
/// (parse error, invalid value) is returned to the caller.
pub async fn load_config_or_default(path: &Path) -> Result<IronwallConfig, IronwallError> {
    match IronwallConfig::load(path).await {
        Ok(config) => Ok(config),
        Err(IronwallError::Config(ConfigError::FileNotFound { .. })) => {
            warn!(path = %path.display(), "configuration file not found, using defaults");
            let mut config = IronwallConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            Ok(config)
        }
        Err(e) => Err(e),
    }
}
