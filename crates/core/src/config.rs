//! 설정 관리 -- ironwall.toml 파싱 및 런타임 설정
//!
//! [`IronwallConfig`]는 모든 크레이트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`IRONWALL_ENGINE_DEFAULT_ACTION=ALLOW` 형식)
//! 3. 설정 파일 (`ironwall.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), ironwall_core::error::IronwallError> {
//! use ironwall_core::config::IronwallConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = IronwallConfig::load("ironwall.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = IronwallConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, IronwallError};

/// 허용되는 기본 정책 값
pub const VALID_DEFAULT_ACTIONS: [&str; 2] = ["ALLOW", "BLOCK"];

/// Ironwall 통합 설정
///
/// `ironwall.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 크레이트는 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IronwallConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 규칙 엔진 설정
    #[serde(default)]
    pub engine: EngineConfig,
    /// HTTP API 설정
    #[serde(default)]
    pub api: ApiConfig,
    /// 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl IronwallConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, IronwallError> {
        let mut config = Self::read_file(path.as_ref()).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    async fn read_file(path: &Path) -> Result<Self, IronwallError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                IronwallError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                IronwallError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, IronwallError> {
        toml::from_str(toml_str).map_err(|e| {
            IronwallError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `IRONWALL_{SECTION}_{FIELD}`
    /// 예: `IRONWALL_API_PORT=8080`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "IRONWALL_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "IRONWALL_GENERAL_LOG_FORMAT");

        // Engine
        override_string(
            &mut self.engine.default_action,
            "IRONWALL_ENGINE_DEFAULT_ACTION",
        );
        override_usize(
            &mut self.engine.audit_log_capacity,
            "IRONWALL_ENGINE_AUDIT_LOG_CAPACITY",
        );
        override_usize(&mut self.engine.max_rules, "IRONWALL_ENGINE_MAX_RULES");
        override_string(&mut self.engine.rules_path, "IRONWALL_ENGINE_RULES_PATH");

        // API
        override_string(&mut self.api.listen_addr, "IRONWALL_API_LISTEN_ADDR");
        override_u16(&mut self.api.port, "IRONWALL_API_PORT");
        override_bool(
            &mut self.api.allow_any_origin,
            "IRONWALL_API_ALLOW_ANY_ORIGIN",
        );

        // Metrics
        override_bool(&mut self.metrics.enabled, "IRONWALL_METRICS_ENABLED");
        override_string(
            &mut self.metrics.listen_addr,
            "IRONWALL_METRICS_LISTEN_ADDR",
        );
        override_u16(&mut self.metrics.port, "IRONWALL_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), IronwallError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        // 기본 정책은 대소문자 구분 없이 허용 (엔진에서 정규화)
        let action = self.engine.default_action.to_ascii_uppercase();
        if !VALID_DEFAULT_ACTIONS.contains(&action.as_str()) {
            return Err(invalid(
                "engine.default_action",
                format!("must be one of: {}", VALID_DEFAULT_ACTIONS.join(", ")),
            ));
        }

        if self.engine.max_rules == 0 {
            return Err(invalid(
                "engine.max_rules",
                "must be greater than 0".to_owned(),
            ));
        }

        if self.api.listen_addr.is_empty() {
            return Err(invalid(
                "api.listen_addr",
                "listen address must not be empty".to_owned(),
            ));
        }

        if self.metrics.enabled {
            if self.metrics.endpoint != "/metrics" {
                return Err(invalid(
                    "metrics.endpoint",
                    "only '/metrics' is supported".to_owned(),
                ));
            }

            if self.metrics.port == self.api.port && self.metrics.listen_addr == self.api.listen_addr
            {
                return Err(invalid(
                    "metrics.port",
                    format!("conflicts with api.port ({})", self.api.port),
                ));
            }
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> IronwallError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 규칙 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 매칭되는 규칙이 없을 때 적용할 기본 정책 (ALLOW, BLOCK)
    pub default_action: String,
    /// 감사 로그 최대 엔트리 수 (0 = 무제한)
    pub audit_log_capacity: usize,
    /// 등록 가능한 최대 규칙 수
    pub max_rules: usize,
    /// 시작 시 로드할 규칙 파일 경로 (비어있으면 빈 규칙 집합으로 시작)
    pub rules_path: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_action: "BLOCK".to_owned(),
            audit_log_capacity: 0,
            max_rules: 1000,
            rules_path: String::new(),
        }
    }
}

/// HTTP API 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// 바인드 주소
    pub listen_addr: String,
    /// 바인드 포트
    pub port: u16,
    /// 모든 Origin에 대해 CORS 허용 (브라우저 대시보드용)
    pub allow_any_origin: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1".to_owned(),
            port: 8000,
            allow_any_origin: true,
        }
    }
}

/// 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prometheus 엔드포인트 활성화 여부
    pub enabled: bool,
    /// 바인드 주소
    pub listen_addr: String,
    /// 바인드 포트
    pub port: u16,
    /// 스크레이프 경로
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9100,
            endpoint: "/metrics".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn default_config_has_sane_values() {
        let config = IronwallConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.engine.default_action, "BLOCK");
        assert_eq!(config.engine.audit_log_capacity, 0);
        assert_eq!(config.api.port, 8000);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn default_config_passes_validation() {
        let config = IronwallConfig::default();
        config.validate().unwrap();
    }

    #[test]
    fn parse_empty_toml_uses_defaults() {
        let config = IronwallConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.engine.max_rules, 1000);
    }

    #[test]
    fn parse_partial_toml_merges_with_defaults() {
        let toml = r#"
[engine]
default_action = "ALLOW"
audit_log_capacity = 100
"#;
        let config = IronwallConfig::parse(toml).unwrap();
        assert_eq!(config.engine.default_action, "ALLOW");
        assert_eq!(config.engine.audit_log_capacity, 100);
        // 나머지는 기본값 유지
        assert_eq!(config.engine.max_rules, 1000);
        assert_eq!(config.general.log_format, "json");
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[general]
log_level = "debug"
log_format = "pretty"

[engine]
default_action = "BLOCK"
audit_log_capacity = 500
max_rules = 64
rules_path = "/etc/ironwall/rules.toml"

[api]
listen_addr = "0.0.0.0"
port = 8080
allow_any_origin = false

[metrics]
enabled = true
listen_addr = "0.0.0.0"
port = 9200
endpoint = "/metrics"
"#;
        let config = IronwallConfig::parse(toml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.general.log_format, "pretty");
        assert_eq!(config.engine.rules_path, "/etc/ironwall/rules.toml");
        assert_eq!(config.engine.max_rules, 64);
        assert_eq!(config.api.port, 8080);
        assert!(!config.api.allow_any_origin);
        assert_eq!(config.metrics.port, 9200);
    }

    #[test]
    fn parse_invalid_toml_returns_error() {
        let err = IronwallConfig::parse("invalid = [[[toml").unwrap_err();
        assert!(matches!(
            err,
            IronwallError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = IronwallConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_unknown_default_action() {
        let mut config = IronwallConfig::default();
        config.engine.default_action = "DROP".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("default_action"));
    }

    #[test]
    fn validate_accepts_lowercase_default_action() {
        let mut config = IronwallConfig::default();
        config.engine.default_action = "allow".to_owned();
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_zero_max_rules() {
        let mut config = IronwallConfig::default();
        config.engine.max_rules = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_rules"));
    }

    #[test]
    fn validate_rejects_metrics_port_collision() {
        let mut config = IronwallConfig::default();
        config.metrics.enabled = true;
        config.metrics.port = config.api.port;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("metrics.port"));
    }

    #[test]
    fn validate_ignores_metrics_when_disabled() {
        let mut config = IronwallConfig::default();
        config.metrics.enabled = false;
        config.metrics.endpoint = "/stats".to_owned();
        config.validate().unwrap();
    }

    #[test]
    #[serial]
    fn env_override_applies_engine_fields() {
        let mut config = IronwallConfig::default();
        // SAFETY: serial 테스트이므로 다른 스레드가 환경변수를 동시에 읽지 않습니다.
        unsafe {
            std::env::set_var("IRONWALL_ENGINE_DEFAULT_ACTION", "ALLOW");
            std::env::set_var("IRONWALL_ENGINE_AUDIT_LOG_CAPACITY", "25");
            std::env::set_var("IRONWALL_API_PORT", "18000");
        }
        config.apply_env_overrides();
        unsafe {
            std::env::remove_var("IRONWALL_ENGINE_DEFAULT_ACTION");
            std::env::remove_var("IRONWALL_ENGINE_AUDIT_LOG_CAPACITY");
            std::env::remove_var("IRONWALL_API_PORT");
        }
        assert_eq!(config.engine.default_action, "ALLOW");
        assert_eq!(config.engine.audit_log_capacity, 25);
        assert_eq!(config.api.port, 18000);
    }

    #[test]
    #[serial]
    fn env_override_invalid_number_keeps_original() {
        let mut val = 8000u16;
        // SAFETY: serial 테스트이므로 다른 스레드가 환경변수를 동시에 읽지 않습니다.
        unsafe { std::env::set_var("TEST_IRONWALL_U16_BAD", "99999") };
        override_u16(&mut val, "TEST_IRONWALL_U16_BAD");
        assert_eq!(val, 8000);
        unsafe { std::env::remove_var("TEST_IRONWALL_U16_BAD") };
    }

    #[test]
    #[serial]
    fn env_override_bool_invalid_keeps_original() {
        let mut val = true;
        // SAFETY: serial 테스트이므로 다른 스레드가 환경변수를 동시에 읽지 않습니다.
        unsafe { std::env::set_var("TEST_IRONWALL_BOOL_BAD", "yes-please") };
        override_bool(&mut val, "TEST_IRONWALL_BOOL_BAD");
        assert!(val);
        unsafe { std::env::remove_var("TEST_IRONWALL_BOOL_BAD") };
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = "original".to_owned();
        override_string(&mut val, "TEST_IRONWALL_NONEXISTENT_12345");
        assert_eq!(val, "original");
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = IronwallConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = IronwallConfig::parse(&toml_str).unwrap();
        assert_eq!(config.engine.default_action, parsed.engine.default_action);
        assert_eq!(config.api.listen_addr, parsed.api.listen_addr);
    }

    #[tokio::test]
    async fn load_not_found() {
        let err = IronwallConfig::load("/nonexistent/path/ironwall.toml")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IronwallError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
