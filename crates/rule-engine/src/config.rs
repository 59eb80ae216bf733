//! 규칙 엔진 설정
//!
//! [`RuleEngineConfig`]는 core의 [`EngineConfig`](ironwall_core::config::EngineConfig)를
//! 기반으로 문자열 값을 타입이 있는 값으로 변환한 엔진 설정입니다.
//!
//! # 사용 예시
//! ```ignore
//! use ironwall_core::config::IronwallConfig;
//! use ironwall_rule_engine::config::RuleEngineConfig;
//!
//! let core_config = IronwallConfig::default();
//! let config = RuleEngineConfig::from_core(&core_config.engine)?;
//! ```

use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::error::RuleEngineError;
use crate::store::DEFAULT_MAX_RULES;
use crate::types::Action;

/// 규칙 수 상한의 최대값
const MAX_RULES_LIMIT: usize = 100_000;

/// 규칙 엔진 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleEngineConfig {
    /// 매칭되는 규칙이 없을 때의 판정
    pub default_action: Action,
    /// 감사 로그 상한 (`None`이면 무제한)
    pub audit_log_capacity: Option<NonZeroUsize>,
    /// 최대 규칙 수
    pub max_rules: usize,
    /// 시작 시 로드할 규칙 파일
    pub rules_path: Option<PathBuf>,
}

impl Default for RuleEngineConfig {
    fn default() -> Self {
        Self {
            default_action: Action::Block,
            audit_log_capacity: None,
            max_rules: DEFAULT_MAX_RULES,
            rules_path: None,
        }
    }
}

impl RuleEngineConfig {
    /// core의 `EngineConfig`에서 엔진 설정을 생성합니다.
    ///
    /// `audit_log_capacity = 0`은 무제한, 빈 `rules_path`는 규칙 파일 없음으로 해석합니다.
    pub fn from_core(core: &ironwall_core::config::EngineConfig) -> Result<Self, RuleEngineError> {
        let default_action =
            core.default_action
                .parse::<Action>()
                .map_err(|_| RuleEngineError::Config {
                    field: "default_action".to_owned(),
                    reason: format!("'{}' is not ALLOW or BLOCK", core.default_action),
                })?;

        let rules_path = match core.rules_path.trim() {
            "" => None,
            path => Some(PathBuf::from(path)),
        };

        let config = Self {
            default_action,
            audit_log_capacity: NonZeroUsize::new(core.audit_log_capacity),
            max_rules: core.max_rules,
            rules_path,
        };
        config.validate()?;
        Ok(config)
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), RuleEngineError> {
        if self.max_rules == 0 || self.max_rules > MAX_RULES_LIMIT {
            return Err(RuleEngineError::Config {
                field: "max_rules".to_owned(),
                reason: format!("must be 1-{MAX_RULES_LIMIT}"),
            });
        }
        Ok(())
    }
}
