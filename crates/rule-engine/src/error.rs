//! 규칙 엔진 에러 타입
//!
//! [`RuleEngineError`]는 규칙 엔진 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<RuleEngineError> for IronwallError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! 존재하지 않는 규칙 삭제는 에러가 아닙니다 (멱등 삭제).

use ironwall_core::error::{ConfigError, EngineError, IronwallError};

/// 규칙 엔진 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum RuleEngineError {
    /// 입력 값 검증 실패
    ///
    /// 상태 변경 전에 발생하므로 이 에러가 반환되면 저장소는 변경되지 않습니다.
    #[error("invalid {field}: {reason}")]
    Validation {
        /// 문제가 된 필드명 (예: `port`, `source_ip`)
        field: String,
        /// 검증 실패 사유
        reason: String,
    },

    /// 규칙 수 상한 도달
    #[error("rule limit reached: at most {limit} rules may be configured")]
    Capacity {
        /// 설정된 최대 규칙 수
        limit: usize,
    },

    /// 규칙 파일 로딩 실패
    #[error("rule load error: {path}: {reason}")]
    RuleLoad {
        /// 규칙 파일 경로
        path: String,
        /// 로딩 실패 사유
        reason: String,
    },

    /// 엔진 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl RuleEngineError {
    /// 검증 에러를 생성합니다.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// 호출자 입력 문제로 인한 에러인지 확인합니다.
    ///
    /// API 레이어는 이 값으로 4xx 응답 여부를 결정합니다.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::Capacity { .. })
    }
}

impl From<RuleEngineError> for IronwallError {
    fn from(err: RuleEngineError) -> Self {
        match err {
            RuleEngineError::Validation { field, reason } => {
                IronwallError::Engine(EngineError::Validation { field, reason })
            }
            RuleEngineError::Config { field, reason } => {
                IronwallError::Config(ConfigError::InvalidValue {
                    field: format!("engine.{field}"),
                    reason,
                })
            }
            RuleEngineError::Capacity { .. } => {
                IronwallError::Engine(EngineError::Capacity(err.to_string()))
            }
            RuleEngineError::RuleLoad { path, reason } => {
                IronwallError::Engine(EngineError::RuleLoad { path, reason })
            }
        }
    }
}
