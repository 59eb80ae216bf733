//! 에러 타입 -- 도메인별 에러 정의

/// Ironwall 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum IronwallError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 규칙 엔진 에러
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 규칙 엔진 에러
///
/// 엔진 크레이트의 상세 에러는 이 세 가지 범주로 축약되어 상위 레이어에 전달됩니다.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// 입력 값 검증 실패 (포트 범위, 프로토콜, 주소 형식 등)
    #[error("validation failed for '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// 용량 한도 초과
    #[error("capacity exceeded: {0}")]
    Capacity(String),

    /// 규칙 파일 로딩 실패
    #[error("rule load failed: {path}: {reason}")]
    RuleLoad { path: String, reason: String },
}
