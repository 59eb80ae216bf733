//! Ironwall 공통 크레이트
//!
//! 모든 Ironwall 크레이트가 공유하는 설정, 에러 타입, 메트릭 이름을 정의합니다.
//!
//! - [`config`]: `ironwall.toml` 파싱 및 환경변수 오버라이드 (`IronwallConfig`)
//! - [`error`]: 최상위 에러 타입 (`IronwallError`)
//! - [`metrics`]: Prometheus 메트릭 이름 상수 및 설명 등록

pub mod config;
pub mod error;
pub mod metrics;

// 에러
pub use error::{ConfigError, EngineError, IronwallError};

// 설정
pub use config::IronwallConfig;
