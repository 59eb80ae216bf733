//! Ironwall 규칙 엔진
//!
//! 방화벽 규칙을 순서대로 관리하고, 가상의 패킷을 first-match 방식으로
//! 평가하며, 모든 판정을 감사 로그에 남깁니다. 실제 네트워크 트래픽에는
//! 관여하지 않는 시뮬레이터입니다.
//!
//! # Module Structure
//!
//! - [`error`]: 도메인 에러 타입 (`RuleEngineError`)
//! - [`types`]: 규칙, 패킷, 판정 타입과 입력 검증 (`RuleSpec`, `PacketSpec`)
//! - [`store`]: 순서가 있는 규칙 저장소 (`RuleStore`)
//! - [`matcher`]: first-match 평가 (`evaluate`)
//! - [`audit`]: append-only 감사 로그 (`AuditLog`, `LogEntry`)
//! - [`simulator`]: 퍼사드 (`Simulator`, `SimulatorBuilder`)
//! - [`config`]: 엔진 설정 (`RuleEngineConfig`)
//! - [`loader`]: TOML 규칙 파일 로더
//!
//! # Architecture
//!
//! ```text
//! PacketSpec --validate--> Packet
//!                            |
//!              RuleStore.snapshot() --> matcher::evaluate()
//!                                            |
//!                                       Evaluation --> AuditLog.record() --> LogEntry
//! ```

pub mod audit;
pub mod config;
pub mod error;
pub mod loader;
pub mod matcher;
pub mod simulator;
pub mod store;
pub mod types;

// --- Public API Re-exports ---

pub use audit::{AuditLog, LogEntry};
pub use config::RuleEngineConfig;
pub use error::RuleEngineError;
pub use loader::{load_rules_from_file, parse_rules};
pub use matcher::{Evaluation, evaluate};
pub use simulator::{Simulator, SimulatorBuilder, SimulatorStats};
pub use store::RuleStore;
pub use types::{
    Action, AddressMatch, Packet, PacketSpec, PortInput, Protocol, ProtocolMatch, Rule, RuleSpec,
    Verdict,
};
