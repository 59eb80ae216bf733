//! 시뮬레이터 -- 규칙 저장소, 평가기, 감사 로그를 묶는 퍼사드
//!
//! [`Simulator`]는 외부(HTTP API, CLI)에 노출되는 단일 진입점입니다.
//! 패킷 시뮬레이션은 다음 순서로 진행됩니다:
//!
//! 1. 입력 검증 (실패 시 아무 상태도 변경하지 않음)
//! 2. 규칙 스냅샷에 대해 first-match 평가
//! 3. 감사 로그 엔트리 생성 및 추가
//! 4. 엔트리 반환
//!
//! # 사용 예시
//! ```ignore
//! use ironwall_rule_engine::{PacketSpec, RuleSpec, SimulatorBuilder};
//!
//! let simulator = SimulatorBuilder::new()
//!     .seed_rule(RuleSpec::new("ALLOW", "TCP").port(443u16))
//!     .build()?;
//! let entry = simulator.simulate(&PacketSpec::new("TCP", "10.0.0.1", "10.0.0.2", 443u16))?;
//! ```

use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{debug, info, warn};

use ironwall_core::metrics as m;

use crate::audit::{AuditLog, LogEntry};
use crate::config::RuleEngineConfig;
use crate::error::RuleEngineError;
use crate::matcher;
use crate::store::RuleStore;
use crate::types::{Action, Packet, PacketSpec, Rule, RuleSpec};

/// 시뮬레이터 상태 요약
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatorStats {
    /// 등록된 규칙 수
    pub rules: usize,
    /// 감사 로그에 보관 중인 엔트리 수
    pub log_entries: usize,
    /// 용량 제한으로 제거된 엔트리 수
    pub evicted: u64,
    /// 지금까지 시뮬레이션된 패킷 수
    pub total_simulated: u64,
}

/// 방화벽 시뮬레이터
///
/// `Send + Sync`이므로 `Arc<Simulator>`로 여러 태스크에서 공유할 수 있습니다.
pub struct Simulator {
    store: RuleStore,
    audit: AuditLog,
    default_action: Action,
}

impl Simulator {
    /// 패킷 요청을 검증하고 평가한 뒤 감사 로그에 기록합니다.
    ///
    /// 검증에 실패하면 감사 로그는 변경되지 않습니다.
    pub fn simulate(&self, spec: &PacketSpec) -> Result<LogEntry, RuleEngineError> {
        let packet = spec.validate().inspect_err(record_validation_failure)?;
        Ok(self.simulate_packet(packet))
    }

    /// 이미 검증된 패킷을 평가하고 감사 로그에 기록합니다.
    pub fn simulate_packet(&self, packet: Packet) -> LogEntry {
        let rules = self.store.snapshot();

        let started = Instant::now();
        let evaluation = matcher::evaluate(&packet, &rules, self.default_action);
        histogram!(m::SIMULATOR_EVALUATION_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());

        counter!(
            m::SIMULATOR_PACKETS_TOTAL,
            m::LABEL_VERDICT => evaluation.verdict.as_str(),
            m::LABEL_PROTOCOL => packet.protocol.as_str()
        )
        .increment(1);
        if evaluation.is_default_policy() {
            counter!(m::SIMULATOR_DEFAULT_POLICY_TOTAL).increment(1);
        }

        debug!(
            packet = %packet,
            verdict = %evaluation.verdict,
            matched_rule_id = evaluation.matched_rule_id.as_deref().unwrap_or("-"),
            "packet evaluated"
        );

        self.audit
            .record(packet, evaluation.verdict, evaluation.matched_rule_id)
    }

    /// 규칙을 생성하여 목록 끝에 추가합니다.
    pub fn create_rule(&self, spec: &RuleSpec) -> Result<Rule, RuleEngineError> {
        self.store.create(spec).inspect_err(record_validation_failure)
    }

    /// 모든 규칙을 평가 순서대로 반환합니다.
    pub fn list_rules(&self) -> Vec<Rule> {
        self.store.list()
    }

    /// 규칙을 삭제합니다. 존재하지 않는 ID여도 성공으로 처리합니다.
    ///
    /// 실제로 제거되었는지 여부를 반환합니다.
    pub fn delete_rule(&self, id: &str) -> bool {
        self.store.delete(id)
    }

    /// 감사 로그를 오래된 순으로 반환합니다.
    pub fn list_logs(&self) -> Vec<LogEntry> {
        self.audit.list()
    }

    /// 기본 정책을 반환합니다.
    pub fn default_action(&self) -> Action {
        self.default_action
    }

    /// 현재 상태 요약을 반환합니다.
    pub fn stats(&self) -> SimulatorStats {
        SimulatorStats {
            rules: self.store.len(),
            log_entries: self.audit.len(),
            evicted: self.audit.evicted_count(),
            total_simulated: self.audit.total_appended(),
        }
    }
}

fn record_validation_failure(err: &RuleEngineError) {
    if let RuleEngineError::Validation { field, .. } = err {
        counter!(m::SIMULATOR_VALIDATION_ERRORS_TOTAL, m::LABEL_FIELD => field.clone())
            .increment(1);
    }
    warn!(error = %err, "request rejected");
}

/// 시뮬레이터 빌더
pub struct SimulatorBuilder {
    config: RuleEngineConfig,
    seed_rules: Vec<RuleSpec>,
}

impl SimulatorBuilder {
    /// 기본 설정으로 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: RuleEngineConfig::default(),
            seed_rules: Vec::new(),
        }
    }

    /// 엔진 설정을 지정합니다.
    pub fn config(mut self, config: RuleEngineConfig) -> Self {
        self.config = config;
        self
    }

    /// 기본 정책을 지정합니다.
    pub fn default_action(mut self, action: Action) -> Self {
        self.config.default_action = action;
        self
    }

    /// 초기 규칙을 하나 추가합니다.
    pub fn seed_rule(mut self, spec: RuleSpec) -> Self {
        self.seed_rules.push(spec);
        self
    }

    /// 초기 규칙 목록을 추가합니다. 주어진 순서대로 생성됩니다.
    pub fn seed_rules(mut self, specs: impl IntoIterator<Item = RuleSpec>) -> Self {
        self.seed_rules.extend(specs);
        self
    }

    /// 시뮬레이터를 빌드합니다.
    ///
    /// 초기 규칙 중 하나라도 실패하면 빌드 전체가 실패합니다.
    pub fn build(self) -> Result<Simulator, RuleEngineError> {
        self.config.validate()?;

        let store = RuleStore::new(self.config.max_rules);
        for (index, spec) in self.seed_rules.iter().enumerate() {
            store.create(spec).map_err(|e| RuleEngineError::RuleLoad {
                path: "<seed>".to_owned(),
                reason: format!("rules[{index}]: {e}"),
            })?;
        }

        let audit = AuditLog::new(self.config.audit_log_capacity);

        info!(
            default_action = %self.config.default_action,
            rules = store.len(),
            audit_log_capacity = ?self.config.audit_log_capacity,
            "simulator ready"
        );

        Ok(Simulator {
            store,
            audit,
            default_action: self.config.default_action,
        })
    }
}

impl Default for SimulatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::types::Verdict;

    fn packet(protocol: &str, src: &str, dst: &str, port: u16) -> PacketSpec {
        PacketSpec::new(protocol, src, dst, port)
    }

    #[test]
    fn simulator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Simulator>();
    }

    #[test]
    fn empty_simulator_blocks_by_default() {
        let sim = SimulatorBuilder::new().build().unwrap();
        let entry = sim
            .simulate(&packet("TCP", "10.0.0.1", "10.0.0.2", 22))
            .unwrap();

        assert_eq!(entry.action, Verdict::Blocked);
        assert!(entry.matched_rule_id.is_none());
        assert_eq!(sim.list_logs(), vec![entry]);
    }

    #[test]
    fn default_action_is_configurable() {
        let sim = SimulatorBuilder::new()
            .default_action(Action::Allow)
            .build()
            .unwrap();
        let entry = sim.simulate(&packet("UDP", "1.1.1.1", "2.2.2.2", 53)).unwrap();
        assert_eq!(entry.action, Verdict::Allowed);
        assert_eq!(sim.default_action(), Action::Allow);
    }

    #[test]
    fn block_rule_for_specific_source() {
        let sim = SimulatorBuilder::new().build().unwrap();
        let rule = sim
            .create_rule(
                &RuleSpec::new("BLOCK", "TCP")
                    .source_ip("192.168.1.100")
                    .destination_ip("ANY")
                    .port(80u16),
            )
            .unwrap();

        let hit = sim
            .simulate(&packet("TCP", "192.168.1.100", "10.0.0.5", 80))
            .unwrap();
        assert_eq!(hit.action, Verdict::Blocked);
        assert_eq!(hit.matched_rule_id.as_deref(), Some(rule.id.as_str()));
    }

    #[test]
    fn invalid_packet_leaves_log_untouched() {
        let sim = SimulatorBuilder::new().build().unwrap();
        let err = sim
            .simulate(&PacketSpec::new("TCP", "not-an-ip", "10.0.0.1", 80u16))
            .unwrap_err();

        assert!(matches!(err, RuleEngineError::Validation { ref field, .. } if field == "source_ip"));
        assert!(sim.list_logs().is_empty());
        assert_eq!(sim.stats().total_simulated, 0);
    }

    #[test]
    fn seeded_rules_keep_their_order() {
        let sim = SimulatorBuilder::new()
            .seed_rules([
                RuleSpec::new("ALLOW", "TCP").port(443u16),
                RuleSpec::new("BLOCK", "ANY"),
            ])
            .build()
            .unwrap();

        let rules = sim.list_rules();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].action, Action::Allow);
        assert_eq!(rules[1].action, Action::Block);

        let https = sim.simulate(&packet("TCP", "1.1.1.1", "2.2.2.2", 443)).unwrap();
        assert_eq!(https.matched_rule_id.as_deref(), Some(rules[0].id.as_str()));
    }

    #[test]
    fn invalid_seed_rule_fails_build() {
        let result = SimulatorBuilder::new()
            .seed_rule(RuleSpec::new("ALLOW", "TCP"))
            .seed_rule(RuleSpec::new("ALLOW", "SCTP"))
            .build();

        match result {
            Err(RuleEngineError::RuleLoad { reason, .. }) => assert!(reason.contains("rules[1]")),
            Err(other) => panic!("expected RuleLoad, got {other:?}"),
            Ok(_) => panic!("expected build failure"),
        }
    }

    #[test]
    fn build_rejects_invalid_config() {
        let config = RuleEngineConfig {
            max_rules: 0,
            ..RuleEngineConfig::default()
        };
        assert!(SimulatorBuilder::new().config(config).build().is_err());
    }

    #[test]
    fn delete_then_simulate_uses_remaining_rules() {
        let sim = SimulatorBuilder::new().build().unwrap();
        let allow = sim.create_rule(&RuleSpec::new("ALLOW", "ANY")).unwrap();

        assert!(sim.delete_rule(&allow.id));
        assert!(!sim.delete_rule(&allow.id));

        let entry = sim.simulate(&packet("ICMP", "1.1.1.1", "2.2.2.2", 0)).unwrap();
        assert_eq!(entry.action, Verdict::Blocked);
    }

    #[test]
    fn logs_accumulate_in_order_and_respect_capacity() {
        let config = RuleEngineConfig {
            audit_log_capacity: NonZeroUsize::new(2),
            ..RuleEngineConfig::default()
        };
        let sim = SimulatorBuilder::new().config(config).build().unwrap();

        for port in [1u16, 2, 3] {
            sim.simulate(&packet("TCP", "1.1.1.1", "2.2.2.2", port)).unwrap();
        }

        let ports: Vec<u16> = sim.list_logs().iter().map(|e| e.packet.port).collect();
        assert_eq!(ports, vec![2, 3]);

        let stats = sim.stats();
        assert_eq!(stats.log_entries, 2);
        assert_eq!(stats.evicted, 1);
        assert_eq!(stats.total_simulated, 3);
    }

    #[test]
    fn create_rule_rejects_invalid_port() {
        let sim = SimulatorBuilder::new().build().unwrap();
        for bad in [
            RuleSpec::new("ALLOW", "TCP").port("abc"),
            RuleSpec::new("ALLOW", "TCP").port(-1i64),
            RuleSpec::new("ALLOW", "TCP").port(70_000i64),
        ] {
            let err = sim.create_rule(&bad).unwrap_err();
            assert!(matches!(err, RuleEngineError::Validation { ref field, .. } if field == "port"));
        }
        assert!(sim.list_rules().is_empty());
    }
}
