//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `ironwall_`
//! - 구성요소: `rule_store_`, `audit_log_`, `simulator_`, `api_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(ironwall_core::metrics::RULE_STORE_RULES_CREATED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 판정 레이블 키 (ALLOWED, BLOCKED)
pub const LABEL_VERDICT: &str = "verdict";

/// 프로토콜 레이블 키 (TCP, UDP, ICMP)
pub const LABEL_PROTOCOL: &str = "protocol";

/// 검증 실패 필드 레이블 키
pub const LABEL_FIELD: &str = "field";

/// HTTP 라우트 레이블 키
pub const LABEL_ROUTE: &str = "route";

/// HTTP 상태 코드 레이블 키
pub const LABEL_STATUS: &str = "status";

// ─── Rule Store 메트릭 ─────────────────────────────────────────────

/// Rule Store: 생성된 규칙 수 (counter)
pub const RULE_STORE_RULES_CREATED_TOTAL: &str = "ironwall_rule_store_rules_created_total";

/// Rule Store: 삭제된 규칙 수 (counter, 실제로 제거된 경우만)
pub const RULE_STORE_RULES_DELETED_TOTAL: &str = "ironwall_rule_store_rules_deleted_total";

/// Rule Store: 현재 등록된 규칙 수 (gauge)
pub const RULE_STORE_RULES_LOADED: &str = "ironwall_rule_store_rules_loaded";

// ─── Audit Log 메트릭 ──────────────────────────────────────────────

/// Audit Log: 현재 보관 중인 엔트리 수 (gauge)
pub const AUDIT_LOG_ENTRIES: &str = "ironwall_audit_log_entries";

/// Audit Log: 용량 초과로 제거된 엔트리 수 (counter)
pub const AUDIT_LOG_EVICTIONS_TOTAL: &str = "ironwall_audit_log_evictions_total";

// ─── Simulator 메트릭 ──────────────────────────────────────────────

/// Simulator: 평가된 패킷 수 (counter, labels: verdict, protocol)
pub const SIMULATOR_PACKETS_TOTAL: &str = "ironwall_simulator_packets_total";

/// Simulator: 기본 정책이 적용된 패킷 수 (counter)
pub const SIMULATOR_DEFAULT_POLICY_TOTAL: &str = "ironwall_simulator_default_policy_total";

/// Simulator: 입력 검증 실패 수 (counter, label: field)
pub const SIMULATOR_VALIDATION_ERRORS_TOTAL: &str = "ironwall_simulator_validation_errors_total";

/// Simulator: 규칙 평가 소요 시간 (histogram, 초)
pub const SIMULATOR_EVALUATION_DURATION_SECONDS: &str =
    "ironwall_simulator_evaluation_duration_seconds";

// ─── API 메트릭 ────────────────────────────────────────────────────

/// API: 처리된 HTTP 요청 수 (counter, labels: route, status)
pub const API_REQUESTS_TOTAL: &str = "ironwall_api_requests_total";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 규칙 평가 지연 시간 히스토그램 버킷 (초)
///
/// 1us ~ 10ms 범위 (인메모리 선형 스캔)
pub const EVALUATION_DURATION_BUCKETS: [f64; 8] =
    [0.000_001, 0.000_005, 0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.01];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 이 함수는 전역 레코더 설치 후 한 번만 호출해야 합니다.
/// 일반적으로 `ironwall-daemon`의 시작 시점에서 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    // Rule Store
    describe_counter!(
        RULE_STORE_RULES_CREATED_TOTAL,
        "Total number of firewall rules created"
    );
    describe_counter!(
        RULE_STORE_RULES_DELETED_TOTAL,
        "Total number of firewall rules removed"
    );
    describe_gauge!(
        RULE_STORE_RULES_LOADED,
        "Number of firewall rules currently configured"
    );

    // Audit Log
    describe_gauge!(
        AUDIT_LOG_ENTRIES,
        "Number of verdict entries currently held in the audit log"
    );
    describe_counter!(
        AUDIT_LOG_EVICTIONS_TOTAL,
        "Total number of audit log entries evicted by the capacity bound"
    );

    // Simulator
    describe_counter!(
        SIMULATOR_PACKETS_TOTAL,
        "Total number of simulated packets by verdict and protocol"
    );
    describe_counter!(
        SIMULATOR_DEFAULT_POLICY_TOTAL,
        "Total number of packets decided by the default policy"
    );
    describe_counter!(
        SIMULATOR_VALIDATION_ERRORS_TOTAL,
        "Total number of rejected rule or packet inputs"
    );
    describe_histogram!(
        SIMULATOR_EVALUATION_DURATION_SECONDS,
        "Time to evaluate one packet against the rule set in seconds"
    );

    // API
    describe_counter!(API_REQUESTS_TOTAL, "Total number of HTTP API requests");
}
