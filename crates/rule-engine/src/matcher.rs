//! 규칙 매칭 -- 패킷에 대한 first-match 평가
//!
//! 규칙은 삽입 순서대로 검사되며, 모든 필드가 일치하는 **첫 번째** 규칙의 액션이
//! 판정이 됩니다. "가장 구체적인 규칙 우선"이 아니므로, 서로 겹치는 두 규칙의
//! 결과는 어느 쪽이 먼저 추가되었는지에 따라 달라집니다.
//!
//! 매칭되는 규칙이 없으면 기본 정책이 적용되고 `matched_rule_id`는 비어있습니다.
//!
//! 평가는 순수 함수입니다. 상태를 갖지 않고, 같은 입력에 항상 같은 결과를 냅니다.

use crate::types::{ANY_PORT, Action, Packet, Rule, Verdict};

/// 평가 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// 판정
    pub verdict: Verdict,
    /// 판정을 결정한 규칙 ID (기본 정책이 적용된 경우 `None`)
    pub matched_rule_id: Option<String>,
}

impl Evaluation {
    /// 기본 정책으로 결정되었는지 확인합니다.
    pub fn is_default_policy(&self) -> bool {
        self.matched_rule_id.is_none()
    }
}

/// 규칙의 모든 필드가 패킷과 일치하는지 확인합니다.
///
/// 각 필드는 와일드카드이거나 패킷의 해당 값과 같아야 합니다 (AND 조건).
pub fn rule_matches(rule: &Rule, packet: &Packet) -> bool {
    rule.protocol.matches(packet.protocol)
        && (rule.port == ANY_PORT || rule.port == packet.port)
        && rule.source_ip.matches(&packet.source_ip)
        && rule.destination_ip.matches(&packet.destination_ip)
}

/// 첫 번째로 매칭되는 규칙을 찾습니다.
pub fn first_match<'a>(packet: &Packet, rules: &'a [Rule]) -> Option<&'a Rule> {
    rules.iter().find(|rule| rule_matches(rule, packet))
}

/// 패킷을 규칙 목록에 대해 평가합니다.
pub fn evaluate(packet: &Packet, rules: &[Rule], default_action: Action) -> Evaluation {
    match first_match(packet, rules) {
        Some(rule) => Evaluation {
            verdict: rule.action.verdict(),
            matched_rule_id: Some(rule.id.clone()),
        },
        None => Evaluation {
            verdict: default_action.verdict(),
            matched_rule_id: None,
        },
    }
}
