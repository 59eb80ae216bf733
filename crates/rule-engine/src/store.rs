//! 규칙 저장소 -- 순서가 있는 방화벽 규칙 컬렉션
//!
//! [`RuleStore`]는 규칙 ID를 부여하고 삽입 순서를 유지합니다.
//! 삽입 순서가 곧 평가 우선순위입니다 (먼저 추가된 규칙이 먼저 평가됨).
//!
//! # 동시성
//! 규칙 목록은 `RwLock<Arc<[Rule]>>`로 보관합니다. 변경 연산은 쓰기 락 아래에서
//! 새 목록을 만들어 통째로 교체하므로, [`RuleStore::snapshot`]으로 얻은 뷰는
//! 변경 전 또는 변경 후 상태 중 하나만을 온전히 반영합니다.

use std::sync::{Arc, PoisonError, RwLock};

use metrics::{counter, gauge};
use tracing::{debug, info};
use uuid::Uuid;

use ironwall_core::metrics as m;

use crate::error::RuleEngineError;
use crate::types::{Rule, RuleSpec, ValidatedRule};

/// 기본 최대 규칙 수
pub const DEFAULT_MAX_RULES: usize = 1000;

/// 규칙 저장소
pub struct RuleStore {
    /// 현재 규칙 스냅샷 (삽입 순서)
    rules: RwLock<Arc<[Rule]>>,
    /// 최대 규칙 수
    max_rules: usize,
}

impl RuleStore {
    /// 지정한 상한을 가진 빈 저장소를 생성합니다.
    pub fn new(max_rules: usize) -> Self {
        Self {
            rules: RwLock::new(Arc::from(Vec::new())),
            max_rules,
        }
    }

    /// 규칙 생성 요청을 검증하고 저장소 끝에 추가합니다.
    ///
    /// 검증이 모두 끝난 뒤에만 저장소를 변경하므로, 실패 시 상태는 그대로입니다.
    pub fn create(&self, spec: &RuleSpec) -> Result<Rule, RuleEngineError> {
        let validated = spec.validate()?;
        self.insert(validated)
    }

    /// 이미 검증된 규칙에 새 ID를 부여하고 끝에 추가합니다.
    pub fn insert(&self, validated: ValidatedRule) -> Result<Rule, RuleEngineError> {
        let mut guard = self.rules.write().unwrap_or_else(PoisonError::into_inner);

        if guard.len() >= self.max_rules {
            return Err(RuleEngineError::Capacity {
                limit: self.max_rules,
            });
        }

        let id = fresh_id(&guard);
        let rule = validated.into_rule(id);

        let mut next = Vec::with_capacity(guard.len() + 1);
        next.extend(guard.iter().cloned());
        next.push(rule.clone());
        *guard = Arc::from(next);
        let count = guard.len();
        drop(guard);

        counter!(m::RULE_STORE_RULES_CREATED_TOTAL).increment(1);
        gauge!(m::RULE_STORE_RULES_LOADED).set(count as f64);
        info!(rule_id = %rule.id, rule = %rule, position = count, "rule created");

        Ok(rule)
    }

    /// 모든 규칙을 삽입 순서대로 반환합니다.
    pub fn list(&self) -> Vec<Rule> {
        self.snapshot().to_vec()
    }

    /// 규칙을 ID로 제거합니다.
    ///
    /// 존재하지 않는 ID를 지정하면 아무 일도 하지 않고 `false`를 반환합니다.
    pub fn delete(&self, id: &str) -> bool {
        let mut guard = self.rules.write().unwrap_or_else(PoisonError::into_inner);

        if !guard.iter().any(|r| r.id == id) {
            drop(guard);
            debug!(rule_id = id, "delete requested for unknown rule, ignoring");
            return false;
        }

        let next: Vec<Rule> = guard.iter().filter(|r| r.id != id).cloned().collect();
        *guard = Arc::from(next);
        let count = guard.len();
        drop(guard);

        counter!(m::RULE_STORE_RULES_DELETED_TOTAL).increment(1);
        gauge!(m::RULE_STORE_RULES_LOADED).set(count as f64);
        info!(rule_id = id, remaining = count, "rule deleted");

        true
    }

    /// 평가용 일관된 스냅샷을 반환합니다.
    ///
    /// 반환된 뷰는 이후의 생성/삭제에 영향을 받지 않습니다.
    pub fn snapshot(&self) -> Arc<[Rule]> {
        let guard = self.rules.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// 등록된 규칙 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// 저장소가 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RULES)
    }
}

/// 현재 목록과 겹치지 않는 UUID v4 ID를 생성합니다.
fn fresh_id(existing: &[Rule]) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !existing.iter().any(|r| r.id == id) {
            return id;
        }
    }
}
