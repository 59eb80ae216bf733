//! 감사 로그 -- 판정 기록의 append-only 저장소
//!
//! [`AuditLog`]는 평가된 모든 패킷과 판정을 삽입(시간) 순서대로 보관합니다.
//! 엔트리는 한 번 기록되면 수정되거나 재정렬되지 않습니다.
//!
//! # 용량 정책
//! - 무제한 (기본값): 제거가 일어나지 않습니다.
//! - 상한 설정 시: 가득 찬 상태에서 추가하면 가장 오래된 엔트리를 먼저 제거합니다 (FIFO).
//!
//! 역시간순 표시는 클라이언트의 몫이며, [`AuditLog::list`]는 항상 오래된 순입니다.

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use metrics::{counter, gauge};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ironwall_core::metrics as m;

use crate::types::{Packet, Verdict};

/// 감사 로그 엔트리
///
/// 생성 후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// 엔트리 고유 ID
    pub id: String,
    /// 평가 시각 (직렬화 시 epoch 초)
    #[serde(with = "epoch_seconds")]
    pub timestamp: SystemTime,
    /// 평가된 패킷
    pub packet: Packet,
    /// 판정
    pub action: Verdict,
    /// 판정을 결정한 규칙 ID (기본 정책이면 생략)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_rule_id: Option<String>,
}

impl LogEntry {
    /// 새 엔트리를 생성합니다. ID는 자동 부여됩니다.
    pub fn new(
        timestamp: SystemTime,
        packet: Packet,
        action: Verdict,
        matched_rule_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp,
            packet,
            action,
            matched_rule_id,
        }
    }

    /// Unix epoch 기준 초
    pub fn epoch_secs(&self) -> u64 {
        epoch_seconds::to_secs(self.timestamp)
    }
}

/// `SystemTime` <-> epoch 초 직렬화
mod epoch_seconds {
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn to_secs(time: SystemTime) -> u64 {
        time.duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    pub fn serialize<S: Serializer>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(to_secs(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SystemTime, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::from_secs(secs))
    }
}

struct Inner {
    entries: VecDeque<LogEntry>,
    evicted: u64,
    total_appended: u64,
}

/// append-only 감사 로그
pub struct AuditLog {
    inner: Mutex<Inner>,
    /// 최대 엔트리 수 (`None`이면 무제한)
    capacity: Option<NonZeroUsize>,
}

impl AuditLog {
    /// 감사 로그를 생성합니다.
    pub fn new(capacity: Option<NonZeroUsize>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: VecDeque::with_capacity(capacity.map_or(0, |c| c.get().min(10_000))),
                evicted: 0,
                total_appended: 0,
            }),
            capacity,
        }
    }

    /// 무제한 감사 로그를 생성합니다.
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// 상한이 있는 감사 로그를 생성합니다.
    pub fn bounded(capacity: NonZeroUsize) -> Self {
        Self::new(Some(capacity))
    }

    /// 엔트리를 추가합니다. 항상 성공합니다.
    ///
    /// 상한에 도달한 상태라면 가장 오래된 엔트리를 먼저 제거합니다.
    pub fn append(&self, entry: LogEntry) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let outcome = self.push(&mut inner, entry);
        drop(inner);

        observe(outcome);
    }

    /// 현재 시각으로 엔트리를 만들어 추가하고, 추가된 엔트리를 반환합니다.
    ///
    /// 시각은 락을 잡은 상태에서 찍으므로, 동시에 기록하더라도 로그 순서와
    /// 타임스탬프 순서가 어긋나지 않습니다.
    pub fn record(
        &self,
        packet: Packet,
        action: Verdict,
        matched_rule_id: Option<String>,
    ) -> LogEntry {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = LogEntry::new(SystemTime::now(), packet, action, matched_rule_id);
        let outcome = self.push(&mut inner, entry.clone());
        drop(inner);

        observe(outcome);
        entry
    }

    /// 락을 잡은 상태에서 엔트리를 넣고 (제거 여부, 현재 길이)를 반환합니다.
    fn push(&self, inner: &mut Inner, entry: LogEntry) -> (bool, usize) {
        let mut evicted = false;
        if let Some(cap) = self.capacity {
            if inner.entries.len() >= cap.get() {
                inner.entries.pop_front();
                inner.evicted += 1;
                evicted = true;
            }
        }

        inner.entries.push_back(entry);
        inner.total_appended += 1;
        (evicted, inner.entries.len())
    }

    /// 모든 엔트리를 오래된 순으로 반환합니다.
    ///
    /// 호출 시점의 일관된 복사본입니다.
    pub fn list(&self) -> Vec<LogEntry> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.entries.iter().cloned().collect()
    }

    /// 현재 보관 중인 엔트리 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    /// 로그가 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 설정된 상한을 반환합니다 (`None`이면 무제한).
    pub fn capacity(&self) -> Option<usize> {
        self.capacity.map(NonZeroUsize::get)
    }

    /// 상한 때문에 제거된 엔트리 수를 반환합니다.
    pub fn evicted_count(&self) -> u64 {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .evicted
    }

    /// 지금까지 추가된 전체 엔트리 수를 반환합니다.
    pub fn total_appended(&self) -> u64 {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .total_appended
    }
}

fn observe((evicted, len): (bool, usize)) {
    if evicted {
        counter!(m::AUDIT_LOG_EVICTIONS_TOTAL).increment(1);
    }
    gauge!(m::AUDIT_LOG_ENTRIES).set(len as f64);
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::unbounded()
    }
}
