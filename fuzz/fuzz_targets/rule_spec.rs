#![no_main]

use ironwall_rule_engine::{PacketSpec, RuleSpec};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // API 요청 본문과 같은 경로: JSON -> 입력 타입 -> 검증
    if let Ok(spec) = serde_json::from_slice::<RuleSpec>(data) {
        let _ = spec.validate();
    }
    if let Ok(spec) = serde_json::from_slice::<PacketSpec>(data) {
        let _ = spec.validate();
    }
});
