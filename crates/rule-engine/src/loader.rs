//! 규칙 파일 로더
//!
//! `[[rules]]` 테이블 배열로 구성된 TOML 파일에서 초기 규칙을 읽습니다.
//! 각 테이블은 규칙 생성 요청과 같은 필드를 가집니다.
//!
//! ```toml
//! [[rules]]
//! action = "BLOCK"
//! protocol = "TCP"
//! source_ip = "192.168.1.100"
//! port = 80
//! ```
//!
//! 모든 엔트리를 검증한 뒤에만 결과를 반환하므로, 일부만 적용되는 일은 없습니다.

use std::path::Path;

use serde::Deserialize;

use crate::error::RuleEngineError;
use crate::types::RuleSpec;

/// 규칙 파일 최대 크기 (10 MB)
const MAX_RULES_FILE_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Deserialize)]
struct RulesFile {
    #[serde(default)]
    rules: Vec<RuleSpec>,
}

/// 파일에서 규칙 목록을 로드합니다.
///
/// 파일 순서가 곧 평가 순서입니다.
pub fn load_rules_from_file(path: &Path) -> Result<Vec<RuleSpec>, RuleEngineError> {
    let load_err = |reason: String| RuleEngineError::RuleLoad {
        path: path.display().to_string(),
        reason,
    };

    // 읽기 전에 크기 확인
    let metadata =
        std::fs::metadata(path).map_err(|e| load_err(format!("failed to read metadata: {e}")))?;

    if metadata.len() > MAX_RULES_FILE_SIZE {
        return Err(load_err(format!(
            "file too large: {} bytes (max: {MAX_RULES_FILE_SIZE})",
            metadata.len()
        )));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| load_err(format!("failed to read file: {e}")))?;

    parse_rules(&content).map_err(|e| match e {
        RuleEngineError::RuleLoad { reason, .. } => load_err(reason),
        other => other,
    })
}

/// TOML 문자열에서 규칙 목록을 파싱하고 검증합니다.
///
/// 에러의 `path`는 `<inline>`으로 채워집니다.
pub fn parse_rules(content: &str) -> Result<Vec<RuleSpec>, RuleEngineError> {
    let inline_err = |reason: String| RuleEngineError::RuleLoad {
        path: "<inline>".to_owned(),
        reason,
    };

    let file: RulesFile =
        toml::from_str(content).map_err(|e| inline_err(format!("failed to parse TOML: {e}")))?;

    for (index, spec) in file.rules.iter().enumerate() {
        spec.validate()
            .map_err(|e| inline_err(format!("rules[{index}]: {e}")))?;
    }

    Ok(file.rules)
}
