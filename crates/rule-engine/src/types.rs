//! 규칙/패킷 도메인 타입
//!
//! 외부 입력은 [`RuleSpec`], [`PacketSpec`]처럼 느슨한 문자열 형태로 받고,
//! `validate()`를 거쳐 [`ValidatedRule`], [`Packet`] 같은 강타입 값으로 변환합니다.
//! 저장소와 평가기는 검증이 끝난 타입만 다룹니다.
//!
//! # 와일드카드
//! - 주소/프로토콜: `ANY`
//! - 포트: `0`
//!
//! 직렬화 시 필드명과 열거값 표기(`ALLOW`/`BLOCK`, `ALLOWED`/`BLOCKED`, `ANY`)는
//! 기존 대시보드 클라이언트와의 호환을 위해 정확히 유지됩니다.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use ipnetwork::IpNetwork;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use crate::error::RuleEngineError;

/// 주소/프로토콜 와일드카드 표기
pub const ANY: &str = "ANY";

/// 모든 포트에 매칭되는 포트 값
pub const ANY_PORT: u16 = 0;

/// 규칙 액션
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    /// 통과
    Allow,
    /// 차단
    Block,
}

impl Action {
    /// 와이어 표기 문자열
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "ALLOW",
            Self::Block => "BLOCK",
        }
    }

    /// 이 액션이 만들어내는 판정
    pub fn verdict(self) -> Verdict {
        match self {
            Self::Allow => Verdict::Allowed,
            Self::Block => Verdict::Blocked,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = RuleEngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "ALLOW" => Ok(Self::Allow),
            "BLOCK" => Ok(Self::Block),
            _ => Err(RuleEngineError::validation(
                "action",
                format!("'{trimmed}' is not one of: ALLOW, BLOCK"),
            )),
        }
    }
}

/// 패킷 평가 판정
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    /// 통과됨
    Allowed,
    /// 차단됨
    Blocked,
}

impl Verdict {
    /// 와이어 표기 문자열
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allowed => "ALLOWED",
            Self::Blocked => "BLOCKED",
        }
    }
}

impl From<Action> for Verdict {
    fn from(action: Action) -> Self {
        action.verdict()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 구체적인 전송 프로토콜 (패킷용)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
}

impl Protocol {
    /// 와이어 표기 문자열
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "TCP",
            Self::Udp => "UDP",
            Self::Icmp => "ICMP",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = RuleEngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "TCP" => Ok(Self::Tcp),
            "UDP" => Ok(Self::Udp),
            "ICMP" => Ok(Self::Icmp),
            ANY => Err(RuleEngineError::validation(
                "protocol",
                "a packet must carry a concrete protocol (TCP, UDP, ICMP)",
            )),
            _ => Err(RuleEngineError::validation(
                "protocol",
                format!("'{trimmed}' is not one of: TCP, UDP, ICMP"),
            )),
        }
    }
}

/// 규칙의 프로토콜 조건
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ProtocolMatch {
    /// 모든 프로토콜
    Any,
    /// 특정 프로토콜만
    Only(Protocol),
}

impl ProtocolMatch {
    /// 패킷 프로토콜이 조건에 맞는지 확인합니다.
    pub fn matches(&self, protocol: Protocol) -> bool {
        match self {
            Self::Any => true,
            Self::Only(expected) => *expected == protocol,
        }
    }
}

impl fmt::Display for ProtocolMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str(ANY),
            Self::Only(p) => f.write_str(p.as_str()),
        }
    }
}

impl FromStr for ProtocolMatch {
    type Err = RuleEngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(ANY) {
            return Ok(Self::Any);
        }
        trimmed.parse::<Protocol>().map(Self::Only).map_err(|_| {
            RuleEngineError::validation(
                "protocol",
                format!("'{trimmed}' is not one of: TCP, UDP, ICMP, ANY"),
            )
        })
    }
}

impl From<ProtocolMatch> for String {
    fn from(value: ProtocolMatch) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for ProtocolMatch {
    type Error = RuleEngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// 규칙의 주소 조건
///
/// 단일 주소는 파싱된 `IpAddr` 동등성으로 비교하고,
/// CIDR 네트워크는 포함 여부로 비교합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum AddressMatch {
    /// 모든 주소
    Any,
    /// 단일 주소
    Exact(IpAddr),
    /// CIDR 네트워크 (예: `10.0.0.0/8`)
    Cidr(IpNetwork),
}

impl AddressMatch {
    /// 주어진 필드명으로 에러를 보고하며 주소 조건을 파싱합니다.
    ///
    /// 비어있거나 생략된 값은 `ANY`로 취급합니다.
    pub fn parse_field(field: &str, input: Option<&str>) -> Result<Self, RuleEngineError> {
        let trimmed = input.map(str::trim).unwrap_or_default();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ANY) {
            return Ok(Self::Any);
        }

        if trimmed.contains('/') {
            return trimmed.parse::<IpNetwork>().map(Self::Cidr).map_err(|e| {
                RuleEngineError::validation(field, format!("'{trimmed}' is not a valid CIDR: {e}"))
            });
        }

        trimmed.parse::<IpAddr>().map(Self::Exact).map_err(|_| {
            RuleEngineError::validation(
                field,
                format!("'{trimmed}' is not ANY, an IP address or a CIDR network"),
            )
        })
    }

    /// 패킷 주소가 조건에 맞는지 확인합니다.
    pub fn matches(&self, addr: &IpAddr) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => expected == addr,
            Self::Cidr(net) => net.contains(*addr),
        }
    }
}

impl fmt::Display for AddressMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str(ANY),
            Self::Exact(ip) => write!(f, "{ip}"),
            Self::Cidr(net) => write!(f, "{net}"),
        }
    }
}

impl FromStr for AddressMatch {
    type Err = RuleEngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_field("address", Some(s))
    }
}

impl From<AddressMatch> for String {
    fn from(value: AddressMatch) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for AddressMatch {
    type Error = RuleEngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// 포트 입력값
///
/// 대시보드 폼은 숫자나 문자열을 보낼 수 있으므로 둘 다 받습니다.
/// 정수로 떨어지는 실수(`80.0`)는 정수로 취급하고, 그 밖의 값(`80.5`, `true`)은
/// 문자열로 받아 두었다가 [`RuleSpec::validate`]에서 `port` 검증 에러로 보고합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PortInput {
    Number(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for PortInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PortInputVisitor)
    }
}

struct PortInputVisitor;

impl Visitor<'_> for PortInputVisitor {
    type Value = PortInput;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a port number or string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<PortInput, E> {
        Ok(PortInput::Number(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<PortInput, E> {
        Ok(i64::try_from(v).map_or_else(|_| PortInput::Text(v.to_string()), PortInput::Number))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<PortInput, E> {
        let whole = v.is_finite() && v.fract() == 0.0;
        Ok(if whole && v.abs() < 1e15 {
            PortInput::Number(v as i64)
        } else if whole {
            PortInput::Text(format!("{v:.0}"))
        } else {
            PortInput::Text(v.to_string())
        })
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<PortInput, E> {
        Ok(PortInput::Text(v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<PortInput, E> {
        Ok(PortInput::Text(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<PortInput, E> {
        Ok(PortInput::Text(v))
    }
}

impl From<u16> for PortInput {
    fn from(port: u16) -> Self {
        Self::Number(i64::from(port))
    }
}

impl From<i64> for PortInput {
    fn from(port: i64) -> Self {
        Self::Number(port)
    }
}

impl From<&str> for PortInput {
    fn from(port: &str) -> Self {
        Self::Text(port.to_owned())
    }
}

/// 포트 입력을 검증합니다.
///
/// 빈 입력은 `None`을 반환하며, 기본값 적용 여부는 호출자가 결정합니다.
fn parse_port(input: Option<&PortInput>) -> Result<Option<u16>, RuleEngineError> {
    let number = match input {
        None => return Ok(None),
        Some(PortInput::Number(n)) => *n,
        Some(PortInput::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            match trimmed.parse::<i64>() {
                Ok(n) => n,
                // 정수 형태지만 i64를 넘는 값
                Err(_) if is_integer_literal(trimmed) => {
                    return Err(RuleEngineError::validation(
                        "port",
                        format!("must be between 0 and 65535, got {trimmed}"),
                    ));
                }
                Err(_) => {
                    return Err(RuleEngineError::validation(
                        "port",
                        format!("'{trimmed}' is not a number"),
                    ));
                }
            }
        }
    };

    u16::try_from(number).map(Some).map_err(|_| {
        RuleEngineError::validation("port", format!("must be between 0 and 65535, got {number}"))
    })
}

fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, RuleEngineError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(RuleEngineError::validation(field, "a value is required")),
    }
}

/// 방화벽 규칙
///
/// 생성 후 변경되지 않습니다. 수정은 삭제 후 재생성으로 표현합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// 서버가 부여한 고유 ID
    pub id: String,
    pub action: Action,
    pub protocol: ProtocolMatch,
    pub source_ip: AddressMatch,
    pub destination_ip: AddressMatch,
    /// 0이면 모든 포트
    pub port: u16,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} -> {} port {}",
            self.action, self.protocol, self.source_ip, self.destination_ip, self.port
        )
    }
}

/// 규칙 생성 요청
///
/// 모든 필드를 선택적으로 받고 [`RuleSpec::validate`]에서 한 번에 검증합니다.
/// 요청에 포함된 알 수 없는 필드(예: 클라이언트가 보낸 `id`)는 무시됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<PortInput>,
}

impl RuleSpec {
    /// 액션과 프로토콜만 지정된 요청을 만듭니다. 나머지 필드는 기본값이 적용됩니다.
    pub fn new(action: impl Into<String>, protocol: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            protocol: Some(protocol.into()),
            ..Self::default()
        }
    }

    pub fn source_ip(mut self, source_ip: impl Into<String>) -> Self {
        self.source_ip = Some(source_ip.into());
        self
    }

    pub fn destination_ip(mut self, destination_ip: impl Into<String>) -> Self {
        self.destination_ip = Some(destination_ip.into());
        self
    }

    pub fn port(mut self, port: impl Into<PortInput>) -> Self {
        self.port = Some(port.into());
        self
    }

    /// 요청을 검증하고 정규화합니다.
    ///
    /// - `action`, `protocol`: 필수, 대소문자 무시
    /// - `source_ip`, `destination_ip`: 비어있으면 `ANY`
    /// - `port`: 비어있으면 `0`
    pub fn validate(&self) -> Result<ValidatedRule, RuleEngineError> {
        let action = required("action", self.action.as_deref())?.parse::<Action>()?;
        let protocol = required("protocol", self.protocol.as_deref())?.parse::<ProtocolMatch>()?;
        let source_ip = AddressMatch::parse_field("source_ip", self.source_ip.as_deref())?;
        let destination_ip =
            AddressMatch::parse_field("destination_ip", self.destination_ip.as_deref())?;
        let port = parse_port(self.port.as_ref())?.unwrap_or(ANY_PORT);

        Ok(ValidatedRule {
            action,
            protocol,
            source_ip,
            destination_ip,
            port,
        })
    }
}

/// 검증을 통과했지만 아직 ID가 부여되지 않은 규칙
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedRule {
    pub action: Action,
    pub protocol: ProtocolMatch,
    pub source_ip: AddressMatch,
    pub destination_ip: AddressMatch,
    pub port: u16,
}

impl ValidatedRule {
    pub(crate) fn into_rule(self, id: String) -> Rule {
        Rule {
            id,
            action: self.action,
            protocol: self.protocol,
            source_ip: self.source_ip,
            destination_ip: self.destination_ip,
            port: self.port,
        }
    }
}

/// 시뮬레이션 요청
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketSpec {
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub source_ip: Option<String>,
    #[serde(default)]
    pub destination_ip: Option<String>,
    #[serde(default)]
    pub port: Option<PortInput>,
}

impl PacketSpec {
    pub fn new(
        protocol: impl Into<String>,
        source_ip: impl Into<String>,
        destination_ip: impl Into<String>,
        port: impl Into<PortInput>,
    ) -> Self {
        Self {
            protocol: Some(protocol.into()),
            source_ip: Some(source_ip.into()),
            destination_ip: Some(destination_ip.into()),
            port: Some(port.into()),
        }
    }

    /// 요청을 검증하여 구체적인 [`Packet`]으로 변환합니다.
    ///
    /// 패킷은 하나의 구체적인 흐름이므로 와일드카드를 허용하지 않습니다.
    pub fn validate(&self) -> Result<Packet, RuleEngineError> {
        let protocol = required("protocol", self.protocol.as_deref())?.parse::<Protocol>()?;
        let source_ip = parse_ip("source_ip", self.source_ip.as_deref())?;
        let destination_ip = parse_ip("destination_ip", self.destination_ip.as_deref())?;
        let port = parse_port(self.port.as_ref())?
            .ok_or_else(|| RuleEngineError::validation("port", "a value is required"))?;

        Ok(Packet {
            protocol,
            source_ip,
            destination_ip,
            port,
        })
    }
}

fn parse_ip(field: &str, value: Option<&str>) -> Result<IpAddr, RuleEngineError> {
    let raw = required(field, value)?;
    raw.parse::<IpAddr>().map_err(|_| {
        RuleEngineError::validation(field, format!("'{raw}' is not a valid IP address"))
    })
}

/// 평가 대상 패킷 (검증 완료)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Packet {
    pub protocol: Protocol,
    pub source_ip: IpAddr,
    pub destination_ip: IpAddr,
    pub port: u16,
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {}:{}",
            self.protocol, self.source_ip, self.destination_ip, self.port
        )
    }
}
