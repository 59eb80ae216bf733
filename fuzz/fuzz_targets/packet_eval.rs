#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use ironwall_rule_engine::matcher::rule_matches;
use ironwall_rule_engine::{Action, PacketSpec, RuleSpec, SimulatorBuilder};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// 규칙 목록 (최대 16개로 제한)
    rules: Vec<FuzzRule>,
    packet: FuzzPacket,
    default_allow: bool,
}

#[derive(Arbitrary, Debug)]
struct FuzzRule {
    allow: bool,
    protocol: FuzzProtocol,
    source: FuzzAddress,
    destination: FuzzAddress,
    port: u16,
}

#[derive(Arbitrary, Debug)]
struct FuzzPacket {
    protocol: FuzzProtocol,
    source: [u8; 4],
    destination: [u8; 4],
    port: u16,
}

#[derive(Arbitrary, Debug)]
enum FuzzProtocol {
    Tcp,
    Udp,
    Icmp,
    Any,
    Raw(String),
}

#[derive(Arbitrary, Debug)]
enum FuzzAddress {
    Any,
    Exact([u8; 4]),
    Cidr([u8; 4], u8),
    Raw(String),
}

impl FuzzProtocol {
    fn as_string(&self) -> String {
        match self {
            FuzzProtocol::Tcp => "TCP".to_owned(),
            FuzzProtocol::Udp => "udp".to_owned(),
            FuzzProtocol::Icmp => "ICMP".to_owned(),
            FuzzProtocol::Any => "ANY".to_owned(),
            FuzzProtocol::Raw(s) => s.clone(),
        }
    }
}

impl FuzzAddress {
    fn as_string(&self) -> String {
        match self {
            FuzzAddress::Any => "ANY".to_owned(),
            FuzzAddress::Exact([a, b, c, d]) => format!("{a}.{b}.{c}.{d}"),
            FuzzAddress::Cidr([a, b, c, d], len) => format!("{a}.{b}.{c}.{d}/{}", len % 33),
            FuzzAddress::Raw(s) => s.clone(),
        }
    }
}

fn dotted([a, b, c, d]: [u8; 4]) -> String {
    format!("{a}.{b}.{c}.{d}")
}

fuzz_target!(|input: FuzzInput| {
    let default_action = if input.default_allow {
        Action::Allow
    } else {
        Action::Block
    };

    // 검증에 실패하는 규칙은 건너뜀
    let specs: Vec<RuleSpec> = input
        .rules
        .iter()
        .take(16)
        .map(|r| {
            RuleSpec::new(if r.allow { "ALLOW" } else { "BLOCK" }, r.protocol.as_string())
                .source_ip(r.source.as_string())
                .destination_ip(r.destination.as_string())
                .port(r.port)
        })
        .filter(|spec| spec.validate().is_ok())
        .collect();

    let Ok(sim) = SimulatorBuilder::new()
        .default_action(default_action)
        .seed_rules(specs)
        .build()
    else {
        return;
    };

    let packet = PacketSpec::new(
        input.packet.protocol.as_string(),
        dotted(input.packet.source),
        dotted(input.packet.destination),
        input.packet.port,
    );

    // 평가는 패닉 없이 끝나야 하고, 판정은 첫 번째로 매칭되는 규칙을 따라야 함
    if let Ok(entry) = sim.simulate(&packet) {
        let rules = sim.list_rules();
        let first = rules.iter().find(|rule| rule_matches(rule, &entry.packet));

        assert_eq!(
            entry.matched_rule_id.as_deref(),
            first.map(|rule| rule.id.as_str())
        );
        let expected = match first {
            Some(rule) => rule.action.verdict(),
            None => default_action.verdict(),
        };
        assert_eq!(entry.action, expected);
        assert_eq!(sim.list_logs().len(), 1);
    }
});
