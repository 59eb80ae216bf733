//! 규칙 평가 벤치마크
//!
//! 규칙 수에 따른 first-match 평가 비용과 시뮬레이터 전체 경로를 측정합니다.

use std::num::NonZeroUsize;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ironwall_rule_engine::{
    Action, PacketSpec, RuleEngineConfig, RuleSpec, RuleStore, SimulatorBuilder, evaluate,
};

/// 패킷과 매칭되지 않는 규칙을 `count`개 생성합니다 (최악의 경우: 전체 스캔).
fn non_matching_rules(count: usize) -> RuleStore {
    let store = RuleStore::new(count.max(1));
    for i in 0..count {
        let spec = RuleSpec::new("ALLOW", "TCP")
            .source_ip(format!("172.16.{}.{}", (i / 250) % 250, i % 250 + 1))
            .port(((i % 60_000) + 1) as u16);
        store.create(&spec).unwrap();
    }
    store
}

fn bench_rule_scaling(c: &mut Criterion) {
    let packet = PacketSpec::new("TCP", "10.0.0.1", "10.0.0.2", 65_000u16)
        .validate()
        .unwrap();

    let mut group = c.benchmark_group("rule_scaling");

    for rule_count in [1usize, 10, 100, 1000].iter() {
        let store = non_matching_rules(*rule_count);
        let rules = store.snapshot();

        group.throughput(Throughput::Elements(*rule_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(rule_count),
            rule_count,
            |b, _| b.iter(|| evaluate(black_box(&packet), black_box(&rules), Action::Block)),
        );
    }

    group.finish();
}

fn bench_cidr_match(c: &mut Criterion) {
    let store = RuleStore::default();
    store
        .create(&RuleSpec::new("ALLOW", "ANY").source_ip("10.0.0.0/8"))
        .unwrap();
    let rules = store.snapshot();
    let packet = PacketSpec::new("UDP", "10.20.30.40", "8.8.8.8", 53u16)
        .validate()
        .unwrap();

    let mut group = c.benchmark_group("cidr_match");
    group.throughput(Throughput::Elements(1));
    group.bench_function("contained", |b| {
        b.iter(|| evaluate(black_box(&packet), black_box(&rules), Action::Block))
    });
    group.finish();
}

fn bench_simulate_end_to_end(c: &mut Criterion) {
    // 반복 중 감사 로그가 무한히 커지지 않도록 상한 설정
    let config = RuleEngineConfig {
        audit_log_capacity: NonZeroUsize::new(1024),
        ..RuleEngineConfig::default()
    };
    let simulator = SimulatorBuilder::new()
        .config(config)
        .seed_rule(RuleSpec::new("BLOCK", "TCP").source_ip("192.168.1.100").port(80u16))
        .seed_rule(RuleSpec::new("ALLOW", "UDP").port(53u16))
        .build()
        .unwrap();
    let spec = PacketSpec::new("UDP", "10.0.0.1", "10.0.0.53", 53u16);

    let mut group = c.benchmark_group("simulate");
    group.throughput(Throughput::Elements(1));
    group.bench_function("validate_evaluate_append", |b| {
        b.iter(|| simulator.simulate(black_box(&spec)).unwrap())
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_rule_scaling,
    bench_cidr_match,
    bench_simulate_end_to_end
);
criterion_main!(benches);
