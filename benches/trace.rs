//! Performance benchmarks for the simulation pipeline.
//!
//! Run with: `cargo bench`

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trace_router::engine::{
    Firewall, FirewallAction, FirewallRule, NameRecord, NetworkSnapshot, PacketSpec, PortRange,
    Route, RouteTable, RuleProtocol, Simulator,
};

/// Build a route table with the specified number of /24 networks plus a
/// default route.
fn build_routes(count: usize) -> RouteTable {
    let mut routes = Vec::with_capacity(count + 1);
    for i in 0..count {
        let second = u8::try_from((i / 256) % 256).unwrap();
        let third = u8::try_from(i % 256).unwrap();
        routes.push(Route {
            network: format!("10.{second}.{third}.0/24").parse().unwrap(),
            next_hop: "10.0.0.1".parse().unwrap(),
            interface: "eth0".into(),
            router_label: None,
        });
    }
    routes.push(Route {
        network: "0.0.0.0/0".parse().unwrap(),
        next_hop: "192.168.1.1".parse().unwrap(),
        interface: "eth1".into(),
        router_label: Some("Router-Edge".into()),
    });
    RouteTable::new(routes)
}

/// Build a firewall where only the last rule matches the benchmark packet.
fn build_firewall(count: usize) -> Firewall {
    let mut rules = Vec::with_capacity(count);
    for i in 0..count {
        rules.push(FirewallRule {
            id: u32::try_from(i).unwrap() + 1,
            action: FirewallAction::Deny,
            protocol: RuleProtocol::Named("UDP".into()),
            source: "172.16.0.0/12".parse().unwrap(),
            ports: PortRange::single(53),
        });
    }
    rules.push(FirewallRule {
        id: u32::try_from(count).unwrap() + 1,
        action: FirewallAction::Allow,
        protocol: RuleProtocol::Any,
        source: "0.0.0.0/0".parse().unwrap(),
        ports: PortRange::new(1, 65535).unwrap(),
    });
    Firewall::new(rules, FirewallAction::Allow)
}

fn build_simulator(table_size: usize) -> Simulator {
    let snapshot = NetworkSnapshot {
        records: vec![
            NameRecord::address("web.internal", "10.0.0.10".parse().unwrap()),
            NameRecord::alias("www.internal", "web.internal"),
        ],
        routes: build_routes(table_size),
        firewall: build_firewall(table_size),
    };
    Simulator::new(Arc::new(snapshot))
}

fn packet(destination: &str) -> PacketSpec {
    PacketSpec {
        source: "192.168.1.50".parse().unwrap(),
        destination: destination.into(),
        destination_port: 80,
        protocol: "TCP".into(),
        time_to_live: 4,
    }
}

fn bench_simulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate");

    for size in [10, 100, 1000] {
        let simulator = build_simulator(size);

        group.bench_with_input(
            BenchmarkId::new("literal_destination", size),
            &simulator,
            |b, sim| {
                let spec = packet("10.0.0.10");
                b.iter(|| black_box(sim.simulate(&spec)));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("named_destination", size),
            &simulator,
            |b, sim| {
                let spec = packet("www.internal");
                b.iter(|| black_box(sim.simulate(&spec)));
            },
        );
    }

    group.finish();
}

fn bench_route_selection(c: &mut Criterion) {
    let routes = build_routes(1000);
    let dest = "10.3.200.77".parse().unwrap();

    c.bench_function("route_select_1000", |b| {
        b.iter(|| black_box(routes.select(black_box(dest))));
    });
}

criterion_group!(benches, bench_simulate, bench_route_selection);
criterion_main!(benches);
