//! MOBIKE Performance Benchmarks
//!
//! Benchmarks for address list construction, notify processing and the
//! address update path.
//!
//! Run with: `cargo bench --bench mobike_bench`

#![cfg(feature = "ipsec")]

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use fynx_mobike::ipsec::{
    ikev2::{
        additional_address_type, build_address_list, encode_address, process_payloads,
        ExchangeType, IkeMessage, IkeSa, MobikeTask, NotifyType, Role, Task,
    },
    kernel::StaticKernelInterface,
    nat::NatDetectionHash,
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

/// Create test IKE SA
fn create_test_sa() -> IkeSa {
    IkeSa::new(
        [0x01; 8],
        [0x02; 8],
        "192.0.2.1:4500".parse().unwrap(),
        "198.51.100.1:4500".parse().unwrap(),
    )
}

/// `count` IPv4 addresses plus one IPv6 address
fn create_test_addresses(count: u8) -> Vec<IpAddr> {
    let mut addrs: Vec<IpAddr> = (1..=count)
        .map(|i| IpAddr::V4(Ipv4Addr::new(10, 0, 0, i)))
        .collect();
    addrs.push("2001:db8::1".parse().unwrap());
    addrs
}

/// Address list as announced by a peer
fn create_address_list_message(count: u8) -> IkeMessage {
    let mut message = IkeMessage::request(ExchangeType::Informational, 2);
    message.add_notify(false, NotifyType::UpdateSaAddresses, Vec::new());
    for addr in create_test_addresses(count) {
        message.add_notify(false, additional_address_type(&addr), encode_address(&addr));
    }
    message
}

/// Benchmark address list construction
fn bench_address_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("address_list");
    let sa = create_test_sa();

    for count in [1u8, 8, 32] {
        let kernel = StaticKernelInterface::new(create_test_addresses(count));
        group.throughput(Throughput::Elements(u64::from(count) + 1));
        group.bench_function(format!("build_{}", count), |b| {
            b.iter(|| {
                let mut message = IkeMessage::request(ExchangeType::Informational, 2);
                build_address_list(black_box(&sa), &kernel, &mut message);
                message
            });
        });
    }

    group.finish();
}

/// Benchmark processing of a peer address list
fn bench_process_payloads(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_payloads");

    for count in [1u8, 8, 32] {
        let message = create_address_list_message(count);
        let mut sa = create_test_sa();
        group.throughput(Throughput::Elements(u64::from(count) + 1));
        group.bench_function(format!("replace_{}", count), |b| {
            b.iter(|| process_payloads(&mut sa, black_box(&message)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark a complete initiator roam
fn bench_roam(c: &mut Criterion) {
    let mut group = c.benchmark_group("roam");
    let kernel = Arc::new(StaticKernelInterface::new(create_test_addresses(4)));
    let targets: [SocketAddr; 2] = [
        "10.0.0.1:4500".parse().unwrap(),
        "10.0.0.2:4500".parse().unwrap(),
    ];

    group.bench_function("build_update", |b| {
        let mut task =
            MobikeTask::new(create_test_sa().into_shared(), kernel.clone(), Role::Initiator);
        let mut i = 0;
        b.iter(|| {
            task.roam(Some(targets[i % 2]), None);
            i += 1;
            let mut message = IkeMessage::request(ExchangeType::Informational, 2);
            task.build(&mut message).unwrap();
            message
        });
    });

    group.finish();
}

/// Benchmark NAT detection hashing
fn bench_nat_detection(c: &mut Criterion) {
    let endpoint: SocketAddr = "203.0.113.5:4500".parse().unwrap();

    c.bench_function("nat_detection_hash", |b| {
        b.iter(|| {
            NatDetectionHash::compute(black_box(&[0x01; 8]), black_box(&[0x02; 8]), endpoint)
        });
    });
}

criterion_group!(
    benches,
    bench_address_list,
    bench_process_payloads,
    bench_roam,
    bench_nat_detection,
);

criterion_main!(benches);
