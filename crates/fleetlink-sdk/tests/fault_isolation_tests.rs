//! 并发隔离测试
//!
//! 验证并发模型的两条核心保证：
//! 1. 慢成员不拖延同伴（广播扇出不在单一长锁内串行）
//! 2. 不同连接之间互不序列化；超时按传输断裂处理

use std::time::{Duration, Instant};

use fleetlink_sdk::prelude::*;

fn sim_member(registry: &FleetRegistry, name: &str, brand: Brand, latency: Duration) {
    let conn = Connection::builder("127.0.0.1", 7000)
        .brand(brand)
        .label(name)
        .driver(SimDriver::new(brand).with_latency(latency))
        .build()
        .unwrap();
    registry.add(name, conn);
}

#[test]
fn test_slow_member_does_not_delay_peers() {
    let latency = Duration::from_millis(150);
    let registry = FleetRegistry::new();
    for name in ["slow-a", "slow-b", "slow-c"] {
        sim_member(&registry, name, Brand::Cnc, latency);
        registry.connect(name).unwrap();
    }

    // 每台 send+receive 各消耗一次延迟；并发扇出的总时长
    // 应接近单台成本（2×150ms），远低于串行的 3×2×150ms
    let started = Instant::now();
    let report = registry.broadcast("G04 P0");
    let elapsed = started.elapsed();

    assert_eq!(report.delivered(), 3);
    assert!(
        elapsed < Duration::from_millis(700),
        "broadcast took {elapsed:?}, members were serialized"
    );
}

#[test]
fn test_different_connections_are_not_serialized() {
    let latency = Duration::from_millis(150);
    let registry = FleetRegistry::new();
    sim_member(&registry, "left", Brand::Kuka, latency);
    sim_member(&registry, "right", Brand::Abb, latency);
    registry.connect("left").unwrap();
    registry.connect("right").unwrap();

    let started = Instant::now();
    std::thread::scope(|s| {
        let left = s.spawn(|| registry.send_command("left", "PTP X,Y,Z"));
        let right = s.spawn(|| registry.send_command("right", "MoveJ A,B,C"));
        assert!(left.join().unwrap().is_ok());
        assert!(right.join().unwrap().is_ok());
    });
    let elapsed = started.elapsed();

    // 串行执行约需 2×2×150ms；并发应接近 2×150ms
    assert!(
        elapsed < Duration::from_millis(500),
        "sends took {elapsed:?}, connections were serialized against each other"
    );
}

#[test]
fn test_handshake_timeout_faults_connection() {
    let conn = Connection::builder("127.0.0.1", 7000)
        .brand(Brand::Fanuc)
        .driver(SimDriver::new(Brand::Fanuc).with_latency(Duration::from_millis(100)))
        .config(ConnectionConfig {
            handshake_timeout_ms: 10,
            call_timeout_ms: 10,
        })
        .build()
        .unwrap();

    let err = conn.connect().unwrap_err();
    match err {
        ConnectionError::HandshakeFailed(source) => {
            assert_eq!(source.kind, ProtocolErrorKind::Timeout);
        },
        other => panic!("expected handshake timeout, got {other}"),
    }
    // 超时与传输断裂同等处理
    assert_eq!(conn.state(), ConnState::Faulted);
}

#[test]
fn test_call_timeout_mid_send_faults_connection() {
    // 握手上界宽松、命令上界收紧：握手成功后 send 必然超时
    let conn = Connection::builder("127.0.0.1", 7000)
        .brand(Brand::Dobot)
        .driver(SimDriver::new(Brand::Dobot).with_latency(Duration::from_millis(100)))
        .config(ConnectionConfig {
            handshake_timeout_ms: 500,
            call_timeout_ms: 20,
        })
        .build()
        .unwrap();
    conn.connect().unwrap();

    let err = conn.send_command("MoveTo 1,2,3").unwrap_err();
    assert_eq!(err.kind_label(), "Timeout");
    assert_eq!(conn.state(), ConnState::Faulted);
}

#[test]
fn test_registry_stays_mutable_during_slow_broadcast() {
    let registry = FleetRegistry::new();
    sim_member(
        &registry,
        "slow",
        Brand::RoboDk,
        Duration::from_millis(200),
    );
    registry.connect("slow").unwrap();

    std::thread::scope(|s| {
        let broadcast = s.spawn(|| registry.broadcast("RunProgram Main"));

        // 广播进行期间注册表仍可注册新成员（快照在锁外发送）
        std::thread::sleep(Duration::from_millis(50));
        let started = Instant::now();
        sim_member(&registry, "late", Brand::Dobot, Duration::ZERO);
        let add_elapsed = started.elapsed();
        assert!(
            add_elapsed < Duration::from_millis(100),
            "add blocked behind broadcast for {add_elapsed:?}"
        );

        let report = broadcast.join().unwrap();
        assert!(report.outcome("slow").unwrap().is_delivered());
        // "late" 从未连接；广播只覆盖快照成员，即便恰好进入快照也只会是 Skipped
        if let Some(outcome) = report.outcome("late") {
            assert!(outcome.is_skipped());
        }
    });
    assert_eq!(registry.len(), 2);
}
