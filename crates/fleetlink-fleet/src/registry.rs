//! 连接注册表实现
//!
//! 注册表锁只保护 name → Connection 映射本身；任何成员 I/O
//! 都在快照上进行，绝不发生在注册表锁内。这是本层最重要的
//! 不变量（避免"持注册表锁阻塞在成员 I/O 上"的可用性风险）。

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use fleetlink_conn::{ConnState, Connection};
use fleetlink_protocol::Response;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::RegistryError;
use crate::report::{BroadcastReport, SendOutcome};

/// 机器人队列注册表
///
/// # 所有权
///
/// 注册表独占持有成员连接（`Arc` 仅用于让广播快照在注册表锁外
/// 存活）；销毁注册表会先尽力断开再释放所有成员。
///
/// # 并发
///
/// 多线程可同时持有同一注册表引用并对不同（或相同）成员发起操作。
/// 名字唯一；重复注册以后写覆盖，被顶替的连接先断开再释放。
#[derive(Default)]
pub struct FleetRegistry {
    members: Mutex<HashMap<String, Arc<Connection>>>,
}

impl FleetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个连接，返回其共享句柄
    ///
    /// 同名成员被顶替：先断开、再随最后一个句柄释放，不泄漏会话。
    pub fn add(&self, name: impl Into<String>, connection: Connection) -> Arc<Connection> {
        let name = name.into();
        let conn = Arc::new(connection);
        let displaced = {
            let mut members = self.members.lock();
            members.insert(name.clone(), conn.clone())
        };
        if let Some(old) = displaced {
            warn!(%name, "replacing existing fleet member");
            // 在注册表锁外断开，避免阻塞其他注册表操作
            old.disconnect();
        }
        debug!(%name, brand = %conn.brand(), "fleet member registered");
        conn
    }

    /// 查询成员；从不隐式创建
    pub fn get(&self, name: &str) -> Result<Arc<Connection>, RegistryError> {
        self.members
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// 移除并断开成员
    pub fn remove(&self, name: &str) -> Result<(), RegistryError> {
        let removed = self.members.lock().remove(name);
        match removed {
            Some(conn) => {
                conn.disconnect();
                debug!(%name, "fleet member removed");
                Ok(())
            },
            None => Err(RegistryError::NotFound(name.to_string())),
        }
    }

    /// 面向单台：建立指定成员的会话
    pub fn connect(&self, name: &str) -> Result<(), RegistryError> {
        let conn = self.get(name)?;
        conn.connect().map_err(|e| RegistryError::member(name, e))
    }

    /// 面向单台：向指定成员发送命令
    pub fn send_command(&self, name: &str, command: &str) -> Result<Response, RegistryError> {
        let conn = self.get(name)?;
        conn.send_command(command)
            .map_err(|e| RegistryError::member(name, e))
    }

    /// 向全队广播一条命令
    ///
    /// 在注册表锁内做一次快照，随后在锁外对每个 Connected 成员
    /// 各起一个线程发送；慢成员既不阻塞注册表变更，也不拖延同伴。
    /// 不处于 Connected 的成员记为 `Skipped`，不做驱动 I/O。
    /// 单台失败收进报表，广播本身从不提前中止、从不失败。
    pub fn broadcast(&self, command: &str) -> BroadcastReport {
        let snapshot = self.snapshot();
        info!(%command, members = snapshot.len(), "broadcasting to fleet");

        let mut outcomes: BTreeMap<String, SendOutcome> = BTreeMap::new();
        std::thread::scope(|s| {
            let mut pending = Vec::new();
            for (name, conn) in snapshot {
                let state = conn.state();
                if state != ConnState::Connected {
                    outcomes.insert(name, SendOutcome::Skipped(state));
                    continue;
                }
                pending.push((
                    name,
                    s.spawn(move || match conn.send_command(command) {
                        Ok(response) => SendOutcome::Delivered(response),
                        Err(error) => SendOutcome::Failed(error),
                    }),
                ));
            }
            for (name, handle) in pending {
                // 发送线程不会 panic；万一 panic 按失败记账
                let outcome = handle.join().unwrap_or_else(|_| {
                    SendOutcome::Failed(fleetlink_conn::ConnectionError::Protocol(
                        fleetlink_protocol::ProtocolError::transport("broadcast worker panicked"),
                    ))
                });
                outcomes.insert(name, outcome);
            }
        });

        let report = BroadcastReport::new(command.to_string(), outcomes);
        info!(
            delivered = report.delivered(),
            failed = report.failed(),
            skipped = report.skipped(),
            "broadcast finished"
        );
        report
    }

    /// 断开全队
    ///
    /// 快照后逐台断开；`disconnect` 定义为不失败，慢成员之间
    /// 互不拖延（每台一个线程）。
    pub fn disconnect_all(&self) {
        let snapshot = self.snapshot();
        info!(members = snapshot.len(), "disconnecting fleet");
        std::thread::scope(|s| {
            for (_, conn) in &snapshot {
                s.spawn(move || conn.disconnect());
            }
        });
    }

    /// 已注册的成员名（有序）
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.members.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// 成员名与当前状态的快照（有序）
    pub fn states(&self) -> Vec<(String, ConnState)> {
        let mut states: Vec<(String, ConnState)> = self
            .snapshot()
            .into_iter()
            .map(|(name, conn)| (name, conn.state()))
            .collect();
        states.sort_by(|a, b| a.0.cmp(&b.0));
        states
    }

    pub fn len(&self) -> usize {
        self.members.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.lock().is_empty()
    }

    /// 在短暂的注册表锁内复制 (name, handle) 对
    fn snapshot(&self) -> Vec<(String, Arc<Connection>)> {
        self.members
            .lock()
            .iter()
            .map(|(name, conn)| (name.clone(), conn.clone()))
            .collect()
    }
}

impl Drop for FleetRegistry {
    fn drop(&mut self) {
        // 成员随注册表释放，先尽力断开
        self.disconnect_all();
    }
}

impl std::fmt::Debug for FleetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FleetRegistry")
            .field("members", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetlink_conn::ConnectionError;
    use fleetlink_driver::mock::{MockDriver, MockHandle};
    use fleetlink_protocol::{Brand, ProtocolErrorKind};

    fn mock_member(host: &str, brand: Brand) -> (Connection, MockHandle) {
        let (driver, handle) = MockDriver::new();
        let conn = Connection::builder(host, 7000)
            .brand(brand)
            .driver(driver)
            .build()
            .unwrap();
        (conn, handle)
    }

    #[test]
    fn test_get_unknown_name() {
        let registry = FleetRegistry::new();
        assert!(matches!(
            registry.get("ghost"),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn test_add_get_remove() {
        let registry = FleetRegistry::new();
        let (conn, _h) = mock_member("10.0.0.1", Brand::Kuka);
        registry.add("kuka-cell", conn);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("kuka-cell").unwrap().brand(), Brand::Kuka);

        registry.remove("kuka-cell").unwrap();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.remove("kuka-cell"),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_add_replaces_and_disconnects_old() {
        let registry = FleetRegistry::new();
        let (first, _h1) = mock_member("10.0.0.1", Brand::Kuka);
        let first_handle = registry.add("cell", first);
        first_handle.connect().unwrap();
        assert!(first_handle.is_connected());

        let (second, _h2) = mock_member("10.0.0.2", Brand::Abb);
        registry.add("cell", second);

        // 名字唯一：后写覆盖，被顶替的连接已断开
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("cell").unwrap().brand(), Brand::Abb);
        assert_eq!(first_handle.state(), ConnState::Disconnected);
    }

    #[test]
    fn test_targeted_send_through_registry() {
        let registry = FleetRegistry::new();
        let (conn, _h) = mock_member("10.0.0.1", Brand::Fanuc);
        registry.add("fanuc-cell", conn);

        registry.connect("fanuc-cell").unwrap();
        let response = registry.send_command("fanuc-cell", "J P[1]").unwrap();
        assert_eq!(response.as_str(), "ECHO: J P[1]");
    }

    #[test]
    fn test_targeted_send_wraps_member_error() {
        let registry = FleetRegistry::new();
        let (conn, _h) = mock_member("10.0.0.1", Brand::Cnc);
        registry.add("cnc-cell", conn);

        let err = registry.send_command("cnc-cell", "G01 X10").unwrap_err();
        match err {
            RegistryError::Connection { name, source } => {
                assert_eq!(name, "cnc-cell");
                assert!(matches!(source, ConnectionError::NotConnected));
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_broadcast_skips_unconnected_members() {
        let registry = FleetRegistry::new();
        let (a, ha) = mock_member("10.0.0.1", Brand::Kuka);
        let (b, _hb) = mock_member("10.0.0.2", Brand::Abb);
        registry.add("a", a);
        registry.add("b", b);

        registry.connect("a").unwrap();
        let report = registry.broadcast("STATUS?");

        assert_eq!(report.len(), 2);
        assert!(report.outcome("a").unwrap().is_delivered());
        assert!(matches!(
            report.outcome("b").unwrap(),
            SendOutcome::Skipped(ConnState::Disconnected)
        ));
        // 未连接成员没有任何驱动 I/O
        assert_eq!(ha.send_calls(), 1);
    }

    #[test]
    fn test_broadcast_isolates_member_failure() {
        let registry = FleetRegistry::new();
        let (a, _ha) = mock_member("10.0.0.1", Brand::Kuka);
        let (b, hb) = mock_member("10.0.0.2", Brand::Abb);
        registry.add("a", a);
        registry.add("b", b);
        registry.connect("a").unwrap();
        registry.connect("b").unwrap();

        hb.fail_send(ProtocolErrorKind::Transport);
        let report = registry.broadcast("STATUS?");

        // 全员在场：B 失败不影响 A 送达
        assert_eq!(report.len(), 2);
        assert!(report.outcome("a").unwrap().is_delivered());
        assert!(report.outcome("b").unwrap().is_failed());

        // B 传输断裂后进入 Faulted，A 保持 Connected
        assert_eq!(registry.get("a").unwrap().state(), ConnState::Connected);
        assert_eq!(registry.get("b").unwrap().state(), ConnState::Faulted);
    }

    #[test]
    fn test_disconnect_all() {
        let registry = FleetRegistry::new();
        for (i, &brand) in Brand::known().iter().enumerate() {
            let (conn, _h) = mock_member(&format!("10.0.0.{}", i + 1), brand);
            let name = format!("robot-{i}");
            registry.add(name.clone(), conn);
            registry.connect(&name).unwrap();
        }

        registry.disconnect_all();
        for (_, state) in registry.states() {
            assert_eq!(state, ConnState::Disconnected);
        }
    }
}
