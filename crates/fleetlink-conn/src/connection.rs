//! 连接状态机实现
//!
//! 一个 [`Connection`] 对应一个可寻址的机器人端点，独占持有一个
//! 协议驱动。驱动锁同时充当操作锁：`connect`、`send_command`、
//! `disconnect`、`set_driver` 彼此互斥，状态迁移因此全序化。

use std::sync::Arc;

use fleetlink_driver::ProtocolDriver;
use fleetlink_protocol::{Brand, ProtocolError, Response};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::builder::ConnectionBuilder;
use crate::config::ConnectionConfig;
use crate::error::ConnectionError;
use crate::events::{ConnectionEvent, EventHub, EventSink};
use crate::state::{AtomicConnState, ConnState};

/// 一个机器人端点的连接
///
/// # 生命周期
///
/// 创建时处于 `Disconnected`，持有默认驱动；`connect()` 走
/// Disconnected/Faulted → Handshaking → Connected（失败 → Faulted）；
/// `disconnect()` 从任意状态回到 `Disconnected`，幂等且不失败；
/// 析构时尽力断开。
///
/// # 并发
///
/// 所有公共操作通过内部锁互斥，但不同连接之间互不序列化。
/// `state()` 为无锁读取。
pub struct Connection {
    host: String,
    port: u16,
    brand: Brand,
    label: String,
    config: ConnectionConfig,
    state: AtomicConnState,
    /// 驱动锁兼操作锁：持锁者是唯一可迁移状态的线程
    driver: Mutex<Box<dyn ProtocolDriver>>,
    events: RwLock<EventHub>,
}

impl Connection {
    pub fn builder(host: impl Into<String>, port: u16) -> ConnectionBuilder {
        ConnectionBuilder::new(host, port)
    }

    pub(crate) fn from_parts(
        host: String,
        port: u16,
        brand: Brand,
        label: String,
        config: ConnectionConfig,
        driver: Box<dyn ProtocolDriver>,
        events: EventHub,
    ) -> Self {
        Self {
            host,
            port,
            brand,
            label,
            config,
            state: AtomicConnState::default(),
            driver: Mutex::new(driver),
            events: RwLock::new(events),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn brand(&self) -> Brand {
        self.brand
    }

    /// 事件与日志中使用的连接标识
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// 当前状态（无锁读取）
    ///
    /// 其他线程握手期间可能观察到瞬态的 `Handshaking`。
    pub fn state(&self) -> ConnState {
        self.state.get()
    }

    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// 注册事件 sink（随时可加，后续事件生效）
    pub fn add_sink(&self, sink: Arc<dyn EventSink>) {
        self.events.write().add_sink(sink);
    }

    /// 迁移状态并发射事件（仅在持有操作锁时调用）
    fn transition(&self, to: ConnState) {
        let from = self.state.replace(to);
        if from == to {
            return;
        }
        debug!(label = %self.label, brand = %self.brand, %from, %to, "connection state changed");
        self.events.read().emit(&ConnectionEvent::StateChanged {
            label: self.label.clone(),
            brand: self.brand,
            from,
            to,
        });
    }

    /// 建立会话
    ///
    /// 仅在 `Disconnected` 或 `Faulted` 状态下有效。并发重入采用
    /// 快速失败策略：与任何在途操作冲突、或会话已建立时，
    /// 立即返回 [`ConnectionError::AlreadyInProgress`]。
    ///
    /// 握手失败使连接进入 `Faulted`；`Faulted` 可直接重试，
    /// 无需手工复位。
    pub fn connect(&self) -> Result<(), ConnectionError> {
        let mut driver = self
            .driver
            .try_lock()
            .ok_or(ConnectionError::AlreadyInProgress)?;

        if !self.state.get().can_connect() {
            return Err(ConnectionError::AlreadyInProgress);
        }

        info!(
            label = %self.label,
            brand = %self.brand,
            host = %self.host,
            port = self.port,
            "connecting"
        );
        self.transition(ConnState::Handshaking);

        driver.set_call_timeout(self.config.handshake_timeout());
        match driver.handshake() {
            Ok(ack) => {
                self.transition(ConnState::Connected);
                info!(label = %self.label, ack = %ack, "connection established");
                Ok(())
            },
            Err(err) => {
                self.transition(ConnState::Faulted);
                warn!(label = %self.label, error = %err, "handshake failed");
                Err(ConnectionError::HandshakeFailed(err))
            },
        }
    }

    /// 发送一条命令并返回配对响应
    ///
    /// 仅在 `Connected` 状态下有效，否则以 `NotConnected` 失败，
    /// 不触碰驱动。驱动报告传输级失败（Transport/Timeout）时，
    /// 连接迁移到 `Faulted` 后再向调用方返回错误；本层不重试。
    pub fn send_command(&self, command: &str) -> Result<Response, ConnectionError> {
        let mut driver = self.driver.lock();

        if self.state.get() != ConnState::Connected {
            return Err(ConnectionError::NotConnected);
        }

        driver.set_call_timeout(self.config.call_timeout());
        match Self::drive_exchange(driver.as_mut(), command) {
            Ok((ack, response)) => {
                self.events.read().emit(&ConnectionEvent::CommandSent {
                    label: self.label.clone(),
                    brand: self.brand,
                    command: command.to_string(),
                    ack,
                });
                debug!(label = %self.label, %command, response = %response, "command completed");
                Ok(response)
            },
            Err(err) => {
                if err.is_fatal() {
                    // 确认的传输断裂不允许继续伪装成 Connected
                    self.transition(ConnState::Faulted);
                }
                self.events.read().emit(&ConnectionEvent::CommandFailed {
                    label: self.label.clone(),
                    brand: self.brand,
                    command: command.to_string(),
                    error: err.clone(),
                });
                warn!(label = %self.label, %command, error = %err, "command failed");
                Err(err.into())
            },
        }
    }

    fn drive_exchange(
        driver: &mut dyn ProtocolDriver,
        command: &str,
    ) -> Result<(String, Response), ProtocolError> {
        let ack = driver.send(command)?;
        let response = driver.receive()?;
        Ok((ack.as_str().to_string(), response))
    }

    /// 断开连接
    ///
    /// 任意状态下有效，幂等，绝不失败。资源释放尽力而为。
    pub fn disconnect(&self) {
        let _driver = self.driver.lock();
        let previous = self.state.get();
        if previous != ConnState::Disconnected {
            info!(label = %self.label, brand = %self.brand, "disconnecting");
        }
        self.transition(ConnState::Disconnected);
    }

    /// 替换协议驱动
    ///
    /// 旧驱动在赋值时释放。会话无法在传输被替换后存续，
    /// 因此替换总是先把连接迁移到 `Disconnected`。
    pub fn set_driver(&self, new_driver: Box<dyn ProtocolDriver>) {
        let mut driver = self.driver.lock();
        self.transition(ConnState::Disconnected);
        debug!(
            label = %self.label,
            old = driver.description(),
            new = new_driver.description(),
            "driver replaced"
        );
        *driver = new_driver;
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("label", &self.label)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("brand", &self.brand)
            .field("state", &self.state.get())
            .finish_non_exhaustive()
    }
}
