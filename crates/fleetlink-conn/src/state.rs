//! 连接状态定义
//!
//! 状态迁移只发生在持有操作锁的线程内；`AtomicConnState`
//! 把迁移结果发布给无锁读取方。

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// 连接生命周期状态
///
/// # 状态说明
///
/// - **Disconnected**: 初始状态，也是 `disconnect()` 的终点
/// - **Handshaking**: `connect()` 执行期间的瞬态
/// - **Connected**: 会话建立，允许 `send_command`
/// - **Faulted**: 确认的传输失效之后的状态，显式 `disconnect()`
///   或下一次成功的 `connect()` 之前保持
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, num_enum::FromPrimitive, num_enum::IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ConnState {
    /// 未连接（默认）
    #[default]
    Disconnected = 0,
    /// 握手进行中（瞬态）
    Handshaking = 1,
    /// 会话已建立
    Connected = 2,
    /// 传输失效，等待重连或断开
    Faulted = 3,
}

impl ConnState {
    pub fn is_connected(self) -> bool {
        self == ConnState::Connected
    }

    /// 该状态下是否允许发起 `connect()`
    pub fn can_connect(self) -> bool {
        matches!(self, ConnState::Disconnected | ConnState::Faulted)
    }

    pub fn label(self) -> &'static str {
        match self {
            ConnState::Disconnected => "disconnected",
            ConnState::Handshaking => "handshaking",
            ConnState::Connected => "connected",
            ConnState::Faulted => "faulted",
        }
    }
}

impl fmt::Display for ConnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 连接状态（原子版本，用于跨线程发布）
///
/// 写入方永远是持有操作锁的线程，读取方无锁。
#[derive(Debug)]
pub struct AtomicConnState {
    inner: AtomicU8,
}

impl AtomicConnState {
    pub fn new(state: ConnState) -> Self {
        Self {
            inner: AtomicU8::new(state.into()),
        }
    }

    pub fn get(&self) -> ConnState {
        ConnState::from(self.inner.load(Ordering::Acquire))
    }

    pub fn set(&self, state: ConnState) {
        self.inner.store(state.into(), Ordering::Release);
    }

    /// 写入新状态并返回旧状态
    pub fn replace(&self, state: ConnState) -> ConnState {
        ConnState::from(self.inner.swap(state.into(), Ordering::AcqRel))
    }
}

impl Default for AtomicConnState {
    fn default() -> Self {
        Self::new(ConnState::Disconnected)
    }
}
