//! 连接事件系统
//!
//! 本模块提供结构化事件发射，替代向控制台直接打印的观测方式。
//! 每次状态迁移、每次命令收发结果都会产生一个 [`ConnectionEvent`]，
//! 由注册在 [`EventHub`] 上的所有 [`EventSink`] 接收。
//!
//! # 性能要求
//!
//! 事件在持有连接操作锁时发射，回调必须快速且不阻塞：
//! - 禁止在 sink 中做 I/O、加锁等待或无界发送
//! - Channel 模式：使用 `try_send`，队列满时丢弃并计数
//!
//! # 使用示例
//!
//! ```rust
//! use fleetlink_conn::{ChannelSink, ConnectionBuilder};
//! use std::sync::Arc;
//!
//! let (sink, rx) = ChannelSink::bounded(64);
//! let conn = ConnectionBuilder::new("192.168.1.10", 7000)
//!     .sink(Arc::new(sink))
//!     .build()
//!     .unwrap();
//!
//! conn.connect().unwrap();
//! let event = rx.try_recv().unwrap();
//! assert_eq!(event.label(), conn.label());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, bounded};
use fleetlink_protocol::{Brand, ProtocolError};
use tracing::{debug, info, warn};

use crate::state::ConnState;

/// 连接产生的结构化事件
#[derive(Debug, Clone)]
pub enum ConnectionEvent {
    /// 状态迁移
    StateChanged {
        label: String,
        brand: Brand,
        from: ConnState,
        to: ConnState,
    },
    /// 命令发送成功（含配对响应）
    CommandSent {
        label: String,
        brand: Brand,
        command: String,
        ack: String,
    },
    /// 命令发送失败
    CommandFailed {
        label: String,
        brand: Brand,
        command: String,
        error: ProtocolError,
    },
}

impl ConnectionEvent {
    /// 产生该事件的连接标识
    pub fn label(&self) -> &str {
        match self {
            ConnectionEvent::StateChanged { label, .. } => label,
            ConnectionEvent::CommandSent { label, .. } => label,
            ConnectionEvent::CommandFailed { label, .. } => label,
        }
    }

    pub fn brand(&self) -> Brand {
        match self {
            ConnectionEvent::StateChanged { brand, .. } => *brand,
            ConnectionEvent::CommandSent { brand, .. } => *brand,
            ConnectionEvent::CommandFailed { brand, .. } => *brand,
        }
    }
}

/// 事件接收端接口
///
/// 实现必须快速返回，推荐 `try_send` 转发后异步处理。
pub trait EventSink: Send + Sync {
    fn on_event(&self, event: &ConnectionEvent);
}

/// 事件中枢
///
/// 管理一个连接上注册的全部 sink。本身不做线程同步，
/// 由连接以 `RwLock<EventHub>` 持有。
#[derive(Default)]
pub struct EventHub {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sink(&mut self, sink: Arc<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// 依注册顺序触发所有 sink
    pub fn emit(&self, event: &ConnectionEvent) {
        for sink in &self.sinks {
            sink.on_event(event);
        }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub").field("sinks", &self.sinks.len()).finish()
    }
}

/// 有界 channel sink
///
/// 队列满时丢弃事件并累加计数，绝不阻塞发射线程。
pub struct ChannelSink {
    tx: Sender<ConnectionEvent>,
    dropped: AtomicU64,
}

impl ChannelSink {
    /// 创建容量为 `capacity` 的 sink 与其接收端
    pub fn bounded(capacity: usize) -> (Self, Receiver<ConnectionEvent>) {
        let (tx, rx) = bounded(capacity);
        (
            Self {
                tx,
                dropped: AtomicU64::new(0),
            },
            rx,
        )
    }

    /// 因队列满而被丢弃的事件数
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl EventSink for ChannelSink {
    fn on_event(&self, event: &ConnectionEvent) {
        if self.tx.try_send(event.clone()).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// tracing sink
///
/// 把每个事件转成一条结构化日志，外部订阅者通过
/// `tracing-subscriber` 接入。
#[derive(Debug, Default, Clone, Copy)]
pub struct TraceSink;

impl EventSink for TraceSink {
    fn on_event(&self, event: &ConnectionEvent) {
        match event {
            ConnectionEvent::StateChanged { label, brand, from, to } => {
                info!(target: "fleetlink::events", %label, %brand, %from, %to, "state changed");
            },
            ConnectionEvent::CommandSent { label, brand, command, ack } => {
                debug!(target: "fleetlink::events", %label, %brand, %command, %ack, "command sent");
            },
            ConnectionEvent::CommandFailed { label, brand, command, error } => {
                warn!(target: "fleetlink::events", %label, %brand, %command, %error, "command failed");
            },
        }
    }
}
