//! # Fleetlink Connection Layer
//!
//! 本模块提供单个机器人端点的连接生命周期管理，包括：
//! - 连接状态机（Disconnected → Handshaking → Connected / Faulted）
//! - 操作互斥（单连接同一时刻只有一个活动操作）
//! - 驱动独占持有与显式替换
//! - 结构化事件发射（状态迁移、命令收发结果）
//!
//! # 并发模型
//!
//! 同一连接上的公共操作彼此互斥、全序执行；不同连接之间互不影响。
//! `state()` 通过原子字无锁读取，握手期间其他线程可以观察到
//! 瞬态的 `Handshaking`。
//!
//! # 使用场景
//!
//! 大多数用户应该通过 `fleetlink-fleet` 的注册表批量管理连接；
//! 直接使用本模块适合只面向单台设备的工具。

pub mod builder;
pub mod config;
pub mod connection;
pub mod error;
pub mod events;
pub mod state;

pub use builder::ConnectionBuilder;
pub use config::ConnectionConfig;
pub use connection::Connection;
pub use error::ConnectionError;
pub use events::{ChannelSink, ConnectionEvent, EventHub, EventSink, TraceSink};
pub use state::{AtomicConnState, ConnState};
