//! # Fleetlink SDK
//!
//! 多品牌工业机器人队列通信 SDK 的统一入口。
//!
//! ## 分层
//!
//! - [`protocol`]: 品牌标签、载荷与协议错误（最底层，无传输依赖）
//! - [`driver`]: 协议驱动抽象与内置驱动（echo / sim / mock）
//! - [`conn`]: 单连接生命周期状态机与事件发射
//! - [`fleet`]: 具名注册表、广播分发与聚合报表
//!
//! ## 快速上手
//!
//! ```rust
//! use fleetlink_sdk::prelude::*;
//!
//! let registry = FleetRegistry::new();
//! let conn = Connection::builder("192.168.1.10", 7000)
//!     .brand(Brand::Kuka)
//!     .build()
//!     .unwrap();
//! registry.add("kuka-cell-1", conn);
//!
//! registry.connect("kuka-cell-1").unwrap();
//! let report = registry.broadcast("STATUS?");
//! assert_eq!(report.delivered(), 1);
//! ```

pub use fleetlink_conn as conn;
pub use fleetlink_driver as driver;
pub use fleetlink_fleet as fleet;
pub use fleetlink_protocol as protocol;

pub mod logging;

/// 常用类型一站式导入
pub mod prelude {
    pub use fleetlink_conn::{
        ChannelSink, ConnState, Connection, ConnectionBuilder, ConnectionConfig, ConnectionError,
        ConnectionEvent, EventSink, TraceSink,
    };
    pub use fleetlink_driver::{EchoDriver, ProtocolDriver, SimDriver};
    pub use fleetlink_fleet::{BroadcastReport, FleetRegistry, RegistryError, SendOutcome};
    pub use fleetlink_protocol::{Ack, Brand, ProtocolError, ProtocolErrorKind, Response};
}
