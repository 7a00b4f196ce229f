//! # Fleetlink Fleet Layer
//!
//! 具名连接注册表与广播分发。
//!
//! [`FleetRegistry`] 独占持有一组以名字索引的连接，提供并发安全的
//! 注册/查询/移除、面向单台的命令转发，以及对全队的广播与批量断开。
//! 单台失败被隔离为逐台结果，不会中断全队操作。

pub mod error;
pub mod registry;
pub mod report;

pub use error::RegistryError;
pub use registry::FleetRegistry;
pub use report::{BroadcastReport, SendOutcome};
