//! # Fleetlink Protocol
//!
//! 机器人通信协议的公共类型定义（无传输依赖）
//!
//! ## 模块
//!
//! - `brand`: 机器人品牌标签
//! - `payload`: 命令应答与响应载荷
//! - `error`: 协议层错误分类
//!
//! ## 设计说明
//!
//! 本 crate 是整个工作区的最底层，不依赖任何传输实现。
//! 命令本身是不透明字符串（G-code、KRL、RAPID 等语法属于具体驱动的职责），
//! 协议层只定义各品牌驱动必须共享的载荷与错误词汇。

pub mod brand;
pub mod error;
pub mod payload;

// 重新导出常用类型
pub use brand::Brand;
pub use error::{ProtocolError, ProtocolErrorKind};
pub use payload::{Ack, Response};
