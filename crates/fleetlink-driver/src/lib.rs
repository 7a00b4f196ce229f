//! # Fleetlink Driver Layer
//!
//! 协议驱动抽象层，提供统一的驱动接口。
//!
//! 每个机器人品牌的线上协议（TCP、串口、厂商 SDK）实现为一个
//! [`ProtocolDriver`]，连接层通过该 trait 驱动握手与命令收发，
//! 对具体传输方式保持无感。

use std::time::Duration;

pub use fleetlink_protocol::{Ack, ProtocolError, Response};

pub mod echo;
pub mod sim;

#[cfg(feature = "mock")]
pub mod mock;

pub use echo::EchoDriver;
pub use sim::SimDriver;

#[cfg(feature = "mock")]
pub use mock::{MockDriver, MockHandle};

/// 品牌协议驱动的统一接口
///
/// # 契约
///
/// - `handshake` 必须先于 `send`/`receive` 调用，建立会话；
///   只返回完整成功或失败，不存在部分成功。
/// - `send` 传输一条不透明命令字符串，返回确认令牌。
/// - `receive` 返回与最近一次 `send` 配对的响应（同步请求/响应，
///   本核心不做乱序复用）。
/// - 跨调用的会话状态是驱动的私有事务，核心层不感知。
///
/// # 超时
///
/// `set_call_timeout` 是可选的逐调用时间上界。默认实现忽略它；
/// 真实驱动应将其映射到 socket/SDK 的 deadline。超时必须以
/// `ProtocolErrorKind::Timeout` 报告，连接层会将其视同传输断裂。
pub trait ProtocolDriver: Send {
    /// 建立会话的初始交换
    fn handshake(&mut self) -> Result<Ack, ProtocolError>;

    /// 传输一条不透明命令
    fn send(&mut self, command: &str) -> Result<Ack, ProtocolError>;

    /// 读取与最近一次 `send` 配对的响应
    fn receive(&mut self) -> Result<Response, ProtocolError>;

    /// 设置单次调用的时间上界（默认忽略）
    fn set_call_timeout(&mut self, _timeout: Duration) {}

    /// 驱动描述（用于日志）
    fn description(&self) -> &str {
        "unnamed driver"
    }
}

impl ProtocolDriver for Box<dyn ProtocolDriver> {
    fn handshake(&mut self) -> Result<Ack, ProtocolError> {
        (**self).handshake()
    }

    fn send(&mut self, command: &str) -> Result<Ack, ProtocolError> {
        (**self).send(command)
    }

    fn receive(&mut self) -> Result<Response, ProtocolError> {
        (**self).receive()
    }

    fn set_call_timeout(&mut self, timeout: Duration) {
        (**self).set_call_timeout(timeout)
    }

    fn description(&self) -> &str {
        (**self).description()
    }
}
