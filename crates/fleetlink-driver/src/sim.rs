//! 模拟设备驱动
//!
//! 带可配置延迟的品牌化模拟驱动，用于演示与延迟相关的测试。
//! 每次调用先消耗设定的人工延迟（`spin_sleep` 精确睡眠），
//! 再返回带品牌标签的应答；若延迟超过调用时间上界，
//! 以 `Timeout` 失败。

use std::time::Duration;

use fleetlink_protocol::{Ack, Brand, ProtocolError, Response};
use tracing::trace;

use crate::ProtocolDriver;

/// 模拟设备驱动
///
/// 会话状态（是否已握手）是驱动私有的：未握手就 `send`/`receive`
/// 会被对端以 `Rejected` 拒绝，模拟真实控制器的行为。
#[derive(Debug)]
pub struct SimDriver {
    brand: Brand,
    latency: Duration,
    call_timeout: Option<Duration>,
    session_open: bool,
    description: String,
}

impl SimDriver {
    pub fn new(brand: Brand) -> Self {
        Self {
            brand,
            latency: Duration::ZERO,
            call_timeout: None,
            session_open: false,
            description: format!("{brand} simulated device"),
        }
    }

    /// 设置每次调用的人工延迟
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn brand(&self) -> Brand {
        self.brand
    }

    /// 消耗人工延迟；超过调用上界则以 Timeout 失败
    fn simulate_io(&self) -> Result<(), ProtocolError> {
        match self.call_timeout {
            Some(bound) if self.latency > bound => {
                // 设备不会更快响应，只等到上界即放弃
                spin_sleep::sleep(bound);
                Err(ProtocolError::timeout(format!(
                    "{} did not answer within {:?}",
                    self.brand, bound
                )))
            },
            _ => {
                if !self.latency.is_zero() {
                    spin_sleep::sleep(self.latency);
                }
                Ok(())
            },
        }
    }
}

impl ProtocolDriver for SimDriver {
    fn handshake(&mut self) -> Result<Ack, ProtocolError> {
        trace!(brand = %self.brand, latency = ?self.latency, "sim handshake");
        self.simulate_io()?;
        self.session_open = true;
        Ok(Ack::new("OK"))
    }

    fn send(&mut self, command: &str) -> Result<Ack, ProtocolError> {
        if !self.session_open {
            return Err(ProtocolError::rejected(format!(
                "{} rejected command before handshake",
                self.brand
            )));
        }
        self.simulate_io()?;
        Ok(Ack::new(format!("{} SENT: {command}", self.brand)))
    }

    fn receive(&mut self) -> Result<Response, ProtocolError> {
        if !self.session_open {
            return Err(ProtocolError::rejected(format!(
                "{} has no session to receive from",
                self.brand
            )));
        }
        self.simulate_io()?;
        Ok(Response::new(format!("{} RESPONSE: OK", self.brand)))
    }

    fn set_call_timeout(&mut self, timeout: Duration) {
        self.call_timeout = Some(timeout);
    }

    fn description(&self) -> &str {
        &self.description
    }
}
