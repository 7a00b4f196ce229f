//! Builder 模式实现
//!
//! 提供链式构造 [`Connection`] 实例的便捷方式，并做构建期校验。

use std::sync::Arc;

use fleetlink_driver::{EchoDriver, ProtocolDriver};
use fleetlink_protocol::Brand;

use crate::config::ConnectionConfig;
use crate::connection::Connection;
use crate::error::ConnectionError;
use crate::events::{EventHub, EventSink};

/// Connection Builder（链式构造）
///
/// # Example
///
/// ```rust
/// use fleetlink_conn::ConnectionBuilder;
/// use fleetlink_protocol::Brand;
///
/// let conn = ConnectionBuilder::new("192.168.1.10", 7000)
///     .brand(Brand::Kuka)
///     .label("kuka-cell-1")
///     .build()
///     .unwrap();
///
/// assert_eq!(conn.brand(), Brand::Kuka);
/// assert_eq!(conn.label(), "kuka-cell-1");
/// ```
pub struct ConnectionBuilder {
    host: String,
    port: u16,
    brand: Brand,
    label: Option<String>,
    driver: Option<Box<dyn ProtocolDriver>>,
    config: ConnectionConfig,
    sinks: Vec<Arc<dyn EventSink>>,
}

impl ConnectionBuilder {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            brand: Brand::Unknown,
            label: None,
            driver: None,
            config: ConnectionConfig::default(),
            sinks: Vec::new(),
        }
    }

    pub fn brand(mut self, brand: Brand) -> Self {
        self.brand = brand;
        self
    }

    /// 设置事件与日志中使用的标识（默认 `{brand}@{host}:{port}`）
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// 注入协议驱动（默认 [`EchoDriver`]）
    pub fn driver(mut self, driver: impl ProtocolDriver + 'static) -> Self {
        self.driver = Some(Box::new(driver));
        self
    }

    /// 注入已装箱的协议驱动
    pub fn boxed_driver(mut self, driver: Box<dyn ProtocolDriver>) -> Self {
        self.driver = Some(driver);
        self
    }

    pub fn config(mut self, config: ConnectionConfig) -> Self {
        self.config = config;
        self
    }

    /// 注册事件 sink（可重复调用）
    pub fn sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// 构建 Connection 实例
    ///
    /// # 校验
    ///
    /// - host 非空
    /// - port 在 1–65535 之间（0 非法）
    pub fn build(self) -> Result<Connection, ConnectionError> {
        if self.host.trim().is_empty() {
            return Err(ConnectionError::InvalidEndpoint(
                "host must not be empty".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(ConnectionError::InvalidEndpoint(
                "port must be in 1-65535".to_string(),
            ));
        }

        let label = self
            .label
            .unwrap_or_else(|| format!("{}@{}:{}", self.brand, self.host, self.port));
        let driver = self
            .driver
            .unwrap_or_else(|| Box::new(EchoDriver::new()));

        let mut events = EventHub::new();
        for sink in self.sinks {
            events.add_sink(sink);
        }

        Ok(Connection::from_parts(
            self.host, self.port, self.brand, label, self.config, driver, events,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_label_and_driver() {
        let conn = ConnectionBuilder::new("192.168.1.20", 9000)
            .brand(Brand::Abb)
            .build()
            .unwrap();
        assert_eq!(conn.label(), "ABB@192.168.1.20:9000");

        // 默认驱动永远成功
        conn.connect().unwrap();
        assert!(conn.is_connected());
    }

    #[test]
    fn test_rejects_empty_host() {
        let err = ConnectionBuilder::new("", 7000).build().unwrap_err();
        assert!(matches!(err, ConnectionError::InvalidEndpoint(_)));
    }

    #[test]
    fn test_rejects_port_zero() {
        let err = ConnectionBuilder::new("10.0.0.1", 0).build().unwrap_err();
        assert!(matches!(err, ConnectionError::InvalidEndpoint(_)));
    }
}
