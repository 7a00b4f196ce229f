//! 队列配置文件解析
//!
//! TOML 格式，每个 `[[robot]]` 条目描述一台机器人。示例：
//!
//! ```toml
//! [[robot]]
//! name = "kuka-cell-1"
//! host = "192.168.1.10"
//! port = 7000
//! brand = "KUKA"
//! latency_ms = 30
//! ```
//!
//! 本 CLI 面向演示与联调，所有条目都以 `SimDriver` 落地；
//! 接入真实控制器时由宿主程序注入对应品牌的驱动。

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use fleetlink_sdk::prelude::*;
use serde::Deserialize;

/// 单台机器人条目
#[derive(Debug, Deserialize)]
pub struct RobotEntry {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub brand: String,
    /// 模拟设备的单次调用延迟（毫秒）
    #[serde(default)]
    pub latency_ms: u64,
    /// 握手超时（毫秒，缺省用连接层默认值）
    #[serde(default)]
    pub handshake_timeout_ms: Option<u64>,
    /// 命令超时（毫秒，缺省用连接层默认值）
    #[serde(default)]
    pub call_timeout_ms: Option<u64>,
}

/// 队列配置文件
#[derive(Debug, Default, Deserialize)]
pub struct FleetFile {
    #[serde(default)]
    pub robot: Vec<RobotEntry>,
}

impl FleetFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fleet file {}", path.display()))?;
        let file: FleetFile = toml::from_str(&raw)
            .with_context(|| format!("failed to parse fleet file {}", path.display()))?;
        Ok(file)
    }

    /// 依据配置构建注册表（每条目一个 SimDriver 连接）
    pub fn build_registry(&self) -> Result<FleetRegistry> {
        let registry = FleetRegistry::new();
        for entry in &self.robot {
            let brand: Brand = entry
                .brand
                .parse()
                .with_context(|| format!("robot {:?}: bad brand {:?}", entry.name, entry.brand))?;

            let defaults = ConnectionConfig::default();
            let config = ConnectionConfig {
                handshake_timeout_ms: entry
                    .handshake_timeout_ms
                    .unwrap_or(defaults.handshake_timeout_ms),
                call_timeout_ms: entry.call_timeout_ms.unwrap_or(defaults.call_timeout_ms),
            };

            let driver =
                SimDriver::new(brand).with_latency(Duration::from_millis(entry.latency_ms));
            let conn = Connection::builder(entry.host.clone(), entry.port)
                .brand(brand)
                .label(entry.name.clone())
                .driver(driver)
                .config(config)
                .sink(Arc::new(TraceSink))
                .build()
                .with_context(|| format!("robot {:?}: invalid endpoint", entry.name))?;
            registry.add(entry.name.clone(), conn);
        }
        Ok(registry)
    }
}
