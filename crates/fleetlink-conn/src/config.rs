//! 连接配置
//!
//! POD 配置结构，毫秒字段便于从配置文件反序列化。

use std::time::Duration;

/// 连接配置
///
/// 两个时间上界在每次驱动调用前通过 `set_call_timeout` 下发：
/// 握手用 `handshake_timeout_ms`，命令收发用 `call_timeout_ms`。
/// 超时与传输断裂同等处理（连接进入 Faulted）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionConfig {
    /// 握手调用的时间上界（毫秒）
    pub handshake_timeout_ms: u64,
    /// 单次 send/receive 调用的时间上界（毫秒）
    pub call_timeout_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            handshake_timeout_ms: 1_000,
            call_timeout_ms: 500,
        }
    }
}

impl ConnectionConfig {
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConnectionConfig::default();
        assert_eq!(config.handshake_timeout(), Duration::from_millis(1_000));
        assert_eq!(config.call_timeout(), Duration::from_millis(500));
    }
}
