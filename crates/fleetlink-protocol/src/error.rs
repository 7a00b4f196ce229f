//! 协议层错误分类
//!
//! 驱动向上层报告的所有失败都归入三类：传输断裂、命令被拒、超时。
//! 错误永远携带人类可读的细节字符串，具体原因对核心层不透明。

use std::fmt;
use thiserror::Error;

/// 协议错误的结构化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProtocolErrorKind {
    /// 传输层断裂（链路断开、对端关闭等）
    Transport,
    /// 对端拒绝了命令（语法错误、会话未建立等）
    Rejected,
    /// 调用在限定时间内未完成
    Timeout,
}

impl fmt::Display for ProtocolErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolErrorKind::Transport => f.write_str("Transport"),
            ProtocolErrorKind::Rejected => f.write_str("Rejected"),
            ProtocolErrorKind::Timeout => f.write_str("Timeout"),
        }
    }
}

/// 结构化协议错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ProtocolError {
    pub kind: ProtocolErrorKind,
    pub message: String,
}

impl ProtocolError {
    pub fn new(kind: ProtocolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ProtocolErrorKind::Transport, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(ProtocolErrorKind::Rejected, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProtocolErrorKind::Timeout, message)
    }

    /// 该错误是否意味着会话已不可用
    ///
    /// 传输断裂与超时都视为链路失效，连接层据此进入 `Faulted`。
    /// `Rejected` 只说明单条命令失败，会话本身仍然有效。
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            ProtocolErrorKind::Transport | ProtocolErrorKind::Timeout
        )
    }
}

impl From<String> for ProtocolError {
    fn from(message: String) -> Self {
        Self::new(ProtocolErrorKind::Transport, message)
    }
}

impl From<&str> for ProtocolError {
    fn from(message: &str) -> Self {
        Self::new(ProtocolErrorKind::Transport, message)
    }
}
