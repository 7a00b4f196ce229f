//! 连接层错误类型定义

use fleetlink_protocol::{ProtocolError, ProtocolErrorKind};
use thiserror::Error;

/// 连接层错误类型
#[derive(Error, Debug, Clone)]
pub enum ConnectionError {
    /// 连接未处于 Connected 状态
    #[error("not connected")]
    NotConnected,

    /// 握手失败（连接进入 Faulted）
    #[error("handshake failed: {0}")]
    HandshakeFailed(#[source] ProtocolError),

    /// 已有操作在执行，或会话已建立
    ///
    /// `connect()` 采用快速失败策略：与任何在途操作冲突、
    /// 或状态已是 Connected 时立即返回本错误。
    #[error("connect rejected: another operation is in progress or session already established")]
    AlreadyInProgress,

    /// 端点参数非法（构建期校验）
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// 驱动在命令收发中报告的协议错误
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl ConnectionError {
    /// 稳定的错误类别标签（用于报表渲染）
    pub fn kind_label(&self) -> &'static str {
        match self {
            ConnectionError::NotConnected => "NotConnected",
            ConnectionError::HandshakeFailed(_) => "HandshakeFailed",
            ConnectionError::AlreadyInProgress => "AlreadyInProgress",
            ConnectionError::InvalidEndpoint(_) => "InvalidEndpoint",
            ConnectionError::Protocol(e) => match e.kind {
                ProtocolErrorKind::Transport => "Transport",
                ProtocolErrorKind::Rejected => "Rejected",
                ProtocolErrorKind::Timeout => "Timeout",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_source_detail() {
        let err = ConnectionError::HandshakeFailed(ProtocolError::transport("link down"));
        assert_eq!(format!("{err}"), "handshake failed: Transport: link down");
    }

    #[test]
    fn test_protocol_passthrough() {
        let err: ConnectionError = ProtocolError::rejected("bad opcode").into();
        assert_eq!(err.kind_label(), "Rejected");
        assert_eq!(format!("{err}"), "Rejected: bad opcode");
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(ConnectionError::NotConnected.kind_label(), "NotConnected");
        assert_eq!(ConnectionError::AlreadyInProgress.kind_label(), "AlreadyInProgress");
    }
}
