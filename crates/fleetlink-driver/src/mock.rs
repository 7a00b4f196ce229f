//! Mock 驱动（feature = "mock"）
//!
//! 用于测试的脚本化驱动：通过共享句柄在驱动被移交给连接之后
//! 继续注入失败、读取调用计数。
//!
//! # 示例
//!
//! ```rust
//! use fleetlink_driver::{MockDriver, ProtocolDriver};
//! use fleetlink_protocol::ProtocolErrorKind;
//!
//! let (mut driver, handle) = MockDriver::new();
//! assert!(driver.handshake().is_ok());
//!
//! handle.fail_send(ProtocolErrorKind::Transport);
//! assert!(driver.send("STATUS?").is_err());
//! assert_eq!(handle.send_calls(), 1);
//! ```

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};

use fleetlink_protocol::{Ack, ProtocolError, ProtocolErrorKind, Response};

use crate::ProtocolDriver;

// 失败开关编码：0 = 正常，1..=3 = ProtocolErrorKind
const FAIL_NONE: u8 = 0;
const FAIL_TRANSPORT: u8 = 1;
const FAIL_REJECTED: u8 = 2;
const FAIL_TIMEOUT: u8 = 3;

fn encode(kind: ProtocolErrorKind) -> u8 {
    match kind {
        ProtocolErrorKind::Transport => FAIL_TRANSPORT,
        ProtocolErrorKind::Rejected => FAIL_REJECTED,
        ProtocolErrorKind::Timeout => FAIL_TIMEOUT,
    }
}

fn decode(value: u8) -> Option<ProtocolErrorKind> {
    match value {
        FAIL_TRANSPORT => Some(ProtocolErrorKind::Transport),
        FAIL_REJECTED => Some(ProtocolErrorKind::Rejected),
        FAIL_TIMEOUT => Some(ProtocolErrorKind::Timeout),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct MockShared {
    fail_handshake: AtomicU8,
    fail_send: AtomicU8,
    fail_receive: AtomicU8,
    handshake_calls: AtomicU32,
    send_calls: AtomicU32,
    receive_calls: AtomicU32,
    last_command: Mutex<Option<String>>,
}

/// 脚本化 mock 驱动
#[derive(Debug)]
pub struct MockDriver {
    shared: Arc<MockShared>,
}

/// mock 驱动的测试侧句柄
///
/// 驱动本体移交给连接后，测试通过句柄继续操控它。
#[derive(Debug, Clone)]
pub struct MockHandle {
    shared: Arc<MockShared>,
}

impl MockDriver {
    pub fn new() -> (Self, MockHandle) {
        let shared = Arc::new(MockShared::default());
        (
            Self {
                shared: shared.clone(),
            },
            MockHandle { shared },
        )
    }

    fn check(&self, switch: &AtomicU8, what: &str) -> Result<(), ProtocolError> {
        if let Some(kind) = decode(switch.load(Ordering::Relaxed)) {
            return Err(ProtocolError::new(
                kind,
                format!("mock {what} failure injected"),
            ));
        }
        Ok(())
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new().0
    }
}

impl ProtocolDriver for MockDriver {
    fn handshake(&mut self) -> Result<Ack, ProtocolError> {
        self.shared.handshake_calls.fetch_add(1, Ordering::Relaxed);
        self.check(&self.shared.fail_handshake, "handshake")?;
        Ok(Ack::new("OK"))
    }

    fn send(&mut self, command: &str) -> Result<Ack, ProtocolError> {
        self.shared.send_calls.fetch_add(1, Ordering::Relaxed);
        *self.shared.last_command.lock().unwrap() = Some(command.to_string());
        self.check(&self.shared.fail_send, "send")?;
        Ok(Ack::new(format!("SENT: {command}")))
    }

    fn receive(&mut self) -> Result<Response, ProtocolError> {
        self.shared.receive_calls.fetch_add(1, Ordering::Relaxed);
        self.check(&self.shared.fail_receive, "receive")?;
        let text = match self.shared.last_command.lock().unwrap().as_deref() {
            Some(cmd) => format!("ECHO: {cmd}"),
            None => "ECHO:".to_string(),
        };
        Ok(Response::new(text))
    }

    fn description(&self) -> &str {
        "mock driver"
    }
}

impl MockHandle {
    pub fn fail_handshake(&self, kind: ProtocolErrorKind) {
        self.shared.fail_handshake.store(encode(kind), Ordering::Relaxed);
    }

    pub fn fail_send(&self, kind: ProtocolErrorKind) {
        self.shared.fail_send.store(encode(kind), Ordering::Relaxed);
    }

    pub fn fail_receive(&self, kind: ProtocolErrorKind) {
        self.shared.fail_receive.store(encode(kind), Ordering::Relaxed);
    }

    /// 清除所有失败开关，驱动恢复正常
    pub fn recover(&self) {
        self.shared.fail_handshake.store(FAIL_NONE, Ordering::Relaxed);
        self.shared.fail_send.store(FAIL_NONE, Ordering::Relaxed);
        self.shared.fail_receive.store(FAIL_NONE, Ordering::Relaxed);
    }

    pub fn handshake_calls(&self) -> u32 {
        self.shared.handshake_calls.load(Ordering::Relaxed)
    }

    pub fn send_calls(&self) -> u32 {
        self.shared.send_calls.load(Ordering::Relaxed)
    }

    pub fn receive_calls(&self) -> u32 {
        self.shared.receive_calls.load(Ordering::Relaxed)
    }

    /// 驱动总共执行过的 IO 调用数
    pub fn total_calls(&self) -> u32 {
        self.handshake_calls() + self.send_calls() + self.receive_calls()
    }

    pub fn last_command(&self) -> Option<String> {
        self.shared.last_command.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injected_failure_and_recovery() {
        let (mut driver, handle) = MockDriver::new();
        handle.fail_handshake(ProtocolErrorKind::Transport);
        assert!(driver.handshake().is_err());

        handle.recover();
        assert!(driver.handshake().is_ok());
        assert_eq!(handle.handshake_calls(), 2);
    }

    #[test]
    fn test_counters_and_last_command() {
        let (mut driver, handle) = MockDriver::new();
        driver.handshake().unwrap();
        driver.send("MoveJ A,B,C").unwrap();
        driver.receive().unwrap();

        assert_eq!(handle.total_calls(), 3);
        assert_eq!(handle.last_command().as_deref(), Some("MoveJ A,B,C"));
    }
}
