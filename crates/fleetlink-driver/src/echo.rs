//! 默认回显驱动
//!
//! 永远成功，把最近一条命令原样回显。用于测试、演示，
//! 以及作为新建连接在注入真实驱动前的占位驱动。

use fleetlink_protocol::{Ack, ProtocolError, Response};

use crate::ProtocolDriver;

/// 回显驱动（默认驱动）
#[derive(Debug, Default)]
pub struct EchoDriver {
    last_command: Option<String>,
}

impl EchoDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProtocolDriver for EchoDriver {
    fn handshake(&mut self) -> Result<Ack, ProtocolError> {
        Ok(Ack::new("OK"))
    }

    fn send(&mut self, command: &str) -> Result<Ack, ProtocolError> {
        let ack = Ack::new(format!("SENT: {command}"));
        self.last_command = Some(command.to_string());
        Ok(ack)
    }

    fn receive(&mut self) -> Result<Response, ProtocolError> {
        let text = match &self.last_command {
            Some(cmd) => format!("ECHO: {cmd}"),
            None => "ECHO:".to_string(),
        };
        Ok(Response::new(text))
    }

    fn description(&self) -> &str {
        "echo driver"
    }
}
