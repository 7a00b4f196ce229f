//! 命令载荷类型
//!
//! `Ack` 与 `Response` 是驱动边界上的两种回包：
//! - `Ack`: `handshake`/`send` 返回的确认令牌
//! - `Response`: `receive` 返回的、与最近一次 `send` 配对的响应
//!
//! 两者都只是人类可读字符串的薄封装，具体格式由驱动决定。

use std::fmt;

/// 驱动确认令牌
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ack {
    text: String,
}

impl Ack {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Ack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// 与最近一次 `send` 配对的响应
///
/// 本核心采用同步请求/响应配对，不做乱序复用。
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Response {
    text: String,
}

impl Response {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
