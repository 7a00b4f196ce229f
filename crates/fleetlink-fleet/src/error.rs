//! 注册表错误类型定义

use fleetlink_conn::ConnectionError;
use thiserror::Error;

/// 注册表层错误类型
#[derive(Error, Debug)]
pub enum RegistryError {
    /// 查询的名字未注册
    #[error("no robot registered under name {0:?}")]
    NotFound(String),

    /// 某个成员的连接层错误（带成员名）
    #[error("robot {name:?}: {source}")]
    Connection {
        name: String,
        #[source]
        source: ConnectionError,
    },
}

impl RegistryError {
    pub(crate) fn member(name: impl Into<String>, source: ConnectionError) -> Self {
        Self::Connection {
            name: name.into(),
            source,
        }
    }
}
