//! 广播结果报表
//!
//! 广播从不把单台失败上抛为自身失败：快照中的每个成员
//! 在报表里恰好出现一次，带着各自的结果。

use std::collections::BTreeMap;
use std::fmt;

use fleetlink_conn::{ConnState, ConnectionError};
use fleetlink_protocol::Response;

/// 单个成员的广播结果
#[derive(Debug, Clone)]
pub enum SendOutcome {
    /// 命令送达，携带配对响应
    Delivered(Response),
    /// 发送失败（成员名下的具体错误）
    Failed(ConnectionError),
    /// 广播时不处于 Connected，未尝试发送
    Skipped(ConnState),
}

impl SendOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, SendOutcome::Delivered(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SendOutcome::Failed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, SendOutcome::Skipped(_))
    }
}

impl fmt::Display for SendOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendOutcome::Delivered(response) => write!(f, "delivered ({response})"),
            SendOutcome::Failed(error) => {
                write!(f, "failed [{}] ({error})", error.kind_label())
            },
            SendOutcome::Skipped(state) => write!(f, "skipped ({state})"),
        }
    }
}

/// 一次广播的聚合报表
///
/// 成员按名字有序排列，遍历顺序稳定。
#[derive(Debug, Clone)]
pub struct BroadcastReport {
    command: String,
    outcomes: BTreeMap<String, SendOutcome>,
}

impl BroadcastReport {
    pub(crate) fn new(command: String, outcomes: BTreeMap<String, SendOutcome>) -> Self {
        Self { command, outcomes }
    }

    /// 广播的命令原文
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn outcome(&self, name: &str) -> Option<&SendOutcome> {
        self.outcomes.get(name)
    }

    /// 按名字序遍历全部结果
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SendOutcome)> {
        self.outcomes.iter().map(|(name, outcome)| (name.as_str(), outcome))
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn delivered(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_delivered()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_failed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_skipped()).count()
    }

    /// 是否所有成员都送达（空报表视为真）
    pub fn is_complete_success(&self) -> bool {
        self.outcomes.values().all(|o| o.is_delivered())
    }
}

impl fmt::Display for BroadcastReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "broadcast {:?}: {} delivered, {} failed, {} skipped",
            self.command,
            self.delivered(),
            self.failed(),
            self.skipped()
        )?;
        for (name, outcome) in self.iter() {
            writeln!(f, "  - {name}: {outcome}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> BroadcastReport {
        let mut outcomes = BTreeMap::new();
        outcomes.insert(
            "abb-cell".to_string(),
            SendOutcome::Delivered(Response::new("ABB RESPONSE: OK")),
        );
        outcomes.insert(
            "dobot-bench".to_string(),
            SendOutcome::Skipped(ConnState::Disconnected),
        );
        outcomes.insert(
            "kuka-cell".to_string(),
            SendOutcome::Failed(ConnectionError::NotConnected),
        );
        BroadcastReport::new("STATUS?".to_string(), outcomes)
    }

    #[test]
    fn test_counts() {
        let report = sample_report();
        assert_eq!(report.len(), 3);
        assert_eq!(report.delivered(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 1);
        assert!(!report.is_complete_success());
    }

    #[test]
    fn test_iteration_is_name_ordered() {
        let report = sample_report();
        let names: Vec<&str> = report.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["abb-cell", "dobot-bench", "kuka-cell"]);
    }

    #[test]
    fn test_display_lists_every_member() {
        let rendered = sample_report().to_string();
        assert!(rendered.contains("1 delivered, 1 failed, 1 skipped"));
        assert!(rendered.contains("dobot-bench: skipped (disconnected)"));
        assert!(rendered.contains("kuka-cell: failed [NotConnected]"));
    }
}
