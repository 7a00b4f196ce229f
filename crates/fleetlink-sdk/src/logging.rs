//! 日志初始化
//!
//! 安装 `tracing-subscriber` 的 fmt 订阅者并桥接 `log` 生态。
//! 重复调用是安全的（后续调用为空操作），方便测试与库内兜底。

use tracing_subscriber::EnvFilter;

/// 以默认过滤规则初始化日志（`RUST_LOG` 优先）
pub fn init() {
    init_with_filter("fleetlink=info");
}

/// 以给定过滤规则初始化日志
///
/// `RUST_LOG` 环境变量存在时优先于 `directives`。
pub fn init_with_filter(directives: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    // log -> tracing 桥接；重复初始化返回 Err，忽略即可
    let _ = tracing_log::LogTracer::init();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
    tracing::debug!("fleetlink logging initialized");
}
