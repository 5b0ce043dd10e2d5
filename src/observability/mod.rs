//! 可观测性：tracing 日志初始化
//!
//! 默认 info，可通过 RUST_LOG 覆盖。宿主进程启动时调用一次。

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init() {
    let _ = try_init();
}

/// 安装全局 subscriber；已安装过时返回 false
pub fn try_init() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init()
        .is_ok()
}
