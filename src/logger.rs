//! 日志初始化
//!
//! `RUST_LOG` 优先；否则默认 `info`，详细模式为 `debug`

use tracing_subscriber::EnvFilter;

/// 初始化全局日志，重复调用无副作用
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("oca={default_level},warn")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
