//! 终端日志初始化

use tracing_subscriber::EnvFilter;

/// 初始化终端日志（`RUST_LOG` 优先）
///
/// # 参数
/// - `verbose`: 未设置 `RUST_LOG` 时是否输出 debug 级别
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 测试中可能被多次调用，忽略重复初始化
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
