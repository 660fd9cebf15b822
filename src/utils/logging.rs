//! 终端输出工具模块
//!
//! 提供启动信息和最终统计的格式化输出

use crate::models::weekday_name;
use crate::orchestrator::batch_runner::{BatchSpec, Dispatch, RunReport};
use tracing::{error, info};

/// 记录程序启动信息
///
/// # 参数
/// - `spec`: 本次批次参数
/// - `backend`: 文档后端名称
pub fn log_startup(spec: &BatchSpec, backend: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - {} 模式", spec.mode);
    info!("📅 锚定日期: {} (共 {} 天)", spec.anchor, spec.count);
    if let Some(day) = spec.required_weekday {
        info!("🗓️ 要求执行日: {}", weekday_name(day));
    }
    match spec.dispatch {
        Dispatch::Sequential => info!("📊 执行方式: 顺序"),
        Dispatch::Pooled { workers } => info!("📊 执行方式: 并发 (最多 {} 个)", workers),
    }
    info!("📄 文档后端: {}", backend);
    if spec.dry_run {
        info!("💡 演练模式：只检查，不创建");
    }
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `report`: 批次运行结果
pub fn print_final_stats(report: &RunReport) {
    let total = report.context.task_count;
    let failed = report.failed();

    info!("\n{}", "=".repeat(60));
    info!("📊 处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", report.created(), total);
    info!("❌ 失败: {}", failed.len());
    for task in &failed {
        error!("   - {}", task.full_path.display());
    }
    info!("🏁 最终状态: {}", report.status);
    info!("{}", "=".repeat(60));
    if let Some(path) = &report.log_path {
        info!("\n日志已保存至: {}", path.display());
    }
    info!("Have a great day!");
}
