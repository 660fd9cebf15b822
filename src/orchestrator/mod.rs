//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 校验配置、选择文档后端
//! - 把命令行请求转换为批次参数
//! - 输出启动信息和最终统计
//!
//! ### `batch_runner` - 批次执行器
//! - 规划 → 冲突检查 → 创建 → 汇总 的状态机
//! - 控制并发数量（Semaphore）
//!
//! ## 层次关系
//!
//! ```text
//! app
//!     ↓
//! batch_runner (处理 Vec<FileTask>)
//!     ↓
//! planning (日期 / 文件名 / 冲突检查)  +  services (创建文档 / 活动日志)
//!     ↓
//! infrastructure (DocumentBackend)
//! ```

pub mod app;
pub mod batch_runner;

pub use app::{App, RunRequest};
pub use batch_runner::{BatchRunner, BatchSpec, Dispatch, RunPhase, RunReport, RunStatus};
