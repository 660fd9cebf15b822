//! # Daily Report Autogen
//!
//! 按日期批量预建空白日报文档的 Rust 工具
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（文档应用实例），只暴露能力
//! - `DocumentBackend` - 新建 / 另存为 / 关闭 / 释放 四步能力
//! - `BlankFileBackend` / `CommandBackend` - 空白占位文件 / 外部编辑器
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 只处理单个文件
//! - `DocumentProvisioner` - 在一个路径上创建文档
//! - `ActivityLog` - 追加写活动日志
//!
//! ### ③ 规划层（Planning）
//! - `planning/` - 纯计算和只读检查
//! - `date_sequence` / `FileNamer` / `collision_guard`
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_runner` - 批次状态机，管理并发
//! - `orchestrator/app` - 应用入口
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod planning;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use config::{BackendKind, Config};
pub use error::{AppError, AppResult, ConfigError, ProvisionError};
pub use infrastructure::{BlankFileBackend, CommandBackend, DocumentBackend, EditorSession};
pub use models::{FileTask, RunContext, RunMode, TaskStatus};
pub use orchestrator::{App, BatchRunner, BatchSpec, RunPhase, RunReport, RunRequest, RunStatus};
pub use services::{ActivityLog, DocumentProvisioner};
