//! 批次数据模型
//!
//! `FileTask` 在规划阶段创建，只在文档创建后更新状态；`RunContext` 持有一次运行的全部任务。

use crate::error::ProvisionError;
use chrono::NaiveDate;
use std::fmt::Display;
use std::path::PathBuf;

/// 目标日期（不含时间）
pub type TargetDate = NaiveDate;

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RunMode {
    /// 只创建当天一个文件，顺序执行
    Daily,
    /// 创建一整周的文件，必须在指定的星期执行，并发执行
    Week,
}

impl RunMode {
    /// 默认日志文件名
    pub fn default_log_file(self) -> &'static str {
        match self {
            RunMode::Daily => "autogen-daily.log",
            RunMode::Week => "autogenV2-monday.log",
        }
    }
}

impl Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Daily => write!(f, "daily"),
            RunMode::Week => write!(f, "week"),
        }
    }
}

/// 任务状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Created,
    Failed { reason: String },
}

/// 单个待创建的文件
#[derive(Debug, Clone)]
pub struct FileTask {
    pub target_date: TargetDate,
    pub file_name: String,
    pub full_path: PathBuf,
    pub status: TaskStatus,
}

impl FileTask {
    /// 创建处于 Pending 状态的任务
    pub fn new(target_date: TargetDate, file_name: String, full_path: PathBuf) -> Self {
        Self {
            target_date,
            file_name,
            full_path,
            status: TaskStatus::Pending,
        }
    }

    /// 记录一次创建尝试的结果
    pub fn record(&mut self, outcome: &Result<(), ProvisionError>) {
        self.status = match outcome {
            Ok(()) => TaskStatus::Created,
            Err(e) => TaskStatus::Failed {
                reason: e.to_string(),
            },
        };
    }

    pub fn is_created(&self) -> bool {
        self.status == TaskStatus::Created
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, TaskStatus::Failed { .. })
    }
}

/// 一次运行的上下文
#[derive(Debug, Clone)]
pub struct RunContext {
    pub output_directory: PathBuf,
    pub anchor_date: TargetDate,
    pub task_count: usize,
    pub tasks: Vec<FileTask>,
}

impl RunContext {
    pub fn new(output_directory: PathBuf, anchor_date: TargetDate, tasks: Vec<FileTask>) -> Self {
        Self {
            output_directory,
            anchor_date,
            task_count: tasks.len(),
            tasks,
        }
    }

    /// 所有计划中的文件名
    pub fn file_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.file_name.as_str()).collect()
    }

    /// 所有计划中的完整路径
    pub fn paths(&self) -> Vec<PathBuf> {
        self.tasks.iter().map(|t| t.full_path.clone()).collect()
    }

    pub fn created_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_created()).count()
    }

    /// 创建失败的任务
    pub fn failed_tasks(&self) -> Vec<&FileTask> {
        self.tasks.iter().filter(|t| t.is_failed()).collect()
    }
}
