use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// 应用程序错误类型
///
/// 调度、冲突、目录错误都是整批致命的；`Provision` 只出现在单个文件的结果里。
#[derive(Debug, Error)]
pub enum AppError {
    /// 调用日期不满足调度要求（或生成数量非法）
    #[error("调度检查失败 (锚定日期: {anchor}): {reason}")]
    InvalidSchedule { anchor: NaiveDate, reason: String },

    /// 目标文件已存在
    #[error("文件已存在: {}", path.display())]
    FileExists { path: PathBuf },

    /// 同一批次中出现重复的目标路径
    #[error("批次中存在重复的目标路径: {}", path.display())]
    DuplicateTarget { path: PathBuf },

    /// 输出目录创建失败
    #[error("无法创建输出目录 ({}): {source}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 文档创建失败
    #[error("文档创建失败: {0}")]
    Provision(#[from] ProvisionError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 批次执行器被重复运行
    #[error("批次执行器只能运行一次 (当前阶段: {phase})")]
    RunnerReused { phase: String },
}

/// 文档创建过程中各个步骤的错误
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// 启动 / 连接文档应用失败
    #[error("无法启动文档应用: {0}")]
    Launch(String),

    /// 新建空白文档失败
    #[error("新建空白文档失败: {0}")]
    Create(String),

    /// 另存为失败
    #[error("保存文档失败 ({}): {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 关闭文档失败
    #[error("关闭文档失败: {0}")]
    Close(String),

    /// 释放文档应用失败
    #[error("释放文档应用失败: {0}")]
    Release(String),

    /// 工作线程异常退出
    #[error("工作线程异常退出: {0}")]
    Worker(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({}): {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML 解析失败
    #[error("TOML解析失败 ({}): {source}", path.display())]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },

    /// 字段取值非法
    #[error("配置项 {field} 非法: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl AppError {
    /// 是否为整批致命错误
    pub fn is_batch_fatal(&self) -> bool {
        !matches!(self, AppError::Provision(_))
    }

    /// 创建调度错误
    pub fn invalid_schedule(anchor: NaiveDate, reason: impl Into<String>) -> Self {
        AppError::InvalidSchedule {
            anchor,
            reason: reason.into(),
        }
    }
}

impl ConfigError {
    /// 创建字段非法错误
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
