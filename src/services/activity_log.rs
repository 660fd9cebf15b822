//! 活动日志 - 业务能力层
//!
//! 只负责"追加写日志文件"能力，同时把每条记录同步输出到终端。

use chrono::Local;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn, Level};

/// 活动日志
///
/// 职责：
/// - 以追加方式写入 `时间 级别 消息` 格式的纯文本行
/// - 多个工作线程并发写入时通过互斥锁串行化，保证一行不被拆开
/// - 写入失败只在终端警告，不影响文档创建
pub struct ActivityLog {
    path: Option<PathBuf>,
    file: Mutex<Option<File>>,
}

impl ActivityLog {
    /// 打开（或创建）日志文件
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file = match open_append(&path) {
            Ok(file) => Some(file),
            Err(e) => {
                warn!("⚠️ 无法打开日志文件 {}: {}", path.display(), e);
                None
            }
        };
        Self {
            path: Some(path),
            file: Mutex::new(file),
        }
    }

    /// 只输出到终端、不写文件的日志（演练模式使用）
    pub fn console_only() -> Self {
        Self {
            path: None,
            file: Mutex::new(None),
        }
    }

    /// 日志文件路径
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.record(Level::INFO, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.record(Level::ERROR, message.as_ref());
    }

    /// 写入分隔线（不输出到终端）
    pub fn separator(&self) {
        self.write_line(&"-".repeat(120));
    }

    /// 写入一条记录并同步输出到终端
    pub fn record(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => error!("{}", message),
            Level::WARN => warn!("{}", message),
            Level::INFO => info!("{}", message),
            _ => debug!("{}", message),
        }

        let line = format!(
            "{} {} {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            level,
            message
        );
        self.write_line(&line);
    }

    fn write_line(&self, line: &str) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        let mut guard = self.file.lock();

        if guard.is_none() {
            match open_append(path) {
                Ok(file) => *guard = Some(file),
                Err(e) => {
                    warn!("⚠️ 写入日志失败 ({}): {}", path.display(), e);
                    return;
                }
            }
        }

        if let Some(file) = guard.as_mut() {
            // 单次 write_all，一行不会被其他线程插入
            if let Err(e) = file.write_all(format!("{}\n", line).as_bytes()) {
                warn!("⚠️ 写入日志失败 ({}): {}", path.display(), e);
            }
        }
    }
}

fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
