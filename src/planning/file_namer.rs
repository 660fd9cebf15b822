//! 文件命名
//!
//! 模板固定为 `<prefix>_<stem>_<YYYYMMDD>.<ext>`，日期部分是定长数字，因此不同日期不会得到相同的文件名。

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::TargetDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 文件名模板
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingTemplate {
    pub prefix: String,
    pub stem: String,
    pub extension: String,
}

impl NamingTemplate {
    pub fn new(prefix: impl Into<String>, stem: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            stem: stem.into(),
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.file_prefix, &config.file_stem, &config.extension)
    }

    /// 生成文件名
    pub fn render(&self, date: TargetDate) -> String {
        format!(
            "{}_{}_{}.{}",
            self.prefix,
            self.stem,
            date.format("%Y%m%d"),
            self.extension
        )
    }
}

/// 文件命名器
pub struct FileNamer {
    directory: PathBuf,
    template: NamingTemplate,
}

impl FileNamer {
    pub fn new(directory: impl Into<PathBuf>, template: NamingTemplate) -> Self {
        Self {
            directory: directory.into(),
            template,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// 确保输出目录存在（已存在时不报错）
    pub fn ensure_directory(&self) -> AppResult<()> {
        fs::create_dir_all(&self.directory).map_err(|source| AppError::DirectoryCreation {
            path: self.directory.clone(),
            source,
        })?;
        debug!("输出目录就绪: {}", self.directory.display());
        Ok(())
    }

    /// 日期 → (文件名, 完整路径)
    pub fn name(&self, date: TargetDate) -> (String, PathBuf) {
        let file_name = self.template.render(date);
        let full_path = self.directory.join(&file_name);
        (file_name, full_path)
    }
}
