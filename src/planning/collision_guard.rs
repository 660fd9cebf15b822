//! 冲突检查
//!
//! 规划阶段的闸门：任何目标路径已存在或重复，整批中止，一个文件都不创建。

use crate::error::{AppError, AppResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 检查所有目标路径，遇到第一个冲突即返回错误
pub fn check<P: AsRef<Path>>(paths: &[P]) -> AppResult<()> {
    let mut seen: HashSet<&Path> = HashSet::with_capacity(paths.len());

    for path in paths {
        let path = path.as_ref();
        if !seen.insert(path) {
            return Err(AppError::DuplicateTarget {
                path: path.to_path_buf(),
            });
        }
        // symlink_metadata 同时能发现悬空的符号链接
        if path.symlink_metadata().is_ok() {
            return Err(AppError::FileExists {
                path: path.to_path_buf(),
            });
        }
        debug!("目标路径可用: {}", path.display());
    }

    Ok(())
}

/// 列出所有已存在的目标路径（用于报告）
pub fn existing(paths: &[PathBuf]) -> Vec<&PathBuf> {
    paths
        .iter()
        .filter(|p| p.symlink_metadata().is_ok())
        .collect()
}
