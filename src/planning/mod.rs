//! 规划层
//!
//! 只计算和检查，不创建文档：
//! - `date_sequence` - 连续日期与星期检查
//! - `file_namer` - 日期到文件名 / 路径的映射
//! - `collision_guard` - 创建前的冲突检查

pub mod collision_guard;
pub mod date_sequence;
pub mod file_namer;

pub use file_namer::{FileNamer, NamingTemplate};
