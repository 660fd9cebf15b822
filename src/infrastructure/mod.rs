//! 基础设施层（Infrastructure）
//!
//! 持有稀缺资源（外部文档应用实例），只暴露能力。

pub mod blank_file;
pub mod command;
pub mod document_backend;

pub use blank_file::BlankFileBackend;
pub use command::CommandBackend;
pub use document_backend::{DocumentBackend, DocumentHandle, EditorSession, SessionGuard};

use crate::config::{BackendKind, Config};
use std::sync::Arc;

/// 根据配置创建文档后端
pub fn backend_from_config(config: &Config) -> Arc<dyn DocumentBackend> {
    match config.backend {
        BackendKind::Blank => Arc::new(BlankFileBackend::new()),
        BackendKind::Command => Arc::new(CommandBackend::new(config.editor_command.clone())),
    }
}
