//! 文档创建服务 - 业务能力层
//!
//! 只处理单个目标路径：启动应用 → 新建 → 另存为 → 关闭 → 释放。
//! 失败只影响当前文件，不重试，也不向批次传播。

use crate::error::ProvisionError;
use crate::infrastructure::{DocumentBackend, SessionGuard};
use crate::services::ActivityLog;
use std::path::Path;
use std::sync::Arc;

/// 文档创建服务
pub struct DocumentProvisioner {
    backend: Arc<dyn DocumentBackend>,
    log: Arc<ActivityLog>,
}

impl DocumentProvisioner {
    pub fn new(backend: Arc<dyn DocumentBackend>, log: Arc<ActivityLog>) -> Self {
        Self { backend, log }
    }

    /// 在指定路径创建一个空白文档，并记录结果
    pub fn provision(&self, path: &Path) -> Result<(), ProvisionError> {
        let result = self.create_and_save(path);
        match &result {
            Ok(()) => self
                .log
                .info(format!("✓ 文档创建成功: {}", path.display())),
            Err(e) => self
                .log
                .error(format!("❌ 文档创建失败: {} ({})", path.display(), e)),
        }
        result
    }

    fn create_and_save(&self, path: &Path) -> Result<(), ProvisionError> {
        // 守卫保证任何提前返回都会释放应用实例
        let mut session = SessionGuard::new(self.backend.launch()?);
        let doc = session.create_blank()?;

        let saved = session.save_as(doc, path);
        let closed = session.close(doc);
        let released = session.release();

        saved?;
        closed?;
        released
    }
}
