//! 文档后端抽象 - 基础设施层
//!
//! 外部文档应用只暴露四步能力：新建、另存为、关闭、释放。
//! 每个会话（应用实例）只属于创建它的工作线程，不在任务之间共享。

use crate::error::ProvisionError;
use std::path::Path;
use tracing::warn;

/// 会话内的文档句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentHandle(pub u64);

/// 文档应用提供者
pub trait DocumentBackend: Send + Sync {
    /// 后端名称（仅用于日志）
    fn name(&self) -> &'static str;

    /// 启动或连接一个应用实例
    fn launch(&self) -> Result<Box<dyn EditorSession>, ProvisionError>;
}

/// 一个应用实例
pub trait EditorSession: Send {
    /// 新建空白文档
    fn create_blank(&mut self) -> Result<DocumentHandle, ProvisionError>;

    /// 将文档保存到指定路径（不得覆盖已有文件）
    fn save_as(&mut self, doc: DocumentHandle, path: &Path) -> Result<(), ProvisionError>;

    /// 关闭文档
    fn close(&mut self, doc: DocumentHandle) -> Result<(), ProvisionError>;

    /// 释放应用实例，重复调用必须是无害的
    fn release(&mut self) -> Result<(), ProvisionError>;
}

/// 会话守卫
///
/// 没有显式调用 `release` 就被丢弃时，在 Drop 中释放实例。
pub struct SessionGuard {
    session: Box<dyn EditorSession>,
    released: bool,
}

impl SessionGuard {
    pub fn new(session: Box<dyn EditorSession>) -> Self {
        Self {
            session,
            released: false,
        }
    }

    pub fn create_blank(&mut self) -> Result<DocumentHandle, ProvisionError> {
        self.session.create_blank()
    }

    pub fn save_as(&mut self, doc: DocumentHandle, path: &Path) -> Result<(), ProvisionError> {
        self.session.save_as(doc, path)
    }

    pub fn close(&mut self, doc: DocumentHandle) -> Result<(), ProvisionError> {
        self.session.close(doc)
    }

    /// 显式释放，返回释放结果
    pub fn release(mut self) -> Result<(), ProvisionError> {
        self.released = true;
        self.session.release()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = self.session.release() {
                warn!("⚠️ 释放文档应用失败: {}", e);
            }
        }
    }
}
