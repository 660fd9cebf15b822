//! 空白文件后端
//!
//! 不依赖外部程序，直接在目标位置写入零字节的占位文档，与文件管理器"新建文档"产生的文件相同。

use crate::error::ProvisionError;
use crate::infrastructure::document_backend::{DocumentBackend, DocumentHandle, EditorSession};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// 空白文件后端
#[derive(Debug, Default, Clone)]
pub struct BlankFileBackend;

impl BlankFileBackend {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentBackend for BlankFileBackend {
    fn name(&self) -> &'static str {
        "blank"
    }

    fn launch(&self) -> Result<Box<dyn EditorSession>, ProvisionError> {
        Ok(Box::new(BlankSession::default()))
    }
}

/// 内存中的"应用实例"，保存尚未关闭的文档内容
#[derive(Debug, Default)]
struct BlankSession {
    next_id: u64,
    documents: HashMap<DocumentHandle, Vec<u8>>,
    released: bool,
}

impl EditorSession for BlankSession {
    fn create_blank(&mut self) -> Result<DocumentHandle, ProvisionError> {
        if self.released {
            return Err(ProvisionError::Create("应用实例已释放".to_string()));
        }
        let handle = DocumentHandle(self.next_id);
        self.next_id += 1;
        self.documents.insert(handle, Vec::new());
        Ok(handle)
    }

    fn save_as(&mut self, doc: DocumentHandle, path: &Path) -> Result<(), ProvisionError> {
        let content = self.documents.get(&doc).ok_or_else(|| ProvisionError::Save {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "文档未打开"),
        })?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|source| ProvisionError::Save {
                path: path.to_path_buf(),
                source,
            })?;
        file.write_all(content)
            .and_then(|_| file.sync_all())
            .map_err(|source| ProvisionError::Save {
                path: path.to_path_buf(),
                source,
            })?;

        debug!("已写入空白文档: {}", path.display());
        Ok(())
    }

    fn close(&mut self, doc: DocumentHandle) -> Result<(), ProvisionError> {
        self.documents
            .remove(&doc)
            .map(|_| ())
            .ok_or_else(|| ProvisionError::Close(format!("未知的文档句柄: {:?}", doc)))
    }

    fn release(&mut self) -> Result<(), ProvisionError> {
        self.documents.clear();
        self.released = true;
        Ok(())
    }
}
