//! 外部编辑器后端
//!
//! 通过配置的命令行驱动外部编辑器保存文档，子进程就是应用实例，释放时结束并回收。

use crate::error::ProvisionError;
use crate::infrastructure::document_backend::{DocumentBackend, DocumentHandle, EditorSession};
use std::collections::HashSet;
use std::io::{Error as IoError, ErrorKind};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use tracing::{debug, warn};

/// 外部编辑器后端
#[derive(Debug, Clone)]
pub struct CommandBackend {
    argv: Vec<String>,
}

impl CommandBackend {
    /// `argv[0]` 为程序，其余为参数；参数中的 `{path}` / `{dir}` / `{name}` 会被替换
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

impl DocumentBackend for CommandBackend {
    fn name(&self) -> &'static str {
        "command"
    }

    fn launch(&self) -> Result<Box<dyn EditorSession>, ProvisionError> {
        if self.argv.first().map_or(true, |p| p.trim().is_empty()) {
            return Err(ProvisionError::Launch("未配置编辑器命令".to_string()));
        }
        Ok(Box::new(CommandSession {
            argv: self.argv.clone(),
            child: None,
            next_id: 0,
            documents: HashSet::new(),
        }))
    }
}

struct CommandSession {
    argv: Vec<String>,
    child: Option<Child>,
    next_id: u64,
    documents: HashSet<DocumentHandle>,
}

impl CommandSession {
    fn render_args(&self, path: &Path) -> Vec<String> {
        let full = path.display().to_string();
        let dir = path
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        self.argv[1..]
            .iter()
            .map(|arg| {
                arg.replace("{path}", &full)
                    .replace("{dir}", &dir)
                    .replace("{name}", &name)
            })
            .collect()
    }
}

impl EditorSession for CommandSession {
    fn create_blank(&mut self) -> Result<DocumentHandle, ProvisionError> {
        let handle = DocumentHandle(self.next_id);
        self.next_id += 1;
        self.documents.insert(handle);
        Ok(handle)
    }

    fn save_as(&mut self, doc: DocumentHandle, path: &Path) -> Result<(), ProvisionError> {
        let save_err = |source: IoError| ProvisionError::Save {
            path: path.to_path_buf(),
            source,
        };

        if !self.documents.contains(&doc) {
            return Err(save_err(IoError::new(ErrorKind::NotFound, "文档未打开")));
        }
        if path.symlink_metadata().is_ok() {
            return Err(save_err(IoError::new(ErrorKind::AlreadyExists, "目标文件已存在")));
        }

        let args = self.render_args(path);
        debug!("启动编辑器: {} {:?}", self.argv[0], args);

        let child = Command::new(&self.argv[0])
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(save_err)?;

        // 先挂到会话上，wait 失败时由 release 负责结束进程
        let status = self.child.insert(child).wait().map_err(save_err)?;
        self.child = None;

        if !status.success() {
            return Err(save_err(IoError::other(format!("编辑器退出状态: {}", status))));
        }
        if !path.exists() {
            return Err(save_err(IoError::new(ErrorKind::NotFound, "编辑器没有生成文件")));
        }
        Ok(())
    }

    fn close(&mut self, doc: DocumentHandle) -> Result<(), ProvisionError> {
        if self.documents.remove(&doc) {
            Ok(())
        } else {
            Err(ProvisionError::Close(format!("未知的文档句柄: {:?}", doc)))
        }
    }

    fn release(&mut self) -> Result<(), ProvisionError> {
        self.documents.clear();
        if let Some(mut child) = self.child.take() {
            warn!("⚠️ 编辑器进程仍在运行，强制结束 (pid: {})", child.id());
            child
                .kill()
                .and_then(|_| child.wait().map(|_| ()))
                .map_err(|e| ProvisionError::Release(e.to_string()))?;
        }
        Ok(())
    }
}
