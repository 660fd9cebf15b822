//! 应用入口 - 编排层
//!
//! 持有配置和文档后端，把一次命令行调用转换成 `BatchSpec` 并交给 `BatchRunner`。

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{backend_from_config, DocumentBackend};
use crate::models::{RunMode, TargetDate};
use crate::orchestrator::batch_runner::{BatchRunner, BatchSpec, RunReport};
use crate::utils::logging::{log_startup, print_final_stats};
use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;

/// 一次调用的请求参数
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub mode: RunMode,
    /// 锚定日期，默认为今天
    pub anchor: Option<TargetDate>,
    /// 覆盖生成天数
    pub count: Option<u32>,
    pub dry_run: bool,
}

impl RunRequest {
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            anchor: None,
            count: None,
            dry_run: false,
        }
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    backend: Arc<dyn DocumentBackend>,
}

impl App {
    /// 初始化应用（校验配置、创建后端）
    pub fn initialize(config: Config) -> AppResult<Self> {
        config.validate()?;
        let backend = backend_from_config(&config);
        Ok(Self { config, backend })
    }

    /// 使用指定后端初始化
    pub fn with_backend(config: Config, backend: Arc<dyn DocumentBackend>) -> AppResult<Self> {
        config.validate()?;
        Ok(Self { config, backend })
    }

    /// 运行一次批次，输出目录以可执行文件所在目录为基准
    pub async fn run(&self, request: RunRequest) -> AppResult<RunReport> {
        let output_dir = self.config.resolve_output_dir()?;
        self.run_in(request, output_dir).await
    }

    /// 在指定输出目录运行一次批次
    pub async fn run_in(&self, request: RunRequest, output_dir: PathBuf) -> AppResult<RunReport> {
        let anchor = request.anchor.unwrap_or_else(|| Local::now().date_naive());
        let mut spec = BatchSpec::from_config(&self.config, request.mode, anchor, request.count, output_dir)?;
        spec.dry_run = request.dry_run;

        log_startup(&spec, self.backend.name());

        let mut runner = BatchRunner::new(spec, self.backend.clone());
        let report = runner.run().await?;

        print_final_stats(&report);
        Ok(report)
    }
}
