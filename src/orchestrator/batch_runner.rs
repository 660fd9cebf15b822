//! 批次执行器 - 编排层
//!
//! ## 状态流转
//!
//! ```text
//! Planning → Guarding → Provisioning → Reporting → Done
//!     ↓          ↓
//!  Aborted    Aborted
//! ```
//!
//! - Planning：星期检查、生成日期、确保目录、计算文件名
//! - Guarding：冲突检查，任何冲突整批中止，一个文件都不创建
//! - Provisioning：顺序或有界并发地创建文档，单个失败不影响其他任务
//! - Reporting：汇总结果，全部成功或部分失败

use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError, ProvisionError};
use crate::infrastructure::DocumentBackend;
use crate::models::{FileTask, RunContext, RunMode, TargetDate};
use crate::planning::{collision_guard, date_sequence, FileNamer, NamingTemplate};
use crate::services::{ActivityLog, DocumentProvisioner};
use chrono::Weekday;
use futures::future::join_all;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// 批次阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Planning,
    Guarding,
    Provisioning,
    Reporting,
    Done,
    Aborted,
}

impl RunPhase {
    /// 是否允许转移到下一个阶段
    pub fn can_transition_to(self, next: RunPhase) -> bool {
        use RunPhase::*;
        matches!(
            (self, next),
            (Planning, Guarding)
                | (Planning, Aborted)
                | (Guarding, Provisioning)
                | (Guarding, Reporting)
                | (Guarding, Aborted)
                | (Provisioning, Reporting)
                | (Reporting, Done)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunPhase::Done | RunPhase::Aborted)
    }
}

/// 批次最终状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// 全部成功（或演练完成）
    Done,
    /// 部分文档创建失败
    PartialFailure,
    /// 在规划或冲突检查阶段中止
    Aborted,
}

impl Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Done => write!(f, "Done"),
            RunStatus::PartialFailure => write!(f, "Reporting: partial failure"),
            RunStatus::Aborted => write!(f, "Aborted"),
        }
    }
}

/// 分发方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// 严格顺序执行
    Sequential,
    /// 有界并发执行
    Pooled { workers: usize },
}

/// 一次批次运行的参数
#[derive(Debug, Clone)]
pub struct BatchSpec {
    pub mode: RunMode,
    pub anchor: TargetDate,
    pub count: u32,
    /// 锚定日期必须落在的星期（None 表示不检查）
    pub required_weekday: Option<Weekday>,
    pub output_dir: PathBuf,
    pub template: NamingTemplate,
    pub dispatch: Dispatch,
    pub log_file: String,
    /// 只规划和检查，不创建文档
    pub dry_run: bool,
}

impl BatchSpec {
    /// 根据配置和运行模式构建参数，`count` 为 None 时使用模式默认值
    pub fn from_config(
        config: &Config,
        mode: RunMode,
        anchor: TargetDate,
        count: Option<u32>,
        output_dir: PathBuf,
    ) -> Result<Self, ConfigError> {
        let (count, required_weekday, dispatch) = match mode {
            RunMode::Daily => (count.unwrap_or(1), None, Dispatch::Sequential),
            RunMode::Week => {
                let count = count.unwrap_or(config.week_days);
                let workers = config.worker_count(count as usize);
                (
                    count,
                    Some(config.required_weekday()?),
                    Dispatch::Pooled { workers },
                )
            }
        };

        Ok(Self {
            mode,
            anchor,
            count,
            required_weekday,
            output_dir,
            template: NamingTemplate::from_config(config),
            dispatch,
            log_file: config.log_file_name(mode),
            dry_run: false,
        })
    }
}

/// 批次运行结果
#[derive(Debug, Clone)]
pub struct RunReport {
    pub status: RunStatus,
    pub context: RunContext,
    pub log_path: Option<PathBuf>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Done
    }

    pub fn created(&self) -> usize {
        self.context.created_count()
    }

    pub fn failed(&self) -> Vec<&FileTask> {
        self.context.failed_tasks()
    }
}

/// 批次执行器
///
/// 一次性使用：`run` 只能调用一次，再次调用返回 `AppError::RunnerReused`。
pub struct BatchRunner {
    spec: BatchSpec,
    backend: Arc<dyn DocumentBackend>,
    phase: RunPhase,
    history: Vec<RunPhase>,
    log: Option<Arc<ActivityLog>>,
}

impl BatchRunner {
    pub fn new(spec: BatchSpec, backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            spec,
            backend,
            phase: RunPhase::Planning,
            history: vec![RunPhase::Planning],
            log: None,
        }
    }

    /// 当前阶段
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// 经历过的所有阶段
    pub fn history(&self) -> &[RunPhase] {
        &self.history
    }

    /// 运行批次
    ///
    /// 调度、目录、冲突错误直接返回（阶段变为 Aborted）；单个文档的失败体现在报告里。
    pub async fn run(&mut self) -> AppResult<RunReport> {
        if self.phase != RunPhase::Planning {
            return Err(AppError::RunnerReused {
                phase: format!("{:?}", self.phase),
            });
        }

        match self.execute().await {
            Ok(report) => Ok(report),
            Err(e) => {
                self.transition(RunPhase::Aborted);
                self.log_aborted();
                Err(e)
            }
        }
    }

    /// 记录中止的最终状态；日志文件尚未打开时只输出到终端
    fn log_aborted(&self) {
        let line = format!("🏁 最终状态: {}", RunStatus::Aborted);
        match &self.log {
            Some(log) => {
                log.error(line);
                log.separator();
            }
            None => error!("{}", line),
        }
    }

    async fn execute(&mut self) -> AppResult<RunReport> {
        // ========== Planning ==========
        let mut ctx = self.plan().map_err(|e| {
            error!("❌ 批次中止: {}", e);
            e
        })?;

        // ========== Guarding ==========
        self.transition(RunPhase::Guarding);
        let log = Arc::new(if self.spec.dry_run {
            ActivityLog::console_only()
        } else {
            ActivityLog::open(ctx.output_directory.join(&self.spec.log_file))
        });
        self.log = Some(log.clone());

        if let Err(e) = collision_guard::check(&ctx.paths()) {
            log.error(format!("❌ 批次中止，不会创建任何文档: {}", e));
            let existing = collision_guard::existing(&ctx.paths())
                .into_iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>();
            if existing.len() > 1 {
                log.error(format!("已存在的文件: {:?}", existing));
            }
            return Err(e);
        }

        log.info(format!("待创建的文件: {:?}", ctx.file_names()));
        log.info(format!("文件将保存到目录: {}", ctx.output_directory.display()));

        if self.spec.dry_run {
            info!("💡 演练模式：冲突检查通过，不创建任何文档");
            self.transition(RunPhase::Reporting);
            self.transition(RunPhase::Done);
            return Ok(RunReport {
                status: RunStatus::Done,
                context: ctx,
                log_path: None,
            });
        }

        // ========== Provisioning ==========
        self.transition(RunPhase::Provisioning);
        log.info(format!(
            "开始创建文档 (模式: {}, 后端: {})...",
            self.spec.mode,
            self.backend.name()
        ));
        let provisioner = Arc::new(DocumentProvisioner::new(self.backend.clone(), log.clone()));
        self.provision_all(&mut ctx, provisioner, &log).await;

        // ========== Reporting ==========
        self.transition(RunPhase::Reporting);
        let status = report(&ctx, &log);
        self.transition(RunPhase::Done);

        Ok(RunReport {
            status,
            context: ctx,
            log_path: log.path().map(|p| p.to_path_buf()),
        })
    }

    /// 规划阶段：星期检查在任何文件系统访问之前
    fn plan(&self) -> AppResult<RunContext> {
        let spec = &self.spec;

        if let Some(required) = spec.required_weekday {
            date_sequence::check_weekday(spec.anchor, required)?;
        }
        let dates = date_sequence::generate(spec.anchor, spec.count)?;

        let namer = FileNamer::new(&spec.output_dir, spec.template.clone());
        if !spec.dry_run {
            namer.ensure_directory()?;
        }

        let tasks = dates
            .into_iter()
            .map(|date| {
                let (file_name, full_path) = namer.name(date);
                FileTask::new(date, file_name, full_path)
            })
            .collect::<Vec<_>>();

        debug!("规划完成: {} 个任务", tasks.len());
        Ok(RunContext::new(
            namer.directory().to_path_buf(),
            spec.anchor,
            tasks,
        ))
    }

    /// 创建阶段：每个任务独立记录结果
    async fn provision_all(
        &self,
        ctx: &mut RunContext,
        provisioner: Arc<DocumentProvisioner>,
        log: &ActivityLog,
    ) {
        match self.spec.dispatch {
            Dispatch::Sequential => {
                for task in ctx.tasks.iter_mut() {
                    let provisioner = provisioner.clone();
                    let path = task.full_path.clone();
                    let outcome = tokio::task::spawn_blocking(move || provisioner.provision(&path))
                        .await
                        .unwrap_or_else(|e| Err(worker_failed(log, &task.full_path, e)));
                    task.record(&outcome);
                }
            }
            Dispatch::Pooled { workers } => {
                info!("📊 最大并发数: {}", workers);
                let semaphore = Arc::new(Semaphore::new(workers.max(1)));

                let handles = ctx
                    .tasks
                    .iter()
                    .map(|task| {
                        let semaphore = semaphore.clone();
                        let provisioner = provisioner.clone();
                        let path = task.full_path.clone();
                        tokio::spawn(async move {
                            // 许可在整个阻塞调用期间持有
                            let _permit = match semaphore.acquire_owned().await {
                                Ok(permit) => permit,
                                Err(e) => return Err(ProvisionError::Worker(e.to_string())),
                            };
                            match tokio::task::spawn_blocking(move || provisioner.provision(&path)).await {
                                Ok(outcome) => outcome,
                                Err(e) => Err(ProvisionError::Worker(e.to_string())),
                            }
                        })
                    })
                    .collect::<Vec<_>>();

                // 等待所有任务完成，按规划顺序记录
                let outcomes = join_all(handles).await;
                for (task, joined) in ctx.tasks.iter_mut().zip(outcomes) {
                    let outcome = match joined {
                        Ok(Err(ProvisionError::Worker(reason))) => {
                            log.error(format!(
                                "❌ 文档创建失败: {} (工作线程异常: {})",
                                task.full_path.display(),
                                reason
                            ));
                            Err(ProvisionError::Worker(reason))
                        }
                        Ok(outcome) => outcome,
                        Err(e) => Err(worker_failed(log, &task.full_path, e)),
                    };
                    task.record(&outcome);
                }
            }
        }
    }

    fn transition(&mut self, next: RunPhase) {
        if !self.phase.can_transition_to(next) {
            warn!("⚠️ 非法的阶段转移: {:?} → {:?}", self.phase, next);
            debug_assert!(false, "illegal phase transition {:?} -> {:?}", self.phase, next);
        }
        debug!("阶段转移: {:?} → {:?}", self.phase, next);
        self.phase = next;
        self.history.push(next);
    }
}

/// 工作线程 panic 或被取消时，转换为单个文件的失败
fn worker_failed(log: &ActivityLog, path: &std::path::Path, e: tokio::task::JoinError) -> ProvisionError {
    log.error(format!(
        "❌ 文档创建失败: {} (工作线程异常: {})",
        path.display(),
        e
    ));
    ProvisionError::Worker(e.to_string())
}

/// 汇总阶段
fn report(ctx: &RunContext, log: &ActivityLog) -> RunStatus {
    let failed = ctx.failed_tasks();

    if failed.is_empty() {
        log.info(format!("文档创建完成，共 {} 个。", ctx.created_count()));
        log.separator();
        RunStatus::Done
    } else {
        let names = failed
            .iter()
            .map(|t| t.full_path.display().to_string())
            .collect::<Vec<_>>();
        log.error(format!(
            "部分文档创建失败 ({}/{}): {:?}",
            failed.len(),
            ctx.task_count,
            names
        ));
        log.separator();
        RunStatus::PartialFailure
    }
}
