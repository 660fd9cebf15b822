use chrono::NaiveDate;
use dailyreport_autogen::error::{AppError, ProvisionError};
use dailyreport_autogen::infrastructure::{DocumentHandle, EditorSession};
use dailyreport_autogen::{
    App, BatchRunner, BatchSpec, BlankFileBackend, Config, DocumentBackend, RunMode, RunPhase,
    RunRequest, RunStatus, TaskStatus,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// 统计实例数量、可以按文件名注入失败的测试后端
#[derive(Default)]
struct FlakyBackend {
    fail_names: Vec<String>,
    launched: AtomicUsize,
    released: AtomicUsize,
    live: AtomicUsize,
    max_live: AtomicUsize,
}

impl FlakyBackend {
    fn failing_on(names: &[&str]) -> Self {
        Self {
            fail_names: names.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }
}

struct FlakySession {
    backend: Arc<FlakyBackend>,
    released: bool,
}

/// 把 Arc<FlakyBackend> 包装成 DocumentBackend，便于测试结束后读取计数
struct Shared(Arc<FlakyBackend>);

impl DocumentBackend for Shared {
    fn name(&self) -> &'static str {
        "flaky"
    }

    fn launch(&self) -> Result<Box<dyn EditorSession>, ProvisionError> {
        let b = &self.0;
        b.launched.fetch_add(1, Ordering::SeqCst);
        let live = b.live.fetch_add(1, Ordering::SeqCst) + 1;
        b.max_live.fetch_max(live, Ordering::SeqCst);
        Ok(Box::new(FlakySession {
            backend: self.0.clone(),
            released: false,
        }))
    }
}

impl EditorSession for FlakySession {
    fn create_blank(&mut self) -> Result<DocumentHandle, ProvisionError> {
        Ok(DocumentHandle(0))
    }

    fn save_as(&mut self, _doc: DocumentHandle, path: &Path) -> Result<(), ProvisionError> {
        std::thread::sleep(Duration::from_millis(20));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        if self.backend.fail_names.contains(&name) {
            return Err(ProvisionError::Save {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "simulated application error"),
            });
        }
        std::fs::write(path, b"").map_err(|source| ProvisionError::Save {
            path: path.to_path_buf(),
            source,
        })
    }

    fn close(&mut self, _doc: DocumentHandle) -> Result<(), ProvisionError> {
        Ok(())
    }

    fn release(&mut self) -> Result<(), ProvisionError> {
        if !self.released {
            self.released = true;
            self.backend.released.fetch_add(1, Ordering::SeqCst);
            self.backend.live.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

fn week_spec(config: &Config, anchor: NaiveDate, dir: &Path) -> BatchSpec {
    BatchSpec::from_config(config, RunMode::Week, anchor, None, dir.to_path_buf()).unwrap()
}

fn expected_week_names() -> Vec<String> {
    (4..=8)
        .map(|d| format!("77988_dailyreport_202403{:02}.docx", d))
        .collect()
}

fn docx_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map_or(false, |x| x == "docx"))
        .collect();
    files.sort();
    files
}

#[tokio::test]
async fn test_week_batch_creates_all_files() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("reports");
    let config = Config::default();

    let mut runner = BatchRunner::new(
        week_spec(&config, monday(), &dir),
        Arc::new(BlankFileBackend::new()),
    );
    let report = runner.run().await.unwrap();

    assert_eq!(report.status, RunStatus::Done);
    assert_eq!(report.created(), 5);
    assert_eq!(runner.phase(), RunPhase::Done);
    assert_eq!(
        runner.history(),
        &[
            RunPhase::Planning,
            RunPhase::Guarding,
            RunPhase::Provisioning,
            RunPhase::Reporting,
            RunPhase::Done
        ]
    );

    let names: Vec<String> = docx_files(&dir)
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, expected_week_names());

    let log = std::fs::read_to_string(dir.join("autogenV2-monday.log")).unwrap();
    assert_eq!(log.matches("文档创建成功").count(), 5);
    assert!(log.contains("文档创建完成"));
    assert!(log.contains(&"-".repeat(120)));
}

#[tokio::test]
async fn test_existing_file_aborts_whole_batch() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().to_path_buf();
    let wednesday = dir.join("77988_dailyreport_20240306.docx");
    std::fs::write(&wednesday, b"already filled in").unwrap();

    let backend = Arc::new(FlakyBackend::default());
    let mut runner = BatchRunner::new(
        week_spec(&Config::default(), monday(), &dir),
        Arc::new(Shared(backend.clone())),
    );

    match runner.run().await {
        Err(AppError::FileExists { path }) => assert_eq!(path, wednesday),
        other => panic!("unexpected result: {:?}", other.map(|r| r.status)),
    }
    assert_eq!(runner.phase(), RunPhase::Aborted);
    assert_eq!(backend.launched.load(Ordering::SeqCst), 0);
    assert_eq!(docx_files(&dir), vec![wednesday.clone()]);
    assert_eq!(std::fs::read(&wednesday).unwrap(), b"already filled in");

    let log = std::fs::read_to_string(dir.join("autogenV2-monday.log")).unwrap();
    assert!(log.contains("77988_dailyreport_20240306.docx"));
    assert!(!log.contains("文档创建成功"));
    assert!(log
        .lines()
        .any(|l| l.contains(" ERROR ") && l.contains("最终状态: Aborted")));
}

#[tokio::test]
async fn test_output_dir_under_regular_file_aborts() {
    let tmp = tempfile::tempdir().unwrap();
    let blocker = tmp.path().join("not-a-dir");
    std::fs::write(&blocker, b"").unwrap();
    let dir = blocker.join("sub");

    let backend = Arc::new(FlakyBackend::default());
    let mut runner = BatchRunner::new(
        week_spec(&Config::default(), monday(), &dir),
        Arc::new(Shared(backend.clone())),
    );
    let err = runner.run().await.unwrap_err();

    match &err {
        AppError::DirectoryCreation { path, .. } => assert_eq!(path, &dir),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.is_batch_fatal());
    assert_eq!(runner.phase(), RunPhase::Aborted);
    assert_eq!(backend.launched.load(Ordering::SeqCst), 0);
    assert!(blocker.is_file());
}

#[tokio::test]
async fn test_daily_sequential_failure_is_partial() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().to_path_buf();
    let backend = Arc::new(FlakyBackend::failing_on(&["77988_dailyreport_20240305.docx"]));
    let spec = BatchSpec::from_config(&Config::default(), RunMode::Daily, monday(), Some(3), dir.clone()).unwrap();

    let mut runner = BatchRunner::new(spec, Arc::new(Shared(backend.clone())));
    let report = runner.run().await.unwrap();

    assert_eq!(report.status, RunStatus::PartialFailure);
    assert_eq!(runner.phase(), RunPhase::Done);
    assert_eq!(report.created(), 2);
    let failed = report.failed();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].file_name, "77988_dailyreport_20240305.docx");
    assert_eq!(
        docx_files(&dir),
        vec![
            dir.join("77988_dailyreport_20240304.docx"),
            dir.join("77988_dailyreport_20240306.docx"),
        ]
    );

    // 顺序执行时同一时刻只有一个实例
    assert_eq!(backend.launched.load(Ordering::SeqCst), 3);
    assert_eq!(backend.released.load(Ordering::SeqCst), 3);
    assert_eq!(backend.live.load(Ordering::SeqCst), 0);
    assert_eq!(backend.max_live.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_single_failure_does_not_cancel_siblings() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().to_path_buf();
    let backend = Arc::new(FlakyBackend::failing_on(&["77988_dailyreport_20240307.docx"]));

    let mut runner = BatchRunner::new(
        week_spec(&Config::default(), monday(), &dir),
        Arc::new(Shared(backend.clone())),
    );
    let report = runner.run().await.unwrap();

    assert_eq!(report.status, RunStatus::PartialFailure);
    assert_eq!(report.status.to_string(), "Reporting: partial failure");
    assert_eq!(report.created(), 4);
    assert_eq!(report.failed().len(), 1);
    assert_eq!(report.failed()[0].file_name, "77988_dailyreport_20240307.docx");
    assert!(matches!(report.failed()[0].status, TaskStatus::Failed { .. }));
    assert_eq!(docx_files(&dir).len(), 4);

    // 每个实例都被释放
    assert_eq!(backend.launched.load(Ordering::SeqCst), 5);
    assert_eq!(backend.released.load(Ordering::SeqCst), 5);
    assert_eq!(backend.live.load(Ordering::SeqCst), 0);

    let log = std::fs::read_to_string(dir.join("autogenV2-monday.log")).unwrap();
    assert_eq!(log.matches("文档创建成功").count(), 4);
    assert!(log.contains("部分文档创建失败"));
    assert!(log
        .lines()
        .any(|l| l.contains(" ERROR ") && l.contains("77988_dailyreport_20240307.docx")));
}

#[tokio::test]
async fn test_wrong_weekday_performs_no_writes() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("not-yet-created");
    let wednesday = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();

    let mut runner = BatchRunner::new(
        week_spec(&Config::default(), wednesday, &dir),
        Arc::new(BlankFileBackend::new()),
    );
    let err = runner.run().await.unwrap_err();

    assert!(matches!(err, AppError::InvalidSchedule { .. }));
    assert!(err.is_batch_fatal());
    assert_eq!(runner.phase(), RunPhase::Aborted);
    assert!(!dir.exists());
}

#[tokio::test]
async fn test_pool_respects_worker_bound() {
    let tmp = tempfile::tempdir().unwrap();
    let config = Config {
        max_workers: 2,
        ..Default::default()
    };
    let backend = Arc::new(FlakyBackend::default());
    let spec = BatchSpec::from_config(&config, RunMode::Week, monday(), Some(6), tmp.path().to_path_buf()).unwrap();

    let report = BatchRunner::new(spec, Arc::new(Shared(backend.clone())))
        .run()
        .await
        .unwrap();

    assert_eq!(report.created(), 6);
    assert!(backend.max_live.load(Ordering::SeqCst) <= 2);
    assert_eq!(backend.released.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn test_daily_mode_ignores_weekday() {
    let tmp = tempfile::tempdir().unwrap();
    let app = App::initialize(Config::default()).unwrap();
    let saturday = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();

    let request = RunRequest {
        anchor: Some(saturday),
        ..RunRequest::new(RunMode::Daily)
    };
    let report = app.run_in(request, tmp.path().to_path_buf()).await.unwrap();

    assert_eq!(report.status, RunStatus::Done);
    assert_eq!(
        docx_files(tmp.path()),
        vec![tmp.path().join("77988_dailyreport_20240309.docx")]
    );
    assert!(tmp.path().join("autogen-daily.log").is_file());
}

#[tokio::test]
async fn test_dry_run_creates_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("out");
    let app = App::initialize(Config::default()).unwrap();

    let request = RunRequest {
        anchor: Some(monday()),
        dry_run: true,
        ..RunRequest::new(RunMode::Week)
    };
    let report = app.run_in(request, dir.clone()).await.unwrap();

    assert_eq!(report.status, RunStatus::Done);
    assert_eq!(report.context.task_count, 5);
    assert_eq!(report.created(), 0);
    assert!(report.log_path.is_none());
    assert!(!dir.exists());
}

#[tokio::test]
async fn test_rerun_after_success_aborts() {
    let tmp = tempfile::tempdir().unwrap();
    let app = App::with_backend(
        Config {
            file_prefix: "4242".to_string(),
            ..Default::default()
        },
        Arc::new(BlankFileBackend::new()),
    )
    .unwrap();
    let request = RunRequest {
        anchor: Some(monday()),
        ..RunRequest::new(RunMode::Week)
    };

    let first = app.run_in(request.clone(), tmp.path().to_path_buf()).await.unwrap();
    assert!(first.is_success());

    let second = app.run_in(request, tmp.path().to_path_buf()).await;
    assert!(matches!(second, Err(AppError::FileExists { .. })));
    assert_eq!(docx_files(tmp.path()).len(), 5);
    assert!(docx_files(tmp.path())[0]
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("4242_dailyreport_"));
}

#[test]
fn test_invalid_config_rejected_at_initialize() {
    let config = Config {
        extension: "do/cx".to_string(),
        ..Default::default()
    };
    assert!(matches!(App::initialize(config), Err(AppError::Config(_))));
}

#[test]
fn test_zero_count_is_invalid_schedule() {
    let tmp = tempfile::tempdir().unwrap();
    let spec = BatchSpec::from_config(&Config::default(), RunMode::Daily, monday(), Some(0), tmp.path().join("x")).unwrap();
    let result = tokio_test::block_on(BatchRunner::new(spec, Arc::new(BlankFileBackend::new())).run());

    assert!(matches!(result, Err(AppError::InvalidSchedule { .. })));
    assert!(!tmp.path().join("x").exists());
}
