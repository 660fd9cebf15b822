use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Parser;
use dailyreport_autogen::{logger, App, BackendKind, Config, RunMode, RunRequest, RunStatus};
use std::path::PathBuf;

/// 按日期预建空白日报文档
#[derive(Parser, Debug)]
#[command(name = "dailyreport-autogen", version)]
struct Args {
    /// 运行模式：daily 只建当天，week 从指定星期开始建一周
    #[arg(long, value_enum, default_value_t = RunMode::Week)]
    mode: RunMode,

    /// 锚定日期 (YYYY-MM-DD)，默认今天
    #[arg(long)]
    date: Option<NaiveDate>,

    /// 生成天数（覆盖配置）
    #[arg(long)]
    count: Option<u32>,

    /// 配置文件 (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// 输出目录
    #[arg(long)]
    dir: Option<PathBuf>,

    /// 文件名前缀
    #[arg(long)]
    prefix: Option<String>,

    /// 最大并发数
    #[arg(long)]
    workers: Option<usize>,

    /// 文档后端
    #[arg(long, value_enum)]
    backend: Option<BackendKind>,

    /// 只检查，不创建文档
    #[arg(long)]
    dry_run: bool,

    /// 显示详细日志
    #[arg(long, short)]
    verbose: bool,
}

impl Args {
    /// 命令行参数覆盖配置
    fn apply(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.dir {
            config.output_dir = Some(dir.clone());
        }
        if let Some(prefix) = &self.prefix {
            config.file_prefix = prefix.clone();
        }
        if let Some(workers) = self.workers {
            config.max_workers = workers;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if self.verbose {
            config.verbose_logging = true;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 加载配置
    let config = args.apply(Config::load(args.config.as_deref())?);

    // 初始化日志
    logger::init(config.verbose_logging);

    let request = RunRequest {
        mode: args.mode,
        anchor: args.date,
        count: args.count,
        dry_run: args.dry_run,
    };

    // 初始化并运行应用
    let report = App::initialize(config)?.run(request).await?;

    if report.status != RunStatus::Done {
        bail!("部分文档创建失败 ({} 个)", report.failed().len());
    }
    Ok(())
}
