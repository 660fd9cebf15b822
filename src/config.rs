use crate::error::ConfigError;
use crate::models::{parse_weekday, RunMode};
use chrono::Weekday;
use regex::Regex;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

/// 文档后端类型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// 直接写入空白占位文件（无需外部程序）
    Blank,
    /// 调用外部编辑器命令
    Command,
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "blank" => Ok(BackendKind::Blank),
            "command" => Ok(BackendKind::Command),
            other => Err(ConfigError::invalid("backend", format!("未知的后端: {}", other))),
        }
    }
}

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 输出目录（相对路径以可执行文件所在目录为基准，未设置时即为该目录）
    pub output_dir: Option<PathBuf>,
    /// 文件名数字前缀（项目相关）
    pub file_prefix: String,
    /// 文件名中间部分
    pub file_stem: String,
    /// 文档扩展名
    pub extension: String,
    /// 周模式下生成的天数
    pub week_days: u32,
    /// 周模式下允许执行的星期
    pub required_weekday: String,
    /// 最大并发数（0 表示自动）
    pub max_workers: usize,
    /// 日志文件名（未设置时按运行模式决定）
    pub log_file: Option<String>,
    /// 文档后端
    pub backend: BackendKind,
    /// 外部编辑器命令（支持 {path} / {dir} / {name} 占位符）
    pub editor_command: Vec<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: None,
            file_prefix: "77988".to_string(),
            file_stem: "dailyreport".to_string(),
            extension: "docx".to_string(),
            week_days: 5,
            required_weekday: "monday".to_string(),
            max_workers: 0,
            log_file: None,
            backend: BackendKind::Blank,
            editor_command: Vec::new(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 加载配置：默认值 → TOML 文件（可选）→ 环境变量
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        base.with_env()
    }

    /// 从 TOML 文件读取配置，缺省字段使用默认值
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 使用进程环境变量覆盖
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_env_from(|name| std::env::var(name).ok())
    }

    /// 使用给定的变量查找函数覆盖配置
    pub fn with_env_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("AUTOGEN_OUTPUT_DIR") {
            self.output_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("AUTOGEN_PREFIX") {
            self.file_prefix = v;
        }
        if let Some(v) = lookup("AUTOGEN_STEM") {
            self.file_stem = v;
        }
        if let Some(v) = lookup("AUTOGEN_EXTENSION") {
            self.extension = v;
        }
        if let Some(v) = parse_env(&lookup, "AUTOGEN_WEEK_DAYS", "u32")? {
            self.week_days = v;
        }
        if let Some(v) = lookup("AUTOGEN_REQUIRED_WEEKDAY") {
            self.required_weekday = v;
        }
        if let Some(v) = parse_env(&lookup, "AUTOGEN_MAX_WORKERS", "usize")? {
            self.max_workers = v;
        }
        if let Some(v) = lookup("AUTOGEN_BACKEND") {
            self.backend = v.parse()?;
        }
        if let Some(v) = parse_env(&lookup, "AUTOGEN_VERBOSE", "bool")? {
            self.verbose_logging = v;
        }
        Ok(self)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        let segment = Regex::new(r"^[A-Za-z0-9._-]+$").map_err(|e| ConfigError::invalid("regex", e.to_string()))?;

        for (field, value) in [
            ("file_prefix", &self.file_prefix),
            ("file_stem", &self.file_stem),
            ("extension", &self.extension),
        ] {
            if !segment.is_match(value) {
                return Err(ConfigError::invalid(
                    field,
                    format!("'{}' 只能包含字母、数字、'.'、'_' 或 '-'", value),
                ));
            }
        }

        if self.week_days == 0 {
            return Err(ConfigError::invalid("week_days", "至少需要 1 天"));
        }

        self.required_weekday()?;

        if self.backend == BackendKind::Command && self.editor_command.is_empty() {
            return Err(ConfigError::invalid(
                "editor_command",
                "使用 command 后端时必须配置编辑器命令",
            ));
        }

        if let Some(log_file) = &self.log_file {
            let mut components = Path::new(log_file).components();
            let is_plain_name = matches!(
                (components.next(), components.next()),
                (Some(Component::Normal(_)), None)
            );
            if !is_plain_name {
                return Err(ConfigError::invalid("log_file", "只能是文件名，不能包含目录"));
            }
        }

        Ok(())
    }

    /// 周模式下允许执行的星期
    pub fn required_weekday(&self) -> Result<Weekday, ConfigError> {
        parse_weekday(&self.required_weekday).ok_or_else(|| {
            ConfigError::invalid(
                "required_weekday",
                format!("无法解析星期: {}", self.required_weekday),
            )
        })
    }

    /// 以可执行文件所在目录为基准解析输出目录
    pub fn resolve_output_dir(&self) -> Result<PathBuf, ConfigError> {
        let exe = std::env::current_exe()
            .map_err(|e| ConfigError::invalid("output_dir", format!("无法定位可执行文件: {}", e)))?;
        let base = exe
            .parent()
            .ok_or_else(|| ConfigError::invalid("output_dir", "可执行文件没有父目录"))?;
        Ok(self.resolve_output_dir_from(base))
    }

    /// 以给定目录为基准解析输出目录
    pub fn resolve_output_dir_from(&self, base: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => base.join(dir),
            None => base.to_path_buf(),
        }
    }

    /// 日志文件名
    pub fn log_file_name(&self, mode: RunMode) -> String {
        self.log_file
            .clone()
            .unwrap_or_else(|| mode.default_log_file().to_string())
    }

    /// 实际使用的并发数，不超过任务数
    pub fn worker_count(&self, task_count: usize) -> usize {
        let configured = if self.max_workers == 0 {
            let cpus = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1);
            (cpus + 4).min(32)
        } else {
            self.max_workers
        };
        configured.min(task_count).max(1)
    }
}

fn parse_env<T, F>(lookup: &F, var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var_name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}
