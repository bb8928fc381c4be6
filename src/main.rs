use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, warn, LevelFilter};
use md_paper_translator::{
    default_output_path, SubstitutionMode, TranslationLibConfig, TranslationService,
};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LevelFilter {
    fn from(level: CliLogLevel) -> Self {
        match level {
            CliLogLevel::Error => LevelFilter::Error,
            CliLogLevel::Warn => LevelFilter::Warn,
            CliLogLevel::Info => LevelFilter::Info,
            CliLogLevel::Debug => LevelFilter::Debug,
            CliLogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// 翻译 Markdown 文件，保留公式、表格和代码块
#[derive(Parser, Debug)]
#[command(name = "md-translate", version, about)]
struct Cli {
    /// 输入 Markdown 文件路径
    #[arg(value_name = "INPUT_FILE", required_unless_present = "generate_config")]
    input_file: Option<PathBuf>,

    /// 输出 Markdown 文件路径 (默认为 <input>_translated.md)
    #[arg(short, long)]
    output_file: Option<PathBuf>,

    /// 目标语言 (默认取配置文件，否则为 Chinese)
    #[arg(short, long)]
    language: Option<String>,

    /// 配置文件路径 (默认在当前目录查找)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 单个文本块的最大字符数
    #[arg(long)]
    max_length: Option<usize>,

    /// 两次请求之间的间隔 (毫秒)
    #[arg(long)]
    interval_ms: Option<u64>,

    /// 模型名称
    #[arg(short, long)]
    model: Option<String>,

    /// 按匹配位置替换占位符，而不是按首次出现的文本
    #[arg(long)]
    offset_substitution: bool,

    /// 日志级别
    #[arg(long, value_enum, default_value = "info")]
    log_level: CliLogLevel,

    /// 生成示例配置文件后退出
    #[arg(long, value_name = "PATH")]
    generate_config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.into())
        .parse_default_env()
        .init();

    if let Some(path) = &cli.generate_config {
        TranslationLibConfig::generate_example_config(path)
            .with_context(|| format!("failed to write example config to {}", path.display()))?;
        info!("Example configuration written to {}", path.display());
        return Ok(());
    }

    let input = cli
        .input_file
        .clone()
        .context("an input file is required")?;
    let output = cli
        .output_file
        .clone()
        .unwrap_or_else(|| default_output_path(&input));

    let lib_config = match &cli.config {
        Some(path) => TranslationLibConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => TranslationLibConfig::load_from_default_locations(),
    }
    .apply_env();

    let mut config = lib_config.translation;
    if let Some(language) = cli.language {
        config.target_lang = language;
    }
    if let Some(max_length) = cli.max_length {
        config.max_text_length = max_length;
    }
    if let Some(interval_ms) = cli.interval_ms {
        config.request_interval_ms = interval_ms;
    }
    if let Some(model) = cli.model {
        config.model = model;
    }
    if cli.offset_substitution {
        config.substitution_mode = SubstitutionMode::Offset;
    }
    config.validate()?;

    if config.api_key.is_none() {
        warn!("未设置 OPENAI_API_KEY，请求可能会被拒绝");
    }

    info!("翻译 {} -> {} ({})", input.display(), output.display(), config.target_lang);
    let service = TranslationService::new(config);
    let result = service
        .translate_file(&input, &output)
        .await
        .context("translation failed")?;

    if !result.failed_chunks.is_empty() {
        warn!(
            "{}/{} 个文本块保留了原文: {:?}",
            result.failed_chunks.len(),
            result.chunk_count,
            result.failed_chunks
        );
    }
    if !result.missing_placeholders.is_empty() {
        warn!(
            "以下受保护元素未能恢复: {:?}",
            result.missing_placeholders
        );
    }

    Ok(())
}
