use anyhow::{Context, Result};
use clap::Parser;
use glyphguard_core::{
    format_codepoint, parse_codepoint, report, scan_tree, ExitStatus, ReportFormat, ScanConfig, EXIT_INTERNAL_FAILURE,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(
    name = "glyphguard",
    version,
    about = "Detect bidirectional control and invisible characters (trojan-source) in a source tree"
)]
struct Cli {
    /// 扫描根目录（默认当前目录）
    #[arg(default_value = ".")]
    root: PathBuf,

    /// 配置文件（TOML），覆盖内置扩展名/忽略目录/码点表
    #[arg(long)]
    config: Option<PathBuf>,

    /// 线程数（"auto"=CPU 核心数；1=串行）
    #[arg(long, default_value = "auto", value_parser = parse_threads)]
    threads: Threads,

    /// 每个分区最多列出的文件数
    #[arg(long)]
    max_listed: Option<usize>,

    /// 每个文件最多展示的不同码点数
    #[arg(long)]
    sample_cap: Option<usize>,

    /// 跟随符号链接（自动检测链接环）
    #[arg(long)]
    follow_links: bool,

    /// 放行的码点，例如 U+200F（可重复）
    #[arg(long = "allow", value_name = "CODEPOINT")]
    allow: Vec<String>,

    /// 输出格式：text 或 json
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

fn main() -> ExitCode {
    init_tracing();

    // clap 默认以 2 退出，与"发现阻断字符"冲突，这里改为内部失败码
    let cli = match Cli::try_parse() {
        Ok(c) => c,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { ExitCode::from(EXIT_INTERNAL_FAILURE) } else { ExitCode::SUCCESS };
        }
    };

    match run(cli) {
        Ok(status) => ExitCode::from(status.code()),
        Err(err) => {
            error!(error = %err, "scan aborted");
            eprintln!("error: {err:#}");
            ExitCode::from(EXIT_INTERNAL_FAILURE)
        }
    }
}

fn run(cli: Cli) -> Result<ExitStatus> {
    let mut config = match &cli.config {
        Some(path) => ScanConfig::load(path).context("load config")?,
        None => ScanConfig::default(),
    };

    if let Threads(Some(n)) = cli.threads {
        config.threads = Some(n);
    }
    if let Some(n) = cli.max_listed {
        config.max_listed = n;
    }
    if let Some(n) = cli.sample_cap {
        config.sample_cap = n;
    }
    if cli.follow_links {
        config.follow_links = true;
    }
    for cp in &cli.allow {
        config.restricted.allow(parse_codepoint(cp).context("parse --allow")?);
    }
    let ranges: Vec<String> = config.restricted.ranges().iter().map(ToString::to_string).collect();
    let allowed: Vec<String> = config.restricted.allowed().map(format_codepoint).collect();
    debug!(
        ?ranges,
        ?allowed,
        threads = ?config.threads,
        sample_cap = config.sample_cap,
        max_listed = config.max_listed,
        follow_links = config.follow_links,
        "effective configuration"
    );

    let format = match cli.format.as_str() {
        "json" => ReportFormat::Json,
        _ => ReportFormat::Text,
    };

    let outcome = scan_tree(&cli.root, &config).context("scan failed")?;

    let stdout = io::stdout();
    let stderr = io::stderr();
    let (mut out, mut err) = (stdout.lock(), stderr.lock());
    let status = report(&outcome, format, config.max_listed, &mut out, &mut err).context("write report")?;
    out.flush().ok();

    Ok(status)
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 默认仅输出 warn 及以上，报告本身是唯一的常规输出；RUST_LOG=info/debug 可查看细节
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// `--threads` 取值：None 表示自动
#[derive(Debug, Clone, Copy)]
struct Threads(Option<usize>);

/// 解析线程参数："auto" 或正整数，其余取值拒绝
fn parse_threads(s: &str) -> Result<Threads, String> {
    if s.eq_ignore_ascii_case("auto") {
        return Ok(Threads(None));
    }
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(Threads(Some(n))),
        _ => Err(format!("expected \"auto\" or a positive integer, got `{s}`")),
    }
}
