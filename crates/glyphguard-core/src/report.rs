//! 报告渲染与退出码策略
use serde::Serialize;
use std::io::Write;

use crate::charset::{codepoint_name, format_codepoint};
use crate::error::GlyphError;
use crate::findings::{Finding, ScanOutcome};
use crate::options::ScanStats;

/// 扫描器自身异常（根路径无效、配置错误等）时的退出码
pub const EXIT_INTERNAL_FAILURE: u8 = 1;

/// 扫描结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitStatus {
    /// 无命中或仅有文档告警
    Clean,
    /// 至少一个源码文件命中
    Blocking,
}

impl ExitStatus {
    pub const fn code(self) -> u8 {
        match self {
            ExitStatus::Clean => 0,
            ExitStatus::Blocking => 2,
        }
    }
}

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// 按格式渲染报告并返回扫描结论
pub fn report(
    outcome: &ScanOutcome,
    format: ReportFormat,
    max_listed: usize,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<ExitStatus, GlyphError> {
    match format {
        ReportFormat::Text => render_text(outcome, max_listed, out, err),
        ReportFormat::Json => render_json(outcome, out),
    }
}

/// 文本报告
/// - 告警分区（文档）写 `out`
/// - 阻断分区（源码）写 `err`
/// - 无阻断时在 `out` 打印 clean 确认
pub fn render_text(
    outcome: &ScanOutcome,
    max_listed: usize,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<ExitStatus, GlyphError> {
    if !outcome.advisory.is_empty() {
        writeln!(
            out,
            "warning: hidden characters found in {} documentation file(s) (advisory, not blocking):",
            outcome.advisory.len()
        )?;
        write_section(out, &outcome.advisory, max_listed)?;
    }

    if !outcome.blocking.is_empty() {
        writeln!(
            err,
            "error: hidden or bidirectional characters found in {} source file(s):",
            outcome.blocking.len()
        )?;
        write_section(err, &outcome.blocking, max_listed)?;
        err.flush()?;
    } else {
        writeln!(out, "clean: no hidden or bidirectional characters in source files")?;
    }
    out.flush()?;

    Ok(outcome.exit_status())
}

fn write_section(w: &mut dyn Write, findings: &[Finding], max_listed: usize) -> std::io::Result<()> {
    for f in findings.iter().take(max_listed) {
        writeln!(w, "  {}: {} occurrence(s): {}", f.path, f.occurrence_count, describe_samples(&f.samples))?;
    }
    let rest = findings.len().saturating_sub(max_listed);
    if rest > 0 {
        writeln!(w, "  ... and {rest} more file(s)")?;
    }
    Ok(())
}

fn describe_samples(samples: &[char]) -> String {
    samples
        .iter()
        .map(|&ch| match codepoint_name(ch) {
            Some(name) => format!("{} {}", format_codepoint(ch), name),
            None => format_codepoint(ch),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Serialize)]
struct JsonReport<'a> {
    status: ExitStatus,
    exit_code: u8,
    blocking: &'a [Finding],
    advisory: &'a [Finding],
    stats: &'a ScanStats,
}

/// JSON 报告：单个文档写 `out`，不做条目截断
pub fn render_json(outcome: &ScanOutcome, out: &mut dyn Write) -> Result<ExitStatus, GlyphError> {
    let status = outcome.exit_status();
    let doc = JsonReport {
        status,
        exit_code: status.code(),
        blocking: &outcome.blocking,
        advisory: &outcome.advisory,
        stats: &outcome.stats,
    };
    serde_json::to_writer_pretty(&mut *out, &doc).map_err(std::io::Error::from)?;
    writeln!(out)?;
    out.flush()?;
    Ok(status)
}
