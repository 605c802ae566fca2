//! 隐藏字符 / 双向控制字符扫描库
//!
//! 设计要点：
//! - 路径分类（Source / Documentation / Ignored）是纯函数，只依赖路径字符串与配置表。
//! - 目录遍历在遍历期剪枝被忽略的目录（node_modules、.git、dist 等），不会进入其子树。
//! - 内容扫描按文件独立执行，worker 之间无共享可变状态，仅通过通道汇总结果。
//! - 汇总后按路径排序，保证输出与并发顺序无关、可复现。

mod charset;
mod classify;
mod content;
mod error;
mod findings;
mod options;
mod report;
mod scan;
mod walk;

pub use charset::{codepoint_name, format_codepoint, parse_codepoint, CodepointRange, RestrictedCharSet};
pub use classify::{classify, extension_of, Classification};
pub use content::{scan_bytes, scan_file, scan_text, FileScan};
pub use error::GlyphError;
pub use findings::{aggregate, Aggregator, Finding, ScanOutcome};
pub use options::{ScanConfig, ScanStats, DEFAULT_MAX_LISTED, DEFAULT_SAMPLE_CAP};
pub use report::{report, render_json, render_text, ExitStatus, ReportFormat, EXIT_INTERNAL_FAILURE};
pub use scan::scan_tree;
pub use walk::Walker;
