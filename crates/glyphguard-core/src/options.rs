//! 扫描配置与统计信息（模块）
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::charset::{parse_codepoint, CodepointRange, RestrictedCharSet};
use crate::error::GlyphError;

/// 每个 Finding 最多保留的不同样本码点数
pub const DEFAULT_SAMPLE_CAP: usize = 8;
/// 报告中每个分区最多逐条列出的文件数
pub const DEFAULT_MAX_LISTED: usize = 40;

const SOURCE_EXTENSIONS: &[&str] = &[
    "c", "cc", "cjs", "cpp", "cs", "css", "cts", "go", "graphql", "h", "hpp", "html", "ini",
    "java", "js", "json", "json5", "jsonc", "jsx", "kt", "less", "mjs", "mts", "php", "ps1",
    "py", "rb", "rs", "sass", "scss", "sh", "sql", "svelte", "swift", "toml", "ts", "tsx",
    "vue", "xml", "yaml", "yml", "zsh",
];

const DOC_EXTENSIONS: &[&str] = &["adoc", "markdown", "md", "mdx", "rst", "txt"];

const IGNORED_NAMES: &[&str] = &[
    ".cache", ".git", ".hg", ".next", ".nuxt", ".svn", ".turbo", ".venv", "__pycache__",
    "build", "coverage", "dist", "node_modules", "out", "target", "vendor",
];

/// 扫描配置
///
/// 构造完成后不再修改，按引用在所有 worker 之间共享。
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// 命中即阻断的源码扩展名（小写、无前导点）
    pub source_extensions: BTreeSet<String>,
    /// 命中仅告警的文档扩展名
    pub doc_extensions: BTreeSet<String>,
    /// 遍历期整体剪枝的目录名（精确匹配）
    pub ignored_names: BTreeSet<String>,
    /// 受限码点集合（含放行列表）
    pub restricted: RestrictedCharSet,
    pub sample_cap: usize,
    pub max_listed: usize,
    /// 是否跟随符号链接；开启时由 walkdir 检测链接环
    pub follow_links: bool,
    /// 线程数：None 表示自动（等于 CPU 核数）；Some(1) 走串行
    pub threads: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            source_extensions: to_set(SOURCE_EXTENSIONS.iter().copied(), normalize_extension),
            doc_extensions: to_set(DOC_EXTENSIONS.iter().copied(), normalize_extension),
            ignored_names: IGNORED_NAMES.iter().map(|s| s.to_string()).collect(),
            restricted: RestrictedCharSet::default(),
            sample_cap: DEFAULT_SAMPLE_CAP,
            max_listed: DEFAULT_MAX_LISTED,
            follow_links: false,
            threads: None,
        }
    }
}

/// 配置文件结构（TOML）；未出现的字段沿用默认值
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    source_extensions: Option<Vec<String>>,
    doc_extensions: Option<Vec<String>>,
    ignored_names: Option<Vec<String>>,
    restricted_ranges: Option<Vec<String>>,
    allowed_codepoints: Option<Vec<String>>,
    sample_cap: Option<usize>,
    max_listed: Option<usize>,
    follow_links: Option<bool>,
    threads: Option<usize>,
}

impl ScanConfig {
    /// 从 TOML 文件加载配置
    pub fn load(path: &Path) -> Result<Self, GlyphError> {
        let txt = std::fs::read_to_string(path).map_err(|source| GlyphError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&txt, &path.display().to_string())
    }

    pub fn from_toml_str(txt: &str) -> Result<Self, GlyphError> {
        Self::parse(txt, "<inline>")
    }

    fn parse(txt: &str, origin: &str) -> Result<Self, GlyphError> {
        let file: ConfigFile = toml::from_str(txt).map_err(|source| GlyphError::ConfigParse {
            origin: origin.to_string(),
            source,
        })?;
        let mut cfg = Self::default();

        if let Some(exts) = file.source_extensions {
            cfg.source_extensions = to_set(exts.iter().map(String::as_str), normalize_extension);
        }
        if let Some(exts) = file.doc_extensions {
            cfg.doc_extensions = to_set(exts.iter().map(String::as_str), normalize_extension);
        }
        if let Some(names) = file.ignored_names {
            cfg.ignored_names = names.into_iter().filter(|n| !n.is_empty()).collect();
        }
        if let Some(ranges) = file.restricted_ranges {
            let parsed = ranges
                .iter()
                .map(|r| r.parse::<CodepointRange>())
                .collect::<Result<Vec<_>, _>>()?;
            cfg.restricted = RestrictedCharSet::from_ranges(parsed);
        }
        for cp in file.allowed_codepoints.unwrap_or_default() {
            cfg.restricted.allow(parse_codepoint(&cp)?);
        }
        if let Some(n) = file.sample_cap {
            cfg.sample_cap = n;
        }
        if let Some(n) = file.max_listed {
            cfg.max_listed = n;
        }
        if let Some(f) = file.follow_links {
            cfg.follow_links = f;
        }
        if let Some(n) = file.threads {
            cfg.threads = (n >= 1).then_some(n);
        }
        Ok(cfg)
    }
}

/// 扩展名归一化：去空白、去前导点、转小写
fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

fn to_set<'a>(items: impl Iterator<Item = &'a str>, f: fn(&str) -> String) -> BTreeSet<String> {
    items.map(f).filter(|s| !s.is_empty()).collect()
}

/// 扫描统计信息（便于日志与 JSON 报告）
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// 遍历产出的候选文件数
    pub files_visited: usize,
    /// 成功读取并解码的文件数
    pub files_scanned: usize,
    /// 读取失败或判定为非文本而跳过的文件数
    pub files_skipped: usize,
    /// 遍历期错误数（不可读目录、失效链接、链接环）
    pub traversal_errors: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_hold_compiled_in_tables() {
        let cfg = ScanConfig::default();
        assert!(cfg.source_extensions.contains("ts"));
        assert!(cfg.doc_extensions.contains("md"));
        assert!(cfg.ignored_names.contains("node_modules"));
        assert_eq!(cfg.sample_cap, DEFAULT_SAMPLE_CAP);
        assert_eq!(cfg.max_listed, DEFAULT_MAX_LISTED);
        assert!(!cfg.follow_links);
    }

    #[test]
    fn toml_overrides_only_named_fields() {
        let cfg = ScanConfig::from_toml_str(
            r#"
            source_extensions = [".TS", "rs"]
            allowed_codepoints = ["U+200F"]
            max_listed = 5
            "#,
        )
        .unwrap();
        assert_eq!(cfg.source_extensions.iter().cloned().collect::<Vec<_>>(), vec!["rs", "ts"]);
        assert!(cfg.doc_extensions.contains("md"));
        assert!(!cfg.restricted.contains('\u{200F}'));
        assert!(cfg.restricted.contains('\u{202E}'));
        assert_eq!(cfg.max_listed, 5);
        assert_eq!(cfg.sample_cap, DEFAULT_SAMPLE_CAP);
    }

    #[test]
    fn custom_ranges_replace_defaults() {
        let cfg = ScanConfig::from_toml_str(r#"restricted_ranges = ["U+202A..U+202E"]"#).unwrap();
        assert!(cfg.restricted.contains('\u{202B}'));
        assert!(!cfg.restricted.contains('\u{200B}'));
    }

    #[test]
    fn rejects_unknown_fields_and_bad_ranges() {
        assert!(matches!(
            ScanConfig::from_toml_str("sourceExts = []"),
            Err(GlyphError::ConfigParse { .. })
        ));
        assert!(matches!(
            ScanConfig::from_toml_str(r#"restricted_ranges = ["U+2069..U+2066"]"#),
            Err(GlyphError::InvalidCodepoint { .. })
        ));
    }

    #[test]
    fn zero_threads_means_auto() {
        let cfg = ScanConfig::from_toml_str("threads = 0").unwrap();
        assert_eq!(cfg.threads, None);
    }
}
