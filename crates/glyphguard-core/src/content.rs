//! 内容扫描：逐字符匹配受限码点
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

use crate::charset::RestrictedCharSet;
use crate::findings::Finding;

/// 单文件扫描结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileScan {
    /// 文本文件，无命中
    Clean,
    /// 文本文件，至少一处命中
    Hit(Finding),
    /// 无法读取或非文本内容（不视为错误）
    Skipped,
}

/// 在已解码文本中查找受限码点
///
/// `occurrence_count` 总是真实总数；`samples` 为按首次出现顺序去重的码点，
/// 最多保留 `sample_cap` 个。
pub fn scan_text(path: &str, text: &str, charset: &RestrictedCharSet, sample_cap: usize) -> Option<Finding> {
    let mut occurrence_count = 0usize;
    let mut samples: Vec<char> = Vec::new();

    for ch in text.chars() {
        if !charset.contains(ch) {
            continue;
        }
        occurrence_count += 1;
        if samples.len() < sample_cap && !samples.contains(&ch) {
            samples.push(ch);
        }
    }

    (occurrence_count > 0).then(|| Finding { path: path.to_string(), occurrence_count, samples })
}

/// 解码为 UTF-8 后扫描；无法解码（二进制内容）时跳过
///
/// 合法 UTF-8 中的 NUL 等控制字节不影响判定，文件照常扫描。
pub fn scan_bytes(path: &str, bytes: &[u8], charset: &RestrictedCharSet, sample_cap: usize) -> FileScan {
    let text = match std::str::from_utf8(bytes) {
        Ok(t) => t,
        Err(_) => return FileScan::Skipped,
    };
    match scan_text(path, text, charset, sample_cap) {
        Some(f) => FileScan::Hit(f),
        None => FileScan::Clean,
    }
}

/// 读取整个文件并扫描；`display_path` 为写入 Finding 的路径
pub fn scan_file(path: &Path, display_path: &str, charset: &RestrictedCharSet, sample_cap: usize) -> FileScan {
    let mut buf = Vec::new();
    let read = File::open(path).and_then(|f| BufReader::new(f).read_to_end(&mut buf));
    if let Err(err) = read {
        debug!(path = %display_path, error = %err, "unreadable file, skipping");
        return FileScan::Skipped;
    }
    let res = scan_bytes(display_path, &buf, charset, sample_cap);
    if res == FileScan::Skipped {
        debug!(path = %display_path, "non-text content, skipping");
    }
    res
}
