//! 路径分类（纯函数，无 I/O）
use serde::Serialize;
use std::path::{Component, Path};

use crate::options::ScanConfig;

/// 文件角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// 机器可读源码：命中即阻断
    Source,
    /// 人类文档：命中仅告警
    Documentation,
    /// 不扫描
    Ignored,
}

/// 取最后一个路径段中最后一个 `.` 之后的部分并转小写；无 `.` 时为空串
///
/// 与 `Path::extension` 不同，`.eslintrc` 的扩展名是 `eslintrc`。
pub fn extension_of(path: &Path) -> String {
    let name = match path.file_name() {
        Some(n) => n.to_string_lossy(),
        None => return String::new(),
    };
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

/// 按扩展名与忽略目录表对路径分类
///
/// 任一路径段命中 `ignored_names` 即为 Ignored；调用方应传入相对扫描根的路径，
/// 使根目录自身的祖先不参与判断。
pub fn classify(path: &Path, config: &ScanConfig) -> Classification {
    let in_ignored_segment = path.components().any(|c| match c {
        Component::Normal(seg) => config.ignored_names.contains(&*seg.to_string_lossy()),
        _ => false,
    });
    if in_ignored_segment {
        return Classification::Ignored;
    }

    let ext = extension_of(path);
    if ext.is_empty() {
        return Classification::Ignored;
    }
    if config.source_extensions.contains(&ext) {
        Classification::Source
    } else if config.doc_extensions.contains(&ext) {
        Classification::Documentation
    } else {
        Classification::Ignored
    }
}
