//! 目录遍历（惰性迭代器，遍历期剪枝）
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::options::ScanConfig;

/// 递归产出候选文件路径
///
/// - 名称命中 `ignored_names` 的目录连同子树整体跳过（根目录自身除外）。
/// - 默认不跟随符号链接，链接条目直接跳过；`follow_links` 开启时由 walkdir
///   检测链接环并以错误形式返回，这里记为遍历错误后继续。
/// - 不可读目录、失效链接只记 warn，不中断遍历。
/// - 根目录自身读取失败时遍历结束，错误留给调用方经 `take_root_error` 取走。
pub struct Walker<'a> {
    inner: walkdir::IntoIter,
    ignored: &'a BTreeSet<String>,
    errors: usize,
    root_error: Option<io::Error>,
}

impl<'a> Walker<'a> {
    pub fn new(root: &Path, config: &'a ScanConfig) -> Self {
        let inner = WalkDir::new(root)
            .follow_links(config.follow_links)
            .sort_by_file_name()
            .into_iter();
        Self { inner, ignored: &config.ignored_names, errors: 0, root_error: None }
    }

    /// 截至目前累计的遍历错误数
    pub fn traversal_errors(&self) -> usize {
        self.errors
    }

    /// 根目录读取失败的原因（至多一次）
    pub fn take_root_error(&mut self) -> Option<io::Error> {
        self.root_error.take()
    }

    fn is_ignored_dir(&self, entry: &walkdir::DirEntry) -> bool {
        entry.depth() > 0 && self.ignored.contains(&*entry.file_name().to_string_lossy())
    }
}

impl Iterator for Walker<'_> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let entry = match self.inner.next()? {
                Ok(e) => e,
                Err(err) if err.depth() == 0 => {
                    let msg = err.to_string();
                    self.root_error = Some(err.into_io_error().unwrap_or_else(|| io::Error::other(msg)));
                    return None;
                }
                Err(err) => {
                    self.errors += 1;
                    let path = err.path().map(|p| p.display().to_string()).unwrap_or_default();
                    if let Some(ancestor) = err.loop_ancestor() {
                        warn!(%path, ancestor = %ancestor.display(), "symlink cycle detected, skipping");
                    } else {
                        warn!(%path, error = %err, "cannot read entry, skipping");
                    }
                    continue;
                }
            };

            let ft = entry.file_type();
            if ft.is_dir() {
                if self.is_ignored_dir(&entry) {
                    debug!(path = %entry.path().display(), "pruning ignored directory");
                    self.inner.skip_current_dir();
                }
                continue;
            }
            if ft.is_file() {
                return Some(entry.into_path());
            }
            // 未跟随的符号链接、设备文件、FIFO 等
            debug!(path = %entry.path().display(), "skipping non-regular entry");
        }
    }
}
