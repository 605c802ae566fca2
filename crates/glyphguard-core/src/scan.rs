//! 扫描主流程与并行调度
use crossbeam_channel as channel;
use rayon::prelude::*;
use std::path::{Component, Path, PathBuf};
use tracing::info;

use crate::classify::{classify, Classification};
use crate::content::{scan_file, FileScan};
use crate::error::GlyphError;
use crate::findings::{Aggregator, Finding, ScanOutcome};
use crate::options::{ScanConfig, ScanStats};
use crate::walk::Walker;

/// 遍历线程 → worker 的待扫描路径队列深度
const PATH_QUEUE_DEPTH: usize = 1024;
/// worker → 收集点的结果队列深度
const RESULT_QUEUE_DEPTH: usize = 256;

/// 单个候选文件经分类与扫描后的结果
enum Step {
    Ignored,
    Clean,
    Skipped,
    Hit(Classification, Finding),
}

/// 扫描整棵目录树并汇总结果
///
/// 根路径不存在或不是目录时在遍历前返回错误；其余逐文件问题均在内部吸收。
/// 线程数大于 1 时走并行调度，输出与串行路径逐字节一致。
pub fn scan_tree(root: &Path, config: &ScanConfig) -> Result<ScanOutcome, GlyphError> {
    let root = validate_root(root)?;
    let threads = config.threads.unwrap_or_else(num_cpus::get).max(1);
    info!(root = %root.display(), threads, "starting scan");

    let outcome = if threads > 1 {
        scan_parallel(&root, config, threads)?
    } else {
        scan_sequential(&root, config)?
    };

    let s = &outcome.stats;
    info!(
        files_visited = s.files_visited,
        files_scanned = s.files_scanned,
        files_skipped = s.files_skipped,
        traversal_errors = s.traversal_errors,
        blocking = outcome.blocking.len(),
        advisory = outcome.advisory.len(),
        "scan finished"
    );
    Ok(outcome)
}

fn validate_root(root: &Path) -> Result<PathBuf, GlyphError> {
    let canonical = std::fs::canonicalize(root).map_err(|source| GlyphError::RootNotFound {
        path: root.to_path_buf(),
        source,
    })?;
    if !canonical.is_dir() {
        return Err(GlyphError::RootNotDirectory { path: root.to_path_buf() });
    }
    // 根目录不可读时遍历会得到空结果，必须在此失败而不是报告 clean
    std::fs::read_dir(&canonical).map_err(|source| GlyphError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;
    Ok(canonical)
}

fn root_unreadable(root: &Path, source: std::io::Error) -> GlyphError {
    GlyphError::RootUnreadable { path: root.to_path_buf(), source }
}

/// 串行路径（reference 行为：先遍历后扫描，逐个处理）
fn scan_sequential(root: &Path, config: &ScanConfig) -> Result<ScanOutcome, GlyphError> {
    let mut agg = Aggregator::default();
    let mut stats = ScanStats::default();

    let mut walker = Walker::new(root, config);
    for path in walker.by_ref() {
        stats.files_visited += 1;
        record(&mut agg, &mut stats, inspect(root, &path, config));
    }
    if let Some(err) = walker.take_root_error() {
        return Err(root_unreadable(root, err));
    }
    stats.traversal_errors = walker.traversal_errors();
    Ok(agg.finish(stats))
}

/// 并行调度：
/// - 遍历线程惰性产出路径，经有界通道交给 Rayon 线程池
/// - worker 各自分类 + 扫描，结果经第二条通道送回当前线程
/// - 当前线程是唯一的收集点，最终按路径排序
fn scan_parallel(root: &Path, config: &ScanConfig, threads: usize) -> Result<ScanOutcome, GlyphError> {
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;

    let (path_tx, path_rx) = channel::bounded::<PathBuf>(PATH_QUEUE_DEPTH);
    let (step_tx, step_rx) = channel::bounded::<Step>(RESULT_QUEUE_DEPTH);

    let mut agg = Aggregator::default();
    let mut stats = ScanStats::default();

    let root_error = std::thread::scope(|s| {
        let walk_thread = s.spawn(move || {
            let mut walker = Walker::new(root, config);
            let mut visited = 0usize;
            for path in walker.by_ref() {
                visited += 1;
                if path_tx.send(path).is_err() {
                    break;
                }
            }
            // path_tx 在此被丢弃，worker 侧迭代随之结束
            (visited, walker.traversal_errors(), walker.take_root_error())
        });

        s.spawn(move || {
            pool.install(|| {
                path_rx.into_iter().par_bridge().for_each_with(step_tx, |tx, path| {
                    let _ = tx.send(inspect(root, &path, config));
                });
            });
        });

        // 所有 step_tx 克隆被丢弃后 recv 循环结束
        for step in step_rx.iter() {
            record(&mut agg, &mut stats, step);
        }

        let (visited, errors, root_error) = match walk_thread.join() {
            Ok(v) => v,
            Err(panic) => std::panic::resume_unwind(panic),
        };
        stats.files_visited = visited;
        stats.traversal_errors = errors;
        root_error
    });

    if let Some(err) = root_error {
        return Err(root_unreadable(root, err));
    }
    Ok(agg.finish(stats))
}

fn inspect(root: &Path, path: &Path, config: &ScanConfig) -> Step {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let class = classify(rel, config);
    if class == Classification::Ignored {
        return Step::Ignored;
    }
    let display = display_path(rel);
    match scan_file(path, &display, &config.restricted, config.sample_cap) {
        FileScan::Clean => Step::Clean,
        FileScan::Skipped => Step::Skipped,
        FileScan::Hit(f) => Step::Hit(class, f),
    }
}

fn record(agg: &mut Aggregator, stats: &mut ScanStats, step: Step) {
    match step {
        Step::Ignored => {}
        Step::Clean => stats.files_scanned += 1,
        Step::Skipped => stats.files_skipped += 1,
        Step::Hit(class, finding) => {
            stats.files_scanned += 1;
            agg.push(class, finding);
        }
    }
}

/// 相对路径统一渲染为 `/` 分隔，保证跨平台输出一致
fn display_path(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(seg) => Some(seg.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
