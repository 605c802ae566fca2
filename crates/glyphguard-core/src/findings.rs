//! 命中项与汇总
use serde::{Serialize, Serializer};

use crate::charset::format_codepoint;
use crate::classify::Classification;
use crate::options::ScanStats;
use crate::report::ExitStatus;

/// 单个文件的命中（创建后不再修改）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// 相对扫描根、以 `/` 分隔的路径
    pub path: String,
    /// 受限码点出现总次数（≥ 1）
    pub occurrence_count: usize,
    /// 按首次出现顺序去重的样本码点（受 sample_cap 截断）
    #[serde(serialize_with = "serialize_samples")]
    pub samples: Vec<char>,
}

fn serialize_samples<S: Serializer>(samples: &[char], s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(samples.iter().map(|c| format_codepoint(*c)))
}

/// 一次扫描的最终结果：两个已按路径排序的分区 + 统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub blocking: Vec<Finding>,
    pub advisory: Vec<Finding>,
    pub stats: ScanStats,
}

impl ScanOutcome {
    pub fn exit_status(&self) -> ExitStatus {
        if self.blocking.is_empty() {
            ExitStatus::Clean
        } else {
            ExitStatus::Blocking
        }
    }

    pub fn is_clean(&self) -> bool {
        self.blocking.is_empty() && self.advisory.is_empty()
    }
}

/// 结果收集点：按分类路由到阻断/告警分区
#[derive(Debug, Default)]
pub struct Aggregator {
    blocking: Vec<Finding>,
    advisory: Vec<Finding>,
}

impl Aggregator {
    pub fn push(&mut self, class: Classification, finding: Finding) {
        match class {
            Classification::Source => self.blocking.push(finding),
            Classification::Documentation => self.advisory.push(finding),
            // 被忽略的文件在扫描前已过滤
            Classification::Ignored => {}
        }
    }

    /// 排序后产出 ScanOutcome；顺序与发现顺序、并发调度无关
    pub fn finish(mut self, stats: ScanStats) -> ScanOutcome {
        sort_by_path(&mut self.blocking);
        sort_by_path(&mut self.advisory);
        ScanOutcome { blocking: self.blocking, advisory: self.advisory, stats }
    }
}

fn sort_by_path(findings: &mut [Finding]) {
    findings.sort_by(|a, b| a.path.cmp(&b.path));
}

/// 一次性汇总 `(分类, 命中)` 序列
pub fn aggregate(items: impl IntoIterator<Item = (Classification, Finding)>) -> ScanOutcome {
    let mut agg = Aggregator::default();
    for (class, finding) in items {
        agg.push(class, finding);
    }
    agg.finish(ScanStats::default())
}
