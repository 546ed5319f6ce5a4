pub mod analysis;
pub mod domain;
pub mod fs_ops;
pub mod normalize;
pub mod parser;

pub use domain::{
    FilterCriteria, Priority, PriorityBuckets, ReportDocument, SectionKind, StatsSummary,
    TaskRecord,
};
pub use normalize::{categorize_task, normalize_task, prefix_match};
pub use parser::parse_report;

use analysis::LATENCY_DAYS;

/// 1回の集計結果。入力の日報リストごと保持する。
pub struct Analysis {
    pub reports: Vec<ReportDocument>,
    pub tasks: Vec<TaskRecord>,
    pub filtered: Vec<TaskRecord>,
    pub stats: StatsSummary,
    pub latency_bins: [usize; LATENCY_DAYS],
}

/// 日報集合を集約してフィルタと統計まで流す単一のエントリポイント。
/// 毎回フルで再計算する。途中状態が外から見えることはない。
pub fn run_analysis(reports: Vec<ReportDocument>, criteria: &FilterCriteria) -> Analysis {
    let tasks = analysis::aggregate(&reports);
    let filtered = analysis::filter_tasks(&tasks, criteria);
    let stats = analysis::compute_stats(&filtered);
    let latency_bins = analysis::completion_latency(&reports);
    Analysis {
        reports,
        tasks,
        filtered,
        stats,
        latency_bins,
    }
}
