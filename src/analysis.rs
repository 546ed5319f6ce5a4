//! 日報集合からのタスク集約とフィルタ・統計。
//! 集約は毎回ゼロから全件を作り直す。入力の日報リストは不変のまま。

use std::collections::{HashMap, HashSet};

use crate::domain::{
    FilterCriteria, Priority, PriorityBuckets, ReportDocument, SectionKind, StatsSummary,
    TaskRecord,
};
use crate::normalize::{categorize_task, normalize_task, prefix_match, CATEGORIES, CATEGORY_OTHER};

/// 完了までの日数ビン（0日〜7日）
pub const LATENCY_DAYS: usize = 8;

/// 全日報からタスクを重複排除しつつ集約する。
///
/// パス1: (正規化文字列, セクション, 日付) をキーに挿入・出現回数の加算。
/// パス2: 同一日報内の予定と成果を前方一致で突き合わせ、予定側を `both` に昇格。
pub fn aggregate(reports: &[ReportDocument]) -> Vec<TaskRecord> {
    let mut tasks: Vec<TaskRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for report in reports {
        let sections = [
            (SectionKind::Task, &report.tasks),
            (SectionKind::Planned, &report.planned),
            (SectionKind::Completed, &report.completed),
        ];
        for (kind, entries) in sections {
            for entry in entries.iter() {
                let normalized = normalize_task(entry);
                let key = dedup_key(&normalized, kind, report.date_key().as_str());
                if let Some(&i) = index.get(&key) {
                    tasks[i].count += 1;
                    continue;
                }
                index.insert(key.clone(), tasks.len());
                tasks.push(TaskRecord {
                    id: key,
                    text: entry.clone(),
                    normalized,
                    category: categorize_task(entry).to_string(),
                    date: report.date,
                    kind,
                    count: 1,
                    completed: kind == SectionKind::Completed,
                    priority: lookup_priority(entry, &report.priority),
                });
            }
        }
    }

    // 予定と成果のマッチング（同一日報内の総当たり）
    for report in reports {
        let date_key = report.date_key();
        for planned in &report.planned {
            let normalized = normalize_task(planned);
            for completed in &report.completed {
                let completed_normalized = normalize_task(completed);
                if !prefix_match(&normalized, &completed_normalized) {
                    continue;
                }
                let key = dedup_key(&normalized, SectionKind::Planned, &date_key);
                if let Some(&i) = index.get(&key) {
                    tasks[i].kind = SectionKind::Both;
                    tasks[i].completed = true;
                }
            }
        }
    }

    tasks
}

fn dedup_key(normalized: &str, kind: SectionKind, date_key: &str) -> String {
    format!("{normalized}{}_{date_key}", kind.key_suffix())
}

impl ReportDocument {
    fn date_key(&self) -> String {
        self.date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// 優先度行のラベルがタスク文に含まれるかを 高→中→低 の順で見る。
/// バケツは日報ごとのローカルなもので、横断はしない。
fn lookup_priority(task: &str, buckets: &PriorityBuckets) -> Option<Priority> {
    let lower = task.to_lowercase();
    let hit = |labels: &[String]| labels.iter().any(|l| lower.contains(&l.to_lowercase()));
    if hit(&buckets.high) {
        Some(Priority::High)
    } else if hit(&buckets.medium) {
        Some(Priority::Medium)
    } else if hit(&buckets.low) {
        Some(Priority::Low)
    } else {
        None
    }
}

/// 予定タスクが何日後の日報で成果として現れたかをビンに積む。
/// 先読みは直後の9日報まで、日数差は0〜7日のみ数える。
pub fn completion_latency(reports: &[ReportDocument]) -> [usize; LATENCY_DAYS] {
    let mut bins = [0usize; LATENCY_DAYS];

    for (i, report) in reports.iter().enumerate() {
        for planned in &report.planned {
            let normalized = normalize_task(planned);
            'scan: for later in reports.iter().skip(i + 1).take(9) {
                for completed in &later.completed {
                    let completed_normalized = normalize_task(completed);
                    if !prefix_match(&normalized, &completed_normalized) {
                        continue;
                    }
                    if let (Some(from), Some(to)) = (report.date, later.date) {
                        let days = (to - from).num_days();
                        if (0..LATENCY_DAYS as i64).contains(&days) {
                            bins[days as usize] += 1;
                        }
                    }
                    break 'scan;
                }
            }
        }
    }
    bins
}

pub fn latency_label(days: usize) -> String {
    format!("{days}日")
}

/// 条件に合うレコードだけを複製して返す。元のレコード集合には触らない。
pub fn filter_tasks(tasks: &[TaskRecord], criteria: &FilterCriteria) -> Vec<TaskRecord> {
    let search = criteria.search.as_ref().map(|s| s.to_lowercase());
    tasks
        .iter()
        .filter(|task| {
            // 日付フィルタは日付のあるレコードにだけ効く
            if let (Some(from), Some(date)) = (criteria.date_from, task.date) {
                if date < from {
                    return false;
                }
            }
            if let (Some(to), Some(date)) = (criteria.date_to, task.date) {
                if date > to {
                    return false;
                }
            }
            if let Some(category) = &criteria.category {
                if &task.category != category {
                    return false;
                }
            }
            if let Some(search) = &search {
                if !task.text.to_lowercase().contains(search) {
                    return false;
                }
            }
            true
        })
        .cloned()
        .collect()
}

pub fn compute_stats(tasks: &[TaskRecord]) -> StatsSummary {
    let total = tasks.len();
    let unique = tasks
        .iter()
        .map(|t| t.normalized.as_str())
        .collect::<HashSet<_>>()
        .len();

    let min = tasks.iter().filter_map(|t| t.date).min();
    let max = tasks.iter().filter_map(|t| t.date).max();
    let date_range = match (min, max) {
        (Some(min), Some(max)) => {
            format!("{} ～ {}", min.format("%Y/%m/%d"), max.format("%Y/%m/%d"))
        }
        _ => "-".to_string(),
    };

    let completed = tasks
        .iter()
        .filter(|t| t.completed || t.kind == SectionKind::Completed)
        .count();
    let completion_rate = if total > 0 {
        ((completed as f64 / total as f64) * 100.0).round() as u32
    } else {
        0
    };

    StatsSummary {
        total,
        unique,
        date_range,
        completion_rate,
    }
}

/// 正規化文字列ごとに出現回数を合算した頻度上位k件。
/// 表示用ラベルは初出の原文を30文字で切り詰めたもの。
pub fn top_tasks(tasks: &[TaskRecord], k: usize) -> Vec<(String, u32)> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, (String, u32)> = HashMap::new();

    for task in tasks {
        let entry = totals.entry(task.normalized.clone()).or_insert_with(|| {
            order.push(task.normalized.clone());
            (display_label(&task.text), 0)
        });
        entry.1 += task.count;
    }

    let mut items: Vec<(String, u32)> = order
        .into_iter()
        .map(|key| totals[&key].clone())
        .collect();
    items.sort_by(|a, b| b.1.cmp(&a.1));
    items.truncate(k);
    items
}

fn display_label(text: &str) -> String {
    if text.chars().count() > 30 {
        let head: String = text.chars().take(30).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

/// カテゴリ宣言順（末尾にその他）で出現回数を合算する
pub fn category_counts(tasks: &[TaskRecord]) -> Vec<(&'static str, u32)> {
    let mut out = Vec::new();
    for label in CATEGORIES
        .iter()
        .map(|(label, _)| *label)
        .chain(std::iter::once(CATEGORY_OTHER))
    {
        let count: u32 = tasks
            .iter()
            .filter(|t| t.category == label)
            .map(|t| t.count)
            .sum();
        if count > 0 {
            out.push((label, count));
        }
    }
    out
}

/// 予定のみ / 成果のみ / 予定→成果 のレコード数
pub fn planned_vs_completed(tasks: &[TaskRecord]) -> (usize, usize, usize) {
    let both = tasks.iter().filter(|t| t.kind == SectionKind::Both).count();
    let planned = tasks
        .iter()
        .filter(|t| t.kind == SectionKind::Planned)
        .count();
    let completed = tasks
        .iter()
        .filter(|t| t.kind == SectionKind::Completed)
        .count();
    (planned, completed, both)
}
