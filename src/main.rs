use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

use report_analyzer::{analysis, fs_ops, run_analysis, Analysis, FilterCriteria, TaskRecord};

const TOP_TASK_COUNT: usize = 10;

#[derive(Parser)]
#[command(name = "report-analyzer", version, about = "Analyze daily report markdown files")]
struct Cli {
    /// 日報フォルダ、または report_data.json スナップショット
    path: PathBuf,
    /// この日以降のタスクだけを対象にする (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,
    /// この日以前のタスクだけを対象にする (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,
    /// カテゴリ名で絞り込む
    #[arg(long)]
    category: Option<String>,
    /// タスク本文の部分一致で絞り込む
    #[arg(long)]
    search: Option<String>,
    /// パース済み日報をJSONスナップショットとして保存する
    #[arg(long)]
    snapshot: Option<PathBuf>,
    /// フィルタ済みタスクをCSVに書き出す
    #[arg(long)]
    export: Option<PathBuf>,
    /// タスク一覧の表示を省略する
    #[arg(long)]
    no_table: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let is_snapshot = cli
        .path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let reports = if is_snapshot {
        fs_ops::load_snapshot(&cli.path)?
    } else {
        fs_ops::load_reports(&cli.path)
    };

    if reports.is_empty() {
        println!("No reports found in {}", cli.path.display());
        return Ok(());
    }

    println!("--- Reports ({}) ---", reports.len());
    for report in &reports {
        println!("  {} ({}タスク)", report.filename, report.entry_count());
    }

    if let Some(path) = &cli.snapshot {
        fs_ops::save_snapshot(path, &reports)?;
        println!("\n{}件の日報データを {} に出力しました。", reports.len(), path.display());
    }

    let criteria = FilterCriteria {
        date_from: cli.from,
        date_to: cli.to,
        category: cli.category.clone(),
        search: cli.search.clone(),
    };
    let result = run_analysis(reports, &criteria);

    print_stats(&result);
    print_categories(&result.filtered);
    print_top_tasks(&result.filtered);
    print_latency(&result);
    if !cli.no_table {
        print_table(&result.filtered);
    }

    if let Some(path) = &cli.export {
        fs_ops::export_csv(path, &result.filtered)?;
        println!("\n{}件のタスクを {} に出力しました。", result.filtered.len(), path.display());
    }

    Ok(())
}

fn print_stats(result: &Analysis) {
    let stats = &result.stats;
    println!("\n--- Stats ---");
    println!("  総タスク:   {}", stats.total);
    println!("  ユニーク:   {}", stats.unique);
    println!("  期間:       {}", stats.date_range);
    println!("  完了率:     {}%", stats.completion_rate);

    let (planned, completed, both) = analysis::planned_vs_completed(&result.filtered);
    println!("  予定のみ {planned} / 成果のみ {completed} / 予定→成果 {both}");
}

fn print_categories(tasks: &[TaskRecord]) {
    let counts = analysis::category_counts(tasks);
    if counts.is_empty() {
        return;
    }
    println!("\n--- カテゴリ別 ---");
    for (label, count) in counts {
        println!("  {label}: {count}");
    }
}

fn print_top_tasks(tasks: &[TaskRecord]) {
    let top = analysis::top_tasks(tasks, TOP_TASK_COUNT);
    if top.is_empty() {
        return;
    }
    println!("\n--- 頻出タスク ---");
    for (label, count) in top {
        println!("  {count:>3}回  {label}");
    }
}

fn print_latency(result: &Analysis) {
    if result.latency_bins.iter().all(|&n| n == 0) {
        return;
    }
    println!("\n--- 完了までの日数 ---");
    for (days, &count) in result.latency_bins.iter().enumerate() {
        if count > 0 {
            println!("  {}: {count}", analysis::latency_label(days));
        }
    }
}

fn print_table(tasks: &[TaskRecord]) {
    if tasks.is_empty() {
        println!("\n0件のタスク");
        return;
    }

    // 新しい日付が先、日付なしは末尾
    let mut sorted: Vec<&TaskRecord> = tasks.iter().collect();
    sorted.sort_by(|a, b| match (a.date, b.date) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    println!("\n--- タスク一覧 ({}件) ---", tasks.len());
    for task in sorted {
        let date = task
            .date
            .map(|d| d.format("%Y/%m/%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        let priority = task
            .priority
            .map(|p| format!(" [{}]", p.label()))
            .unwrap_or_default();
        println!(
            "  {date}  {:<6} x{:<2} {} ({}, {}){priority}",
            task.kind.label(),
            task.count,
            task.text,
            task.category,
            task.completion_label(),
        );
    }
}
