use anyhow::{Context, Result};
use serde::Serialize;
use std::cmp::Ordering;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::{ReportDocument, TaskRecord};
use crate::parser::parse_report;

pub fn is_report_file(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("md")
    )
}

/// フォルダ直下の .md を全部パースして日付順に返す。
/// 読めないファイルは警告してスキップ、日付もタスクも無いものは捨てる。
pub fn load_reports(dir: &Path) -> Vec<ReportDocument> {
    let mut reports = Vec::new();
    let Ok(entries) = std::fs::read_dir(dir) else { return reports };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| !p.is_dir() && is_report_file(p))
        .collect();
    files.sort();

    for path in files {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let report = parse_report(&content, &filename);
                if report.has_content() {
                    reports.push(report);
                }
            }
            Err(e) => eprintln!("Warning: failed to read {}: {e}", path.display()),
        }
    }

    sort_by_date(&mut reports);
    reports
}

/// 日付昇順、日付なしは末尾。同日・同なしは元の順序を保つ。
pub fn sort_by_date(reports: &mut [ReportDocument]) {
    reports.sort_by(|a, b| match (a.date, b.date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

pub fn save_snapshot(path: &Path, reports: &[ReportDocument]) -> Result<()> {
    let json = serde_json::to_string_pretty(reports).context("Failed to serialize reports")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<Vec<ReportDocument>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let reports: Vec<ReportDocument> =
        serde_json::from_str(&data).with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(reports)
}

#[derive(Serialize)]
struct TaskCsvRow<'a> {
    #[serde(rename = "日付")]
    date: String,
    #[serde(rename = "タスク")]
    task: &'a str,
    #[serde(rename = "カテゴリ")]
    category: &'a str,
    #[serde(rename = "タイプ")]
    kind: &'static str,
    #[serde(rename = "出現回数")]
    count: u32,
    #[serde(rename = "完了状況")]
    status: &'static str,
}

/// フィルタ済みタスクをCSVに書き出す。
/// Excelで開けるようBOM付きUTF-8、テキスト列は引用符囲み。
pub fn export_csv(path: &Path, tasks: &[TaskRecord]) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all("\u{FEFF}".as_bytes())
        .context("Failed to write BOM")?;

    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::NonNumeric)
        .from_writer(file);

    for task in tasks {
        let row = TaskCsvRow {
            date: task
                .date
                .map(|d| d.format("%Y/%m/%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
            task: &task.text,
            category: &task.category,
            kind: task.kind.label(),
            count: task.count,
            status: task.completion_label(),
        };
        wtr.serialize(row).context("Failed to write CSV row")?;
    }
    wtr.flush().context("Failed to flush CSV")?;
    Ok(())
}
