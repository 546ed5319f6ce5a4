use chrono::NaiveDate;
use unicode_normalization::UnicodeNormalization;

use crate::domain::{PriorityBuckets, ReportDocument};

const DATE_MARKER: &str = "**日付**:";
const PRIORITY_MARKER: &str = "**優先度**:";

const SECTION_TASKS: &str = "本日の業務内容";
const SECTION_COMPLETED: &str = "本日の成果";
const SECTION_PLANNED: &str = "明日の予定";

/// 未記入テンプレートの目印。これを含む箇条書きはタスク扱いしない。
const PLACEHOLDER_MARKER: &str = "記入";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Tasks,
    Completed,
    Planned,
}

/// 日報テキスト1件をパースする。
/// 日付・優先度行が壊れていてもエラーにはせず、該当フィールドを空のままにする。
pub fn parse_report(content: &str, filename: &str) -> ReportDocument {
    let mut report = ReportDocument::new(filename);
    let mut current: Option<Section> = None;
    let mut buffer: Vec<String> = Vec::new();
    let mut priority_line: Option<String> = None;

    for raw_line in content.lines() {
        let line = raw_line.trim();

        if let Some(rest) = line.strip_prefix(DATE_MARKER) {
            report.date = parse_japanese_date(rest);
        }

        if let Some(rest) = line.strip_prefix(PRIORITY_MARKER) {
            let rest = rest.trim();
            // 複数回現れた場合は最後の行が勝つ
            if !rest.is_empty() {
                priority_line = Some(rest.to_string());
            }
        }

        if line.starts_with("##") {
            flush_section(&mut report, current, &mut buffer);
            current = if line.contains(SECTION_TASKS) {
                Some(Section::Tasks)
            } else if line.contains(SECTION_COMPLETED) {
                Some(Section::Completed)
            } else if line.contains(SECTION_PLANNED) {
                Some(Section::Planned)
            } else {
                None
            };
        }

        if let Some(rest) = line.strip_prefix("- ") {
            if current.is_some() {
                let text = rest.trim();
                if !text.is_empty() && !text.starts_with('[') && !text.contains(PLACEHOLDER_MARKER) {
                    buffer.push(text.to_string());
                }
            }
        }
    }
    flush_section(&mut report, current, &mut buffer);

    if let Some(line) = priority_line {
        report.priority = parse_priority_line(&line);
    }

    report
}

/// バッファが空のときは何もしない（空セクションで既存の中身を消さない）
fn flush_section(report: &mut ReportDocument, current: Option<Section>, buffer: &mut Vec<String>) {
    if buffer.is_empty() {
        return;
    }
    match current {
        Some(Section::Tasks) => report.tasks = std::mem::take(buffer),
        Some(Section::Completed) => report.completed = std::mem::take(buffer),
        Some(Section::Planned) => report.planned = std::mem::take(buffer),
        None => buffer.clear(),
    }
}

/// `YYYY年M月D日` をテキスト中のどこからでも拾う。
/// 暦として不正な日付（13月など）は無かったことにする。
pub fn parse_japanese_date(text: &str) -> Option<NaiveDate> {
    let chars: Vec<char> = text.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c != '年' || i < 4 {
            continue;
        }
        let year_digits: String = chars[i - 4..i].iter().collect();
        if !year_digits.chars().all(|d| d.is_ascii_digit()) {
            continue;
        }
        let Some((month, next)) = read_number(&chars, i + 1, '月') else {
            continue;
        };
        let Some((day, _)) = read_number(&chars, next, '日') else {
            continue;
        };
        let year: i32 = year_digits.parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }
    None
}

/// start 位置から1〜2桁の数字とその直後の区切り文字を読む
fn read_number(chars: &[char], start: usize, terminator: char) -> Option<(u32, usize)> {
    let mut i = start;
    let mut digits = String::new();
    while i < chars.len() && chars[i].is_ascii_digit() {
        digits.push(chars[i]);
        i += 1;
    }
    if digits.is_empty() || digits.len() > 2 || chars.get(i) != Some(&terminator) {
        return None;
    }
    Some((digits.parse().ok()?, i + 1))
}

/// `高[A、B] 中[C] 低[D]` 形式の優先度行をパースする。
/// NFKCで全角括弧・全角カンマを半角に寄せてから取り出す。
pub fn parse_priority_line(line: &str) -> PriorityBuckets {
    let line: String = line.nfkc().collect();
    PriorityBuckets {
        high: extract_bucket(&line, '高'),
        medium: extract_bucket(&line, '中'),
        low: extract_bucket(&line, '低'),
    }
}

fn extract_bucket(line: &str, key: char) -> Vec<String> {
    let mut rest = line;
    while let Some(pos) = rest.find(key) {
        let after = &rest[pos + key.len_utf8()..];
        if let Some(body) = after.strip_prefix('[') {
            if let Some(end) = body.find(']') {
                return body[..end]
                    .split(['、', ','])
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect();
            }
        }
        rest = after;
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# 日報

**日付**: 2024年3月5日
**優先度**: 高[資料作成] 中[メール対応、電話] 低[]

## 本日の業務内容
- クライアントに3件のメールを送信した
- 提案資料を作成

## 本日の成果
- 提案資料の完成

## 明日の予定
- クライアント定例ミーティング
";

    #[test]
    fn parses_date_line() {
        let report = parse_report(SAMPLE, "0305_日報.md");
        assert_eq!(report.date, NaiveDate::from_ymd_opt(2024, 3, 5));
    }

    #[test]
    fn parses_all_three_sections() {
        let report = parse_report(SAMPLE, "0305_日報.md");
        assert_eq!(report.tasks.len(), 2);
        assert_eq!(report.completed, vec!["提案資料の完成"]);
        assert_eq!(report.planned, vec!["クライアント定例ミーティング"]);
    }

    #[test]
    fn parses_priority_buckets() {
        let report = parse_report(SAMPLE, "0305_日報.md");
        assert_eq!(report.priority.high, vec!["資料作成"]);
        assert_eq!(report.priority.medium, vec!["メール対応", "電話"]);
        assert!(report.priority.low.is_empty());
    }

    #[test]
    fn japanese_date_requires_four_digit_year() {
        assert_eq!(
            parse_japanese_date(" 2024年3月5日"),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert_eq!(
            parse_japanese_date("2024年12月31日に提出"),
            NaiveDate::from_ymd_opt(2024, 12, 31)
        );
        assert_eq!(parse_japanese_date("24年3月5日"), None);
        assert_eq!(parse_japanese_date("3月5日"), None);
    }

    #[test]
    fn invalid_calendar_date_is_dropped() {
        assert_eq!(parse_japanese_date("2024年13月40日"), None);
        let report = parse_report("**日付**: 2024年13月1日\n", "x.md");
        assert_eq!(report.date, None);
    }

    #[test]
    fn template_stubs_are_skipped() {
        let text = "\
## 本日の業務内容
- [ここに記入]
- ここに記入してください
-
- 実際のタスク
";
        let report = parse_report(text, "stub.md");
        assert_eq!(report.tasks, vec!["実際のタスク"]);
    }

    #[test]
    fn bullets_under_unknown_heading_are_ignored() {
        let text = "\
## 本日の業務内容
- タスクA

## 所感
- これはタスクではない

## 明日の予定
- タスクB
";
        let report = parse_report(text, "x.md");
        assert_eq!(report.tasks, vec!["タスクA"]);
        assert_eq!(report.planned, vec!["タスクB"]);
    }

    #[test]
    fn bullets_before_any_heading_are_ignored() {
        let report = parse_report("- 見出しより前の行\n", "x.md");
        assert!(report.tasks.is_empty());
        assert!(!report.has_content());
    }

    #[test]
    fn last_section_is_flushed_at_eof() {
        let text = "## 明日の予定\n- 最後のタスク";
        let report = parse_report(text, "x.md");
        assert_eq!(report.planned, vec!["最後のタスク"]);
    }

    #[test]
    fn later_priority_line_wins() {
        let text = "\
**優先度**: 高[A]
**優先度**: 高[B]
";
        let report = parse_report(text, "x.md");
        assert_eq!(report.priority.high, vec!["B"]);
    }

    #[test]
    fn priority_line_accepts_fullwidth_brackets() {
        let buckets = parse_priority_line("高［資料作成，レビュー］ 低[雑務]");
        assert_eq!(buckets.high, vec!["資料作成", "レビュー"]);
        assert_eq!(buckets.low, vec!["雑務"]);
    }

    #[test]
    fn malformed_priority_line_yields_empty_buckets() {
        let buckets = parse_priority_line("特になし");
        assert!(buckets.is_empty());
    }

    #[test]
    fn missing_date_does_not_abort_parsing() {
        let text = "\
**日付**: 未定
## 本日の業務内容
- タスクA
";
        let report = parse_report(text, "x.md");
        assert_eq!(report.date, None);
        assert_eq!(report.tasks, vec!["タスクA"]);
    }
}
