use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 日報の優先度行 `高[...] 中[...] 低[...]` から取り出したラベル群
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityBuckets {
    #[serde(default)]
    pub high: Vec<String>,
    #[serde(default)]
    pub medium: Vec<String>,
    #[serde(default)]
    pub low: Vec<String>,
}

impl PriorityBuckets {
    pub fn is_empty(&self) -> bool {
        self.high.is_empty() && self.medium.is_empty() && self.low.is_empty()
    }
}

/// 1ファイル分の日報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub filename: String,
    pub date: Option<NaiveDate>,
    pub tasks: Vec<String>,
    pub completed: Vec<String>,
    pub planned: Vec<String>,
    #[serde(default)]
    pub priority: PriorityBuckets,
}

impl ReportDocument {
    pub fn new(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            date: None,
            tasks: Vec::new(),
            completed: Vec::new(),
            planned: Vec::new(),
            priority: PriorityBuckets::default(),
        }
    }

    /// 日付もタスクも無いドキュメントは取り込まない
    pub fn has_content(&self) -> bool {
        self.date.is_some() || !self.tasks.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.tasks.len() + self.completed.len() + self.planned.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionKind {
    #[serde(rename = "tasks")]
    Task,
    #[serde(rename = "planned")]
    Planned,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "both")]
    Both,
}

impl SectionKind {
    /// 重複排除キーに混ぜるサフィックス（スナップショットのキー形式に合わせる）
    pub fn key_suffix(self) -> &'static str {
        match self {
            SectionKind::Task => "",
            SectionKind::Planned => "_planned",
            SectionKind::Completed => "_completed",
            SectionKind::Both => "_both",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SectionKind::Task => "業務",
            SectionKind::Planned => "予定",
            SectionKind::Completed => "成果",
            SectionKind::Both => "予定→成果",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "高",
            Priority::Medium => "中",
            Priority::Low => "低",
        }
    }
}

/// 集約後の正規化済みタスク1件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub text: String,
    pub normalized: String,
    pub category: String,
    pub date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub kind: SectionKind,
    pub count: u32,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl TaskRecord {
    pub fn completion_label(&self) -> &'static str {
        if self.completed {
            "完了"
        } else {
            "未完了"
        }
    }
}

/// 全条件AND。未指定の条件は素通し。
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub total: usize,
    pub unique: usize,
    pub date_range: String,
    pub completion_rate: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_document_serializes_date_as_iso() {
        let mut report = ReportDocument::new("a.md");
        report.date = NaiveDate::from_ymd_opt(2024, 3, 5);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"2024-03-05\""));

        let back: ReportDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back.date, NaiveDate::from_ymd_opt(2024, 3, 5));
    }

    #[test]
    fn report_document_deserializes_without_priority_field() {
        let json = r#"{"filename":"a.md","date":null,"tasks":["x"],"completed":[],"planned":[]}"#;
        let report: ReportDocument = serde_json::from_str(json).unwrap();
        assert!(report.priority.is_empty());
        assert!(report.has_content());
    }

    #[test]
    fn has_content_requires_date_or_tasks() {
        let mut report = ReportDocument::new("empty.md");
        assert!(!report.has_content());
        report.planned.push("明日の予定".to_string());
        assert!(!report.has_content());
        report.tasks.push("業務".to_string());
        assert!(report.has_content());
    }

    #[test]
    fn section_kind_json_names_match_record_shape() {
        assert_eq!(serde_json::to_string(&SectionKind::Task).unwrap(), "\"tasks\"");
        assert_eq!(serde_json::to_string(&SectionKind::Both).unwrap(), "\"both\"");
    }
}
