//! Task records and their closed enums.
//!
//! Rows arrive as loose string maps (mirror CSV cells, remote JSON) and are
//! coerced into `TaskRecord` exactly once, at the load boundary. Unknown
//! enum text, unparseable dates, and out-of-range ratings degrade to
//! defaults there instead of failing the load. The domain value and its
//! display form stay distinct: enums serialize as snake_case tokens and map
//! to presentation labels through `label()`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A loose row as read from the mirror or the remote table.
pub type RawRow = BTreeMap<String, String>;

/// Column names, in mirror/remote order.
pub const COLUMNS: [&str; 17] = [
    "Id",
    "Area",
    "Phase",
    "Assignee",
    "Title",
    "Type",
    "Complexity",
    "Priority",
    "Status",
    "StartDate",
    "DueDate",
    "DoneDate",
    "DeletedDate",
    "Evaluation",
    "Rating",
    "Compliance",
    "Comments",
];

pub const MAX_RATING: u8 = 5;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Done,
    Paused,
    Cancelled,
    Deleted,
}

impl TaskStatus {
    /// All statuses in board-column order.
    pub const ALL: [TaskStatus; 6] = [
        TaskStatus::NotStarted,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::Paused,
        TaskStatus::Cancelled,
        TaskStatus::Deleted,
    ];

    /// Canonical storage token.
    pub fn token(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not_started",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
            TaskStatus::Paused => "paused",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Deleted => "deleted",
        }
    }

    /// Presentation label.
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "Not Started",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
            TaskStatus::Paused => "Paused",
            TaskStatus::Cancelled => "Cancelled",
            TaskStatus::Deleted => "Deleted",
        }
    }

    /// Parse a stored or displayed status; blank and unknown text map to None.
    pub fn parse(value: &str) -> Option<TaskStatus> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        TaskStatus::ALL.into_iter().find(|status| {
            status.token().eq_ignore_ascii_case(trimmed)
                || status.label().eq_ignore_ascii_case(trimmed)
        })
    }
}

/// Review verdict for a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Evaluation {
    Unevaluated,
    Approved,
    Rejected,
    Observed,
}

impl Evaluation {
    pub const ALL: [Evaluation; 4] = [
        Evaluation::Unevaluated,
        Evaluation::Approved,
        Evaluation::Rejected,
        Evaluation::Observed,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            Evaluation::Unevaluated => "unevaluated",
            Evaluation::Approved => "approved",
            Evaluation::Rejected => "rejected",
            Evaluation::Observed => "observed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Evaluation::Unevaluated => "Unevaluated",
            Evaluation::Approved => "Approved",
            Evaluation::Rejected => "Rejected",
            Evaluation::Observed => "Observed",
        }
    }

    /// Parse a stored or displayed verdict; blank and unknown text degrade
    /// to Unevaluated.
    pub fn parse(value: &str) -> Evaluation {
        let trimmed = value.trim();
        Evaluation::ALL
            .into_iter()
            .find(|eval| {
                eval.token().eq_ignore_ascii_case(trimmed)
                    || eval.label().eq_ignore_ascii_case(trimmed)
            })
            .unwrap_or(Evaluation::Unevaluated)
    }
}

/// One row of the task table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub assignee: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub complexity: String,
    #[serde(default)]
    pub priority: String,
    /// Stored status; None means "derive from dates".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_date: Option<NaiveDate>,
    #[serde(default = "default_evaluation")]
    pub evaluation: Evaluation,
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub compliance: String,
    #[serde(default)]
    pub comments: String,
}

fn default_evaluation() -> Evaluation {
    Evaluation::Unevaluated
}

impl TaskRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            area: String::new(),
            phase: String::new(),
            assignee: String::new(),
            title: title.into(),
            kind: String::new(),
            complexity: String::new(),
            priority: String::new(),
            status: None,
            start_date: None,
            due_date: None,
            done_date: None,
            deleted_date: None,
            evaluation: Evaluation::Unevaluated,
            rating: 0,
            compliance: String::new(),
            comments: String::new(),
        }
    }

    /// Effective status: the stored value, or the date-derived fallback
    /// when the stored value is blank.
    pub fn current_status(&self) -> TaskStatus {
        if let Some(status) = self.status {
            return status;
        }
        if self.deleted_date.is_some() {
            TaskStatus::Deleted
        } else if self.done_date.is_some() {
            TaskStatus::Done
        } else if self.start_date.is_some() {
            TaskStatus::InProgress
        } else {
            TaskStatus::NotStarted
        }
    }

    /// Coerce a loose row into a record. Returns None when the id cell is
    /// blank or missing (the row is skipped, not an error).
    pub fn from_raw(raw: &RawRow) -> Option<TaskRecord> {
        let id = cell(raw, "Id");
        if id.is_empty() {
            return None;
        }

        Some(TaskRecord {
            id,
            area: cell(raw, "Area"),
            phase: cell(raw, "Phase"),
            assignee: cell(raw, "Assignee"),
            title: cell(raw, "Title"),
            kind: cell(raw, "Type"),
            complexity: cell(raw, "Complexity"),
            priority: cell(raw, "Priority"),
            status: TaskStatus::parse(&cell(raw, "Status")),
            start_date: parse_date(&cell(raw, "StartDate")),
            due_date: parse_date(&cell(raw, "DueDate")),
            done_date: parse_date(&cell(raw, "DoneDate")),
            deleted_date: parse_date(&cell(raw, "DeletedDate")),
            evaluation: Evaluation::parse(&cell(raw, "Evaluation")),
            rating: parse_rating(&cell(raw, "Rating")),
            compliance: cell(raw, "Compliance"),
            comments: cell(raw, "Comments"),
        })
    }

    /// Render the record back into a loose row, canonical tokens throughout.
    pub fn to_raw(&self) -> RawRow {
        let mut raw = RawRow::new();
        raw.insert("Id".to_string(), self.id.clone());
        raw.insert("Area".to_string(), self.area.clone());
        raw.insert("Phase".to_string(), self.phase.clone());
        raw.insert("Assignee".to_string(), self.assignee.clone());
        raw.insert("Title".to_string(), self.title.clone());
        raw.insert("Type".to_string(), self.kind.clone());
        raw.insert("Complexity".to_string(), self.complexity.clone());
        raw.insert("Priority".to_string(), self.priority.clone());
        raw.insert(
            "Status".to_string(),
            self.status.map(|s| s.token().to_string()).unwrap_or_default(),
        );
        raw.insert("StartDate".to_string(), format_date(self.start_date));
        raw.insert("DueDate".to_string(), format_date(self.due_date));
        raw.insert("DoneDate".to_string(), format_date(self.done_date));
        raw.insert("DeletedDate".to_string(), format_date(self.deleted_date));
        raw.insert(
            "Evaluation".to_string(),
            self.evaluation.token().to_string(),
        );
        raw.insert("Rating".to_string(), self.rating.to_string());
        raw.insert("Compliance".to_string(), self.compliance.clone());
        raw.insert("Comments".to_string(), self.comments.clone());
        raw
    }
}

fn cell(raw: &RawRow, column: &str) -> String {
    raw.get(column).map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Clamp any integer input into the [0, MAX_RATING] range.
pub fn clamp_rating(value: i64) -> u8 {
    value.clamp(0, MAX_RATING as i64) as u8
}

fn parse_rating(value: &str) -> u8 {
    match value.trim().parse::<i64>() {
        Ok(number) => clamp_rating(number),
        Err(_) => 0,
    }
}

/// Parse a date cell; unparseable text becomes None.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn status_parse_accepts_tokens_and_labels() {
        assert_eq!(TaskStatus::parse("in_progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("In Progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("DONE"), Some(TaskStatus::Done));
        assert_eq!(TaskStatus::parse(""), None);
        assert_eq!(TaskStatus::parse("garbled"), None);
    }

    #[test]
    fn evaluation_parse_defaults_to_unevaluated() {
        assert_eq!(Evaluation::parse("Approved"), Evaluation::Approved);
        assert_eq!(Evaluation::parse("observed"), Evaluation::Observed);
        assert_eq!(Evaluation::parse(""), Evaluation::Unevaluated);
        assert_eq!(Evaluation::parse("???"), Evaluation::Unevaluated);
    }

    #[test]
    fn rating_clamps_into_range() {
        assert_eq!(clamp_rating(-3), 0);
        assert_eq!(clamp_rating(0), 0);
        assert_eq!(clamp_rating(5), 5);
        assert_eq!(clamp_rating(42), 5);
    }

    #[test]
    fn derived_status_follows_dates() {
        let mut task = TaskRecord::new("T-1", "Derive me");
        assert_eq!(task.current_status(), TaskStatus::NotStarted);

        task.start_date = Some(date(2024, 3, 1));
        assert_eq!(task.current_status(), TaskStatus::InProgress);

        task.done_date = Some(date(2024, 3, 9));
        assert_eq!(task.current_status(), TaskStatus::Done);

        task.deleted_date = Some(date(2024, 3, 10));
        assert_eq!(task.current_status(), TaskStatus::Deleted);
    }

    #[test]
    fn stored_status_wins_over_dates() {
        let mut task = TaskRecord::new("T-1", "Stored");
        task.start_date = Some(date(2024, 3, 1));
        task.status = Some(TaskStatus::Paused);
        assert_eq!(task.current_status(), TaskStatus::Paused);
    }

    #[test]
    fn from_raw_coerces_loose_cells() {
        let mut raw = RawRow::new();
        raw.insert("Id".to_string(), " T-7 ".to_string());
        raw.insert("Title".to_string(), "Loose row".to_string());
        raw.insert("Status".to_string(), "In Progress".to_string());
        raw.insert("StartDate".to_string(), "03/04/2024".to_string());
        raw.insert("DueDate".to_string(), "not a date".to_string());
        raw.insert("Rating".to_string(), "99".to_string());
        raw.insert("Evaluation".to_string(), "nonsense".to_string());

        let task = TaskRecord::from_raw(&raw).expect("record");
        assert_eq!(task.id, "T-7");
        assert_eq!(task.status, Some(TaskStatus::InProgress));
        assert!(task.start_date.is_some());
        assert_eq!(task.due_date, None);
        assert_eq!(task.rating, 5);
        assert_eq!(task.evaluation, Evaluation::Unevaluated);
    }

    #[test]
    fn from_raw_skips_blank_id() {
        let mut raw = RawRow::new();
        raw.insert("Id".to_string(), "  ".to_string());
        raw.insert("Title".to_string(), "No id".to_string());
        assert!(TaskRecord::from_raw(&raw).is_none());
    }

    #[test]
    fn raw_round_trip_preserves_fields() {
        let mut task = TaskRecord::new("T-3", "Round trip");
        task.area = "Platform".to_string();
        task.assignee = "alice@example.com".to_string();
        task.priority = "High".to_string();
        task.status = Some(TaskStatus::Done);
        task.start_date = Some(date(2024, 1, 2));
        task.done_date = Some(date(2024, 2, 3));
        task.evaluation = Evaluation::Approved;
        task.rating = 4;
        task.compliance = "ok".to_string();
        task.comments = "looks good".to_string();

        let raw = task.to_raw();
        let back = TaskRecord::from_raw(&raw).expect("record");
        assert_eq!(task, back);
    }
}
