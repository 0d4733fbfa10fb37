//! The shared task table.
//!
//! A `TaskTable` is the explicit application state for a session: an
//! ordered collection of records with unique ids, loaded wholesale from the
//! mirror (or remote) and replaced wholesale on save. Handlers receive it
//! by reference; there is no global instance.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::record::{clamp_rating, Evaluation, RawRow, TaskRecord, TaskStatus};

/// A single field edit against one task row.
///
/// Each edit names the columns it touches so the save path can re-check
/// field-level read-only restrictions before anything is persisted.
#[derive(Debug, Clone)]
pub enum TaskEdit {
    Status(Option<TaskStatus>),
    Priority(String),
    Rating(i64),
    Evaluate {
        verdict: Evaluation,
        rating: Option<i64>,
        compliance: Option<String>,
    },
    Comment(String),
    Assignee(String),
    StartDate(Option<NaiveDate>),
    DueDate(Option<NaiveDate>),
    DoneDate(Option<NaiveDate>),
    DeletedDate(Option<NaiveDate>),
}

impl TaskEdit {
    /// Column names this edit writes.
    pub fn columns(&self) -> Vec<&'static str> {
        match self {
            TaskEdit::Status(_) => vec!["Status"],
            TaskEdit::Priority(_) => vec!["Priority"],
            TaskEdit::Rating(_) => vec!["Rating"],
            TaskEdit::Evaluate {
                rating, compliance, ..
            } => {
                let mut columns = vec!["Evaluation"];
                if rating.is_some() {
                    columns.push("Rating");
                }
                if compliance.is_some() {
                    columns.push("Compliance");
                }
                columns
            }
            TaskEdit::Comment(_) => vec!["Comments"],
            TaskEdit::Assignee(_) => vec!["Assignee"],
            TaskEdit::StartDate(_) => vec!["StartDate"],
            TaskEdit::DueDate(_) => vec!["DueDate"],
            TaskEdit::DoneDate(_) => vec!["DoneDate"],
            TaskEdit::DeletedDate(_) => vec!["DeletedDate"],
        }
    }

    fn apply(&self, record: &mut TaskRecord) {
        match self {
            TaskEdit::Status(status) => record.status = *status,
            TaskEdit::Priority(priority) => record.priority = priority.trim().to_string(),
            TaskEdit::Rating(rating) => record.rating = clamp_rating(*rating),
            TaskEdit::Evaluate {
                verdict,
                rating,
                compliance,
            } => {
                record.evaluation = *verdict;
                if let Some(rating) = rating {
                    record.rating = clamp_rating(*rating);
                }
                if let Some(compliance) = compliance {
                    record.compliance = compliance.trim().to_string();
                }
            }
            TaskEdit::Comment(comment) => record.comments = comment.trim().to_string(),
            TaskEdit::Assignee(assignee) => record.assignee = assignee.trim().to_string(),
            TaskEdit::StartDate(date) => record.start_date = *date,
            TaskEdit::DueDate(date) => record.due_date = *date,
            TaskEdit::DoneDate(date) => record.done_date = *date,
            TaskEdit::DeletedDate(date) => record.deleted_date = *date,
        }
    }
}

/// Ordered task rows with unique ids.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskTable {
    rows: Vec<TaskRecord>,
}

impl TaskTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from loose rows, coercing each at the load boundary.
    /// Rows with a blank id are skipped; a duplicate id keeps the first
    /// occurrence and drops the rest.
    pub fn from_raw_rows(rows: &[RawRow]) -> Self {
        let mut table = TaskTable::new();
        for raw in rows {
            if let Some(record) = TaskRecord::from_raw(raw) {
                let _ = table.insert(record);
            }
        }
        table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[TaskRecord] {
        &self.rows
    }

    pub fn find(&self, id: &str) -> Option<&TaskRecord> {
        let id = id.trim();
        self.rows.iter().find(|row| row.id == id)
    }

    /// Append a record, rejecting duplicate ids.
    pub fn insert(&mut self, record: TaskRecord) -> Result<()> {
        if record.id.trim().is_empty() {
            return Err(Error::InvalidArgument("task id cannot be empty".to_string()));
        }
        if self.find(&record.id).is_some() {
            return Err(Error::InvalidArgument(format!(
                "task already exists: {}",
                record.id
            )));
        }
        self.rows.push(record);
        Ok(())
    }

    /// Apply an edit to one row, returning a copy of the updated record.
    pub fn apply(&mut self, id: &str, edit: &TaskEdit) -> Result<TaskRecord> {
        let id = id.trim();
        let record = self
            .rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        edit.apply(record);
        Ok(record.clone())
    }

    /// Replace the whole table. The session table is never diffed
    /// incrementally; load and save swap it wholesale.
    pub fn replace_all(&mut self, rows: Vec<TaskRecord>) {
        self.rows = rows;
    }

    pub fn into_rows(self) -> Vec<TaskRecord> {
        self.rows
    }

    pub fn to_raw_rows(&self) -> Vec<RawRow> {
        self.rows.iter().map(TaskRecord::to_raw).collect()
    }

    /// Generate an id not present in the table: "TD-" plus the shortest
    /// unique slice of a fresh ulid's random section.
    pub fn generate_id(&self) -> String {
        loop {
            let base = ulid::Ulid::new().to_string().to_lowercase();
            // skip the 10 leading timestamp chars; they barely vary
            let random = &base[10..];
            for len in 6..=random.len() {
                let candidate = format!("TD-{}", &random[..len]);
                if self.find(&candidate).is_none() {
                    return candidate;
                }
            }
        }
    }
}
