//! Data-level projections behind the non-editor tabs.
//!
//! No rendering happens here: the board is status buckets, the timeline is
//! date spans, the evaluation queue is an ordering. The CLI formats them
//! through `output`.

use chrono::NaiveDate;
use serde::Serialize;

use crate::record::{Evaluation, TaskRecord, TaskStatus};

/// One kanban column: a status and the rows currently in it.
#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn<'a> {
    pub status: TaskStatus,
    pub tasks: Vec<&'a TaskRecord>,
}

/// Group rows by derived status, one column per status in enum order.
/// Empty columns are kept so the board shape is stable.
pub fn board<'a>(rows: &[&'a TaskRecord]) -> Vec<BoardColumn<'a>> {
    TaskStatus::ALL
        .into_iter()
        .map(|status| BoardColumn {
            status,
            tasks: rows
                .iter()
                .copied()
                .filter(|row| row.current_status() == status)
                .collect(),
        })
        .collect()
}

/// One timeline row: a task with its date span.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntry<'a> {
    pub task: &'a TaskRecord,
    pub start: NaiveDate,
    /// Completion date when set, else the due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

/// Rows with a start date, ordered by start date then id.
pub fn timeline<'a>(rows: &[&'a TaskRecord]) -> Vec<TimelineEntry<'a>> {
    let mut entries: Vec<TimelineEntry<'a>> = rows
        .iter()
        .copied()
        .filter_map(|task| {
            task.start_date.map(|start| TimelineEntry {
                task,
                start,
                end: task.done_date.or(task.due_date),
            })
        })
        .collect();
    entries.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.task.id.cmp(&b.task.id)));
    entries
}

/// Rows for the evaluation screen: unevaluated first, stable otherwise.
pub fn evaluation_queue<'a>(rows: &[&'a TaskRecord]) -> Vec<&'a TaskRecord> {
    let mut ordered: Vec<&TaskRecord> = rows.to_vec();
    ordered.sort_by_key(|row| match row.evaluation {
        Evaluation::Unevaluated => 0,
        _ => 1,
    });
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(id: &str) -> TaskRecord {
        TaskRecord::new(id, id)
    }

    #[test]
    fn board_buckets_by_derived_status() {
        let mut started = task("T-1");
        started.start_date = Some(date(2024, 3, 1));
        let mut done = task("T-2");
        done.status = Some(TaskStatus::Done);
        let fresh = task("T-3");

        let rows = [&started, &done, &fresh];
        let columns = board(&rows);

        assert_eq!(columns.len(), TaskStatus::ALL.len());
        assert_eq!(columns[0].status, TaskStatus::NotStarted);
        assert_eq!(columns[0].tasks.len(), 1);
        assert_eq!(columns[1].tasks[0].id, "T-1");
        assert_eq!(columns[2].tasks[0].id, "T-2");
        assert!(columns[3].tasks.is_empty());
    }

    #[test]
    fn timeline_orders_by_start_and_prefers_done_date() {
        let mut late = task("T-1");
        late.start_date = Some(date(2024, 3, 10));
        late.due_date = Some(date(2024, 3, 20));
        let mut early = task("T-2");
        early.start_date = Some(date(2024, 3, 1));
        early.due_date = Some(date(2024, 3, 15));
        early.done_date = Some(date(2024, 3, 12));
        let dateless = task("T-3");

        let rows = [&late, &early, &dateless];
        let entries = timeline(&rows);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].task.id, "T-2");
        assert_eq!(entries[0].end, Some(date(2024, 3, 12)));
        assert_eq!(entries[1].task.id, "T-1");
        assert_eq!(entries[1].end, Some(date(2024, 3, 20)));
    }

    #[test]
    fn evaluation_queue_puts_unevaluated_first() {
        let mut approved = task("T-1");
        approved.evaluation = Evaluation::Approved;
        let pending = task("T-2");
        let mut observed = task("T-3");
        observed.evaluation = Evaluation::Observed;
        let pending2 = task("T-4");

        let rows = [&approved, &pending, &observed, &pending2];
        let ordered = evaluation_queue(&rows);
        let ids: Vec<&str> = ordered.iter().map(|row| row.id.as_str()).collect();
        assert_eq!(ids, vec!["T-2", "T-4", "T-1", "T-3"]);
    }
}
