//! taskdeck view command implementations.
//!
//! Each view runs the access gate for its tab, scopes the rows, and emits
//! a data projection; rendering stays in the terminal.

use std::path::PathBuf;

use crate::access::Tab;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::views;

pub struct ViewOptions {
    pub user: Option<String>,
    pub root: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub fn run_board(options: ViewOptions) -> Result<()> {
    let session = super::open_session(options.root, options.user.as_deref())?;
    session.require_access(Tab::Board, super::now())?;

    let rows = session.visible_rows()?;
    let columns = views::board(&rows);

    let mut human = HumanOutput::new(format!(
        "taskdeck board: {} task(s) across {} column(s)",
        rows.len(),
        columns.len()
    ));
    for column in &columns {
        human.push_summary(
            column.status.label(),
            column.tasks.len().to_string(),
        );
        for task in &column.tasks {
            human.push_detail(format!("[{}] {}  {}", column.status.label(), task.id, task.title));
        }
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "view board",
        &columns,
        Some(&human),
    )
}

pub fn run_timeline(options: ViewOptions) -> Result<()> {
    let session = super::open_session(options.root, options.user.as_deref())?;
    session.require_access(Tab::Timeline, super::now())?;

    let rows = session.visible_rows()?;
    let entries = views::timeline(&rows);

    let mut human = HumanOutput::new(format!(
        "taskdeck timeline: {} dated task(s)",
        entries.len()
    ));
    for entry in &entries {
        let span = match entry.end {
            Some(end) => format!("{} -> {}", entry.start, end),
            None => format!("{} ->", entry.start),
        };
        human.push_detail(format!("{}  {}  {}", entry.task.id, span, entry.task.title));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "view timeline",
        &entries,
        Some(&human),
    )
}

pub fn run_evaluation(options: ViewOptions) -> Result<()> {
    let session = super::open_session(options.root, options.user.as_deref())?;
    session.require_access(Tab::Evaluation, super::now())?;

    let rows = session.visible_rows()?;
    let queue = views::evaluation_queue(&rows);
    let pending = queue
        .iter()
        .filter(|row| row.evaluation == crate::record::Evaluation::Unevaluated)
        .count();

    let mut human = HumanOutput::new(format!(
        "taskdeck evaluation: {pending} task(s) awaiting a verdict"
    ));
    for task in &queue {
        human.push_detail(format!(
            "{}  [{}]  {}  rating={}",
            task.id,
            task.evaluation.label(),
            task.title,
            task.rating
        ));
    }
    if pending > 0 {
        human.push_next_step("taskdeck task evaluate <id> --verdict approved");
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "view evaluation",
        &queue,
        Some(&human),
    )
}
