//! taskdeck task command implementations.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::access::Tab;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::record::{parse_date, Evaluation, TaskRecord, TaskStatus};
use crate::session::SaveReport;
use crate::table::TaskEdit;

pub struct ListOptions {
    pub status: Option<String>,
    pub user: Option<String>,
    pub root: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ShowOptions {
    pub id: String,
    pub user: Option<String>,
    pub root: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct AddOptions {
    pub title: String,
    pub assignee: Option<String>,
    pub area: Option<String>,
    pub phase: Option<String>,
    pub priority: Option<String>,
    pub start: Option<String>,
    pub due: Option<String>,
    pub user: Option<String>,
    pub root: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct EditOptions {
    pub id: String,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub start: Option<String>,
    pub due: Option<String>,
    pub done: Option<String>,
    pub user: Option<String>,
    pub root: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct CommentOptions {
    pub id: String,
    pub text: String,
    pub user: Option<String>,
    pub root: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct RateOptions {
    pub id: String,
    pub rating: i64,
    pub user: Option<String>,
    pub root: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct EvaluateOptions {
    pub id: String,
    pub verdict: String,
    pub rating: Option<i64>,
    pub compliance: Option<String>,
    pub user: Option<String>,
    pub root: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let session = super::open_session(options.root, options.user.as_deref())?;
    session.require_access(Tab::Editor, super::now())?;

    let filter = match options.status.as_deref() {
        Some(value) => Some(TaskStatus::parse(value).ok_or_else(|| {
            Error::InvalidArgument(format!("unknown status '{value}'"))
        })?),
        None => None,
    };

    let rows: Vec<&TaskRecord> = session
        .visible_rows()?
        .into_iter()
        .filter(|row| filter.map_or(true, |status| row.current_status() == status))
        .collect();

    let mut human = HumanOutput::new(format!(
        "taskdeck tasks: {} row(s) visible to {}",
        rows.len(),
        session.identity.email
    ));
    human.push_summary("user", session.identity.email.clone());
    if let Some(status) = filter {
        human.push_summary("status", status.label());
    }
    for row in &rows {
        human.push_detail(format_row(row));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task list",
        &rows,
        Some(&human),
    )
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let session = super::open_session(options.root, options.user.as_deref())?;
    session.require_access(Tab::Editor, super::now())?;

    let record = session
        .table
        .find(&options.id)
        .ok_or_else(|| Error::TaskNotFound(options.id.clone()))?;

    let visible = session.visible_rows()?;
    if !visible.iter().any(|row| row.id == record.id) {
        return Err(Error::RowOutOfScope {
            id: record.id.clone(),
        });
    }

    let mut human = HumanOutput::new(format!("taskdeck task {}", record.id));
    human.push_summary("title", record.title.clone());
    human.push_summary("status", record.current_status().label());
    human.push_summary("assignee", record.assignee.clone());
    if !record.priority.is_empty() {
        human.push_summary("priority", record.priority.clone());
    }
    human.push_summary("evaluation", record.evaluation.label());
    human.push_summary("rating", record.rating.to_string());
    if !record.comments.is_empty() {
        human.push_detail(record.comments.clone());
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task show",
        record,
        Some(&human),
    )
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let title = options.title.trim().to_string();
    if title.is_empty() {
        return Err(Error::InvalidArgument("task title cannot be empty".to_string()));
    }

    let mut session = super::open_session(options.root, options.user.as_deref())?;
    let remote = super::build_remote(&session.config);

    let mut record = TaskRecord::new(session.table.generate_id(), title);
    record.assignee = options
        .assignee
        .unwrap_or_else(|| session.identity.email.clone())
        .trim()
        .to_string();
    record.area = options.area.unwrap_or_default().trim().to_string();
    record.phase = options.phase.unwrap_or_default().trim().to_string();
    record.priority = options.priority.unwrap_or_default().trim().to_string();
    record.start_date = parse_date_arg(options.start.as_deref(), "start")?;
    record.due_date = parse_date_arg(options.due.as_deref(), "due")?;

    let id = record.id.clone();
    let report = session.create_and_save(Tab::Editor, super::now(), record, remote.as_deref())?;

    emit_save(
        &format!("taskdeck task: created {id}"),
        "task add",
        &report,
        options.json,
        options.quiet,
    )
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let mut edits: Vec<(String, TaskEdit)> = Vec::new();

    if let Some(value) = options.status.as_deref() {
        let status = if value.trim().is_empty() {
            None
        } else {
            Some(TaskStatus::parse(value).ok_or_else(|| {
                Error::InvalidArgument(format!("unknown status '{value}'"))
            })?)
        };
        edits.push((options.id.clone(), TaskEdit::Status(status)));
    }
    if let Some(priority) = options.priority {
        edits.push((options.id.clone(), TaskEdit::Priority(priority)));
    }
    if let Some(assignee) = options.assignee {
        edits.push((options.id.clone(), TaskEdit::Assignee(assignee)));
    }
    if let Some(value) = options.start.as_deref() {
        edits.push((
            options.id.clone(),
            TaskEdit::StartDate(parse_clearable_date(value, "start")?),
        ));
    }
    if let Some(value) = options.due.as_deref() {
        edits.push((
            options.id.clone(),
            TaskEdit::DueDate(parse_clearable_date(value, "due")?),
        ));
    }
    if let Some(value) = options.done.as_deref() {
        edits.push((
            options.id.clone(),
            TaskEdit::DoneDate(parse_clearable_date(value, "done")?),
        ));
    }

    if edits.is_empty() {
        return Err(Error::InvalidArgument(
            "no fields to edit; pass at least one of --status/--priority/--assignee/--start/--due/--done".to_string(),
        ));
    }

    let mut session = super::open_session(options.root, options.user.as_deref())?;
    let remote = super::build_remote(&session.config);
    let report = session.edit_and_save(Tab::Editor, super::now(), &edits, remote.as_deref())?;

    emit_save(
        &format!("taskdeck task: updated {}", options.id),
        "task edit",
        &report,
        options.json,
        options.quiet,
    )
}

pub fn run_comment(options: CommentOptions) -> Result<()> {
    let mut session = super::open_session(options.root, options.user.as_deref())?;
    let remote = super::build_remote(&session.config);
    let edits = vec![(options.id.clone(), TaskEdit::Comment(options.text))];
    let report = session.edit_and_save(Tab::Editor, super::now(), &edits, remote.as_deref())?;

    emit_save(
        &format!("taskdeck task: commented on {}", options.id),
        "task comment",
        &report,
        options.json,
        options.quiet,
    )
}

pub fn run_rate(options: RateOptions) -> Result<()> {
    let mut session = super::open_session(options.root, options.user.as_deref())?;
    let remote = super::build_remote(&session.config);
    let edits = vec![(options.id.clone(), TaskEdit::Rating(options.rating))];
    let report = session.edit_and_save(Tab::Editor, super::now(), &edits, remote.as_deref())?;

    emit_save(
        &format!("taskdeck task: rated {}", options.id),
        "task rate",
        &report,
        options.json,
        options.quiet,
    )
}

pub fn run_evaluate(options: EvaluateOptions) -> Result<()> {
    let verdict = parse_verdict(&options.verdict)?;

    let mut session = super::open_session(options.root, options.user.as_deref())?;
    let remote = super::build_remote(&session.config);
    let edits = vec![(
        options.id.clone(),
        TaskEdit::Evaluate {
            verdict,
            rating: options.rating,
            compliance: options.compliance,
        },
    )];
    let report = session.edit_and_save(Tab::Evaluation, super::now(), &edits, remote.as_deref())?;

    emit_save(
        &format!(
            "taskdeck task: {} marked {}",
            options.id,
            verdict.label()
        ),
        "task evaluate",
        &report,
        options.json,
        options.quiet,
    )
}

fn emit_save(
    header: &str,
    command: &str,
    report: &SaveReport,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let mut human = HumanOutput::new(header.to_string());
    human.push_summary("result", report.message.clone());
    for warning in &report.warnings {
        human.push_warning(warning.clone());
    }

    emit_success(OutputOptions { json, quiet }, command, report, Some(&human))
}

fn format_row(row: &TaskRecord) -> String {
    let mut line = format!(
        "{}  [{}]  {}",
        row.id,
        row.current_status().label(),
        row.title
    );
    if !row.assignee.is_empty() {
        line.push_str(&format!("  ({})", row.assignee));
    }
    if !row.priority.is_empty() {
        line.push_str(&format!("  prio={}", row.priority));
    }
    line
}

fn parse_date_arg(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>> {
    match value {
        None => Ok(None),
        Some(raw) => parse_date(raw)
            .map(Some)
            .ok_or_else(|| Error::InvalidArgument(format!("invalid {field} date '{raw}'"))),
    }
}

fn parse_clearable_date(value: &str, field: &str) -> Result<Option<NaiveDate>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse_date(value)
        .map(Some)
        .ok_or_else(|| Error::InvalidArgument(format!("invalid {field} date '{value}'")))
}

fn parse_verdict(value: &str) -> Result<Evaluation> {
    let trimmed = value.trim();
    Evaluation::ALL
        .into_iter()
        .find(|eval| {
            eval.token().eq_ignore_ascii_case(trimmed) || eval.label().eq_ignore_ascii_case(trimmed)
        })
        .ok_or_else(|| {
            Error::InvalidArgument(format!(
                "unknown verdict '{value}' (expected approved|rejected|observed|unevaluated)"
            ))
        })
}
