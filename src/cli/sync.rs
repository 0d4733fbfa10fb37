//! taskdeck sync command implementations.

use std::path::PathBuf;

use crate::access::Tab;
use crate::error::{Error, Result};
use crate::mirror;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::remote::RemoteTable;
use crate::roles::RoleTable;
use crate::sync::Synchronizer;

pub struct PushOptions {
    pub user: Option<String>,
    pub root: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct PullOptions {
    pub user: Option<String>,
    pub root: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct RolesOptions {
    pub root: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

fn require_remote(config: &crate::config::Config) -> Result<Box<dyn RemoteTable>> {
    super::build_remote(config).ok_or_else(|| {
        Error::InvalidConfig("remote.url is not configured in .taskdeck.toml".to_string())
    })
}

pub fn run_push(options: PushOptions) -> Result<()> {
    let mut session = super::open_session(options.root, options.user.as_deref())?;
    let remote = require_remote(&session.config)?;

    let report = session.save_all(Tab::Editor, super::now(), Some(remote.as_ref()))?;

    let mut human = HumanOutput::new("taskdeck sync: pushed local table".to_string());
    human.push_summary("result", report.message.clone());
    for warning in &report.warnings {
        human.push_warning(warning.clone());
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "sync push",
        &report,
        Some(&human),
    )
}

pub fn run_pull(options: PullOptions) -> Result<()> {
    let mut session = super::open_session(options.root, options.user.as_deref())?;
    let remote = require_remote(&session.config)?;
    let dry_run = session.require_access(Tab::Editor, super::now())?;

    let sync = Synchronizer::new(remote.as_ref(), session.config.remote.tasks_sheet.clone());
    let table = sync.pull()?;
    let fetched = table.len();

    let mut human = HumanOutput::new("taskdeck sync: pulled remote table".to_string());
    human.push_summary("rows", fetched.to_string());

    let persisted = if dry_run {
        human.push_warning("dry-run mode: local mirror left untouched".to_string());
        false
    } else {
        mirror::write_table(&session.storage.mirror_path(), &table)?;
        session.table = table;
        true
    };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "sync pull",
        &serde_json::json!({ "rows": fetched, "persisted": persisted }),
        Some(&human),
    )
}

/// Refresh the local role table from the remote roles sub-table.
///
/// Deliberately ungated: the role table is the policy source itself, and a
/// first pull must work before any role row exists locally.
pub fn run_roles(options: RolesOptions) -> Result<()> {
    let (config, storage) = super::load_env(options.root)?;
    storage.ensure_initialized()?;
    let remote = require_remote(&config)?;

    let rows = remote.fetch(&config.remote.roles_sheet)?;
    let roles = RoleTable::from_raw_rows(&rows);
    roles.store(&storage.roles_path())?;

    let mut human = HumanOutput::new("taskdeck sync: refreshed role table".to_string());
    human.push_summary("roles", roles.len().to_string());
    human.push_summary("file", storage.roles_path().display().to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "sync roles",
        &serde_json::json!({ "roles": roles.len() }),
        Some(&human),
    )
}
