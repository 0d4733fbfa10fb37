//! Session state and the save pipeline.
//!
//! A `Session` is the explicit application state for one CLI invocation:
//! identity, the resolved role row, the task table, config, and storage.
//! Handlers receive it by reference; nothing is global. The table is
//! loaded wholesale from the mirror and replaced wholesale on save.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::access::{AccessDecision, AccessGate, Tab};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::identity::{self, Identity};
use crate::mirror;
use crate::record::TaskRecord;
use crate::remote::RemoteTable;
use crate::roles::{RoleRecord, RoleTable, SaveScope};
use crate::scope;
use crate::storage::Storage;
use crate::sync::{SyncReport, Synchronizer};
use crate::table::{TaskEdit, TaskTable};

/// Whether a save reached the stores.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    Persisted,
    /// Accepted but not persisted; both stores untouched.
    DryRun,
}

/// Structured outcome of a save attempt.
#[derive(Debug, Clone, Serialize)]
pub struct SaveReport {
    pub status: SaveStatus,
    pub task_ids: Vec<String>,
    pub mirror_written: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<SyncReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub message: String,
}

/// Per-invocation application state.
pub struct Session {
    pub config: Config,
    pub storage: Storage,
    pub identity: Identity,
    pub role: Option<RoleRecord>,
    pub table: TaskTable,
}

impl Session {
    /// Open a session: resolve identity, load the role table and the
    /// mirror. A missing mirror yields an empty schema-conformant table;
    /// an unknown email yields no role (every gate check then denies).
    pub fn open(storage: Storage, config: Config, cli_user: Option<&str>) -> Result<Session> {
        storage.ensure_initialized()?;

        let email = identity::resolve_email(&storage, cli_user, &config);
        let roles = RoleTable::load(&storage.roles_path())?;
        let role = roles.find(&email).cloned();
        let identity = Identity::resolve(&email, role.as_ref());

        // an unreadable mirror degrades to an empty schema-conformant
        // table; the session still opens
        let table = match mirror::read_table(&storage.mirror_path()) {
            Ok(table) => table,
            Err(err) => {
                tracing::warn!(error = %err, "mirror unreadable; starting from an empty table");
                TaskTable::new()
            }
        };

        tracing::debug!(
            user = %identity.email,
            tasks = table.len(),
            has_role = role.is_some(),
            "session opened"
        );

        Ok(Session {
            config,
            storage,
            identity,
            role,
            table,
        })
    }

    pub fn gate(&self) -> Result<AccessGate> {
        AccessGate::from_config(&self.config.hours)
    }

    /// Run the access gate for a tab. Returns the decision; callers that
    /// must halt use [`Session::require_access`].
    pub fn check_access(&self, tab: Tab, now: NaiveDateTime) -> Result<AccessDecision> {
        let gate = self.gate()?;
        Ok(gate.check(&self.identity.email, self.role.as_ref(), tab, now))
    }

    /// Run the access gate and convert a denial into a policy error.
    /// Returns whether the session is in dry-run mode.
    pub fn require_access(&self, tab: Tab, now: NaiveDateTime) -> Result<bool> {
        match self.check_access(tab, now)? {
            AccessDecision::Allowed { dry_run } => Ok(dry_run),
            AccessDecision::Denied { reason } => Err(Error::AccessDenied(reason)),
        }
    }

    /// The role row, or a policy error when the email has none.
    pub fn require_role(&self) -> Result<&RoleRecord> {
        self.role.as_ref().ok_or_else(|| {
            Error::AccessDenied(format!("no role entry for {}", self.identity.email))
        })
    }

    /// Rows visible to this user, in table order.
    pub fn visible_rows(&self) -> Result<Vec<&TaskRecord>> {
        let role = self.require_role()?;
        Ok(scope::visible_rows(
            self.table.rows(),
            role,
            &self.identity.email,
        ))
    }

    /// Apply edits through the gate and scoping, then persist.
    ///
    /// The pipeline: access gate for the tab -> save scope -> per-edit
    /// scoping re-check (row visibility, read-only columns) -> apply to
    /// the in-memory table -> dry-run short-circuit -> best-effort mirror
    /// rewrite and remote upsert. The two stores are independent: a
    /// failure in either becomes a warning and the other is still
    /// attempted. No transaction spans them.
    pub fn edit_and_save(
        &mut self,
        tab: Tab,
        now: NaiveDateTime,
        edits: &[(String, TaskEdit)],
        remote: Option<&dyn RemoteTable>,
    ) -> Result<SaveReport> {
        let dry_run = self.require_access(tab, now)?;
        let role = self.require_role()?.clone();

        if role.save_scope == SaveScope::None {
            return Err(Error::SaveDisabled(self.identity.email.clone()));
        }
        require_editable_tab(&role, tab)?;

        for (id, edit) in edits {
            let row = self
                .table
                .find(id)
                .ok_or_else(|| Error::TaskNotFound(id.clone()))?;
            scope::check_edit(row, edit, &role, &self.identity.email)?;
        }

        let mut batch = Vec::with_capacity(edits.len());
        for (id, edit) in edits {
            let updated = self.table.apply(id, edit)?;
            batch.push(updated);
        }

        self.persist(batch, dry_run, remote)
    }

    /// Insert a new task through the gate and scoping, then persist.
    ///
    /// A new row must be assigned to the creating user unless the role is
    /// a super-viewer.
    pub fn create_and_save(
        &mut self,
        tab: Tab,
        now: NaiveDateTime,
        record: TaskRecord,
        remote: Option<&dyn RemoteTable>,
    ) -> Result<SaveReport> {
        let dry_run = self.require_access(tab, now)?;
        let role = self.require_role()?.clone();

        if role.save_scope == SaveScope::None {
            return Err(Error::SaveDisabled(self.identity.email.clone()));
        }
        require_editable_tab(&role, tab)?;

        if !role.view_all && !scope::is_own_row(&record, &role, &self.identity.email) {
            return Err(Error::RowOutOfScope {
                id: record.id.clone(),
            });
        }

        self.table.insert(record.clone())?;
        self.persist(vec![record], dry_run, remote)
    }

    /// Persist the full table (used by an explicit sync push).
    pub fn save_all(
        &mut self,
        tab: Tab,
        now: NaiveDateTime,
        remote: Option<&dyn RemoteTable>,
    ) -> Result<SaveReport> {
        let dry_run = self.require_access(tab, now)?;
        let role = self.require_role()?;
        if role.save_scope == SaveScope::None {
            return Err(Error::SaveDisabled(self.identity.email.clone()));
        }
        let batch = self.table.rows().to_vec();
        self.persist(batch, dry_run, remote)
    }

    fn persist(
        &mut self,
        batch: Vec<TaskRecord>,
        dry_run: bool,
        remote: Option<&dyn RemoteTable>,
    ) -> Result<SaveReport> {
        let task_ids: Vec<String> = batch.iter().map(|row| row.id.clone()).collect();

        if dry_run {
            return Ok(SaveReport {
                status: SaveStatus::DryRun,
                task_ids,
                mirror_written: false,
                remote: None,
                warnings: Vec::new(),
                message: format!(
                    "accepted {} change(s) but not persisted (dry-run)",
                    batch.len()
                ),
            });
        }

        let mut warnings = Vec::new();

        let mirror_written = match mirror::write_table(&self.storage.mirror_path(), &self.table) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "mirror write failed");
                warnings.push(format!("local mirror not updated: {err}"));
                false
            }
        };

        let remote_report = match remote {
            Some(remote) => {
                let sync = Synchronizer::new(remote, self.config.remote.tasks_sheet.clone());
                match sync.push(&batch) {
                    Ok(report) => Some(report),
                    Err(err) => {
                        tracing::warn!(error = %err, "remote upsert failed");
                        warnings.push(format!("remote table not updated: {err}"));
                        None
                    }
                }
            }
            None => None,
        };

        let message = match (&remote_report, remote.is_some()) {
            (Some(report), _) => format!("saved {} change(s); {}", batch.len(), report.message),
            (None, true) => format!("saved {} change(s) to the local mirror only", batch.len()),
            (None, false) => format!(
                "saved {} change(s) to the local mirror (remote sync disabled)",
                batch.len()
            ),
        };

        Ok(SaveReport {
            status: SaveStatus::Persisted,
            task_ids,
            mirror_written,
            remote: remote_report,
            warnings,
            message,
        })
    }
}

/// Field edits land on the editor tab by default; any other tab needs the
/// role's edit-all grant.
fn require_editable_tab(role: &RoleRecord, tab: Tab) -> Result<()> {
    if tab != Tab::Editor && !role.edit_all {
        return Err(Error::AccessDenied(format!(
            "editing on tab '{}' requires the edit-all grant",
            tab.token()
        )));
    }
    Ok(())
}
