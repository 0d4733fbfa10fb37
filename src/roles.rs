//! The role table.
//!
//! One row per user, keyed by email, loaded once at session start from
//! `roles.csv` under the state directory (optionally refreshed from the
//! remote roles sub-table). The application never mutates roles; it only
//! reads them to drive the access gate and scoping.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::access::Tab;
use crate::error::Result;
use crate::mirror;
use crate::record::RawRow;

/// Role file column names, in file order.
pub const ROLE_COLUMNS: [&str; 11] = [
    "Email",
    "Name",
    "Active",
    "Tabs",
    "AfterHours",
    "Weekends",
    "ReadOnlyColumns",
    "SaveScope",
    "DryRun",
    "EditAll",
    "ViewAll",
];

/// Which tabs a role may open.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TabGrant {
    /// Every tab, current and future.
    All,
    /// Only the named tabs.
    Only(Vec<Tab>),
}

impl TabGrant {
    pub fn allows(&self, tab: Tab) -> bool {
        match self {
            TabGrant::All => true,
            TabGrant::Only(tabs) => tabs.contains(&tab),
        }
    }

    fn parse(value: &str) -> TabGrant {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") || trimmed == "*" {
            return TabGrant::All;
        }
        let mut tabs = Vec::new();
        for part in trimmed.split([',', ';']) {
            if let Some(tab) = Tab::parse(part) {
                if !tabs.contains(&tab) {
                    tabs.push(tab);
                }
            }
        }
        TabGrant::Only(tabs)
    }

    fn render(&self) -> String {
        match self {
            TabGrant::All => "ALL".to_string(),
            TabGrant::Only(tabs) => tabs
                .iter()
                .map(|tab| tab.token().to_string())
                .collect::<Vec<_>>()
                .join(";"),
        }
    }
}

/// Whether a role's saves are persisted at all.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SaveScope {
    All,
    None,
}

impl SaveScope {
    fn parse(value: &str) -> SaveScope {
        if value.trim().eq_ignore_ascii_case("none") {
            SaveScope::None
        } else {
            SaveScope::All
        }
    }

    fn render(&self) -> &'static str {
        match self {
            SaveScope::All => "all",
            SaveScope::None => "none",
        }
    }
}

/// One row of the role table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleRecord {
    /// Key; stored lowercased.
    pub email: String,
    pub name: String,
    pub active: bool,
    pub tabs: TabGrant,
    /// May use the dashboard outside the configured hours window.
    pub after_hours: bool,
    /// May use the dashboard on Saturday/Sunday.
    pub weekends: bool,
    /// Glob patterns over column names this role may not edit.
    pub readonly_columns: Vec<String>,
    pub save_scope: SaveScope,
    /// Edits are accepted but never persisted.
    pub dry_run: bool,
    /// Edit affordance on every tab, not only the editor.
    pub edit_all: bool,
    /// Super-viewer: sees all rows, not only own tasks.
    pub view_all: bool,
}

impl RoleRecord {
    /// Coerce a loose row. Returns None when the email cell is blank.
    pub fn from_raw(raw: &RawRow) -> Option<RoleRecord> {
        let email = cell(raw, "Email").to_lowercase();
        if email.is_empty() {
            return None;
        }
        Some(RoleRecord {
            email,
            name: cell(raw, "Name"),
            active: parse_bool(&cell(raw, "Active")),
            tabs: TabGrant::parse(&cell(raw, "Tabs")),
            after_hours: parse_bool(&cell(raw, "AfterHours")),
            weekends: parse_bool(&cell(raw, "Weekends")),
            readonly_columns: parse_list(&cell(raw, "ReadOnlyColumns")),
            save_scope: SaveScope::parse(&cell(raw, "SaveScope")),
            dry_run: parse_bool(&cell(raw, "DryRun")),
            edit_all: parse_bool(&cell(raw, "EditAll")),
            view_all: parse_bool(&cell(raw, "ViewAll")),
        })
    }

    pub fn to_raw(&self) -> RawRow {
        let mut raw = RawRow::new();
        raw.insert("Email".to_string(), self.email.clone());
        raw.insert("Name".to_string(), self.name.clone());
        raw.insert("Active".to_string(), render_bool(self.active));
        raw.insert("Tabs".to_string(), self.tabs.render());
        raw.insert("AfterHours".to_string(), render_bool(self.after_hours));
        raw.insert("Weekends".to_string(), render_bool(self.weekends));
        raw.insert(
            "ReadOnlyColumns".to_string(),
            self.readonly_columns.join(";"),
        );
        raw.insert("SaveScope".to_string(), self.save_scope.render().to_string());
        raw.insert("DryRun".to_string(), render_bool(self.dry_run));
        raw.insert("EditAll".to_string(), render_bool(self.edit_all));
        raw.insert("ViewAll".to_string(), render_bool(self.view_all));
        raw
    }
}

/// All roles, keyed by lowercased email.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoleTable {
    roles: BTreeMap<String, RoleRecord>,
}

impl RoleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_raw_rows(rows: &[RawRow]) -> Self {
        let mut table = RoleTable::new();
        for raw in rows {
            if let Some(role) = RoleRecord::from_raw(raw) {
                // first row wins on duplicate emails
                table.roles.entry(role.email.clone()).or_insert(role);
            }
        }
        table
    }

    /// Load the role table from the local roles file. Missing file yields
    /// an empty table (every lookup then fails closed).
    pub fn load(path: &Path) -> Result<RoleTable> {
        let rows = mirror::read_rows(path)?;
        Ok(RoleTable::from_raw_rows(&rows))
    }

    /// Rewrite the local roles file wholesale.
    pub fn store(&self, path: &Path) -> Result<()> {
        let rows: Vec<RawRow> = self.roles.values().map(RoleRecord::to_raw).collect();
        mirror::write_rows(path, &ROLE_COLUMNS, &rows)
    }

    pub fn find(&self, email: &str) -> Option<&RoleRecord> {
        self.roles.get(&email.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

fn cell(raw: &RawRow, column: &str) -> String {
    raw.get(column).map(|v| v.trim().to_string()).unwrap_or_default()
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "yes" | "y" | "true" | "1" | "x"
    )
}

fn render_bool(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split([',', ';'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
