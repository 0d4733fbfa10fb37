//! taskdeck roles command implementations.

use std::path::PathBuf;

use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::roles::TabGrant;

pub struct ShowOptions {
    pub user: Option<String>,
    pub root: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let session = super::open_session(options.root, options.user.as_deref())?;
    let role = session.require_role()?;

    let mut human = HumanOutput::new(format!("taskdeck role: {}", role.email));
    human.push_summary("name", role.name.clone());
    human.push_summary("active", if role.active { "yes" } else { "no" });
    human.push_summary(
        "tabs",
        match &role.tabs {
            TabGrant::All => "all".to_string(),
            TabGrant::Only(tabs) => tabs
                .iter()
                .map(|tab| tab.token())
                .collect::<Vec<_>>()
                .join(", "),
        },
    );
    human.push_summary("after hours", if role.after_hours { "yes" } else { "no" });
    human.push_summary("weekends", if role.weekends { "yes" } else { "no" });
    human.push_summary("edit all tabs", if role.edit_all { "yes" } else { "no" });
    if !role.readonly_columns.is_empty() {
        human.push_summary("read-only columns", role.readonly_columns.join(", "));
    }
    human.push_summary(
        "save scope",
        match role.save_scope {
            crate::roles::SaveScope::All => "all",
            crate::roles::SaveScope::None => "none",
        },
    );
    if role.dry_run {
        human.push_warning("dry-run mode: edits will be accepted but not persisted");
    }
    if role.view_all {
        human.push_detail("super-viewer: sees every row".to_string());
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "roles show",
        role,
        Some(&human),
    )
}
