//! taskdeck user command implementations.

use std::path::PathBuf;

use crate::error::Result;
use crate::identity::{self, Identity};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::roles::RoleTable;

pub struct SetOptions {
    pub email: String,
    pub root: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ShowOptions {
    pub user: Option<String>,
    pub root: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct UserReport {
    identity: Identity,
    has_role: bool,
    active: bool,
}

pub fn run_set(options: SetOptions) -> Result<()> {
    let (_, storage) = super::load_env(options.root)?;
    storage.ensure_initialized()?;
    storage.write_user(&options.email)?;

    let email = options.email.trim().to_lowercase();
    let mut human = HumanOutput::new(format!("taskdeck user: now acting as {email}"));
    human.push_summary("user", email.clone());
    human.push_next_step("taskdeck task list");

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "user set",
        &serde_json::json!({ "user": email }),
        Some(&human),
    )
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let (config, storage) = super::load_env(options.root)?;
    storage.ensure_initialized()?;

    let email = identity::resolve_email(&storage, options.user.as_deref(), &config);
    let roles = RoleTable::load(&storage.roles_path())?;
    let role = roles.find(&email);
    let identity = Identity::resolve(&email, role);

    let report = UserReport {
        identity: identity.clone(),
        has_role: role.is_some(),
        active: role.map(|r| r.active).unwrap_or(false),
    };

    let mut human = HumanOutput::new(format!("taskdeck user: {}", identity.email));
    human.push_summary("name", identity.name.clone());
    human.push_summary(
        "role",
        if report.has_role {
            if report.active { "active" } else { "inactive" }.to_string()
        } else {
            "none".to_string()
        },
    );
    if !report.has_role {
        human.push_warning(format!("no role entry for {}", identity.email));
        human.push_next_step("ask an administrator to add a role row");
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "user show",
        &report,
        Some(&human),
    )
}
