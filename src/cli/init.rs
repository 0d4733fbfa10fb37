//! taskdeck init command implementation
//!
//! Creates the initial config, the state directory, a schema-only task
//! mirror, and an empty role table.

use std::path::PathBuf;

use crate::config::Config;
use crate::error::Result;
use crate::mirror;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::roles::ROLE_COLUMNS;
use crate::storage::Storage;

#[derive(serde::Serialize)]
struct InitReport {
    root: PathBuf,
    created: InitCreated,
}

#[derive(serde::Serialize)]
struct InitCreated {
    config: bool,
    state_dir: bool,
    mirror: bool,
    roles: bool,
}

pub fn run(root: Option<PathBuf>, json: bool, quiet: bool) -> Result<()> {
    let root = super::resolve_root(root)?;

    let config_path = Storage::config_path(&root);
    let created_config = if config_path.exists() {
        false
    } else {
        Config::default().save(&config_path)?;
        true
    };

    let config = Config::load_from_root(&root);
    let storage = Storage::new(root.clone(), &config.mirror);
    let (created_dir, created_mirror) = storage.init()?;

    let roles_path = storage.roles_path();
    let created_roles = if roles_path.exists() {
        false
    } else {
        mirror::write_rows(&roles_path, &ROLE_COLUMNS, &[])?;
        true
    };

    let report = InitReport {
        root: root.clone(),
        created: InitCreated {
            config: created_config,
            state_dir: created_dir,
            mirror: created_mirror,
            roles: created_roles,
        },
    };

    let mut created_items = Vec::new();
    if created_config {
        created_items.push(".taskdeck.toml");
    }
    if created_dir {
        created_items.push(".taskdeck/");
    }
    if created_mirror {
        created_items.push("task mirror");
    }
    if created_roles {
        created_items.push("role table");
    }

    let header = if created_items.is_empty() {
        "taskdeck init: nothing to do".to_string()
    } else {
        "taskdeck init: initialized".to_string()
    };

    let mut human = HumanOutput::new(header);
    human.push_summary("root", root.display().to_string());
    human.push_summary(
        "created",
        if created_items.is_empty() {
            "none".to_string()
        } else {
            created_items.join(", ")
        },
    );
    human.push_next_step("taskdeck user set <email>");
    human.push_next_step("add role rows to .taskdeck/roles.csv (or: taskdeck sync roles)");

    emit_success(OutputOptions { json, quiet }, "init", &report, Some(&human))?;

    Ok(())
}
