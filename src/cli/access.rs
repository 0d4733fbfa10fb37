//! taskdeck access command implementations.

use std::path::PathBuf;

use crate::access::{AccessDecision, Tab};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};

pub struct CheckOptions {
    pub tab: String,
    pub user: Option<String>,
    pub root: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

/// Report the gate decision without opening the tab. The command itself
/// succeeds either way; the decision is the payload.
pub fn run_check(options: CheckOptions) -> Result<()> {
    let tab = Tab::parse(&options.tab).ok_or_else(|| Error::UnknownTab(options.tab.clone()))?;

    let session = super::open_session(options.root, options.user.as_deref())?;
    let decision = session.check_access(tab, super::now())?;

    let mut human = match &decision {
        AccessDecision::Allowed { dry_run } => {
            let mut human = HumanOutput::new(format!(
                "taskdeck access: {} may open '{}'",
                session.identity.email,
                tab.token()
            ));
            if *dry_run {
                human.push_warning("dry-run mode: edits will be accepted but not persisted");
            }
            human
        }
        AccessDecision::Denied { reason } => {
            let mut human = HumanOutput::new(format!(
                "taskdeck access: '{}' is blocked",
                tab.token()
            ));
            human.push_summary("reason", reason.clone());
            human
        }
    };
    human.push_summary("user", session.identity.email.clone());
    human.push_summary("tab", tab.token());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "access check",
        &decision,
        Some(&human),
    )
}
