//! Command-line interface for taskdeck
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::remote::{HttpRemote, RemoteTable};
use crate::session::Session;
use crate::storage::Storage;

mod access;
mod init;
mod roles;
mod sync;
mod task;
mod user;
mod view;

/// taskdeck - shared task dashboard
///
/// A CLI for a role-gated task table: scoped viewing, field-level edit
/// restrictions, a local CSV mirror, and upsert sync against a remote
/// spreadsheet-style table.
#[derive(Parser, Debug)]
#[command(name = "taskdeck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the project root (defaults to current directory)
    #[arg(long, global = true, env = "TASKDECK_ROOT")]
    pub root: Option<PathBuf>,

    /// Acting user email (overrides environment and persisted identity)
    #[arg(long, global = true, env = "TASKDECK_USER")]
    pub user: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize taskdeck in a directory
    Init,

    /// Set or show the acting user
    #[command(subcommand)]
    User(UserCommands),

    /// Task table operations (editor tab)
    #[command(subcommand)]
    Task(TaskCommands),

    /// Data-level views (board, timeline, evaluation tabs)
    #[command(subcommand)]
    View(ViewCommands),

    /// Explain the access gate decision for a tab
    #[command(subcommand)]
    Access(AccessCommands),

    /// Role table queries
    #[command(subcommand)]
    Roles(RolesCommands),

    /// Synchronize with the remote table
    #[command(subcommand)]
    Sync(SyncCommands),
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Persist the acting user for this checkout
    Set {
        /// User email
        email: String,
    },

    /// Show the resolved identity and role
    Show,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// List visible tasks
    List {
        /// Filter by status (token or label, e.g. "in_progress")
        #[arg(long)]
        status: Option<String>,
    },

    /// Show one task
    Show {
        /// Task id
        id: String,
    },

    /// Create a task assigned to the acting user
    Add {
        /// Task text
        title: String,

        /// Assignee (defaults to the acting user)
        #[arg(long)]
        assignee: Option<String>,

        /// Area
        #[arg(long)]
        area: Option<String>,

        /// Phase
        #[arg(long)]
        phase: Option<String>,

        /// Priority
        #[arg(long)]
        priority: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },

    /// Edit fields of a task
    Edit {
        /// Task id
        id: String,

        /// New status (token or label; empty string clears)
        #[arg(long)]
        status: Option<String>,

        /// New priority
        #[arg(long)]
        priority: Option<String>,

        /// New assignee
        #[arg(long)]
        assignee: Option<String>,

        /// Start date (YYYY-MM-DD; empty string clears)
        #[arg(long)]
        start: Option<String>,

        /// Due date (YYYY-MM-DD; empty string clears)
        #[arg(long)]
        due: Option<String>,

        /// Completion date (YYYY-MM-DD; empty string clears)
        #[arg(long)]
        done: Option<String>,
    },

    /// Set the free-text comment of a task
    Comment {
        /// Task id
        id: String,

        /// Comment text
        text: String,
    },

    /// Rate a task (0-5, clamped)
    Rate {
        /// Task id
        id: String,

        /// Rating
        rating: i64,
    },

    /// Record an evaluation verdict (evaluation tab)
    Evaluate {
        /// Task id
        id: String,

        /// Verdict: approved, rejected, observed, unevaluated
        #[arg(long)]
        verdict: String,

        /// Rating (0-5, clamped)
        #[arg(long)]
        rating: Option<i64>,

        /// Compliance note
        #[arg(long)]
        compliance: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ViewCommands {
    /// Kanban columns by status
    Board,

    /// Tasks with start dates, ordered by start
    Timeline,

    /// Evaluation queue, unevaluated first
    Evaluation,
}

#[derive(Subcommand, Debug)]
pub enum AccessCommands {
    /// Evaluate the gate for a tab without opening it
    Check {
        /// Tab: editor, board, timeline, evaluation
        tab: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum RolesCommands {
    /// Show the acting user's role row
    Show,
}

#[derive(Subcommand, Debug)]
pub enum SyncCommands {
    /// Upsert the full local table into the remote table
    Push,

    /// Replace the local mirror with the remote table
    Pull,

    /// Refresh the local role table from the remote roles sub-table
    Roles,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => init::run(self.root, self.json, self.quiet),
            Commands::User(cmd) => match cmd {
                UserCommands::Set { email } => user::run_set(user::SetOptions {
                    email,
                    root: self.root,
                    json: self.json,
                    quiet: self.quiet,
                }),
                UserCommands::Show => user::run_show(user::ShowOptions {
                    user: self.user,
                    root: self.root,
                    json: self.json,
                    quiet: self.quiet,
                }),
            },
            Commands::Task(cmd) => match cmd {
                TaskCommands::List { status } => task::run_list(task::ListOptions {
                    status,
                    user: self.user,
                    root: self.root,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Show { id } => task::run_show(task::ShowOptions {
                    id,
                    user: self.user,
                    root: self.root,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Add {
                    title,
                    assignee,
                    area,
                    phase,
                    priority,
                    start,
                    due,
                } => task::run_add(task::AddOptions {
                    title,
                    assignee,
                    area,
                    phase,
                    priority,
                    start,
                    due,
                    user: self.user,
                    root: self.root,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Edit {
                    id,
                    status,
                    priority,
                    assignee,
                    start,
                    due,
                    done,
                } => task::run_edit(task::EditOptions {
                    id,
                    status,
                    priority,
                    assignee,
                    start,
                    due,
                    done,
                    user: self.user,
                    root: self.root,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Comment { id, text } => task::run_comment(task::CommentOptions {
                    id,
                    text,
                    user: self.user,
                    root: self.root,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Rate { id, rating } => task::run_rate(task::RateOptions {
                    id,
                    rating,
                    user: self.user,
                    root: self.root,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Evaluate {
                    id,
                    verdict,
                    rating,
                    compliance,
                } => task::run_evaluate(task::EvaluateOptions {
                    id,
                    verdict,
                    rating,
                    compliance,
                    user: self.user,
                    root: self.root,
                    json: self.json,
                    quiet: self.quiet,
                }),
            },
            Commands::View(cmd) => {
                let options = view::ViewOptions {
                    user: self.user,
                    root: self.root,
                    json: self.json,
                    quiet: self.quiet,
                };
                match cmd {
                    ViewCommands::Board => view::run_board(options),
                    ViewCommands::Timeline => view::run_timeline(options),
                    ViewCommands::Evaluation => view::run_evaluation(options),
                }
            }
            Commands::Access(cmd) => match cmd {
                AccessCommands::Check { tab } => access::run_check(access::CheckOptions {
                    tab,
                    user: self.user,
                    root: self.root,
                    json: self.json,
                    quiet: self.quiet,
                }),
            },
            Commands::Roles(cmd) => match cmd {
                RolesCommands::Show => roles::run_show(roles::ShowOptions {
                    user: self.user,
                    root: self.root,
                    json: self.json,
                    quiet: self.quiet,
                }),
            },
            Commands::Sync(cmd) => match cmd {
                SyncCommands::Push => sync::run_push(sync::PushOptions {
                    user: self.user,
                    root: self.root,
                    json: self.json,
                    quiet: self.quiet,
                }),
                SyncCommands::Pull => sync::run_pull(sync::PullOptions {
                    user: self.user,
                    root: self.root,
                    json: self.json,
                    quiet: self.quiet,
                }),
                SyncCommands::Roles => sync::run_roles(sync::RolesOptions {
                    root: self.root,
                    json: self.json,
                    quiet: self.quiet,
                }),
            },
        }
    }
}

/// Resolve the project root from the flag or the current directory.
pub(crate) fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf> {
    match root {
        Some(path) => Ok(path),
        None => Ok(std::env::current_dir()?),
    }
}

/// Load config and storage for a project root.
pub(crate) fn load_env(root: Option<PathBuf>) -> Result<(Config, Storage)> {
    let root = resolve_root(root)?;
    let config = Config::load_from_root(&root);
    let storage = Storage::new(root, &config.mirror);
    Ok((config, storage))
}

/// Open a session for the acting user.
pub(crate) fn open_session(root: Option<PathBuf>, user: Option<&str>) -> Result<Session> {
    let (config, storage) = load_env(root)?;
    Session::open(storage, config, user)
}

/// Build the remote client when a URL is configured.
pub(crate) fn build_remote(config: &Config) -> Option<Box<dyn RemoteTable>> {
    if config.remote.enabled() {
        Some(Box::new(HttpRemote::new(&config.remote)))
    } else {
        None
    }
}

/// The gate evaluation instant: local wall-clock time.
pub(crate) fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
