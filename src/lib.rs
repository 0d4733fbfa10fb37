//! taskdeck - Shared Task Dashboard Library
//!
//! This library provides the core functionality for the taskdeck CLI:
//! the data, access-control, and synchronization layers of a shared
//! task dashboard.
//!
//! # Core Concepts
//!
//! - **Task table**: the explicit per-session state, loaded and replaced
//!   wholesale, never diffed incrementally
//! - **Roles**: a static per-user policy table driving tab visibility,
//!   row scoping, read-only columns, hours gating, and dry-run
//! - **Upsert sync**: read-merge-overwrite against a remote table keyed
//!   by task id, last writer wins
//! - **Local mirror**: a CSV fallback rewritten on every accepted save,
//!   independent of the remote outcome
//!
//! # Module Organization
//!
//! - `cli`: command-line interface using clap
//! - `config`: configuration loading from `.taskdeck.toml`
//! - `error`: error types and result aliases
//! - `record`: task records and their closed enums
//! - `table`: the task table and field edits
//! - `roles`: the role table
//! - `access`: the tab/hours access gate
//! - `scope`: row visibility and read-only column enforcement
//! - `mirror`: CSV mirror read/write
//! - `remote`: remote table client (HTTP + in-memory)
//! - `sync`: upsert-by-identifier synchronizer
//! - `session`: session state and the save pipeline
//! - `views`: board/timeline/evaluation projections
//! - `identity`: user identity resolution
//! - `storage`: state directory management
//! - `lock`: file locking and atomic writes

pub mod access;
pub mod cli;
pub mod config;
pub mod error;
pub mod identity;
pub mod lock;
pub mod mirror;
pub mod output;
pub mod record;
pub mod remote;
pub mod roles;
pub mod scope;
pub mod session;
pub mod storage;
pub mod sync;
pub mod table;
pub mod views;

pub use error::{Error, Result};
