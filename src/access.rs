//! The role/access gate.
//!
//! Given a user's role row, a requested tab, and the current local time,
//! decides whether rendering may proceed and whether persistence is
//! suppressed (dry-run). Denials carry a human-readable reason; callers
//! halt on denial, there is no retry or escalation path.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::config::HoursConfig;
use crate::error::Result;
use crate::roles::RoleRecord;

/// The dashboard views, as access-control surfaces.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    Editor,
    Board,
    Timeline,
    Evaluation,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Editor, Tab::Board, Tab::Timeline, Tab::Evaluation];

    pub fn token(&self) -> &'static str {
        match self {
            Tab::Editor => "editor",
            Tab::Board => "board",
            Tab::Timeline => "timeline",
            Tab::Evaluation => "evaluation",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Editor => "Editor",
            Tab::Board => "Board",
            Tab::Timeline => "Timeline",
            Tab::Evaluation => "Evaluation",
        }
    }

    pub fn parse(value: &str) -> Option<Tab> {
        let trimmed = value.trim();
        Tab::ALL
            .into_iter()
            .find(|tab| tab.token().eq_ignore_ascii_case(trimmed))
    }
}

/// Outcome of a gate check.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum AccessDecision {
    Allowed { dry_run: bool },
    Denied { reason: String },
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed { .. })
    }

    pub fn deny_reason(&self) -> Option<&str> {
        match self {
            AccessDecision::Allowed { .. } => None,
            AccessDecision::Denied { reason } => Some(reason),
        }
    }
}

/// The access gate, parameterized by the configured hours window.
#[derive(Debug, Clone)]
pub struct AccessGate {
    open: NaiveTime,
    close: NaiveTime,
}

impl AccessGate {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Self {
        Self { open, close }
    }

    pub fn from_config(hours: &HoursConfig) -> Result<Self> {
        Ok(Self::new(hours.open_time()?, hours.close_time()?))
    }

    /// Evaluate the gate for one user, tab, and instant.
    ///
    /// `now` is passed in rather than read from the clock so callers (and
    /// tests) control the evaluation instant.
    pub fn check(
        &self,
        email: &str,
        role: Option<&RoleRecord>,
        tab: Tab,
        now: NaiveDateTime,
    ) -> AccessDecision {
        let Some(role) = role else {
            return AccessDecision::Denied {
                reason: format!("no role entry for {email}"),
            };
        };

        if !role.active {
            return AccessDecision::Denied {
                reason: format!("user {email} is inactive"),
            };
        }

        let weekday = now.weekday();
        if matches!(weekday, Weekday::Sat | Weekday::Sun) && !role.weekends {
            return AccessDecision::Denied {
                reason: format!("weekend access is not enabled for {email}"),
            };
        }

        let time = now.time();
        if (time < self.open || time >= self.close) && !role.after_hours {
            return AccessDecision::Denied {
                reason: format!(
                    "outside allowed hours ({}-{}) for {email}",
                    self.open.format("%H:%M"),
                    self.close.format("%H:%M")
                ),
            };
        }

        if !role.tabs.allows(tab) {
            return AccessDecision::Denied {
                reason: format!("tab '{}' is not permitted for {email}", tab.token()),
            };
        }

        AccessDecision::Allowed {
            dry_run: role.dry_run,
        }
    }
}
