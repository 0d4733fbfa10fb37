//! Upsert-by-identifier synchronization against the remote table.
//!
//! The merge is a pure function: remote rows matching a changed id are
//! replaced in place, unmatched remote rows are preserved in order, and
//! new ids are appended in batch order. The push cycle is read-merge-
//! overwrite: last writer wins, and a failure during the overwrite leaves
//! the remote either unchanged or fully rewritten, never partially
//! applied. The operation is not resumable or retried.

use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::record::TaskRecord;
use crate::remote::RemoteTable;
use crate::table::TaskTable;

/// Merge a batch of changed rows into the remote row set by id.
pub fn merge_by_id(remote: Vec<TaskRecord>, batch: &[TaskRecord]) -> Vec<TaskRecord> {
    let mut merged = Vec::with_capacity(remote.len() + batch.len());
    let mut consumed: Vec<&str> = Vec::new();

    for row in remote {
        match batch.iter().rev().find(|changed| changed.id == row.id) {
            Some(changed) => {
                consumed.push(changed.id.as_str());
                merged.push(changed.clone());
            }
            None => merged.push(row),
        }
    }

    for changed in batch {
        if !consumed.contains(&changed.id.as_str())
            && !merged.iter().any(|row| row.id == changed.id)
        {
            merged.push(changed.clone());
        }
    }

    merged
}

/// Result of one push cycle.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub op_id: String,
    pub sheet: String,
    pub fetched: usize,
    pub replaced: usize,
    pub appended: usize,
    pub total: usize,
    pub message: String,
}

/// Drives the read-merge-overwrite cycle for one sub-table.
pub struct Synchronizer<'a> {
    remote: &'a dyn RemoteTable,
    sheet: String,
}

impl<'a> Synchronizer<'a> {
    pub fn new(remote: &'a dyn RemoteTable, sheet: impl Into<String>) -> Self {
        Self {
            remote,
            sheet: sheet.into(),
        }
    }

    /// Upsert a batch of changed rows into the remote sub-table.
    pub fn push(&self, batch: &[TaskRecord]) -> Result<SyncReport> {
        let raw = self.remote.fetch(&self.sheet)?;
        let fetched = TaskTable::from_raw_rows(&raw);
        let fetched_count = fetched.len();

        let merged = merge_by_id(fetched.into_rows(), batch);
        let appended = merged.len().saturating_sub(fetched_count);
        let replaced = batch.len().saturating_sub(appended);

        let merged_table = {
            let mut table = TaskTable::new();
            table.replace_all(merged);
            table
        };
        self.remote.replace(&self.sheet, &merged_table.to_raw_rows())?;

        let total = merged_table.len();
        tracing::debug!(
            sheet = %self.sheet,
            fetched = fetched_count,
            replaced,
            appended,
            "remote table replaced"
        );

        Ok(SyncReport {
            op_id: Uuid::new_v4().to_string(),
            sheet: self.sheet.clone(),
            fetched: fetched_count,
            replaced,
            appended,
            total,
            message: format!(
                "upserted {} row(s) into '{}' ({replaced} replaced, {appended} appended)",
                batch.len(),
                self.sheet
            ),
        })
    }

    /// Fetch the remote sub-table as a coerced task table.
    pub fn pull(&self) -> Result<TaskTable> {
        let raw = self.remote.fetch(&self.sheet)?;
        Ok(TaskTable::from_raw_rows(&raw))
    }
}
