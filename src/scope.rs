//! Row and field scoping.
//!
//! Visibility narrows the table to the user's own rows unless the role is
//! a super-viewer; read-only column patterns block field edits. Both are
//! re-validated on the save path, not only when rendering, so a scoped
//! user cannot persist an edit the grid would have disabled.

use crate::error::{Error, Result};
use crate::record::TaskRecord;
use crate::roles::RoleRecord;
use crate::table::TaskEdit;

/// Rows the user may see, in table order.
pub fn visible_rows<'a>(
    rows: &'a [TaskRecord],
    role: &RoleRecord,
    email: &str,
) -> Vec<&'a TaskRecord> {
    if role.view_all {
        return rows.iter().collect();
    }
    rows.iter()
        .filter(|row| is_own_row(row, role, email))
        .collect()
}

/// Whether a row belongs to the user: the assignee cell matches their
/// display name or email, case-insensitive.
pub fn is_own_row(row: &TaskRecord, role: &RoleRecord, email: &str) -> bool {
    let assignee = row.assignee.trim();
    if assignee.is_empty() {
        return false;
    }
    assignee.eq_ignore_ascii_case(email.trim())
        || (!role.name.trim().is_empty() && assignee.eq_ignore_ascii_case(role.name.trim()))
}

/// Check one edit against the role's scope before it is applied.
///
/// Rejects edits to rows outside the user's visibility and edits that
/// touch a read-only column.
pub fn check_edit(row: &TaskRecord, edit: &TaskEdit, role: &RoleRecord, email: &str) -> Result<()> {
    if !role.view_all && !is_own_row(row, role, email) {
        return Err(Error::RowOutOfScope {
            id: row.id.clone(),
        });
    }

    for column in edit.columns() {
        if is_readonly_column(role, column)? {
            return Err(Error::ReadOnlyColumn {
                column: column.to_string(),
                user: email.to_string(),
            });
        }
    }

    Ok(())
}

/// Whether a column matches one of the role's read-only glob patterns.
pub fn is_readonly_column(role: &RoleRecord, column: &str) -> Result<bool> {
    for pattern in &role.readonly_columns {
        let matcher = glob::Pattern::new(pattern).map_err(|err| {
            Error::InvalidConfig(format!("invalid read-only pattern '{pattern}': {err}"))
        })?;
        if matcher.matches(column) {
            return Ok(true);
        }
    }
    Ok(false)
}
