//! Journal entry state machine.
//!
//! ```text
//! DRAFT --post--> POSTED --reverse--> REVERSED
//!   |
//!   +--update / delete (stays DRAFT or disappears)
//! ```

use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::types::JournalStatus;

/// An operation on an existing journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalAction {
    /// Replace header and lines.
    Update,
    /// Remove the entry.
    Delete,
    /// Make it count toward balances.
    Post,
    /// Cancel with a reversing entry.
    Reverse,
}

impl JournalAction {
    /// Verb used in messages.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Post => "post",
            Self::Reverse => "reverse",
        }
    }

    /// The status an entry must be in for this action.
    #[must_use]
    pub const fn required_status(self) -> JournalStatus {
        match self {
            Self::Update | Self::Delete | Self::Post => JournalStatus::Draft,
            Self::Reverse => JournalStatus::Posted,
        }
    }
}

/// Checks that `action` is allowed on an entry currently in `status`.
///
/// # Errors
///
/// `InvalidTransition` when the status does not match.
pub fn ensure_allowed(action: JournalAction, status: JournalStatus) -> Result<(), LedgerError> {
    if status == action.required_status() {
        Ok(())
    } else {
        Err(LedgerError::InvalidTransition {
            action: action.verb(),
            status,
        })
    }
}

/// Interprets the affected-row count of a guarded status update
/// (`UPDATE ... WHERE id = $1 AND status = $expected`).
///
/// # Errors
///
/// `ConcurrentModification` when no row matched.
pub fn check_guarded_update(rows_affected: u64) -> Result<(), LedgerError> {
    if rows_affected == 0 {
        Err(LedgerError::ConcurrentModification)
    } else {
        Ok(())
    }
}
