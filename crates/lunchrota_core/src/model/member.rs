//! Group member record.
//!
//! # Invariants
//! - `member_id` is stable and unique within a group roster.
//! - `accumulated_cost` never goes negative; only ledger operations may
//!   change it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a person participating in a group.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type MemberId = Uuid;

/// One roster entry: identity, display name and running cost total.
///
/// Roster order is meaningful: rotation tie-breaks and burden statistics
/// resolve ties by first-encountered position, so `Member` values are always
/// carried in `Vec`s ordered by join position, never in unordered maps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Stable global ID used for assignment, auditing and ledger targeting.
    pub member_id: MemberId,
    /// Display name captured at join time.
    pub name: String,
    /// Running total of weighted difficulty points incurred so far.
    pub accumulated_cost: u32,
    /// Unix epoch milliseconds of roster admission.
    pub joined_at_epoch_ms: i64,
}

impl Member {
    /// Creates a fresh roster entry with zero accumulated cost.
    pub fn new(member_id: MemberId, name: impl Into<String>, joined_at_epoch_ms: i64) -> Self {
        Self {
            member_id,
            name: name.into(),
            accumulated_cost: 0,
            joined_at_epoch_ms,
        }
    }

    /// Lightweight identity+name reference for audit fields and results.
    pub fn to_ref(&self) -> MemberRef {
        MemberRef {
            member_id: self.member_id,
            name: self.name.clone(),
        }
    }
}

/// Identity plus captured display name.
///
/// Used wherever a member is referenced outside their owning roster: task
/// assignees, override audit trails, assignment results. The name is a
/// snapshot; later renames do not rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRef {
    pub member_id: MemberId,
    pub name: String,
}
