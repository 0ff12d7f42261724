//! Ledger primitives: the only legal writers of accumulated cost.
//!
//! # Responsibility
//! - Credit, debit and reset per-member accumulated cost.
//!
//! # Invariants
//! - Accumulated cost never goes below zero: a debit past the floor is
//!   clamped and reported as a data-integrity warning, not a failure.
//! - Callers run these inside the same transaction as the task-instance
//!   insert/delete they compensate, so ledger and history never diverge.

use crate::model::group::GroupId;
use crate::model::member::MemberId;
use crate::repo::{RepoError, RepoResult};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};

/// Result of a debit, carrying the clamp warning when the requested amount
/// exceeded the member's current total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebitOutcome {
    /// Amount actually subtracted.
    pub applied: u32,
    /// True when the debit was clamped at the zero floor.
    pub clamped: bool,
}

/// Adds `amount` to the member's accumulated cost.
pub(crate) fn credit_member(
    conn: &Connection,
    group_id: GroupId,
    member_id: MemberId,
    amount: u32,
) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE members
         SET accumulated_cost = accumulated_cost + ?1
         WHERE group_uuid = ?2 AND member_uuid = ?3;",
        params![amount, group_id.to_string(), member_id.to_string()],
    )?;
    if changed == 0 {
        return Err(RepoError::MemberNotFound(member_id));
    }
    Ok(())
}

/// Subtracts up to `amount` from the member's accumulated cost, clamping at
/// zero. Used only to reverse a deleted task instance.
pub(crate) fn debit_member(
    conn: &Connection,
    group_id: GroupId,
    member_id: MemberId,
    amount: u32,
) -> RepoResult<DebitOutcome> {
    let current: Option<u32> = conn
        .query_row(
            "SELECT accumulated_cost FROM members
             WHERE group_uuid = ?1 AND member_uuid = ?2;",
            params![group_id.to_string(), member_id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    let current = current.ok_or(RepoError::MemberNotFound(member_id))?;

    let applied = amount.min(current);
    conn.execute(
        "UPDATE members
         SET accumulated_cost = accumulated_cost - ?1
         WHERE group_uuid = ?2 AND member_uuid = ?3;",
        params![applied, group_id.to_string(), member_id.to_string()],
    )?;

    let clamped = applied < amount;
    if clamped {
        warn!(
            "event=ledger_debit_clamped module=ledger status=warn group={group_id} member={member_id} requested={amount} applied={applied}"
        );
    }
    Ok(DebitOutcome { applied, clamped })
}

/// Zeroes accumulated cost for every member of the group. Irreversible and
/// deliberately blind to task history.
pub(crate) fn reset_member_costs(conn: &Connection, group_id: GroupId) -> RepoResult<()> {
    conn.execute(
        "UPDATE members SET accumulated_cost = 0 WHERE group_uuid = ?1;",
        params![group_id.to_string()],
    )?;
    Ok(())
}
