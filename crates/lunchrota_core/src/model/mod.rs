//! Domain model for rotation groups and task instances.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Enforce structural invariants (name bounds, weight bounds, audit
//!   consistency) at construction/validation time.
//!
//! # Invariants
//! - Every domain object is identified by a stable UUID.
//! - Group deletion is a soft-delete flag, not a hard delete.
//! - Accumulated cost is mutated only through ledger operations.

pub mod group;
pub mod member;
pub mod task;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as unix epoch milliseconds.
///
/// Timestamps are captured by the service layer at creation time so that
/// persisted rows carry the moment of the domain event, not the moment of
/// the SQL write.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
