//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for groups and tasks.
//! - Keep SQL details out of the service/business orchestration layer.
//!
//! # Invariants
//! - Write paths validate domain records before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `accumulated_cost` is written exclusively through the ledger
//!   operations in [`ledger`].

pub mod group_repo;
pub(crate) mod ledger;
pub mod task_repo;

pub use ledger::DebitOutcome;

use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Begins an immediate write transaction on a shared connection.
///
/// `BEGIN IMMEDIATE` takes the database write lock up front, so a concurrent
/// writer's reads queue behind the commit (bounded by the connection's busy
/// timeout) instead of racing against a stale snapshot.
pub(crate) fn write_transaction(conn: &Connection) -> rusqlite::Result<Transaction<'_>> {
    Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
}

use crate::db::DbError;
use crate::model::group::{GroupId, GroupValidationError, WeightError};
use crate::model::member::MemberId;
use crate::model::task::{TaskId, TaskValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence and query error shared by the group and task repositories.
#[derive(Debug)]
pub enum RepoError {
    GroupValidation(GroupValidationError),
    TaskValidation(TaskValidationError),
    Weight(WeightError),
    Db(DbError),
    GroupNotFound(GroupId),
    MemberNotFound(MemberId),
    TaskNotFound(TaskId),
    DuplicateMember(MemberId),
    /// Persisted state violates a domain invariant (bad UUID, unknown
    /// signal value, dangling override audit). Indicates external breakage,
    /// never a normal runtime condition.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GroupValidation(err) => write!(f, "{err}"),
            Self::TaskValidation(err) => write!(f, "{err}"),
            Self::Weight(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::GroupNotFound(id) => write!(f, "group not found: {id}"),
            Self::MemberNotFound(id) => write!(f, "member not found in group: {id}"),
            Self::TaskNotFound(id) => write!(f, "task instance not found: {id}"),
            Self::DuplicateMember(id) => write!(f, "member already in group: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::GroupValidation(err) => Some(err),
            Self::TaskValidation(err) => Some(err),
            Self::Weight(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GroupValidationError> for RepoError {
    fn from(value: GroupValidationError) -> Self {
        Self::GroupValidation(value)
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::TaskValidation(value)
    }
}

impl From<WeightError> for RepoError {
    fn from(value: WeightError) -> Self {
        Self::Weight(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
