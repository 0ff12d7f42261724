//! Core domain logic for the lunch-run rotation scheduler.
//! This crate is the single source of truth for scoring, selection and
//! fairness invariants; transport and authentication live elsewhere.

pub mod db;
pub mod invite;
pub mod logging;
pub mod model;
pub mod repo;
pub mod scoring;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::group::{
    Group, GroupId, GroupValidationError, WeightError, WeightUpdate, WeightVector,
};
pub use model::member::{Member, MemberId, MemberRef};
pub use model::task::{
    Distance, Money, SignalParseError, TaskId, TaskInstance, TaskValidationError, Wait,
};
pub use repo::group_repo::{GroupRepository, SqliteGroupRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskListQuery, TaskRepository};
pub use repo::{DebitOutcome, RepoError, RepoResult};
pub use scoring::cost::{compute_cost, cost_description};
pub use scoring::fairness::{evaluate, fairness_index, BurdenEntry, GroupStats, VenueCount};
pub use scoring::rotation::{assign, select_next, Assignment, RotationError};
pub use service::group_service::GroupService;
pub use service::task_service::{CreateTaskRequest, MemberHistory, TaskOutcome, TaskService};
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
