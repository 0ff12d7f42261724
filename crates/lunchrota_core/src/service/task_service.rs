//! Task-instance use-cases: the cost/assignment flow and history queries.
//!
//! # Responsibility
//! - Turn a difficulty request into a scored, assigned, credited instance.
//! - Reverse an instance's ledger effect on deletion.
//!
//! # Invariants
//! - Cost is computed against the group's weights at creation time and
//!   persisted as a snapshot.
//! - The read-select-credit span of instance creation is one serialized
//!   write unit; concurrent creators queue instead of racing the roster.
//! - Insert+credit and delete+debit are single transactions at the
//!   repository layer; this service never splits them.

use crate::model::group::GroupId;
use crate::model::member::{MemberId, MemberRef};
use crate::model::now_epoch_ms;
use crate::model::task::{Distance, Money, TaskId, TaskInstance, Wait};
use crate::repo::group_repo::GroupRepository;
use crate::repo::task_repo::{TaskListQuery, TaskRepository};
use crate::repo::DebitOutcome;
use crate::scoring::cost::compute_cost;
use crate::scoring::fairness::{evaluate, GroupStats};
use crate::scoring::rotation::{assign, select_next};
use crate::service::{ServiceError, ServiceResult};
use log::info;
use uuid::Uuid;

/// Input for creating one task instance.
#[derive(Debug, Clone)]
pub struct CreateTaskRequest {
    pub group_id: GroupId,
    /// Restaurant/venue label the run is for.
    pub venue: String,
    pub distance: Distance,
    pub wait: Wait,
    pub money: Money,
    pub notes: Option<String>,
    /// Manual override of the rotation's proposal.
    pub manual_person_id: Option<MemberId>,
}

/// Result of the assignment flow.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    /// The persisted instance.
    pub task: TaskInstance,
    pub assignee: MemberRef,
    pub cost: u32,
    pub was_override: bool,
    /// The rotation's proposal when it was overridden.
    pub suggested: Option<MemberRef>,
}

/// Member history summary: their instances plus total incurred cost.
#[derive(Debug, Clone)]
pub struct MemberHistory {
    pub tasks: Vec<TaskInstance>,
    pub total_cost: u64,
}

/// Use-case service for the task-instance flow.
pub struct TaskService<G: GroupRepository, T: TaskRepository> {
    groups: G,
    tasks: T,
}

impl<G: GroupRepository, T: TaskRepository> TaskService<G, T> {
    /// Both repositories must sit on the same underlying store so the
    /// serialized write unit of [`Self::create_instance`] covers the task
    /// insert as well as the roster read.
    pub fn new(groups: G, tasks: T) -> Self {
        Self { groups, tasks }
    }

    /// Scores the request, picks (or overrides) the runner, persists the
    /// instance and credits the ledger.
    ///
    /// The roster read, the selection and the insert+credit run as one
    /// serialized write unit: a concurrent creator's roster read waits
    /// behind this commit, so two callers can never act on the same ledger
    /// snapshot and double-assign the proposed runner.
    pub fn create_instance(&self, request: CreateTaskRequest) -> ServiceResult<TaskOutcome> {
        self.groups.serialized(|| self.assign_and_record(request))
    }

    fn assign_and_record(&self, request: CreateTaskRequest) -> ServiceResult<TaskOutcome> {
        let group = self
            .groups
            .get_group(request.group_id, false)?
            .ok_or(ServiceError::GroupNotFound(request.group_id))?;

        let suggested = select_next(&group.members)
            .ok_or(ServiceError::EmptyRoster(request.group_id))?;
        let assignment = assign(&group.members, suggested, request.manual_person_id)?;
        let cost = compute_cost(request.distance, request.wait, request.money, &group.weights);

        let task = TaskInstance {
            uuid: Uuid::new_v4(),
            group_id: request.group_id,
            assignee: assignment.assignee.clone(),
            venue: request.venue,
            distance: request.distance,
            wait: request.wait,
            money: request.money,
            cost,
            notes: request.notes,
            was_override: assignment.was_override,
            suggested: assignment.suggested.clone(),
            created_at_epoch_ms: now_epoch_ms(),
        };
        self.tasks.create_task(&task)?;
        info!(
            "event=task_created module=task_service status=ok group={} task={} assignee={} cost={cost} override={}",
            task.group_id, task.uuid, task.assignee.member_id, task.was_override
        );

        Ok(TaskOutcome {
            assignee: assignment.assignee,
            cost,
            was_override: assignment.was_override,
            suggested: assignment.suggested,
            task,
        })
    }

    /// Deletes an instance and debits its cost back from the assignee.
    ///
    /// A clamped debit is reported in the outcome (and logged by the
    /// ledger), not raised as an error.
    pub fn delete_instance(&self, task_id: TaskId) -> ServiceResult<DebitOutcome> {
        let outcome = self.tasks.delete_task(task_id)?;
        info!(
            "event=task_deleted module=task_service status=ok task={task_id} debited={} clamped={}",
            outcome.applied, outcome.clamped
        );
        Ok(outcome)
    }

    pub fn get_instance(&self, task_id: TaskId) -> ServiceResult<Option<TaskInstance>> {
        Ok(self.tasks.get_task(task_id)?)
    }

    /// Newest-first page of a group's history.
    pub fn list_instances(
        &self,
        group_id: GroupId,
        query: &TaskListQuery,
    ) -> ServiceResult<Vec<TaskInstance>> {
        Ok(self.tasks.list_tasks(group_id, query)?)
    }

    pub fn count_instances(&self, group_id: GroupId) -> ServiceResult<u32> {
        Ok(self.tasks.count_tasks(group_id)?)
    }

    /// One member's instances across groups, with their total cost.
    pub fn member_history(&self, member_id: MemberId) -> ServiceResult<MemberHistory> {
        let tasks = self.tasks.list_tasks_for_member(member_id)?;
        let total_cost = tasks.iter().map(|task| u64::from(task.cost)).sum();
        Ok(MemberHistory { tasks, total_cost })
    }

    /// Fairness report over the current roster and the full history.
    ///
    /// Works on inactive groups too, so a deleted group's history stays
    /// auditable.
    pub fn group_stats(&self, group_id: GroupId) -> ServiceResult<GroupStats> {
        let group = self
            .groups
            .get_group(group_id, true)?
            .ok_or(ServiceError::GroupNotFound(group_id))?;
        let tasks = self.tasks.list_tasks_chronological(group_id)?;
        Ok(evaluate(&group.members, &tasks))
    }
}
