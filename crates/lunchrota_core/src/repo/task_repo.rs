//! Task-instance repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist immutable task-instance rows.
//! - Pair every insert with a ledger credit and every delete with a
//!   compensating debit, inside one transaction.
//!
//! # Invariants
//! - Task rows are never updated; only INSERT and DELETE exist.
//! - A row's `cost` is a snapshot; weight changes never rewrite it.

use crate::model::group::GroupId;
use crate::model::member::{MemberId, MemberRef};
use crate::model::task::{Distance, Money, TaskId, TaskInstance, Wait};
use crate::repo::group_repo::parse_uuid;
use crate::repo::ledger::{credit_member, debit_member, DebitOutcome};
use crate::repo::{write_transaction, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    group_uuid,
    assignee_uuid,
    assignee_name,
    venue,
    distance,
    wait,
    money,
    cost,
    notes,
    was_override,
    suggested_uuid,
    suggested_name,
    created_at
FROM task_instances";

/// Query options for listing task instances (newest first).
#[derive(Debug, Clone, Default)]
pub struct TaskListQuery {
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for task-instance history.
pub trait TaskRepository {
    /// Inserts the instance and credits its cost to the assignee, atomically.
    fn create_task(&self, task: &TaskInstance) -> RepoResult<TaskId>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<TaskInstance>>;
    /// Newest-first page of a group's history.
    fn list_tasks(&self, group_id: GroupId, query: &TaskListQuery) -> RepoResult<Vec<TaskInstance>>;
    /// Full group history in creation order, as consumed by the fairness
    /// evaluator (first-encountered tie-breaks depend on this order).
    fn list_tasks_chronological(&self, group_id: GroupId) -> RepoResult<Vec<TaskInstance>>;
    /// Every instance assigned to one member, newest first, across groups.
    fn list_tasks_for_member(&self, member_id: MemberId) -> RepoResult<Vec<TaskInstance>>;
    fn count_tasks(&self, group_id: GroupId) -> RepoResult<u32>;
    /// Deletes the instance and debits its cost back, atomically. Returns
    /// the debit outcome so callers can surface the clamp warning.
    fn delete_task(&self, id: TaskId) -> RepoResult<DebitOutcome>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn insert_and_credit(&self, task: &TaskInstance) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO task_instances (
                uuid, group_uuid, assignee_uuid, assignee_name,
                venue, distance, wait, money, cost, notes,
                was_override, suggested_uuid, suggested_name, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14);",
            params![
                task.uuid.to_string(),
                task.group_id.to_string(),
                task.assignee.member_id.to_string(),
                task.assignee.name.as_str(),
                task.venue.as_str(),
                task.distance.as_str(),
                task.wait.as_str(),
                task.money.as_str(),
                task.cost,
                task.notes.as_deref(),
                task.was_override as i64,
                task.suggested.as_ref().map(|s| s.member_id.to_string()),
                task.suggested.as_ref().map(|s| s.name.as_str()),
                task.created_at_epoch_ms,
            ],
        )?;
        credit_member(self.conn, task.group_id, task.assignee.member_id, task.cost)
    }

    fn collect_tasks(
        &self,
        sql: &str,
        bind: &str,
        limit: i64,
        offset: u32,
    ) -> RepoResult<Vec<TaskInstance>> {
        let mut statement = self.conn.prepare(sql)?;
        let rows = statement.query_map(params![bind, limit, offset], map_task_row)?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row??);
        }
        Ok(tasks)
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &TaskInstance) -> RepoResult<TaskId> {
        task.validate()?;

        // Joins the caller's open transaction when there is one (the
        // service's assignment unit); otherwise insert+credit get their own.
        if self.conn.is_autocommit() {
            let tx = write_transaction(self.conn)?;
            self.insert_and_credit(task)?;
            tx.commit()?;
        } else {
            self.insert_and_credit(task)?;
        }
        Ok(task.uuid)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<TaskInstance>> {
        let sql = format!("{TASK_SELECT_SQL} WHERE uuid = ?1;");
        let task = self
            .conn
            .query_row(&sql, params![id.to_string()], map_task_row)
            .optional()?;
        match task {
            Some(task) => Ok(Some(task?)),
            None => Ok(None),
        }
    }

    fn list_tasks(
        &self,
        group_id: GroupId,
        query: &TaskListQuery,
    ) -> RepoResult<Vec<TaskInstance>> {
        let sql = format!(
            "{TASK_SELECT_SQL}
             WHERE group_uuid = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2 OFFSET ?3;"
        );
        // SQLite treats a negative LIMIT as unlimited.
        let limit = query.limit.map_or(-1, i64::from);
        self.collect_tasks(&sql, &group_id.to_string(), limit, query.offset)
    }

    fn list_tasks_chronological(&self, group_id: GroupId) -> RepoResult<Vec<TaskInstance>> {
        let sql = format!(
            "{TASK_SELECT_SQL}
             WHERE group_uuid = ?1
             ORDER BY created_at ASC, rowid ASC
             LIMIT ?2 OFFSET ?3;"
        );
        self.collect_tasks(&sql, &group_id.to_string(), -1, 0)
    }

    fn list_tasks_for_member(&self, member_id: MemberId) -> RepoResult<Vec<TaskInstance>> {
        let sql = format!(
            "{TASK_SELECT_SQL}
             WHERE assignee_uuid = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2 OFFSET ?3;"
        );
        self.collect_tasks(&sql, &member_id.to_string(), -1, 0)
    }

    fn count_tasks(&self, group_id: GroupId) -> RepoResult<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM task_instances WHERE group_uuid = ?1;",
            params![group_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<DebitOutcome> {
        // Immediate transaction: the cost read and the compensating debit
        // form one write unit, same discipline as task creation.
        let tx = write_transaction(self.conn)?;
        let target: Option<(String, String, u32)> = tx
            .query_row(
                "SELECT group_uuid, assignee_uuid, cost
                 FROM task_instances WHERE uuid = ?1;",
                params![id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;
        let (group_uuid, assignee_uuid, cost) = target.ok_or(RepoError::TaskNotFound(id))?;
        let group_id = parse_uuid("task_instances.group_uuid", &group_uuid)?;
        let assignee_id = parse_uuid("task_instances.assignee_uuid", &assignee_uuid)?;

        tx.execute(
            "DELETE FROM task_instances WHERE uuid = ?1;",
            params![id.to_string()],
        )?;
        let outcome = debit_member(&tx, group_id, assignee_id, cost)?;
        tx.commit()?;
        Ok(outcome)
    }
}

fn map_task_row(row: &Row<'_>) -> rusqlite::Result<RepoResult<TaskInstance>> {
    let uuid: String = row.get(0)?;
    let group_uuid: String = row.get(1)?;
    let assignee_uuid: String = row.get(2)?;
    let assignee_name: String = row.get(3)?;
    let venue: String = row.get(4)?;
    let distance: String = row.get(5)?;
    let wait: String = row.get(6)?;
    let money: String = row.get(7)?;
    let cost: u32 = row.get(8)?;
    let notes: Option<String> = row.get(9)?;
    let was_override: i64 = row.get(10)?;
    let suggested_uuid: Option<String> = row.get(11)?;
    let suggested_name: Option<String> = row.get(12)?;
    let created_at: i64 = row.get(13)?;

    Ok(build_task(TaskRowParts {
        uuid,
        group_uuid,
        assignee_uuid,
        assignee_name,
        venue,
        distance,
        wait,
        money,
        cost,
        notes,
        was_override: was_override != 0,
        suggested_uuid,
        suggested_name,
        created_at,
    }))
}

struct TaskRowParts {
    uuid: String,
    group_uuid: String,
    assignee_uuid: String,
    assignee_name: String,
    venue: String,
    distance: String,
    wait: String,
    money: String,
    cost: u32,
    notes: Option<String>,
    was_override: bool,
    suggested_uuid: Option<String>,
    suggested_name: Option<String>,
    created_at: i64,
}

fn build_task(parts: TaskRowParts) -> RepoResult<TaskInstance> {
    let suggested = match (parts.suggested_uuid, parts.suggested_name) {
        (Some(uuid), Some(name)) => Some(MemberRef {
            member_id: parse_uuid("task_instances.suggested_uuid", &uuid)?,
            name,
        }),
        (None, None) => None,
        _ => {
            return Err(RepoError::InvalidData(
                "task_instances.suggested_* columns are half-populated".to_string(),
            ))
        }
    };
    if parts.was_override != suggested.is_some() {
        return Err(RepoError::InvalidData(
            "task_instances.was_override disagrees with suggested_* columns".to_string(),
        ));
    }

    Ok(TaskInstance {
        uuid: parse_uuid("task_instances.uuid", &parts.uuid)?,
        group_id: parse_uuid("task_instances.group_uuid", &parts.group_uuid)?,
        assignee: MemberRef {
            member_id: parse_uuid("task_instances.assignee_uuid", &parts.assignee_uuid)?,
            name: parts.assignee_name,
        },
        venue: parts.venue,
        distance: Distance::parse(&parts.distance)
            .map_err(|err| RepoError::InvalidData(format!("task_instances.distance: {err}")))?,
        wait: Wait::parse(&parts.wait)
            .map_err(|err| RepoError::InvalidData(format!("task_instances.wait: {err}")))?,
        money: Money::parse(&parts.money)
            .map_err(|err| RepoError::InvalidData(format!("task_instances.money: {err}")))?,
        cost: parts.cost,
        notes: parts.notes,
        was_override: parts.was_override,
        suggested,
        created_at_epoch_ms: parts.created_at,
    })
}
