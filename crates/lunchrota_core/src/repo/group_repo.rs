//! Group repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist group aggregates with their ordered rosters.
//! - Expose the ledger operations (credit/debit/reset) at the storage
//!   boundary.
//!
//! # Invariants
//! - Rosters are always read back in join order (`position` column).
//! - Multi-row mutations run in one immediate write transaction; read-then-
//!   write flows that span repositories go through [`GroupRepository::serialized`].

use crate::model::group::{validate_name, Group, GroupId, WeightVector};
use crate::model::member::{Member, MemberId};
use crate::repo::ledger::{credit_member, debit_member, reset_member_costs, DebitOutcome};
use crate::repo::{write_transaction, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const GROUP_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    admin_uuid,
    invite_code,
    distance_weight,
    wait_weight,
    money_weight,
    is_active,
    created_at
FROM groups";

/// Repository interface for group lifecycle and ledger operations.
pub trait GroupRepository {
    fn create_group(&self, group: &Group) -> RepoResult<GroupId>;
    /// Loads one group with its ordered roster. Inactive groups are treated
    /// as absent unless `include_inactive` is set.
    fn get_group(&self, id: GroupId, include_inactive: bool) -> RepoResult<Option<Group>>;
    /// Finds an active group by admission code. Codes are stored normalized.
    fn find_by_invite_code(&self, code: &str) -> RepoResult<Option<Group>>;
    fn list_groups_for_member(&self, member_id: MemberId) -> RepoResult<Vec<Group>>;
    fn invite_code_in_use(&self, code: &str) -> RepoResult<bool>;
    fn rename_group(&self, id: GroupId, name: &str) -> RepoResult<()>;
    /// Soft delete: flips `is_active` off, history stays in place.
    fn deactivate_group(&self, id: GroupId) -> RepoResult<()>;
    fn add_member(&self, id: GroupId, member: &Member) -> RepoResult<()>;
    fn remove_member(&self, id: GroupId, member_id: MemberId) -> RepoResult<()>;
    fn update_weights(&self, id: GroupId, weights: &WeightVector) -> RepoResult<()>;
    /// Ledger: adds cost to one member.
    fn credit(&self, id: GroupId, member_id: MemberId, amount: u32) -> RepoResult<()>;
    /// Ledger: reverses cost, clamped at zero.
    fn debit(&self, id: GroupId, member_id: MemberId, amount: u32) -> RepoResult<DebitOutcome>;
    /// Ledger: zeroes every member's accumulated cost.
    fn reset_scores(&self, id: GroupId) -> RepoResult<()>;
    /// Runs `f` as one serialized write unit: reads inside `f` stay valid
    /// until the unit commits, so a read-select-write flow cannot act on a
    /// ledger snapshot another writer is changing.
    fn serialized<T, E>(&self, f: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: From<RepoError>;
}

/// SQLite-backed group repository.
pub struct SqliteGroupRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGroupRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn group_exists(&self, id: GroupId) -> RepoResult<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM groups WHERE uuid = ?1);",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn load_roster(&self, id: GroupId) -> RepoResult<Vec<Member>> {
        let mut statement = self.conn.prepare(
            "SELECT member_uuid, name, accumulated_cost, joined_at
             FROM members
             WHERE group_uuid = ?1
             ORDER BY position ASC;",
        )?;
        let rows = statement.query_map(params![id.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;

        let mut members = Vec::new();
        for row in rows {
            let (member_uuid, name, accumulated_cost, joined_at) = row?;
            members.push(Member {
                member_id: parse_uuid("members.member_uuid", &member_uuid)?,
                name,
                accumulated_cost,
                joined_at_epoch_ms: joined_at,
            });
        }
        Ok(members)
    }

    fn hydrate(&self, mut group: Group) -> RepoResult<Group> {
        group.members = self.load_roster(group.uuid)?;
        Ok(group)
    }
}

impl GroupRepository for SqliteGroupRepository<'_> {
    fn create_group(&self, group: &Group) -> RepoResult<GroupId> {
        validate_name(&group.name)?;
        group.weights.validate()?;

        let tx = write_transaction(self.conn)?;
        tx.execute(
            "INSERT INTO groups (
                uuid, name, admin_uuid, invite_code,
                distance_weight, wait_weight, money_weight,
                is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                group.uuid.to_string(),
                group.name.as_str(),
                group.admin_id.to_string(),
                group.invite_code.as_str(),
                group.weights.distance,
                group.weights.wait,
                group.weights.money,
                group.is_active as i64,
                group.created_at_epoch_ms,
            ],
        )?;
        for (position, member) in group.members.iter().enumerate() {
            tx.execute(
                "INSERT INTO members (
                    group_uuid, member_uuid, name, accumulated_cost, joined_at, position
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    group.uuid.to_string(),
                    member.member_id.to_string(),
                    member.name.as_str(),
                    member.accumulated_cost,
                    member.joined_at_epoch_ms,
                    position as i64,
                ],
            )?;
        }
        tx.commit()?;
        Ok(group.uuid)
    }

    fn get_group(&self, id: GroupId, include_inactive: bool) -> RepoResult<Option<Group>> {
        let sql = format!("{GROUP_SELECT_SQL} WHERE uuid = ?1;");
        let group = self
            .conn
            .query_row(&sql, params![id.to_string()], map_group_row)
            .optional()?;
        match group {
            Some(Ok(group)) if group.is_active || include_inactive => {
                Ok(Some(self.hydrate(group)?))
            }
            Some(Ok(_)) => Ok(None),
            Some(Err(err)) => Err(err),
            None => Ok(None),
        }
    }

    fn find_by_invite_code(&self, code: &str) -> RepoResult<Option<Group>> {
        let sql = format!("{GROUP_SELECT_SQL} WHERE invite_code = ?1 AND is_active = 1;");
        let group = self
            .conn
            .query_row(&sql, params![code], map_group_row)
            .optional()?;
        match group {
            Some(Ok(group)) => Ok(Some(self.hydrate(group)?)),
            Some(Err(err)) => Err(err),
            None => Ok(None),
        }
    }

    fn list_groups_for_member(&self, member_id: MemberId) -> RepoResult<Vec<Group>> {
        let sql = format!(
            "{GROUP_SELECT_SQL}
             WHERE is_active = 1
               AND uuid IN (SELECT group_uuid FROM members WHERE member_uuid = ?1)
             ORDER BY created_at DESC;"
        );
        let mut statement = self.conn.prepare(&sql)?;
        let rows = statement.query_map(params![member_id.to_string()], map_group_row)?;

        let mut groups = Vec::new();
        for row in rows {
            groups.push(self.hydrate(row??)?);
        }
        Ok(groups)
    }

    fn invite_code_in_use(&self, code: &str) -> RepoResult<bool> {
        let in_use: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM groups WHERE invite_code = ?1);",
            params![code],
            |row| row.get(0),
        )?;
        Ok(in_use)
    }

    fn rename_group(&self, id: GroupId, name: &str) -> RepoResult<()> {
        validate_name(name)?;
        let changed = self.conn.execute(
            "UPDATE groups SET name = ?1 WHERE uuid = ?2;",
            params![name, id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::GroupNotFound(id));
        }
        Ok(())
    }

    fn deactivate_group(&self, id: GroupId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE groups SET is_active = 0 WHERE uuid = ?1;",
            params![id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::GroupNotFound(id));
        }
        Ok(())
    }

    fn add_member(&self, id: GroupId, member: &Member) -> RepoResult<()> {
        let tx = write_transaction(self.conn)?;
        let group_exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM groups WHERE uuid = ?1);",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        if !group_exists {
            return Err(RepoError::GroupNotFound(id));
        }
        let already_member: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM members WHERE group_uuid = ?1 AND member_uuid = ?2);",
            params![id.to_string(), member.member_id.to_string()],
            |row| row.get(0),
        )?;
        if already_member {
            return Err(RepoError::DuplicateMember(member.member_id));
        }
        tx.execute(
            "INSERT INTO members (
                group_uuid, member_uuid, name, accumulated_cost, joined_at, position
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                (SELECT COALESCE(MAX(position) + 1, 0) FROM members WHERE group_uuid = ?1)
            );",
            params![
                id.to_string(),
                member.member_id.to_string(),
                member.name.as_str(),
                member.accumulated_cost,
                member.joined_at_epoch_ms,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn remove_member(&self, id: GroupId, member_id: MemberId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM members WHERE group_uuid = ?1 AND member_uuid = ?2;",
            params![id.to_string(), member_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::MemberNotFound(member_id));
        }
        Ok(())
    }

    fn update_weights(&self, id: GroupId, weights: &WeightVector) -> RepoResult<()> {
        weights.validate()?;
        let changed = self.conn.execute(
            "UPDATE groups
             SET distance_weight = ?1, wait_weight = ?2, money_weight = ?3
             WHERE uuid = ?4;",
            params![weights.distance, weights.wait, weights.money, id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::GroupNotFound(id));
        }
        Ok(())
    }

    fn credit(&self, id: GroupId, member_id: MemberId, amount: u32) -> RepoResult<()> {
        credit_member(self.conn, id, member_id, amount)
    }

    fn debit(&self, id: GroupId, member_id: MemberId, amount: u32) -> RepoResult<DebitOutcome> {
        let tx = write_transaction(self.conn)?;
        let outcome = debit_member(&tx, id, member_id, amount)?;
        tx.commit()?;
        Ok(outcome)
    }

    fn reset_scores(&self, id: GroupId) -> RepoResult<()> {
        if !self.group_exists(id)? {
            return Err(RepoError::GroupNotFound(id));
        }
        reset_member_costs(self.conn, id)
    }

    fn serialized<T, E>(&self, f: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: From<RepoError>,
    {
        let tx = write_transaction(self.conn).map_err(RepoError::from)?;
        let value = f()?;
        tx.commit().map_err(RepoError::from)?;
        Ok(value)
    }
}

fn map_group_row(row: &Row<'_>) -> rusqlite::Result<RepoResult<Group>> {
    let uuid: String = row.get(0)?;
    let name: String = row.get(1)?;
    let admin_uuid: String = row.get(2)?;
    let invite_code: String = row.get(3)?;
    let distance_weight: f64 = row.get(4)?;
    let wait_weight: f64 = row.get(5)?;
    let money_weight: f64 = row.get(6)?;
    let is_active: i64 = row.get(7)?;
    let created_at: i64 = row.get(8)?;

    Ok(build_group(
        uuid,
        name,
        admin_uuid,
        invite_code,
        distance_weight,
        wait_weight,
        money_weight,
        is_active,
        created_at,
    ))
}

#[allow(clippy::too_many_arguments)]
fn build_group(
    uuid: String,
    name: String,
    admin_uuid: String,
    invite_code: String,
    distance_weight: f64,
    wait_weight: f64,
    money_weight: f64,
    is_active: i64,
    created_at: i64,
) -> RepoResult<Group> {
    let weights = WeightVector::new(distance_weight, wait_weight, money_weight)
        .map_err(|err| RepoError::InvalidData(format!("groups.weights: {err}")))?;
    Ok(Group {
        uuid: parse_uuid("groups.uuid", &uuid)?,
        name,
        admin_id: parse_uuid("groups.admin_uuid", &admin_uuid)?,
        invite_code,
        members: Vec::new(),
        weights,
        is_active: is_active != 0,
        created_at_epoch_ms: created_at,
    })
}

pub(crate) fn parse_uuid(column: &str, value: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|err| RepoError::InvalidData(format!("{column} `{value}`: {err}")))
}
