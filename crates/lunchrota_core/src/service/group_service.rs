//! Group lifecycle use-cases.
//!
//! # Responsibility
//! - Create groups with unique admission codes; admit and remove members.
//! - Guard roster invariants (no duplicates, no orphaned adminship).
//!
//! # Invariants
//! - Admission codes are minted through bounded retry against the stored
//!   set; the generator itself stays stateless.
//! - All reads used for invariant checks and the subsequent writes go
//!   through the same repository connection.

use crate::invite;
use crate::model::group::{validate_name, Group, GroupId, WeightUpdate, WeightVector};
use crate::model::member::{Member, MemberId};
use crate::model::now_epoch_ms;
use crate::repo::group_repo::GroupRepository;
use crate::scoring::rotation::select_next;
use crate::service::{ServiceError, ServiceResult};
use log::info;

/// Retry budget for minting an unused admission code. The space holds
/// ~17.5M codes, so hitting this cap means something is badly wrong.
const MAX_CODE_ATTEMPTS: u32 = 32;

/// Use-case service for group lifecycle and roster management.
pub struct GroupService<R: GroupRepository> {
    repo: R,
}

impl<R: GroupRepository> GroupService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a group; the creator becomes admin and first member.
    pub fn create_group(
        &self,
        name: impl Into<String>,
        admin_id: MemberId,
        admin_name: impl Into<String>,
    ) -> ServiceResult<Group> {
        let name = name.into();
        // Minting hits storage; reject bad names before it starts.
        validate_name(&name)?;
        let invite_code = self.mint_invite_code()?;
        let group = Group::new(name, admin_id, admin_name, invite_code, now_epoch_ms())?;
        self.repo.create_group(&group)?;
        info!(
            "event=group_created module=group_service status=ok group={} admin={}",
            group.uuid, group.admin_id
        );
        Ok(group)
    }

    /// Admits a member via admission code. Input is normalized first, so
    /// `" abc123 "` admits against `ABC123`.
    pub fn join_group(
        &self,
        code: &str,
        member_id: MemberId,
        name: impl Into<String>,
    ) -> ServiceResult<Group> {
        let normalized = invite::normalize(code);
        let group = self
            .repo
            .find_by_invite_code(&normalized)?
            .ok_or_else(|| ServiceError::UnknownInviteCode(normalized.clone()))?;
        if group.is_member(member_id) {
            return Err(ServiceError::AlreadyMember(member_id));
        }
        let member = Member::new(member_id, name, now_epoch_ms());
        self.repo.add_member(group.uuid, &member)?;
        info!(
            "event=member_joined module=group_service status=ok group={} member={member_id}",
            group.uuid
        );
        self.load_group(group.uuid)
    }

    /// Adds a member directly (administrator action, no code involved).
    pub fn add_member(
        &self,
        group_id: GroupId,
        member_id: MemberId,
        name: impl Into<String>,
    ) -> ServiceResult<Group> {
        let group = self.load_group(group_id)?;
        if group.is_member(member_id) {
            return Err(ServiceError::AlreadyMember(member_id));
        }
        let member = Member::new(member_id, name, now_epoch_ms());
        self.repo.add_member(group_id, &member)?;
        info!(
            "event=member_added module=group_service status=ok group={group_id} member={member_id}"
        );
        self.load_group(group_id)
    }

    /// Removes a member from the roster. The admin can never be removed;
    /// group deletion is the only admin exit.
    pub fn remove_member(&self, group_id: GroupId, member_id: MemberId) -> ServiceResult<Group> {
        let group = self.load_group(group_id)?;
        if group.admin_id == member_id {
            return Err(ServiceError::AdminCannotLeave(member_id));
        }
        self.repo.remove_member(group_id, member_id)?;
        info!(
            "event=member_removed module=group_service status=ok group={group_id} member={member_id}"
        );
        self.load_group(group_id)
    }

    /// A member leaves voluntarily. Same admin guard as removal.
    pub fn leave_group(&self, group_id: GroupId, member_id: MemberId) -> ServiceResult<()> {
        self.remove_member(group_id, member_id)?;
        Ok(())
    }

    /// Applies a partial weight change; unset axes keep their values.
    pub fn update_weights(
        &self,
        group_id: GroupId,
        update: &WeightUpdate,
    ) -> ServiceResult<WeightVector> {
        let group = self.load_group(group_id)?;
        let merged = group.weights.merged_with(update)?;
        self.repo.update_weights(group_id, &merged)?;
        info!(
            "event=weights_updated module=group_service status=ok group={group_id} distance={} wait={} money={}",
            merged.distance, merged.wait, merged.money
        );
        Ok(merged)
    }

    /// Zeroes every member's accumulated cost. Task history is untouched;
    /// fairness computed afterwards reflects only future instances.
    pub fn reset_scores(&self, group_id: GroupId) -> ServiceResult<()> {
        // Ensure the group exists and is active before wiping the ledger.
        self.load_group(group_id)?;
        self.repo.reset_scores(group_id)?;
        info!("event=scores_reset module=group_service status=ok group={group_id}");
        Ok(())
    }

    /// Read-only rotation query: whose turn is next.
    pub fn next_person(&self, group_id: GroupId) -> ServiceResult<Member> {
        let group = self.load_group(group_id)?;
        select_next(&group.members)
            .cloned()
            .ok_or(ServiceError::EmptyRoster(group_id))
    }

    pub fn rename_group(&self, group_id: GroupId, name: &str) -> ServiceResult<Group> {
        self.repo.rename_group(group_id, name)?;
        self.load_group(group_id)
    }

    /// Soft delete: the group disappears from listing, admission and
    /// rotation, but rows stay in place.
    pub fn delete_group(&self, group_id: GroupId) -> ServiceResult<()> {
        self.repo.deactivate_group(group_id)?;
        info!("event=group_deactivated module=group_service status=ok group={group_id}");
        Ok(())
    }

    pub fn get_group(&self, group_id: GroupId) -> ServiceResult<Group> {
        self.load_group(group_id)
    }

    /// Active groups the member belongs to, newest first.
    pub fn my_groups(&self, member_id: MemberId) -> ServiceResult<Vec<Group>> {
        Ok(self.repo.list_groups_for_member(member_id)?)
    }

    fn load_group(&self, group_id: GroupId) -> ServiceResult<Group> {
        self.repo
            .get_group(group_id, false)?
            .ok_or(ServiceError::GroupNotFound(group_id))
    }

    fn mint_invite_code(&self) -> ServiceResult<String> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = invite::generate();
            if !self.repo.invite_code_in_use(&code)? {
                return Ok(code);
            }
        }
        Err(ServiceError::InviteCodesExhausted)
    }
}
