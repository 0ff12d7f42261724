//! Rotation selection and manual override handling.
//!
//! # Responsibility
//! - Propose the next runner from an ordered roster snapshot.
//! - Resolve a manual override while keeping the proposal for audit.
//!
//! # Invariants
//! - Selection is stable: on ties the earliest roster position wins.
//! - Nothing here touches the ledger; callers apply the resulting cost.

use crate::model::member::{Member, MemberId, MemberRef};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Picks the member with the strictly smallest accumulated cost.
///
/// Returns `None` on an empty roster. Ties resolve to the first minimal
/// member in roster order, so the same snapshot always yields the same
/// proposal.
pub fn select_next(members: &[Member]) -> Option<&Member> {
    members.iter().reduce(|minimum, candidate| {
        if candidate.accumulated_cost < minimum.accumulated_cost {
            candidate
        } else {
            minimum
        }
    })
}

/// Outcome of resolving a proposal against an optional manual choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Who actually gets the run.
    pub assignee: MemberRef,
    /// True when the assignee differs from the rotation's proposal.
    pub was_override: bool,
    /// The rotation's proposal, kept for audit. `Some` iff `was_override`.
    pub suggested: Option<MemberRef>,
}

/// Resolves the rotation proposal against an optional manual choice.
///
/// - No manual choice, or a choice equal to the proposal: the proposal wins
///   and no override is recorded.
/// - A differing manual choice naming a current member: that member wins and
///   the proposal is carried as audit trail.
/// - A manual choice outside the roster fails with
///   [`RotationError::MemberNotFound`].
pub fn assign(
    members: &[Member],
    suggested: &Member,
    manual_choice: Option<MemberId>,
) -> Result<Assignment, RotationError> {
    match manual_choice {
        None => Ok(Assignment {
            assignee: suggested.to_ref(),
            was_override: false,
            suggested: None,
        }),
        Some(choice_id) if choice_id == suggested.member_id => Ok(Assignment {
            assignee: suggested.to_ref(),
            was_override: false,
            suggested: None,
        }),
        Some(choice_id) => {
            let chosen = members
                .iter()
                .find(|member| member.member_id == choice_id)
                .ok_or(RotationError::MemberNotFound(choice_id))?;
            Ok(Assignment {
                assignee: chosen.to_ref(),
                was_override: true,
                suggested: Some(suggested.to_ref()),
            })
        }
    }
}

/// Failure while resolving a rotation assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationError {
    /// Manual override target is not on the current roster.
    MemberNotFound(MemberId),
}

impl Display for RotationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MemberNotFound(id) => {
                write!(f, "override target {id} is not a member of this group")
            }
        }
    }
}

impl Error for RotationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::member::Member;
    use uuid::Uuid;

    fn roster(costs: &[(&str, u32)]) -> Vec<Member> {
        costs
            .iter()
            .map(|(name, cost)| {
                let mut member = Member::new(Uuid::new_v4(), *name, 0);
                member.accumulated_cost = *cost;
                member
            })
            .collect()
    }

    #[test]
    fn empty_roster_has_no_next() {
        assert!(select_next(&[]).is_none());
    }

    #[test]
    fn picks_strictly_smallest_cost() {
        let members = roster(&[("a", 9), ("b", 4), ("c", 7)]);
        assert_eq!(select_next(&members).unwrap().name, "b");
    }

    #[test]
    fn ties_resolve_to_first_roster_position() {
        let members = roster(&[("a", 5), ("b", 3), ("c", 3)]);
        assert_eq!(select_next(&members).unwrap().name, "b");
    }

    #[test]
    fn no_manual_choice_keeps_proposal() {
        let members = roster(&[("a", 0), ("b", 2)]);
        let suggested = select_next(&members).unwrap();
        let assignment = assign(&members, suggested, None).unwrap();
        assert_eq!(assignment.assignee.name, "a");
        assert!(!assignment.was_override);
        assert!(assignment.suggested.is_none());
    }

    #[test]
    fn manual_choice_of_proposal_is_not_an_override() {
        let members = roster(&[("a", 0), ("b", 2)]);
        let suggested = select_next(&members).unwrap();
        let assignment = assign(&members, suggested, Some(suggested.member_id)).unwrap();
        assert!(!assignment.was_override);
        assert!(assignment.suggested.is_none());
    }

    #[test]
    fn differing_manual_choice_records_audit_trail() {
        let members = roster(&[("a", 0), ("b", 2), ("c", 9)]);
        let suggested = select_next(&members).unwrap();
        let choice = members[2].member_id;
        let assignment = assign(&members, suggested, Some(choice)).unwrap();
        assert_eq!(assignment.assignee.member_id, choice);
        assert!(assignment.was_override);
        let audit = assignment.suggested.unwrap();
        assert_eq!(audit.member_id, suggested.member_id);
        assert_eq!(audit.name, "a");
    }

    #[test]
    fn unknown_manual_choice_fails() {
        let members = roster(&[("a", 0)]);
        let suggested = select_next(&members).unwrap();
        let stranger = Uuid::new_v4();
        let err = assign(&members, suggested, Some(stranger)).unwrap_err();
        assert_eq!(err, RotationError::MemberNotFound(stranger));
    }
}
