//! Task instance record and categorical difficulty signals.
//!
//! # Responsibility
//! - Define the three difficulty axes and their fixed base-point tables.
//! - Define the immutable per-run record with its override audit fields.
//!
//! # Invariants
//! - Signal enums are the only representable values; unknown strings are
//!   rejected at parse time, never stored.
//! - `cost` is a snapshot of the weights in force at creation time and is
//!   never recomputed.
//! - `was_override == true` implies the suggested member audit fields are
//!   present, and vice versa.

use crate::model::group::GroupId;
use crate::model::member::MemberRef;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one recorded task run.
pub type TaskId = Uuid;

const MAX_VENUE_CHARS: usize = 100;
const MAX_NOTES_CHARS: usize = 500;

/// How far the runner has to travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distance {
    Short,
    Medium,
    Long,
}

/// How long the runner has to wait on site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wait {
    Low,
    Medium,
    High,
}

/// How much money the runner has to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Money {
    Low,
    Medium,
    High,
}

impl Distance {
    /// Fixed base points before weighting.
    pub fn base_points(self) -> u32 {
        match self {
            Self::Short => 3,
            Self::Medium => 6,
            Self::Long => 10,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }

    pub fn parse(value: &str) -> Result<Self, SignalParseError> {
        match value {
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            other => Err(SignalParseError::new("distance", other)),
        }
    }
}

impl Wait {
    /// Fixed base points before weighting.
    pub fn base_points(self) -> u32 {
        match self {
            Self::Low => 2,
            Self::Medium => 5,
            Self::High => 8,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Result<Self, SignalParseError> {
        match value {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(SignalParseError::new("wait", other)),
        }
    }
}

impl Money {
    /// Fixed base points before weighting.
    pub fn base_points(self) -> u32 {
        match self {
            Self::Low => 2,
            Self::Medium => 4,
            Self::High => 7,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Result<Self, SignalParseError> {
        match value {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(SignalParseError::new("money", other)),
        }
    }
}

/// Unrecognized categorical value on one of the difficulty axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalParseError {
    pub axis: &'static str,
    pub value: String,
}

impl SignalParseError {
    fn new(axis: &'static str, value: &str) -> Self {
        Self {
            axis,
            value: value.to_string(),
        }
    }
}

impl Display for SignalParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid {} value `{}`; expected one of the three {} levels",
            self.axis, self.value, self.axis
        )
    }
}

impl Error for SignalParseError {}

/// Immutable record of one performed (or scheduled) task run.
///
/// Rows are only ever inserted and deleted. Deletion must be paired with a
/// compensating ledger debit of `cost`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInstance {
    pub uuid: TaskId,
    pub group_id: GroupId,
    /// Assigned runner. Name is snapshotted at assignment time.
    pub assignee: MemberRef,
    /// Restaurant/venue label the run is for.
    pub venue: String,
    pub distance: Distance,
    pub wait: Wait,
    pub money: Money,
    /// Weighted difficulty score computed at creation time.
    pub cost: u32,
    /// Optional free-text note.
    pub notes: Option<String>,
    /// True when the actual assignee differs from the rotation's proposal.
    pub was_override: bool,
    /// Audit trail: who the rotation would have chosen. `Some` iff
    /// `was_override` is true.
    pub suggested: Option<MemberRef>,
    pub created_at_epoch_ms: i64,
}

impl TaskInstance {
    /// Checks structural bounds and override audit consistency.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.venue.trim().is_empty() {
            return Err(TaskValidationError::EmptyVenue);
        }
        let venue_chars = self.venue.chars().count();
        if venue_chars > MAX_VENUE_CHARS {
            return Err(TaskValidationError::VenueTooLong(venue_chars));
        }
        if let Some(notes) = &self.notes {
            let notes_chars = notes.chars().count();
            if notes_chars > MAX_NOTES_CHARS {
                return Err(TaskValidationError::NotesTooLong(notes_chars));
            }
        }
        if self.was_override != self.suggested.is_some() {
            return Err(TaskValidationError::InconsistentOverrideAudit);
        }
        if let Some(suggested) = &self.suggested {
            if suggested.member_id == self.assignee.member_id {
                return Err(TaskValidationError::InconsistentOverrideAudit);
            }
        }
        Ok(())
    }
}

/// Structural validation failure for a task instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyVenue,
    VenueTooLong(usize),
    NotesTooLong(usize),
    /// Override flag and suggested-member audit fields disagree.
    InconsistentOverrideAudit,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyVenue => write!(f, "venue label cannot be empty"),
            Self::VenueTooLong(len) => {
                write!(f, "venue label is {len} chars, maximum is {MAX_VENUE_CHARS}")
            }
            Self::NotesTooLong(len) => {
                write!(f, "notes are {len} chars, maximum is {MAX_NOTES_CHARS}")
            }
            Self::InconsistentOverrideAudit => {
                write!(f, "override flag and suggested-member audit fields disagree")
            }
        }
    }
}

impl Error for TaskValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::member::MemberRef;
    use uuid::Uuid;

    fn sample_task() -> TaskInstance {
        TaskInstance {
            uuid: Uuid::new_v4(),
            group_id: Uuid::new_v4(),
            assignee: MemberRef {
                member_id: Uuid::new_v4(),
                name: "Ada".to_string(),
            },
            venue: "Trattoria da Mario".to_string(),
            distance: Distance::Medium,
            wait: Wait::High,
            money: Money::Low,
            cost: 14,
            notes: None,
            was_override: false,
            suggested: None,
            created_at_epoch_ms: 0,
        }
    }

    #[test]
    fn base_point_tables_match_contract() {
        assert_eq!(Distance::Short.base_points(), 3);
        assert_eq!(Distance::Medium.base_points(), 6);
        assert_eq!(Distance::Long.base_points(), 10);
        assert_eq!(Wait::Low.base_points(), 2);
        assert_eq!(Wait::Medium.base_points(), 5);
        assert_eq!(Wait::High.base_points(), 8);
        assert_eq!(Money::Low.base_points(), 2);
        assert_eq!(Money::Medium.base_points(), 4);
        assert_eq!(Money::High.base_points(), 7);
    }

    #[test]
    fn parse_rejects_unknown_values() {
        let err = Distance::parse("teleport").unwrap_err();
        assert_eq!(err.axis, "distance");
        assert_eq!(err.value, "teleport");
        assert!(Wait::parse("eternal").is_err());
        assert!(Money::parse("free").is_err());
    }

    #[test]
    fn parse_roundtrips_canonical_strings() {
        for distance in [Distance::Short, Distance::Medium, Distance::Long] {
            assert_eq!(Distance::parse(distance.as_str()).unwrap(), distance);
        }
        for wait in [Wait::Low, Wait::Medium, Wait::High] {
            assert_eq!(Wait::parse(wait.as_str()).unwrap(), wait);
        }
        for money in [Money::Low, Money::Medium, Money::High] {
            assert_eq!(Money::parse(money.as_str()).unwrap(), money);
        }
    }

    #[test]
    fn validate_rejects_empty_and_oversized_fields() {
        let mut task = sample_task();
        task.venue = "  ".to_string();
        assert_eq!(task.validate(), Err(TaskValidationError::EmptyVenue));

        let mut task = sample_task();
        task.venue = "x".repeat(101);
        assert_eq!(task.validate(), Err(TaskValidationError::VenueTooLong(101)));

        let mut task = sample_task();
        task.notes = Some("n".repeat(501));
        assert_eq!(task.validate(), Err(TaskValidationError::NotesTooLong(501)));
    }

    #[test]
    fn validate_rejects_inconsistent_override_audit() {
        let mut task = sample_task();
        task.was_override = true;
        assert_eq!(
            task.validate(),
            Err(TaskValidationError::InconsistentOverrideAudit)
        );

        let mut task = sample_task();
        task.suggested = Some(task.assignee.clone());
        task.was_override = true;
        assert_eq!(
            task.validate(),
            Err(TaskValidationError::InconsistentOverrideAudit)
        );
    }
}
