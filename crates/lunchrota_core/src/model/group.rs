//! Group aggregate: roster, admin, weight vector and admission code.
//!
//! # Responsibility
//! - Hold the ordered roster consumed by the rotation selector.
//! - Own the per-group weight vector with its [0, 2] axis bounds.
//!
//! # Invariants
//! - No two members share an identity within one group.
//! - The admin identity always refers to a current roster member; the admin
//!   cannot be removed, only group deletion ends adminship.
//! - Roster order is join order and is preserved through persistence so
//!   tie-breaks stay deterministic.

use crate::model::member::{Member, MemberId};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a group.
pub type GroupId = Uuid;

const MIN_NAME_CHARS: usize = 2;
const MAX_NAME_CHARS: usize = 50;

/// Lower/upper bound for every weight axis.
pub const WEIGHT_MIN: f64 = 0.0;
pub const WEIGHT_MAX: f64 = 2.0;

/// Per-axis multipliers applied to base difficulty points.
///
/// Defaults favor distance over wait over fronted money, matching the
/// rotation's notion of which burden feels heaviest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
    pub distance: f64,
    pub wait: f64,
    pub money: f64,
}

impl Default for WeightVector {
    fn default() -> Self {
        Self {
            distance: 1.0,
            wait: 0.8,
            money: 0.6,
        }
    }
}

impl WeightVector {
    /// Builds a vector, rejecting axes outside `[WEIGHT_MIN, WEIGHT_MAX]`.
    pub fn new(distance: f64, wait: f64, money: f64) -> Result<Self, WeightError> {
        let vector = Self {
            distance,
            wait,
            money,
        };
        vector.validate()?;
        Ok(vector)
    }

    /// Checks every axis against the shared bounds.
    pub fn validate(&self) -> Result<(), WeightError> {
        check_axis("distance", self.distance)?;
        check_axis("wait", self.wait)?;
        check_axis("money", self.money)?;
        Ok(())
    }

    /// Applies a partial update, keeping current values for unset axes.
    ///
    /// This is the explicit counterpart of merge-over-defaults: unset fields
    /// never silently reset an axis.
    pub fn merged_with(&self, update: &WeightUpdate) -> Result<Self, WeightError> {
        Self::new(
            update.distance.unwrap_or(self.distance),
            update.wait.unwrap_or(self.wait),
            update.money.unwrap_or(self.money),
        )
    }
}

/// Partial weight change: only the set axes are touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightUpdate {
    pub distance: Option<f64>,
    pub wait: Option<f64>,
    pub money: Option<f64>,
}

fn check_axis(axis: &'static str, value: f64) -> Result<(), WeightError> {
    if !value.is_finite() || !(WEIGHT_MIN..=WEIGHT_MAX).contains(&value) {
        return Err(WeightError::OutOfRange { axis, value });
    }
    Ok(())
}

/// Weight axis outside the permitted range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeightError {
    OutOfRange { axis: &'static str, value: f64 },
}

impl Display for WeightError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { axis, value } => write!(
                f,
                "{axis} weight {value} is outside [{WEIGHT_MIN}, {WEIGHT_MAX}]"
            ),
        }
    }
}

impl Error for WeightError {}

/// The group aggregate consumed by rotation and fairness logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub uuid: GroupId,
    pub name: String,
    /// Identity of the administrator; always a current roster member.
    pub admin_id: MemberId,
    /// Six-character human-shareable admission code, unique across groups.
    pub invite_code: String,
    /// Roster in join order.
    pub members: Vec<Member>,
    pub weights: WeightVector,
    /// Soft-delete flag; inactive groups are excluded from rotation,
    /// admission and listing.
    pub is_active: bool,
    pub created_at_epoch_ms: i64,
}

impl Group {
    /// Creates a group whose creator becomes administrator and first member.
    pub fn new(
        name: impl Into<String>,
        admin_id: MemberId,
        admin_name: impl Into<String>,
        invite_code: impl Into<String>,
        created_at_epoch_ms: i64,
    ) -> Result<Self, GroupValidationError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            uuid: Uuid::new_v4(),
            name,
            admin_id,
            invite_code: invite_code.into(),
            members: vec![Member::new(admin_id, admin_name, created_at_epoch_ms)],
            weights: WeightVector::default(),
            is_active: true,
            created_at_epoch_ms,
        })
    }

    pub fn member(&self, member_id: MemberId) -> Option<&Member> {
        self.members
            .iter()
            .find(|member| member.member_id == member_id)
    }

    pub fn is_member(&self, member_id: MemberId) -> bool {
        self.member(member_id).is_some()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// Validates a group display name against schema bounds.
pub fn validate_name(name: &str) -> Result<(), GroupValidationError> {
    let chars = name.trim().chars().count();
    if chars < MIN_NAME_CHARS {
        return Err(GroupValidationError::NameTooShort(chars));
    }
    if chars > MAX_NAME_CHARS {
        return Err(GroupValidationError::NameTooLong(chars));
    }
    Ok(())
}

/// Structural validation failure for a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupValidationError {
    NameTooShort(usize),
    NameTooLong(usize),
}

impl Display for GroupValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameTooShort(len) => write!(
                f,
                "group name is {len} chars, minimum is {MIN_NAME_CHARS}"
            ),
            Self::NameTooLong(len) => {
                write!(f, "group name is {len} chars, maximum is {MAX_NAME_CHARS}")
            }
        }
    }
}

impl Error for GroupValidationError {}
