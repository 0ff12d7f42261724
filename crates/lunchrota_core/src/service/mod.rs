//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate scoring, rotation and repository calls into use-case APIs.
//! - Keep callers decoupled from SQL and from the pure scheduling math.

pub mod group_service;
pub mod task_service;

use crate::model::group::{GroupId, GroupValidationError, WeightError};
use crate::model::member::MemberId;
use crate::repo::RepoError;
use crate::scoring::rotation::RotationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Use-case level error: domain rule violations plus wrapped lower layers.
#[derive(Debug)]
pub enum ServiceError {
    Repo(RepoError),
    Rotation(RotationError),
    GroupValidation(GroupValidationError),
    Weight(WeightError),
    GroupNotFound(GroupId),
    /// No active group carries this admission code.
    UnknownInviteCode(String),
    AlreadyMember(MemberId),
    /// Admins may not remove themselves or leave; deleting the group is the
    /// only admin exit.
    AdminCannotLeave(MemberId),
    /// Selection requested on a roster with no members.
    EmptyRoster(GroupId),
    /// Admission-code generation kept colliding with existing codes.
    InviteCodesExhausted,
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Rotation(err) => write!(f, "{err}"),
            Self::GroupValidation(err) => write!(f, "{err}"),
            Self::Weight(err) => write!(f, "{err}"),
            Self::GroupNotFound(id) => write!(f, "group not found: {id}"),
            Self::UnknownInviteCode(code) => {
                write!(f, "no active group with admission code `{code}`")
            }
            Self::AlreadyMember(id) => write!(f, "member already in group: {id}"),
            Self::AdminCannotLeave(id) => {
                write!(f, "admin {id} cannot leave; delete the group instead")
            }
            Self::EmptyRoster(id) => write!(f, "group {id} has no members to rotate"),
            Self::InviteCodesExhausted => {
                write!(f, "could not mint an unused admission code")
            }
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Rotation(err) => Some(err),
            Self::GroupValidation(err) => Some(err),
            Self::Weight(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<RotationError> for ServiceError {
    fn from(value: RotationError) -> Self {
        Self::Rotation(value)
    }
}

impl From<GroupValidationError> for ServiceError {
    fn from(value: GroupValidationError) -> Self {
        Self::GroupValidation(value)
    }
}

impl From<WeightError> for ServiceError {
    fn from(value: WeightError) -> Self {
        Self::Weight(value)
    }
}
