//! Who may do what to which record.
//!
//! Handlers ask [`can`] before touching the store. For experience records the answer for
//! a foreign record is turned into `NotFound`, so a caller cannot learn whether another
//! user's record exists.

use uuid::Uuid;

use crate::{auth::AuthUser, error::ApiError, models::Owned};

/// The identity a request runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    Account { id: Uuid, is_staff: bool },
}

impl From<&AuthUser> for Caller {
    fn from(user: &AuthUser) -> Self {
        Caller::Account {
            id: user.id,
            is_staff: user.is_staff,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    HealthCheck,
    Register,
    Login,
    Logout,
    /// Public listings of every user's experiences.
    ListPublic,
    /// Public detail view of any account.
    ViewPublicUser,
    ReadProfile,
    UpdateProfile,
    CreateExperience,
    ListOwnExperiences,
    ReadExperience,
    UpdateExperience,
    DeleteExperience,
    Administer,
}

/// can
///
/// Decides whether `caller` may perform `action`. Record-scoped actions need the record;
/// without one the answer is `false`. Staff rights only open the admin surface, they do
/// not grant access to other users' records.
pub fn can(caller: &Caller, action: Action, record: Option<&dyn Owned>) -> bool {
    use Action::*;

    match (caller, action) {
        (_, HealthCheck | Register | Login | ListPublic | ViewPublicUser) => true,
        (Caller::Anonymous, _) => false,
        (Caller::Account { .. }, Logout | CreateExperience | ListOwnExperiences) => true,
        (Caller::Account { id, .. }, ReadProfile | UpdateProfile | ReadExperience | UpdateExperience | DeleteExperience) => {
            record.is_some_and(|r| r.owner_id() == *id)
        }
        (Caller::Account { is_staff, .. }, Administer) => *is_staff,
    }
}

/// Returns the record when the caller may act on it, `NotFound` otherwise. Absence and
/// foreign ownership are reported identically.
pub fn authorize_record<T: Owned>(
    caller: &Caller,
    action: Action,
    record: Option<T>,
    not_found: &'static str,
) -> Result<T, ApiError> {
    match record {
        Some(record) if can(caller, action, Some(&record)) => Ok(record),
        _ => Err(ApiError::NotFound(not_found)),
    }
}

/// Staff gate for the admin surface.
pub fn require_staff(user: &AuthUser) -> Result<(), ApiError> {
    if can(&Caller::from(user), Action::Administer, None) {
        Ok(())
    } else {
        tracing::warn!(user_id = %user.id, "non-staff caller rejected from admin surface");
        Err(ApiError::Forbidden)
    }
}
