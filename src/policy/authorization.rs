// teamcal-service/src/policy/authorization.rs
// Who may list, create, update or delete schedules.

use crate::models::{LoadedSchedule, ServiceError, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Index,
    Create,
    Update,
    Destroy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    NotOnTeam,
    // Reported like a missing schedule so existence is never confirmed
    NotFoundOrForbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied(Denial),
}

/// Decide whether `actor` may perform `action`.
///
/// `schedule` is the target for update/destroy (`None` when it does not
/// exist) and is ignored for index/create.
pub fn authorize(action: Action, schedule: Option<&LoadedSchedule>, actor: &User) -> Decision {
    match action {
        Action::Index | Action::Create => {
            if actor.team_id.is_some() {
                Decision::Allowed
            } else {
                Decision::Denied(Denial::NotOnTeam)
            }
        }
        Action::Update | Action::Destroy => match schedule {
            Some(s) if s.is_creator(actor.id) || s.is_participant(actor.id) => Decision::Allowed,
            _ => Decision::Denied(Denial::NotFoundOrForbidden),
        },
    }
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }

    pub fn into_result(self, action: Action) -> Result<(), ServiceError> {
        match self {
            Decision::Allowed => Ok(()),
            Decision::Denied(Denial::NotOnTeam) => Err(ServiceError::Forbidden(format!(
                "You are not on a team, so you cannot {}.",
                match action {
                    Action::Index => "view schedules",
                    _ => "create schedules",
                }
            ))),
            Decision::Denied(Denial::NotFoundOrForbidden) => Err(ServiceError::NotFound(format!(
                "Schedule not found or you do not have permission to {} it.",
                match action {
                    Action::Destroy => "delete",
                    _ => "update",
                }
            ))),
        }
    }
}
