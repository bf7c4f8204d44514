use crate::domain::{Role, User};
use uuid::Uuid;

/// An authenticated caller that is allowed to read analytics.
///
/// A client principal always carries its tenant, so tenant-less clients
/// cannot be represented here at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Principal {
    Agency { user_id: Uuid },
    Client { user_id: Uuid, company_id: Uuid },
}

impl Principal {
    /// Returns `None` for deactivated users and for clients with no company bound.
    pub fn from_user(user: &User) -> Option<Self> {
        if !user.is_active {
            return None;
        }

        match (user.role, user.company_id) {
            (Role::Agency, _) => Some(Principal::Agency { user_id: user.id }),
            (Role::Client, Some(company_id)) => Some(Principal::Client {
                user_id: user.id,
                company_id,
            }),
            (Role::Client, None) => None,
        }
    }

    pub fn user_id(&self) -> Uuid {
        match self {
            Principal::Agency { user_id } | Principal::Client { user_id, .. } => *user_id,
        }
    }
}
