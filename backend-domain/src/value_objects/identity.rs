// Identity value objects

use serde::{Deserialize, Serialize};

use crate::value_objects::Role;

/// Identity attached to a verified bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub uid: String,
    pub email: String,
    pub roles: Vec<Role>,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.has_role(*role))
    }
}

/// Owner resolution for a ticket at issuance time.
///
/// `Guest` leaves the ticket unbound and arms orphan recovery for the
/// given email. `NewAccount` is only produced by paid self-checkout when
/// an account was created synchronously during the purchase.
#[derive(Debug, Clone)]
pub enum ResolvedIdentity {
    Bound { uid: String },
    Guest { email: String },
    NewAccount { uid: String, custom_token: Option<String> },
}

impl ResolvedIdentity {
    pub fn uid(&self) -> Option<&str> {
        match self {
            ResolvedIdentity::Bound { uid } => Some(uid),
            ResolvedIdentity::NewAccount { uid, .. } => Some(uid),
            ResolvedIdentity::Guest { .. } => None,
        }
    }
}
