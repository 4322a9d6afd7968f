//! Maps verified token claims to the caller identity used by the file service.
//!
//! Nothing in this module checks signatures. Claims must come from
//! [`crate::utils::auth::validate_jwt`] (or an equivalent upstream layer)
//! before they reach [`Identity::from_claims`].

use crate::utils::auth::Claims;
use serde::Serialize;
use utoipa::ToSchema;

pub const ANONYMOUS_ID: &str = "anonymous";
pub const UNKNOWN_EMAIL: &str = "unknown";
pub const DEFAULT_ROLE: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Identity {
    /// Claims consumed, in order of preference:
    /// - id: `sub`, then `cognito:username`
    /// - email: `email`
    /// - role: `custom:role`, then `role`
    pub fn from_claims(claims: &Claims) -> Self {
        let id = present(&claims.sub)
            .or(present(&claims.username))
            .unwrap_or(ANONYMOUS_ID);

        let email = present(&claims.email).unwrap_or(UNKNOWN_EMAIL);

        let role = present(&claims.custom_role)
            .or(present(&claims.role))
            .unwrap_or(DEFAULT_ROLE);

        Self {
            id: id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }
}

/// An empty claim counts as absent.
fn present(claim: &Option<String>) -> Option<&str> {
    claim.as_deref().filter(|s| !s.is_empty())
}
