use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::entities::user;

/// Identity embedded in an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPayload {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
}

impl From<&user::Model> for AccessPayload {
    fn from(user: &user::Model) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub username: String,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenBundle {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

/// Result of a revocation. Store failures are reported, never raised, so
/// logout cannot fail the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    Revoked(u64),
    NothingToRevoke,
    StoreUnavailable,
}

impl RevokeOutcome {
    pub fn from_rows(rows_affected: u64) -> Self {
        if rows_affected == 0 {
            Self::NothingToRevoke
        } else {
            Self::Revoked(rows_affected)
        }
    }

    pub fn revoked(&self) -> bool {
        matches!(self, Self::Revoked(_))
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{Claims, RevokeOutcome};

    #[test]
    fn revoke_outcome_from_row_counts() {
        assert_eq!(RevokeOutcome::from_rows(0), RevokeOutcome::NothingToRevoke);
        assert_eq!(RevokeOutcome::from_rows(2), RevokeOutcome::Revoked(2));
        assert!(RevokeOutcome::Revoked(1).revoked());
        assert!(!RevokeOutcome::NothingToRevoke.revoked());
        assert!(!RevokeOutcome::StoreUnavailable.revoked());
    }

    #[test]
    fn claims_subject_parses_as_user_id() {
        let id = Uuid::new_v4();
        let mut claims = Claims {
            sub: id.to_string(),
            email: "a@example.com".to_string(),
            username: "alice".to_string(),
            iat: 0,
            exp: 0,
        };
        assert_eq!(claims.user_id(), Some(id));

        claims.sub = "not-a-uuid".to_string();
        assert_eq!(claims.user_id(), None);
    }
}
