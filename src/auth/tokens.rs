use chrono::Utc;
use tracing::{error, warn};
use uuid::Uuid;

use super::{
    AccessPayload, Claims, RevokeOutcome, TokenBundle,
    duration::parse_ttl,
    jwt::{JwtKeys, decode_access_token, encode_token, make_access_claims, now_unix, read_expiry},
};
use crate::{
    config::{AuthConfig, defaults::DEFAULT_ACCESS_TOKEN_TTL_SECS},
    db::dao::RefreshTokenDao,
    error::AppError,
};

/// Issues, verifies, rotates and revokes the access/refresh token pair.
#[derive(Clone)]
pub struct TokenService {
    refresh_tokens: RefreshTokenDao,
    access_keys: JwtKeys,
    access_ttl_secs: usize,
    refresh_ttl: chrono::Duration,
}

impl TokenService {
    pub fn new(refresh_tokens: RefreshTokenDao, cfg: &AuthConfig) -> Self {
        Self {
            refresh_tokens,
            access_keys: JwtKeys::from_secret(cfg.jwt_secret.as_bytes()),
            access_ttl_secs: usize::try_from(cfg.access_token_ttl_secs)
                .unwrap_or(DEFAULT_ACCESS_TOKEN_TTL_SECS as usize),
            refresh_ttl: parse_ttl(&cfg.refresh_token_ttl),
        }
    }

    pub async fn generate_tokens(&self, payload: &AccessPayload) -> Result<TokenBundle, AppError> {
        let claims = make_access_claims(payload, self.access_ttl_secs);
        let access_token = encode_token(&self.access_keys, &claims)?;

        let expires_at = Utc::now()
            .fixed_offset()
            .checked_add_signed(self.refresh_ttl)
            .ok_or_else(|| AppError::internal("refresh token expiry out of range"))?;
        let refresh = self
            .refresh_tokens
            .create_refresh_token(&payload.user_id, expires_at)
            .await?;

        let expires_in = read_expiry(&self.access_keys, &access_token)
            .map(|exp| exp.saturating_sub(now_unix()) as u64)
            .unwrap_or(DEFAULT_ACCESS_TOKEN_TTL_SECS);

        Ok(TokenBundle {
            access_token,
            refresh_token: refresh.token,
            token_type: "Bearer",
            expires_in,
        })
    }

    pub fn verify_access_token(&self, token: &str) -> Option<Claims> {
        decode_access_token(&self.access_keys, token).ok()
    }

    /// `Ok(None)` for unknown or expired tokens; expired rows are removed on
    /// sight. Only a failed lookup is an error.
    pub async fn verify_refresh_token(&self, token: &str) -> Result<Option<Uuid>, AppError> {
        let Some(stored) = self.refresh_tokens.find_by_token(token).await? else {
            return Ok(None);
        };

        if stored.expires_at <= Utc::now().fixed_offset() {
            if let Err(err) = self.refresh_tokens.delete_by_token(token).await {
                warn!(error = %err, "failed to delete expired refresh token");
            }
            return Ok(None);
        }

        Ok(Some(stored.user_id))
    }

    /// Deletes the token if it is still live. Returns `true` for exactly one
    /// caller per token.
    pub async fn consume_refresh_token(&self, token: &str) -> Result<bool, AppError> {
        let rows = self
            .refresh_tokens
            .delete_live_token(token, Utc::now().fixed_offset())
            .await?;
        Ok(rows == 1)
    }

    pub async fn revoke_refresh_token(&self, token: &str) -> RevokeOutcome {
        match self.refresh_tokens.delete_by_token(token).await {
            Ok(rows) => RevokeOutcome::from_rows(rows),
            Err(err) => {
                error!(error = %err, "refresh token revocation failed");
                RevokeOutcome::StoreUnavailable
            }
        }
    }

    pub async fn revoke_all_user_tokens(&self, user_id: &Uuid) -> RevokeOutcome {
        match self.refresh_tokens.delete_all_for_user(user_id).await {
            Ok(rows) => RevokeOutcome::from_rows(rows),
            Err(err) => {
                error!(error = %err, %user_id, "bulk refresh token revocation failed");
                RevokeOutcome::StoreUnavailable
            }
        }
    }
}
