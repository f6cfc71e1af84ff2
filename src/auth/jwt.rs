use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::{AccessPayload, Claims};
use crate::error::AppError;

#[derive(Clone)]
pub struct JwtKeys {
    pub enc: EncodingKey,
    pub dec: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            enc: EncodingKey::from_secret(secret),
            dec: DecodingKey::from_secret(secret),
        }
    }
}

pub fn now_unix() -> usize {
    usize::try_from(Utc::now().timestamp()).unwrap_or(0)
}

pub fn encode_token(keys: &JwtKeys, claims: &Claims) -> Result<String, AppError> {
    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".into());

    encode(&header, claims, &keys.enc)
        .map_err(|err| AppError::internal(format!("token encoding failed: {err}")))
}

pub fn make_access_claims(payload: &AccessPayload, ttl_secs: usize) -> Claims {
    let iat = now_unix();
    Claims {
        sub: payload.user_id.to_string(),
        email: payload.email.clone(),
        username: payload.username.clone(),
        iat,
        exp: iat.saturating_add(ttl_secs),
    }
}

/// HS256 only, expiry enforced with zero leeway.
pub fn decode_access_token(
    keys: &JwtKeys,
    token: &str,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_exp = true;
    decode::<Claims>(token, &keys.dec, &validation).map(|data| data.claims)
}

/// Reads `exp` from a token this process just signed; expiry is not checked.
pub fn read_expiry(keys: &JwtKeys, token: &str) -> Option<usize> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    decode::<Claims>(token, &keys.dec, &validation)
        .ok()
        .map(|data| data.claims.exp)
}
