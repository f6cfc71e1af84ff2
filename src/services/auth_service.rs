use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        AccessPayload, RevokeOutcome, TokenBundle, TokenService,
        password::{check_strength, hash_password, verify_password},
    },
    error::{AppError, FieldError},
    services::user_service::{UserProfile, UserService},
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const INVALID_REFRESH_TOKEN: &str = "Invalid or expired refresh token";
const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
const USERNAME_PATTERN: &str = r"^[A-Za-z0-9_]{3,30}$";

static EMAIL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(EMAIL_PATTERN).ok());
static USERNAME_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(USERNAME_PATTERN).ok());

// Verified against when the email is unknown so both login failures cost
// one argon2 verification.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("dummy-password-for-timing").ok());

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResult {
    pub user: UserProfile,
    pub tokens: TokenBundle,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(email))
}

fn is_valid_username(username: &str) -> bool {
    USERNAME_RE.as_ref().is_some_and(|re| re.is_match(username))
}

#[derive(Clone)]
pub struct AuthService {
    users: UserService,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(users: UserService, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub async fn register(&self, input: RegisterInput) -> Result<AuthResult, AppError> {
        let email = normalize_email(&input.email);
        let username = input.username.trim().to_string();

        let mut errors = Vec::new();
        if !is_valid_email(&email) {
            errors.push(FieldError::new("email", "Email must be a valid address"));
        }
        if !is_valid_username(&username) {
            errors.push(FieldError::new(
                "username",
                "Username must be 3-30 letters, digits or underscores",
            ));
        }
        if input.password != input.confirm_password {
            errors.push(FieldError::new("confirm_password", "Passwords do not match"));
        }
        if let Err(err) = check_strength(&input.password) {
            errors.extend(err.field_errors().iter().cloned());
        }
        if !errors.is_empty() {
            return Err(AppError::validation(errors));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("Email already registered"));
        }
        if self.users.find_by_username(&username).await?.is_some() {
            return Err(AppError::conflict("Username already taken"));
        }

        let password_hash = hash_password(&input.password)?;
        let user = self
            .users
            .create_user(&email, &username, &password_hash)
            .await?;
        info!(user_id = %user.id, "user registered");

        let tokens = self.tokens.generate_tokens(&AccessPayload::from(&user)).await?;
        Ok(AuthResult {
            user: UserProfile::from(&user),
            tokens,
        })
    }

    /// Unknown email, wrong password and an unreadable stored hash all fail
    /// with the same message.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResult, AppError> {
        let email = normalize_email(email);

        let Some(user) = self.users.find_by_email(&email).await? else {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(password, dummy);
            }
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        match verify_password(password, &user.password_hash) {
            Ok(true) => {}
            Ok(false) => return Err(AppError::unauthorized(INVALID_CREDENTIALS)),
            Err(err) => {
                warn!(user_id = %user.id, error = %err.detail(), "stored password hash unreadable");
                return Err(AppError::unauthorized(INVALID_CREDENTIALS));
            }
        }

        let tokens = self.tokens.generate_tokens(&AccessPayload::from(&user)).await?;
        Ok(AuthResult {
            user: UserProfile::from(&user),
            tokens,
        })
    }

    /// Rotation: the presented token is consumed before a new pair is issued,
    /// and only one concurrent caller can consume it.
    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenBundle, AppError> {
        let user_id = self
            .tokens
            .verify_refresh_token(refresh_token)
            .await?
            .ok_or_else(|| AppError::unauthorized(INVALID_REFRESH_TOKEN))?;

        let Some(user) = self.users.find_by_id(&user_id).await? else {
            self.tokens.revoke_refresh_token(refresh_token).await;
            return Err(AppError::unauthorized(INVALID_REFRESH_TOKEN));
        };

        if !self.tokens.consume_refresh_token(refresh_token).await? {
            warn!(user_id = %user.id, "refresh token already consumed");
            return Err(AppError::unauthorized(INVALID_REFRESH_TOKEN));
        }

        self.tokens.generate_tokens(&AccessPayload::from(&user)).await
    }

    pub async fn logout(&self, refresh_token: &str) -> RevokeOutcome {
        self.tokens.revoke_refresh_token(refresh_token).await
    }

    pub async fn logout_all_devices(&self, user_id: &Uuid) -> RevokeOutcome {
        let outcome = self.tokens.revoke_all_user_tokens(user_id).await;
        info!(%user_id, ?outcome, "logged out of all devices");
        outcome
    }

    pub async fn profile(&self, user_id: &Uuid) -> Result<UserProfile, AppError> {
        self.users.profile(user_id).await
    }
}
