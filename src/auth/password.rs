use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::thread_rng;

use crate::error::{AppError, FieldError};

const MIN_PASSWORD_LEN: usize = 8;
pub const PASSWORD_SYMBOLS: &str = "@$!%*?&";

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut thread_rng());
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| AppError::internal(format!("password hashing failed: {err}")))?
        .to_string();
    Ok(hash)
}

/// `Ok(false)` on mismatch; an unparsable stored hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|err| AppError::internal(format!("invalid stored password hash: {err}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Every failed rule is reported, not just the first.
pub fn check_strength(password: &str) -> Result<(), AppError> {
    let mut errors = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push(FieldError::new(
            "password",
            "Password must contain a lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push(FieldError::new(
            "password",
            "Password must contain an uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(FieldError::new("password", "Password must contain a digit"));
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        errors.push(FieldError::new(
            "password",
            format!("Password must contain one of {PASSWORD_SYMBOLS}"),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::{check_strength, hash_password, verify_password};

    #[test]
    fn hash_differs_from_plaintext_and_verifies() {
        let hash = hash_password("Str0ng!pass").expect("hash should succeed");

        assert_ne!(hash, "Str0ng!pass");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Str0ng!pass", &hash).expect("verify should succeed"));
        assert!(!verify_password("wrong", &hash).expect("verify should succeed"));
    }

    #[test]
    fn same_password_hashes_differently() {
        let a = hash_password("Str0ng!pass").expect("hash should succeed");
        let b = hash_password("Str0ng!pass").expect("hash should succeed");
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn strong_password_passes() {
        assert!(check_strength("Abcdef1!").is_ok());
    }

    #[test]
    fn weak_password_reports_every_failed_rule() {
        let err = check_strength("abc").expect_err("should be rejected");
        let messages: Vec<&str> = err
            .field_errors()
            .iter()
            .map(|e| e.message.as_str())
            .collect();

        assert_eq!(messages.len(), 4, "{messages:?}");
        assert!(err.field_errors().iter().all(|e| e.field == "password"));
    }

    #[test]
    fn symbol_must_come_from_fixed_set() {
        let err = check_strength("Abcdef12#").expect_err("# is not an accepted symbol");
        assert_eq!(err.field_errors().len(), 1);
        assert!(err.field_errors()[0].message.contains("@$!%*?&"));
    }
}
