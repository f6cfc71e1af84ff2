use anyhow::{Result, bail};

use super::AppConfig;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.general.host.trim().is_empty() {
        errors.push("general.host must not be empty".to_string());
    }

    if cfg.database.url.trim().is_empty() {
        errors.push("database.url must not be empty".to_string());
    }

    if cfg.database.min_idle > cfg.database.max_connections {
        errors.push(format!(
            "database.min_idle ({}) must be <= database.max_connections ({})",
            cfg.database.min_idle, cfg.database.max_connections
        ));
    }

    let auth = &cfg.auth;
    if auth.jwt_secret.trim().is_empty() {
        errors.push("auth.jwt_secret must not be empty".to_string());
    }

    if auth.refresh_secret.trim().is_empty() {
        errors.push("auth.refresh_secret must not be empty".to_string());
    }

    if !auth.jwt_secret.is_empty() && auth.jwt_secret == auth.refresh_secret {
        errors.push("auth.refresh_secret must differ from auth.jwt_secret".to_string());
    }

    if auth.access_token_ttl_secs == 0 {
        errors.push("auth.access_token_ttl_secs must be > 0".to_string());
    }

    if auth.reaper_interval_secs == 0 {
        errors.push("auth.reaper_interval_secs must be > 0".to_string());
    }

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}

#[cfg(test)]
mod tests {
    use super::validate;
    use crate::config::AppConfig;

    fn valid_config() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.auth.jwt_secret = "access-secret".to_string();
        cfg.auth.refresh_secret = "refresh-secret".to_string();
        cfg
    }

    #[test]
    fn accepts_complete_config() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn missing_secrets_are_reported_together() {
        let err = validate(&AppConfig::default()).expect_err("secrets are required");
        let message = err.to_string();

        assert!(message.contains("auth.jwt_secret must not be empty"));
        assert!(message.contains("auth.refresh_secret must not be empty"));
    }

    #[test]
    fn rejects_shared_secret() {
        let mut cfg = valid_config();
        cfg.auth.refresh_secret = cfg.auth.jwt_secret.clone();

        let err = validate(&cfg).expect_err("shared secret should fail");
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn rejects_min_idle_above_max_connections() {
        let mut cfg = valid_config();
        cfg.database.min_idle = 20;
        cfg.database.max_connections = 5;

        let err = validate(&cfg).expect_err("pool bounds should fail");
        assert!(err.to_string().contains("database.min_idle (20)"));
    }

    #[test]
    fn rejects_zero_intervals() {
        let mut cfg = valid_config();
        cfg.auth.access_token_ttl_secs = 0;
        cfg.auth.reaper_interval_secs = 0;

        let message = validate(&cfg).expect_err("zero ttl should fail").to_string();
        assert!(message.contains("auth.access_token_ttl_secs must be > 0"));
        assert!(message.contains("auth.reaper_interval_secs must be > 0"));
    }
}
