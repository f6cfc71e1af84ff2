use ::config as config_rs;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Layered loader: optional config file first, then `APP_*` environment
/// variables on top (`APP_AUTH__JWT_SECRET` -> `auth.jwt_secret`).
pub trait EnvConfig: Sized + DeserializeOwned {
    const PREFIX: &'static str = "APP";
    const SEPARATOR: &'static str = "__";
    const FILE_VAR: &'static str = "CHESS_SERVER_CONFIG";

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Err(err) if !err.not_found() => {
                tracing::warn!("ignoring unreadable .env file: {err}");
            }
            _ => {}
        }

        let mut builder = config_rs::Config::builder();
        if let Ok(path) = std::env::var(Self::FILE_VAR) {
            builder = builder.add_source(config_rs::File::with_name(&path).required(true));
        }

        let settings = builder
            .add_source(
                config_rs::Environment::with_prefix(Self::PREFIX)
                    .prefix_separator("_")
                    .separator(Self::SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .context("failed to read config sources")?;

        let cfg = settings
            .try_deserialize::<Self>()
            .context("failed to deserialize config")?;

        cfg.validate()?;
        Ok(cfg)
    }
}
