use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{config::AppConfig, services::ServiceContext};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DatabaseConnection,
    pub services: ServiceContext,
}

impl AppState {
    /// Builds the service graph once; handlers share it through the `Arc`.
    pub fn new(config: AppConfig, db: DatabaseConnection) -> Arc<Self> {
        let services = ServiceContext::new(&db, &config.auth);
        Arc::new(Self {
            config,
            db,
            services,
        })
    }
}
