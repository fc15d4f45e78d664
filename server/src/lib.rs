use std::sync::Arc;

use sqlx::PgPool;
use tracing::warn;

use shared::types::server_config::AppConfig;

pub mod database;
pub mod handlers;
pub mod session;
pub mod storage;

use crate::storage::ObjectStore;

/// Process-wide state, built once in `main` and cloned into every
/// connection task.
///
/// Optional members stay `None` when their backing service is
/// unconfigured; the affected surfaces answer 503 instead of the process
/// refusing to start. Nothing in here is mutable after construction.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,

    /// Resolved signing secret. `None` puts the gate into its documented
    /// misconfiguration mode (503 on protected APIs).
    pub jwt_secret: Option<Arc<str>>,

    pub db: Option<PgPool>,

    pub storage: Option<Arc<ObjectStore>>,
}

impl AppState {
    /// Resolve configuration into process state. Warnings are logged for
    /// every absent backend so a misconfigured deploy is visible at boot,
    /// not just at the first failing request.
    pub fn from_config(config: AppConfig) -> Self {
        let jwt_secret: Option<Arc<str>> =
            config.auth.resolved_jwt_secret().map(Arc::from);
        if jwt_secret.is_none() {
            warn!("JWT secret unset — protected APIs will answer 503");
        }

        let db = database::connect(&config.database);
        if db.is_none() {
            warn!("Database not configured — data endpoints will answer 503");
        }

        let storage = ObjectStore::from_config(&config.storage).map(Arc::new);
        if storage.is_none() {
            warn!("Object storage not configured — file endpoints will answer 503");
        }

        Self {
            config: Arc::new(config),
            jwt_secret,
            db,
            storage,
        }
    }
}
