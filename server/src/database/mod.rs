pub mod password;
pub mod tickets;
pub mod users;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};

use shared::types::server_config::DatabaseConfig;

/// Build a lazy Postgres pool when a connection URL is configured.
///
/// The pool connects on first use, so an unreachable database delays the
/// first query rather than the whole boot. `None` means no URL at all —
/// handlers answer 503 for data endpoints.
pub fn connect(config: &DatabaseConfig) -> Option<PgPool> {
    let url = config.resolved_url()?;

    match PgPoolOptions::new()
        .max_connections(config.pool_size)
        .connect_lazy(&url)
    {
        Ok(pool) => {
            info!("Database pool ready (size {})", config.pool_size);
            Some(pool)
        }
        Err(e) => {
            error!("Invalid database URL: {}", e);
            None
        }
    }
}
