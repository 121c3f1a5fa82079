//! SeaORM connection pool setup and liveness probing for the
//! notifications service.

use std::time::Duration;

use anyhow::{Context, Result};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement,
};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::AppConfig;

/// Errors raised while establishing the connection pool.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("failed to connect to database: {source}")]
    ConnectionFailed {
        #[from]
        source: DbErr,
    },
    #[error("invalid database configuration: {message}")]
    InvalidConfiguration { message: String },
}

const CONNECT_ATTEMPTS: u32 = 5;
const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Open the connection pool described by the configuration.
///
/// Transient startup failures (a database that is still booting, say) are
/// retried with exponential backoff before giving up.
pub async fn init_pool(cfg: &AppConfig) -> Result<DatabaseConnection> {
    if cfg.database_url.is_empty() {
        return Err(DatabaseError::InvalidConfiguration {
            message: "database URL cannot be empty".to_string(),
        }
        .into());
    }

    let mut options = ConnectOptions::new(&cfg.database_url);
    options
        .max_connections(cfg.db_max_connections)
        .acquire_timeout(Duration::from_millis(cfg.db_acquire_timeout_ms))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let pool = connect_with_backoff(options)
        .await
        .map_err(DatabaseError::from)?;
    Ok(pool)
}

async fn connect_with_backoff(options: ConnectOptions) -> Result<DatabaseConnection, DbErr> {
    let mut delay = INITIAL_RETRY_DELAY;
    let mut attempt = 1u32;

    loop {
        match Database::connect(options.clone()).await {
            Ok(conn) => {
                info!(attempt, "Database connection established");
                return Ok(conn);
            }
            Err(err) if attempt < CONNECT_ATTEMPTS => {
                warn!(
                    attempt,
                    error = %err,
                    retry_in_ms = delay.as_millis() as u64,
                    "Database connection failed, retrying"
                );
                sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            Err(err) => {
                error!(
                    attempts = CONNECT_ATTEMPTS,
                    error = %err,
                    "Giving up on database connection"
                );
                return Err(err);
            }
        }
    }
}

/// Cheap liveness probe backing the health endpoint.
pub async fn health_check(db: &DatabaseConnection) -> Result<()> {
    let probe = Statement::from_string(db.get_database_backend(), "SELECT 1".to_string());

    db.query_one(probe)
        .await
        .context("database health check failed")?;

    Ok(())
}
