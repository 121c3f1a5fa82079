//! Binary entry point for the Traineo notifications service.

use migration::MigratorTrait;
use notifications::{config::ConfigLoader, db, server::run_server, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Tracing takes its level from config, so the loader runs first and a
    // load failure surfaces on stderr before any subscriber exists.
    let config = ConfigLoader::new().load()?;
    telemetry::init_tracing(&config)?;

    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!("Configuration: {}", redacted_json);
    }

    let db = db::init_pool(&config).await?;
    migration::Migrator::up(&db, None).await?;

    run_server(config, db).await
}
