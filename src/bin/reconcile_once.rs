use anyhow::{Context, Result};
use clap::Parser;
use notifications::{
    config::ConfigLoader, db, deficiencies::default_registry, reconcile::ReconcileEngine,
    repositories::TenantRepository,
};
use uuid::Uuid;

/// Run a single reconciliation pass and print a JSON summary per tenant.
///
/// Useful for backfills after imports and for verifying generator changes
/// without waiting for the background scheduler.
#[derive(Parser, Debug)]
#[command(name = "reconcile_once")]
struct Cli {
    /// Reconcile only this tenant instead of every tenant.
    #[arg(long)]
    tenant_id: Option<Uuid>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loader = ConfigLoader::new();
    let config = loader.load().context("loading configuration")?;

    let db = db::init_pool(&config)
        .await
        .context("initializing database connection pool")?;

    let tenant_ids = match cli.tenant_id {
        Some(id) => vec![id],
        None => TenantRepository::new(&db)
            .list_tenants()
            .await
            .context("listing tenants")?
            .into_iter()
            .map(|tenant| tenant.id)
            .collect(),
    };

    let registry = default_registry(&config.reconcile.portal_base_url);
    let engine = ReconcileEngine::new(db.clone(), registry);

    for tenant_id in tenant_ids {
        let summary = engine.reconcile(tenant_id).await;
        let line = serde_json::json!({
            "tenant_id": tenant_id,
            "summary": summary,
        });
        println!("{}", line);
    }

    Ok(())
}
