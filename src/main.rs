//! Wiring & DI. Entry point: bootstrap the catalog, store and service.
//! No business logic here; schema problems are programmer errors and
//! abort startup instead of surfacing per request.

use fabrica_core::adapters::persistence::JsonStore;
use fabrica_core::domain::EntityKind;
use fabrica_core::domain::catalog::factory_catalog;
use fabrica_core::ports::AdminPort;
use fabrica_core::shared::config::AppConfig;
use fabrica_core::usecases::AdminService;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = AppConfig::load().unwrap_or_default();
    let data_dir = cfg.data_dir_or_default();
    let op_timeout = Duration::from_millis(cfg.op_timeout_ms_or_default());

    // Catalog registration: SchemaConflict here means a misconfigured
    // deployment, so bail before accepting any work.
    let registry = Arc::new(factory_catalog()?);

    let kinds: Vec<EntityKind> = registry.kinds().iter().map(|d| d.kind).collect();
    let store = JsonStore::new(&data_dir);
    store.load(&kinds).await?;
    info!(path = %data_dir, "collections loaded");

    let service = AdminService::new(registry, Arc::new(store), op_timeout);

    // Menu the admin console renders, one line per kind.
    for descriptor in service.kinds() {
        info!(
            group = descriptor.group.label(),
            kind = %descriptor.kind,
            "registered resource"
        );
    }
    info!("factory back-office core ready");

    Ok(())
}
