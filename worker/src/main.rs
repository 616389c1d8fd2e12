use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mr_common::{apps, storage::LocalStorage};
use mr_worker::{new_worker_id, run_loop, HttpCoordinator, WorkerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mr_worker=debug,reqwest=info")),
        )
        .init();

    let config = WorkerConfig::from_env().context("configuración del worker")?;

    let app = apps::by_name(&config.app)
        .with_context(|| format!("aplicación map/reduce desconocida: {:?}", config.app))?;
    let storage = LocalStorage::new(&config.data_dir)
        .with_context(|| format!("directorio de datos {}", config.data_dir.display()))?;
    let client = HttpCoordinator::new(&config.master_url, config.rpc_timeout)?;

    let worker_id = new_worker_id();
    info!(
        "worker {} contra {} (app={}, datos={})",
        worker_id,
        client.base_url(),
        config.app,
        config.data_dir.display()
    );

    let summary = run_loop(
        &client,
        &worker_id,
        app,
        Arc::new(storage),
        config.poll_interval,
    )
    .await?;

    info!(
        "worker {} terminó: {} completadas, {} fallidas, {} reportes perdidos",
        worker_id, summary.completed, summary.failed, summary.lost_reports
    );
    Ok(())
}
