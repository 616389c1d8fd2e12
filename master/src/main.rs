use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mr_common::storage::LocalStorage;
use mr_master::{failover, handlers, monitor, AppState, Coordinator, MasterConfig};

const DONE_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mr_master=debug,tower_http=info")),
        )
        .init();

    let config = MasterConfig::from_env().context("configuración del master")?;
    let inputs = config.input_files()?;
    info!(
        "{} archivos de entrada para {:?}",
        inputs.len(),
        config.input_glob
    );

    let storage = LocalStorage::new(&config.data_dir)
        .with_context(|| format!("no se pudo crear {}", config.data_dir.display()))?;

    let coordinator = Coordinator::new(inputs, config.n_reduce, config.lease_timeout)?;
    let state = AppState::new(coordinator, config.data_dir.to_string_lossy());

    // router HTTP
    let app = handlers::build_router(state.clone());

    // sweep de leases en segundo plano
    tokio::spawn(failover::run_failover_loop(
        state.clone(),
        config.sweep_interval,
    ));

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("no se pudo escuchar en {}", config.bind_addr))?;
    info!("master escuchando en {}", listener.local_addr()?);

    let grace = config.shutdown_grace;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            monitor::wait_until_done(state, DONE_POLL_INTERVAL).await;
            // los workers que sigan haciendo polling reciben end=true
            tokio::time::sleep(grace).await;
            // staging de workers caídos antes de publicar
            match storage.prune_staging() {
                Ok(0) => {}
                Ok(n) => info!("{} archivos de staging abandonados borrados", n),
                Err(e) => warn!("no se pudo limpiar el staging: {}", e),
            }
            info!("apagando master");
        })
        .await?;

    Ok(())
}
