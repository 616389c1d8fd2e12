use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use mr_common::{apps::MapReduceApp, storage::Storage, TaskInput, WorkerId, WorkerRequest};

use crate::client::CoordinatorClient;
use crate::executor::{self, ExecError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerSummary {
    /// Tareas ejecutadas y reportadas.
    pub completed: u32,
    /// Tareas que fallaron y no se reportaron (el lease las recicla).
    pub failed: u32,
    /// Tareas ejecutadas cuyo reporte no llegó al master.
    pub lost_reports: u32,
}

/// `<hostname>-<uuid>`: único por proceso, legible en los logs del master.
pub fn new_worker_id() -> WorkerId {
    let host = hostname::get()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let host = if host.is_empty() { "worker".to_string() } else { host };
    format!("{}-{}", host, uuid::Uuid::new_v4())
}

/// Loop principal del worker:
/// - pide una tarea, la ejecuta y la reporta, de a una
/// - si el master no tiene trabajo, espera `poll_interval` y vuelve a pedir
/// - termina cuando el master responde `end = true`
///
/// Sólo el primer contacto con el master es fatal; después cada RPC fallida
/// se loguea y se reintenta en el siguiente poll.
pub async fn run_loop<C: CoordinatorClient>(
    client: &C,
    worker_id: &str,
    app: Arc<dyn MapReduceApp>,
    storage: Arc<dyn Storage>,
    poll_interval: Duration,
) -> Result<WorkerSummary> {
    client
        .ping()
        .await
        .context("no se pudo contactar al master")?;
    info!("worker {} conectado, ejecutando {}", worker_id, app.name());

    let mut summary = WorkerSummary::default();
    let mut first_poll = true;

    loop {
        if !first_poll {
            sleep(poll_interval).await;
        }
        first_poll = false;

        let assignment = match client.assign_task(&WorkerRequest::idle(worker_id)).await {
            Ok(a) => a,
            Err(e) => {
                warn!("no se pudo pedir tarea al master: {:#}", e);
                continue;
            }
        };

        if assignment.end {
            info!("master indicó fin del job, worker {} termina", worker_id);
            return Ok(summary);
        }

        let Some(task) = assignment.task else {
            debug!("worker {} pidió tarea pero no hay", worker_id);
            continue;
        };

        match &task.input {
            TaskInput::Map { location } => info!(
                "tengo tarea {} (intento {}, input={})",
                task.id, task.attempt, location
            ),
            TaskInput::Reduce {
                partition,
                manifest,
            } => info!(
                "tengo tarea {} (intento {}, partición {}, {} intermedios)",
                task.id,
                task.attempt,
                partition,
                manifest.len()
            ),
        }

        // El trabajo pesado va a un hilo de bloqueo
        let app_cloned = app.clone();
        let storage_cloned = storage.clone();
        let task_cloned = task.clone();
        let handle = tokio::task::spawn_blocking(move || {
            executor::execute(&task_cloned, app_cloned.as_ref(), storage_cloned.as_ref())
        });

        let produced = match handle.await {
            Ok(Ok(produced)) => produced,
            Ok(Err(e @ ExecError::InputUnreadable { .. })) => {
                // sin su entrada el worker no puede hacer nada útil
                return Err(e).with_context(|| format!("tarea {}", task.id));
            }
            Ok(Err(e)) => {
                warn!("error procesando tarea {}, no se reporta: {:#}", task.id, e);
                summary.failed += 1;
                continue;
            }
            Err(e) => {
                warn!("panic o join error en tarea {}: {:?}", task.id, e);
                summary.failed += 1;
                continue;
            }
        };

        let report = WorkerRequest::completed(worker_id, task.id, produced);
        match client.report_completion(&report).await {
            Ok(resp) => {
                summary.completed += 1;
                debug!("reporte de {} absorbido como {:?}", task.id, resp.report);
                if resp.end {
                    info!("job completo tras {}, worker {} termina", task.id, worker_id);
                    return Ok(summary);
                }
            }
            Err(e) => {
                // el lease vencerá y otro worker repetirá la tarea
                warn!("no se pudo reportar la tarea {}: {:#}", task.id, e);
                summary.lost_reports += 1;
            }
        }
    }
}
