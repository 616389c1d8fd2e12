use serde::{Deserialize, Serialize};

use crate::task::{TaskDescriptor, TaskId};

pub type WorkerId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerStatus {
    Idle,
    Completed,
}

/// Archivo intermedio ya publicado por una tarea map para una partición.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionOutput {
    pub partition: usize,
    pub location: String,
}

/// Mensaje único worker -> master, tanto para pedir tarea como para reportar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRequest {
    pub worker_id: WorkerId,
    pub status: WorkerStatus,
    #[serde(default)]
    pub completed_task: Option<TaskId>,
    #[serde(default)]
    pub produced_partitions: Option<Vec<PartitionOutput>>,
}

impl WorkerRequest {
    pub fn idle(worker_id: impl Into<WorkerId>) -> Self {
        Self {
            worker_id: worker_id.into(),
            status: WorkerStatus::Idle,
            completed_task: None,
            produced_partitions: None,
        }
    }

    pub fn completed(
        worker_id: impl Into<WorkerId>,
        task: TaskId,
        produced_partitions: Option<Vec<PartitionOutput>>,
    ) -> Self {
        Self {
            worker_id: worker_id.into(),
            status: WorkerStatus::Completed,
            completed_task: Some(task),
            produced_partitions,
        }
    }
}

/// Cómo absorbió el master un reporte de finalización.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportOutcome {
    Recorded,
    /// La tarea ya estaba completada; el reporte no cambia nada.
    Duplicate,
    /// Tarea desconocida o manifiesto mal formado; se ignora.
    Rejected,
}

/// Respuesta del master.
/// - `end = true`: el job terminó, el worker se apaga.
/// - `end = false` y `task = None`: no hay trabajo ahora, reintentar luego.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterResponse {
    pub end: bool,
    #[serde(default)]
    pub task: Option<TaskDescriptor>,
    #[serde(default)]
    pub report: Option<ReportOutcome>,
}

impl MasterResponse {
    pub fn end() -> Self {
        Self {
            end: true,
            task: None,
            report: None,
        }
    }

    pub fn retry_later() -> Self {
        Self {
            end: false,
            task: None,
            report: None,
        }
    }

    pub fn assigned(task: TaskDescriptor) -> Self {
        Self {
            end: false,
            task: Some(task),
            report: None,
        }
    }

    pub fn report(outcome: ReportOutcome, end: bool) -> Self {
        Self {
            end,
            task: None,
            report: Some(outcome),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoneResponse {
    pub done: bool,
}
