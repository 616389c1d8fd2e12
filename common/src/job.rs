use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fase global del job. Sólo avanza: Map -> Reduce -> Done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobPhase {
    Map,
    Reduce,
    Done,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCounts {
    pub total: u32,
    pub unallocated: u32,
    pub in_progress: u32,
    pub completed: u32,
}

/// Foto del estado del job que expone el master.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInfo {
    pub phase: JobPhase,
    pub n_reduce: usize,

    pub map_tasks: TaskCounts,
    /// Vacío (total = 0) hasta que termina la fase map.
    pub reduce_tasks: TaskCounts,

    /// -------- Métricas del job --------
    pub active_leases: u32,
    pub recycled_tasks: u64,
    pub duplicate_reports: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}
