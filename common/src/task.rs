use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPhase {
    Map,
    Reduce,
}

/// Identificador estable de una tarea: una por (fase, índice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId {
    pub phase: TaskPhase,
    pub index: usize,
}

impl TaskId {
    pub fn map(index: usize) -> Self {
        Self {
            phase: TaskPhase::Map,
            index,
        }
    }

    pub fn reduce(index: usize) -> Self {
        Self {
            phase: TaskPhase::Reduce,
            index,
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.phase {
            TaskPhase::Map => write!(f, "map-{}", self.index),
            TaskPhase::Reduce => write!(f, "reduce-{}", self.index),
        }
    }
}

/// Estados de una tarea en el master.
/// Sólo retrocede InProgress -> Unallocated cuando vence su lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Unallocated,
    Allocated,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskInput {
    /// Archivo de entrada completo de una tarea map.
    Map { location: String },
    /// Partición de reduce y los archivos intermedios que le tocan,
    /// uno por tarea map que produjo datos para ella.
    Reduce {
        partition: usize,
        manifest: Vec<String>,
    },
}

/// Lo que recibe un worker al pedir trabajo. Sólo datos: el worker decide
/// qué función map/reduce ejecutar según su propia configuración.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    pub id: TaskId,
    pub n_reduce: usize,
    /// Cuántas veces se entregó esta tarea (1 = primera vez).
    pub attempt: u32,
    pub input: TaskInput,
}
