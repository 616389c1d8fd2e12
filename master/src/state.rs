// master/src/state.rs

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::coordinator::Coordinator;

#[derive(Clone)]
pub struct AppState {
    // toda la tabla de tareas, leases y fase bajo un solo lock
    pub coordinator: Arc<Mutex<Coordinator>>,
    // directorio compartido donde quedan los mr-out-*
    pub output_dir: String,
}

impl AppState {
    pub fn new(coordinator: Coordinator, output_dir: impl Into<String>) -> Self {
        Self {
            coordinator: Arc::new(Mutex::new(coordinator)),
            output_dir: output_dir.into(),
        }
    }

    /// Si un handler entró en pánico con el lock tomado, seguimos con el estado
    /// tal cual: cada operación deja la tabla consistente antes de soltarlo.
    pub fn coordinator(&self) -> MutexGuard<'_, Coordinator> {
        self.coordinator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
