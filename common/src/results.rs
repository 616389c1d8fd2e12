use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResults {
    /// Directorio donde quedaron los outputs del job
    pub output_dir: String,
    /// Archivos de salida de las tareas reduce ya completadas
    pub files: Vec<String>,
}
