use thiserror::Error;

/// Errores compartidos por master y worker.
#[derive(Debug, Error)]
pub enum MrError {
    /// Variable de entorno o parámetro con un valor inválido.
    #[error("configuración inválida: {0}")]
    InvalidConfig(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Registro intermedio o mensaje que no se pudo (de)serializar.
    #[error("codec: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("no encontrado: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, MrError>;
