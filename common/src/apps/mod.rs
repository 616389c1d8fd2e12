//! Funciones map/reduce que puede ejecutar un worker.
//!
//! La carga dinámica de plugins queda fuera; cada worker elige una de estas
//! aplicaciones por nombre en su configuración.

mod indexer;
mod wordcount;

use std::sync::Arc;

use crate::shuffle::KeyValue;

pub use indexer::Indexer;
pub use wordcount::WordCount;

pub trait MapReduceApp: Send + Sync {
    fn name(&self) -> &'static str;

    /// (nombre de entrada, contenido) -> pares clave/valor sin orden.
    fn map(&self, filename: &str, contents: &str) -> anyhow::Result<Vec<KeyValue>>;

    /// Todos los valores de `key` -> una línea de salida.
    fn reduce(&self, key: &str, values: &[String]) -> anyhow::Result<String>;
}

pub fn by_name(name: &str) -> Option<Arc<dyn MapReduceApp>> {
    match name {
        "wc" | "wordcount" => Some(Arc::new(WordCount)),
        "indexer" => Some(Arc::new(Indexer)),
        _ => None,
    }
}

/// Palabra normalizada: sólo alfanumérico y '_', en minúscula.
pub(crate) fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().filter_map(|raw| {
        let cleaned: String = raw
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_')
            .collect::<String>()
            .to_lowercase();
        (!cleaned.is_empty()).then_some(cleaned)
    })
}
