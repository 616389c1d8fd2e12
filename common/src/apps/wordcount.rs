use anyhow::Context;

use super::{tokenize, MapReduceApp};
use crate::shuffle::KeyValue;

/// Cuenta palabras: map emite (palabra, "1"), reduce suma.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordCount;

impl MapReduceApp for WordCount {
    fn name(&self) -> &'static str {
        "wc"
    }

    fn map(&self, _filename: &str, contents: &str) -> anyhow::Result<Vec<KeyValue>> {
        Ok(tokenize(contents).map(|w| KeyValue::new(w, "1")).collect())
    }

    fn reduce(&self, key: &str, values: &[String]) -> anyhow::Result<String> {
        let mut total: u64 = 0;
        for v in values {
            let n: u64 = v
                .parse()
                .with_context(|| format!("conteo inválido {v:?} para la clave {key:?}"))?;
            total += n;
        }
        Ok(total.to_string())
    }
}
