use std::collections::BTreeSet;

use super::{tokenize, MapReduceApp};
use crate::shuffle::KeyValue;

/// Índice invertido: para cada palabra, en qué documentos aparece.
#[derive(Debug, Clone, Copy, Default)]
pub struct Indexer;

impl MapReduceApp for Indexer {
    fn name(&self) -> &'static str {
        "indexer"
    }

    fn map(&self, filename: &str, contents: &str) -> anyhow::Result<Vec<KeyValue>> {
        let words: BTreeSet<String> = tokenize(contents).collect();
        Ok(words
            .into_iter()
            .map(|w| KeyValue::new(w, filename))
            .collect())
    }

    fn reduce(&self, _key: &str, values: &[String]) -> anyhow::Result<String> {
        let docs: BTreeSet<&str> = values.iter().map(String::as_str).collect();
        let joined = docs.iter().copied().collect::<Vec<_>>().join(",");
        Ok(format!("{} {}", docs.len(), joined))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_emits_each_word_once_per_document() {
        let kvs = Indexer.map("a.txt", "gato perro gato").unwrap();
        assert_eq!(
            kvs,
            vec![KeyValue::new("gato", "a.txt"), KeyValue::new("perro", "a.txt")]
        );
    }

    #[test]
    fn reduce_lists_sorted_unique_documents() {
        let values: Vec<String> = ["b.txt", "a.txt", "b.txt"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(Indexer.reduce("gato", &values).unwrap(), "2 a.txt,b.txt");
    }
}
