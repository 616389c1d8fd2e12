use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, io::Write};

use crate::error::Result;
use crate::partition::partition_for;

/// Par clave/valor que emite una función map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Nombre final del archivo intermedio de la tarea map `map_index` para `partition`.
pub fn intermediate_name(map_index: usize, partition: usize) -> String {
    format!("mr-{}-{}", map_index, partition)
}

/// Nombre final de la salida de la tarea reduce `partition`.
pub fn output_name(partition: usize) -> String {
    format!("mr-out-{}", partition)
}

/// Reparte los pares por hash(key) % n_reduce.
/// Sólo aparecen las particiones que recibieron algún par.
pub fn group_by_partition(
    pairs: Vec<KeyValue>,
    n_reduce: usize,
) -> BTreeMap<usize, Vec<KeyValue>> {
    let mut out: BTreeMap<usize, Vec<KeyValue>> = BTreeMap::new();
    for kv in pairs {
        let pid = partition_for(&kv.key, n_reduce);
        out.entry(pid).or_default().push(kv);
    }
    out
}

/// Agrupa todos los valores de cada clave. Las claves quedan ordenadas.
pub fn group_by_key<I>(pairs: I) -> BTreeMap<String, Vec<String>>
where
    I: IntoIterator<Item = KeyValue>,
{
    let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for kv in pairs {
        out.entry(kv.key).or_default().push(kv.value);
    }
    out
}

/// Serializa registros intermedios como JSONL (un KeyValue por línea).
pub fn encode_records(records: &[KeyValue]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    for rec in records {
        serde_json::to_writer(&mut buf, rec)?;
        buf.write_all(b"\n")?;
    }
    Ok(buf)
}

pub fn decode_records(bytes: &[u8]) -> Result<Vec<KeyValue>> {
    let mut out = Vec::new();
    for line in bytes.split(|b| *b == b'\n') {
        if line.iter().all(|b| b.is_ascii_whitespace()) {
            continue;
        }
        out.push(serde_json::from_slice(line)?);
    }
    Ok(out)
}

/// Salida final de un reduce: CSV sin encabezado, "clave,valor" por línea.
pub fn encode_output(rows: &[(String, String)]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut buf);
        for (key, value) in rows {
            writer.write_record([key, value])?;
        }
        writer.flush()?;
    }
    Ok(buf)
}

pub fn decode_output(bytes: &[u8]) -> Result<Vec<(String, String)>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(bytes);
    let mut out = Vec::new();
    for rec in reader.records() {
        let rec = rec?;
        let key = rec.get(0).unwrap_or_default().to_string();
        let value = rec.get(1).unwrap_or_default().to_string();
        out.push((key, value));
    }
    Ok(out)
}
