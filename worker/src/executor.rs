//! Ejecución de una tarea map o reduce dentro del worker.
//!
//! Toda salida se publica con `storage::commit`: cada intento escribe en su
//! propio archivo de staging y después lo renombra al nombre final.

use std::{fs, io};

use anyhow::Context;
use thiserror::Error;
use tracing::{debug, info};

use mr_common::{
    apps::MapReduceApp,
    shuffle::{
        decode_records, encode_output, encode_records, group_by_key, group_by_partition,
        intermediate_name, output_name,
    },
    storage::{commit, Storage},
    PartitionOutput, TaskDescriptor, TaskInput,
};

#[derive(Debug, Error)]
pub enum ExecError {
    /// El archivo de entrada de una tarea map no se puede leer.
    #[error("no se pudo leer la entrada {location}: {source}")]
    InputUnreadable {
        location: String,
        #[source]
        source: io::Error,
    },

    /// Falla de la función map/reduce, del codec o del almacenamiento.
    #[error(transparent)]
    Task(#[from] anyhow::Error),
}

/// Ejecuta `task` y devuelve el manifiesto a reportar (sólo para map).
pub fn execute(
    task: &TaskDescriptor,
    app: &dyn MapReduceApp,
    storage: &dyn Storage,
) -> Result<Option<Vec<PartitionOutput>>, ExecError> {
    match &task.input {
        TaskInput::Map { location } => {
            run_map(task.id.index, location, task.n_reduce, app, storage).map(Some)
        }
        TaskInput::Reduce {
            partition,
            manifest,
        } => {
            run_reduce(*partition, manifest, app, storage)?;
            Ok(None)
        }
    }
}

/// Lee la entrada completa, aplica map y publica un archivo por partición con datos.
pub fn run_map(
    map_index: usize,
    location: &str,
    n_reduce: usize,
    app: &dyn MapReduceApp,
    storage: &dyn Storage,
) -> Result<Vec<PartitionOutput>, ExecError> {
    let raw = fs::read(location).map_err(|source| ExecError::InputUnreadable {
        location: location.to_string(),
        source,
    })?;
    // bytes no UTF-8 se reemplazan; sólo una falla de E/S es fatal
    let contents = String::from_utf8_lossy(&raw);

    let pairs = app
        .map(location, &contents)
        .with_context(|| format!("map de {} falló sobre {}", app.name(), location))?;
    debug!("map {} emitió {} pares", map_index, pairs.len());

    let mut produced = Vec::new();
    for (partition, group) in group_by_partition(pairs, n_reduce) {
        let bytes = encode_records(&group).context("serializando intermedios")?;
        let name = intermediate_name(map_index, partition);
        let location = commit(storage, &bytes, &name)
            .with_context(|| format!("publicando {name}"))?;
        produced.push(PartitionOutput {
            partition,
            location,
        });
    }

    info!(
        "map {} terminado: {} particiones publicadas",
        map_index,
        produced.len()
    );
    Ok(produced)
}

/// Lee todos los intermedios de la partición, agrupa por clave, aplica reduce
/// y publica un único `mr-out-<partition>`. Devuelve el nombre publicado.
pub fn run_reduce(
    partition: usize,
    manifest: &[String],
    app: &dyn MapReduceApp,
    storage: &dyn Storage,
) -> Result<String, ExecError> {
    let mut pairs = Vec::new();
    for location in manifest {
        let bytes = storage
            .read(location)
            .with_context(|| format!("leyendo intermedio {location}"))?;
        let mut records =
            decode_records(&bytes).with_context(|| format!("intermedio corrupto {location}"))?;
        pairs.append(&mut records);
    }

    let grouped = group_by_key(pairs);
    let mut rows = Vec::with_capacity(grouped.len());
    for (key, values) in grouped {
        let out = app
            .reduce(&key, &values)
            .with_context(|| format!("reduce de {} falló para la clave {key:?}", app.name()))?;
        rows.push((key, out));
    }

    let bytes = encode_output(&rows).context("serializando salida")?;
    let name = output_name(partition);
    let location =
        commit(storage, &bytes, &name).with_context(|| format!("publicando {name}"))?;

    info!(
        "reduce {} terminado: {} claves en {}",
        partition,
        rows.len(),
        location
    );
    Ok(location)
}
