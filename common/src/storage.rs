use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::error::{MrError, Result};

const STAGING_DIR: &str = ".staging";

/// Archivo escrito completo bajo un nombre propio de un intento de ejecución,
/// todavía invisible con su nombre final.
#[derive(Debug)]
pub struct StagedObject {
    location: String,
}

impl StagedObject {
    pub fn location(&self) -> &str {
        &self.location
    }
}

/// Colaborador de almacenamiento que usa el protocolo de commit atómico.
pub trait Storage: Send + Sync {
    /// Escribe `bytes` en una ubicación única para este intento.
    fn stage(&self, bytes: &[u8]) -> Result<StagedObject>;

    /// Publica atómicamente `staged` con el nombre final `final_name`.
    /// Si ya existía un archivo con ese nombre, lo reemplaza.
    fn publish(&self, staged: StagedObject, final_name: &str) -> Result<String>;

    fn read(&self, location: &str) -> Result<Vec<u8>>;
}

/// Escribe y publica `bytes` como `final_name`. Un lector nunca ve un archivo a medias.
pub fn commit(storage: &dyn Storage, bytes: &[u8], final_name: &str) -> Result<String> {
    let staged = storage.stage(bytes)?;
    storage.publish(staged, final_name)
}

/// Almacenamiento sobre un directorio compartido (p.ej. un volumen montado
/// por el master y todos los workers). El staging vive dentro del mismo
/// directorio para que el rename sea atómico.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(STAGING_DIR))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Borra lo que quedó en staging de intentos abandonados, p.ej. un worker
    /// que se cayó entre `stage` y `publish`. Devuelve cuántos archivos borró.
    pub fn prune_staging(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(self.root.join(STAGING_DIR))? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                // otro proceso lo publicó o borró mientras tanto
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(removed)
    }

    fn resolve(&self, name: &str) -> Result<PathBuf> {
        let invalid = name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name == "."
            || name == "..";
        if invalid {
            return Err(MrError::InvalidConfig(format!(
                "nombre de archivo inválido: {name:?}"
            )));
        }
        Ok(self.root.join(name))
    }

    fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(bytes)?;
        file.sync_all()
    }
}

impl Storage for LocalStorage {
    fn stage(&self, bytes: &[u8]) -> Result<StagedObject> {
        let name = format!("{}.tmp", uuid::Uuid::new_v4());
        let path = self.root.join(STAGING_DIR).join(&name);

        if let Err(e) = Self::write_synced(&path, bytes) {
            let _ = fs::remove_file(&path);
            return Err(e.into());
        }

        Ok(StagedObject {
            location: format!("{}/{}", STAGING_DIR, name),
        })
    }

    fn publish(&self, staged: StagedObject, final_name: &str) -> Result<String> {
        let from = self.root.join(&staged.location);
        let to = match self.resolve(final_name) {
            Ok(p) => p,
            Err(e) => {
                let _ = fs::remove_file(&from);
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&from, &to) {
            let _ = fs::remove_file(&from);
            return Err(e.into());
        }

        debug!("publicado {} -> {}", staged.location, final_name);
        Ok(final_name.to_string())
    }

    fn read(&self, location: &str) -> Result<Vec<u8>> {
        let path = self.resolve(location)?;
        fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => MrError::NotFound(location.to_string()),
            _ => MrError::Io(e),
        })
    }
}
