use std::{net::SocketAddr, path::PathBuf, time::Duration};

use glob::glob;
use mr_common::config::{env_millis_or, env_or, env_secs_or, env_string_or};
use mr_common::{MrError, Result};

#[derive(Debug, Clone)]
pub struct MasterConfig {
    /// Patrón de archivos de entrada, ej: "/data/input/*.txt"
    pub input_glob: String,
    pub n_reduce: usize,
    pub lease_timeout: Duration,
    pub sweep_interval: Duration,
    pub bind_addr: SocketAddr,
    /// Directorio compartido con los workers (intermedios y salidas)
    pub data_dir: PathBuf,
    /// Cuánto seguir sirviendo después de Done para que los workers vean `end`
    pub shutdown_grace: Duration,
}

impl MasterConfig {
    pub fn from_env() -> Result<Self> {
        let bind_raw = env_string_or("MR_BIND_ADDR", "0.0.0.0:8080");
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| MrError::InvalidConfig(format!("MR_BIND_ADDR={bind_raw:?}: {e}")))?;

        Ok(Self {
            input_glob: env_string_or("MR_INPUT_GLOB", "/data/input/*"),
            n_reduce: env_or("MR_N_REDUCE", 10)?,
            lease_timeout: env_secs_or("MR_LEASE_TIMEOUT_SECS", 10)?,
            sweep_interval: env_millis_or("MR_SWEEP_INTERVAL_MS", 1000)?,
            bind_addr,
            data_dir: PathBuf::from(env_string_or("MR_DATA_DIR", "/data/mr")),
            shutdown_grace: env_millis_or("MR_SHUTDOWN_GRACE_MS", 3000)?,
        })
    }

    /// Archivos que hacen match con `input_glob`, ordenados.
    pub fn input_files(&self) -> Result<Vec<String>> {
        let entries = glob(&self.input_glob).map_err(|e| {
            MrError::InvalidConfig(format!("MR_INPUT_GLOB={:?}: {e}", self.input_glob))
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| MrError::Io(e.into_error()))?;
            if path.is_file() {
                files.push(path.to_string_lossy().to_string());
            }
        }
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config_for(pattern: String) -> MasterConfig {
        MasterConfig {
            input_glob: pattern,
            n_reduce: 2,
            lease_timeout: Duration::from_secs(1),
            sweep_interval: Duration::from_millis(100),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            data_dir: PathBuf::from("/tmp"),
            shutdown_grace: Duration::ZERO,
        }
    }

    #[test]
    fn input_files_are_sorted_and_skip_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("pg-b.txt"), "b").unwrap();
        fs::write(dir.path().join("pg-a.txt"), "a").unwrap();
        fs::create_dir(dir.path().join("pg-dir.txt")).unwrap();

        let cfg = config_for(format!("{}/pg-*.txt", dir.path().display()));
        let files = cfg.input_files().unwrap();

        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("pg-a.txt"));
        assert!(files[1].ends_with("pg-b.txt"));
    }

    #[test]
    fn invalid_pattern_is_config_error() {
        let cfg = config_for("/data/[".to_string());
        assert!(matches!(cfg.input_files(), Err(MrError::InvalidConfig(_))));
    }
}
