use std::{path::PathBuf, time::Duration};

use mr_common::config::{env_millis_or, env_string_or};
use mr_common::Result;

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// - En Docker: MASTER_URL=http://master:8080
    /// - Local: default http://localhost:8080
    pub master_url: String,
    /// Aplicación map/reduce que ejecuta este worker ("wc", "indexer")
    pub app: String,
    pub data_dir: PathBuf,
    pub poll_interval: Duration,
    pub rpc_timeout: Duration,
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            master_url: env_string_or("MASTER_URL", "http://localhost:8080"),
            app: env_string_or("MR_APP", "wc"),
            data_dir: PathBuf::from(env_string_or("MR_DATA_DIR", "/data/mr")),
            poll_interval: env_millis_or("MR_POLL_INTERVAL_MS", 500)?,
            rpc_timeout: env_millis_or("MR_RPC_TIMEOUT_MS", 5000)?,
        })
    }
}
