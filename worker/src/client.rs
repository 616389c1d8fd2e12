use std::time::Duration;

use anyhow::{Context, Result};
use mr_common::{MasterResponse, WorkerRequest};
use reqwest::Client;

/// Las dos RPC del master más un ping inicial.
/// Un `Err` significa "la llamada no ocurrió".
#[allow(async_fn_in_trait)]
pub trait CoordinatorClient {
    async fn ping(&self) -> Result<()>;
    async fn assign_task(&self, req: &WorkerRequest) -> Result<MasterResponse>;
    async fn report_completion(&self, req: &WorkerRequest) -> Result<MasterResponse>;
}

#[derive(Debug, Clone)]
pub struct HttpCoordinator {
    client: Client,
    base_url: String,
}

impl HttpCoordinator {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("no se pudo crear el cliente HTTP")?;
        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post(&self, path: &str, req: &WorkerRequest) -> Result<MasterResponse> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .post(&url)
            .json(req)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?
            .error_for_status()
            .with_context(|| format!("POST {url}"))?;
        let body: MasterResponse = resp
            .json()
            .await
            .with_context(|| format!("respuesta inválida de {url}"))?;
        Ok(body)
    }
}

impl CoordinatorClient for HttpCoordinator {
    async fn ping(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        self.client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url}"))?;
        Ok(())
    }

    async fn assign_task(&self, req: &WorkerRequest) -> Result<MasterResponse> {
        self.post("/api/v1/tasks/next", req).await
    }

    async fn report_completion(&self, req: &WorkerRequest) -> Result<MasterResponse> {
        self.post("/api/v1/tasks/complete", req).await
    }
}
