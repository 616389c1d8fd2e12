use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use mr_common::{DoneResponse, JobInfo, JobResults, MasterResponse, WorkerRequest};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/tasks/next", post(assign_task))
        .route("/api/v1/tasks/complete", post(complete_task))
        .route("/api/v1/done", get(done))
        .route("/api/v1/job", get(get_job))
        .route("/api/v1/job/results", get(get_job_results))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/* ---------------- handlers HTTP ---------------- */

async fn health() -> &'static str {
    "ok"
}

// Un body mal formado se loguea y se responde 400 sin tocar el estado
fn parse_request(
    endpoint: &str,
    body: Result<Json<WorkerRequest>, JsonRejection>,
) -> Result<WorkerRequest, StatusCode> {
    match body {
        Ok(Json(req)) => Ok(req),
        Err(rejection) => {
            warn!("request mal formado en {}: {}", endpoint, rejection.body_text());
            Err(StatusCode::BAD_REQUEST)
        }
    }
}

// AssignTask: el worker pide la siguiente tarea
async fn assign_task(
    State(state): State<AppState>,
    body: Result<Json<WorkerRequest>, JsonRejection>,
) -> Result<Json<MasterResponse>, StatusCode> {
    let req = parse_request("tasks/next", body)?;
    let resp = state.coordinator().assign_task(&req, Instant::now());
    Ok(Json(resp))
}

// ReportCompletion: el worker reporta una tarea terminada
async fn complete_task(
    State(state): State<AppState>,
    body: Result<Json<WorkerRequest>, JsonRejection>,
) -> Result<Json<MasterResponse>, StatusCode> {
    let req = parse_request("tasks/complete", body)?;
    let resp = state.coordinator().report_completion(&req);
    Ok(Json(resp))
}

async fn done(State(state): State<AppState>) -> Json<DoneResponse> {
    Json(DoneResponse {
        done: state.coordinator().done(),
    })
}

// Devuelve el estado del job
async fn get_job(State(state): State<AppState>) -> Json<JobInfo> {
    Json(state.coordinator().info())
}

// Lista archivos de salida ya publicados
async fn get_job_results(State(state): State<AppState>) -> Json<JobResults> {
    let files = state.coordinator().completed_outputs();
    Json(JobResults {
        output_dir: state.output_dir.clone(),
        files,
    })
}
