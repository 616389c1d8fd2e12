pub mod client;
pub mod config;
pub mod executor;
pub mod worker;

pub use client::{CoordinatorClient, HttpCoordinator};
pub use config::WorkerConfig;
pub use worker::{new_worker_id, run_loop, WorkerSummary};
