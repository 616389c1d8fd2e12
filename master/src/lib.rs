pub mod config;
pub mod coordinator;
pub mod failover;
pub mod handlers;
pub mod monitor;
pub mod state;

pub use config::MasterConfig;
pub use coordinator::Coordinator;
pub use state::AppState;
