use std::time::Duration;

use tokio::time::sleep;
use tracing::info;

use crate::state::AppState;

/// El proceso dueño del master consulta Done() periódicamente.
pub async fn wait_until_done(state: AppState, poll: Duration) {
    loop {
        if state.coordinator().done() {
            info!("job completo");
            return;
        }
        sleep(poll).await;
    }
}
