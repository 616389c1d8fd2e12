use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{debug, info};

use mr_common::TaskId;

use crate::state::AppState;

/// Loop de tolerancia a fallos: cada `interval` libera las tareas cuyo lease
/// venció para que otro worker las tome. Nunca contacta a los workers.
pub async fn run_failover_loop(state: AppState, interval: Duration) {
    loop {
        sleep(interval).await;

        let recycled = sweep_once(&state, Instant::now());
        if !recycled.is_empty() {
            info!("failover sweep: {} tareas reencoladas", recycled.len());
        }

        if state.coordinator().done() {
            debug!("job terminado, se detiene el failover sweep");
            return;
        }
    }
}

/// Una pasada del sweep bajo el lock del coordinator.
pub fn sweep_once(state: &AppState, now: Instant) -> Vec<TaskId> {
    state.coordinator().sweep_expired(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::Coordinator;
    use mr_common::{TaskStatus, WorkerRequest};

    fn state_with_one_task(lease: Duration) -> AppState {
        let c = Coordinator::new(vec!["a.txt".into()], 1, lease).unwrap();
        AppState::new(c, "/tmp")
    }

    #[test]
    fn sweep_once_recycles_expired_lease() {
        let state = state_with_one_task(Duration::from_secs(5));
        let now = Instant::now();
        state
            .coordinator()
            .assign_task(&WorkerRequest::idle("w1"), now);

        assert!(sweep_once(&state, now).is_empty());
        assert_eq!(
            sweep_once(&state, now + Duration::from_secs(5)),
            vec![TaskId::map(0)]
        );
        assert_eq!(
            state.coordinator().task_status(TaskId::map(0)),
            Some(TaskStatus::Unallocated)
        );
    }

    #[tokio::test]
    async fn background_loop_frees_abandoned_task() {
        let state = state_with_one_task(Duration::from_millis(50));
        state
            .coordinator()
            .assign_task(&WorkerRequest::idle("caido"), Instant::now());

        let handle = tokio::spawn(run_failover_loop(state.clone(), Duration::from_millis(10)));

        let mut freed = false;
        for _ in 0..100 {
            sleep(Duration::from_millis(10)).await;
            if state.coordinator().task_status(TaskId::map(0)) == Some(TaskStatus::Unallocated) {
                freed = true;
                break;
            }
        }
        handle.abort();
        assert!(freed, "la tarea debería volver a estar libre");
    }
}
