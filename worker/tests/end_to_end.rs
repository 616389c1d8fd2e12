use std::{
    collections::BTreeMap,
    fs,
    path::Path,
    sync::Arc,
    time::Duration,
};

use mr_common::{
    apps::{MapReduceApp, WordCount},
    shuffle::{decode_output, output_name},
    storage::{LocalStorage, Storage},
    JobPhase, ReportOutcome, TaskId, WorkerRequest,
};
use mr_master::{failover, handlers, AppState, Coordinator};
use mr_worker::{executor, run_loop, CoordinatorClient, HttpCoordinator};
use tokio::net::TcpListener;

const POLL: Duration = Duration::from_millis(10);
const RPC_TIMEOUT: Duration = Duration::from_secs(5);

const TEXTS: [&str; 3] = [
    "el gato come pescado. El perro come carne",
    "Un gato, dos gatos y un perro\nmundo_prueba",
    "pescado pescado PESCADO",
];

fn write_inputs(dir: &Path) -> Vec<String> {
    TEXTS
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let path = dir.join(format!("pg-{i}.txt"));
            fs::write(&path, text).unwrap();
            path.to_string_lossy().to_string()
        })
        .collect()
}

fn expected_counts() -> BTreeMap<String, String> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for text in TEXTS {
        for kv in WordCount.map("x", text).unwrap() {
            *counts.entry(kv.key).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .map(|(k, v)| (k, v.to_string()))
        .collect()
}

fn read_outputs(storage: &LocalStorage, n_reduce: usize) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for r in 0..n_reduce {
        let bytes = storage.read(&output_name(r)).unwrap();
        for (key, value) in decode_output(&bytes).unwrap() {
            assert!(out.insert(key, value).is_none(), "clave repetida entre particiones");
        }
    }
    out
}

async fn start_master(
    inputs: Vec<String>,
    n_reduce: usize,
    lease: Duration,
    data_dir: &Path,
) -> (HttpCoordinator, AppState) {
    let coordinator = Coordinator::new(inputs, n_reduce, lease).unwrap();
    let state = AppState::new(coordinator, data_dir.to_string_lossy());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = handlers::build_router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::spawn(failover::run_failover_loop(
        state.clone(),
        Duration::from_millis(20),
    ));

    let client = HttpCoordinator::new(format!("http://{addr}"), RPC_TIMEOUT).unwrap();
    (client, state)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn two_workers_run_word_count_to_completion() {
    let input_dir = tempfile::tempdir().unwrap();
    let data_dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(input_dir.path());
    let storage = Arc::new(LocalStorage::new(data_dir.path()).unwrap());

    let (client, state) = start_master(inputs, 3, Duration::from_secs(10), data_dir.path()).await;

    let (a, b) = tokio::join!(
        run_loop(&client, "w-a", Arc::new(WordCount), storage.clone(), POLL),
        run_loop(&client, "w-b", Arc::new(WordCount), storage.clone(), POLL),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    // 3 map + 3 reduce, repartidas entre los dos
    assert_eq!(a.completed + b.completed, 6);
    assert_eq!(a.failed + b.failed, 0);

    let info = state.coordinator().info();
    assert_eq!(info.phase, JobPhase::Done);
    assert_eq!(info.map_tasks.completed, 3);
    assert_eq!(info.reduce_tasks.completed, 3);
    assert_eq!(info.recycled_tasks, 0);

    assert_eq!(read_outputs(&storage, 3), expected_counts());
    assert_eq!(
        fs::read_dir(data_dir.path().join(".staging")).unwrap().count(),
        0
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn crashed_worker_task_is_recycled_and_finished_by_another() {
    let input_dir = tempfile::tempdir().unwrap();
    let data_dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(input_dir.path());
    let storage = Arc::new(LocalStorage::new(data_dir.path()).unwrap());

    let (client, state) =
        start_master(inputs, 2, Duration::from_millis(150), data_dir.path()).await;

    // un worker toma map-0 y se cae sin reportar
    let claimed = client
        .assign_task(&WorkerRequest::idle("caido"))
        .await
        .unwrap();
    assert_eq!(claimed.task.unwrap().id, TaskId::map(0));

    let summary = run_loop(&client, "w-ok", Arc::new(WordCount), storage.clone(), POLL)
        .await
        .unwrap();
    assert_eq!(summary.completed, 5);

    let info = state.coordinator().info();
    assert_eq!(info.phase, JobPhase::Done);
    assert!(info.recycled_tasks >= 1);
    assert_eq!(read_outputs(&storage, 2), expected_counts());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn straggler_finishing_late_does_not_change_the_result() {
    let input_dir = tempfile::tempdir().unwrap();
    let data_dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(input_dir.path());
    let storage = Arc::new(LocalStorage::new(data_dir.path()).unwrap());

    let (client, state) =
        start_master(inputs, 2, Duration::from_millis(150), data_dir.path()).await;

    let straggler_task = client
        .assign_task(&WorkerRequest::idle("lento"))
        .await
        .unwrap()
        .task
        .unwrap();

    run_loop(&client, "w-ok", Arc::new(WordCount), storage.clone(), POLL)
        .await
        .unwrap();
    let before = read_outputs(&storage, 2);

    // el straggler termina su map tarde y lo reporta
    let produced = executor::execute(&straggler_task, &WordCount, storage.as_ref()).unwrap();
    let late = client
        .report_completion(&WorkerRequest::completed(
            "lento",
            straggler_task.id,
            produced,
        ))
        .await
        .unwrap();

    assert_eq!(late.report, Some(ReportOutcome::Duplicate));
    assert!(late.end);
    assert_eq!(state.coordinator().info().duplicate_reports, 1);
    assert_eq!(read_outputs(&storage, 2), before);
    assert_eq!(before, expected_counts());
}

#[tokio::test]
async fn worker_without_master_fails_on_first_dial() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let data_dir = tempfile::tempdir().unwrap();
    let storage: Arc<dyn Storage> = Arc::new(LocalStorage::new(data_dir.path()).unwrap());
    let client = HttpCoordinator::new(format!("http://{addr}"), Duration::from_millis(500)).unwrap();

    let res = run_loop(&client, "w-solo", Arc::new(WordCount), storage, POLL).await;
    assert!(res.is_err());
}
