//! Tabla de tareas, leases y máquina de fases del job.
//!
//! Todo es síncrono y recibe el reloj (`now`) por parámetro: el master lo
//! envuelve en un único `Mutex` y cada método es una sección crítica completa.

use std::{
    collections::{BTreeMap, HashMap},
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use mr_common::{
    shuffle::output_name, JobInfo, JobPhase, MasterResponse, MrError, PartitionOutput,
    ReportOutcome, TaskCounts, TaskDescriptor, TaskId, TaskInput, TaskPhase, TaskStatus,
    WorkerId, WorkerRequest,
};

#[derive(Debug, Clone)]
struct TaskEntry {
    id: TaskId,
    status: TaskStatus,
    input: TaskInput,
    attempts: u32,
}

impl TaskEntry {
    fn new(id: TaskId, input: TaskInput) -> Self {
        Self {
            id,
            status: TaskStatus::Unallocated,
            input,
            attempts: 0,
        }
    }
}

/// Reclamo de un worker sobre una tarea en curso.
#[derive(Debug, Clone)]
pub struct Lease {
    pub worker_id: WorkerId,
    pub attempt: u32,
    pub started_at: Instant,
    pub deadline: Instant,
}

#[derive(Debug)]
pub struct Coordinator {
    n_reduce: usize,
    lease_timeout: Duration,
    phase: JobPhase,

    map_tasks: Vec<TaskEntry>,
    // vacío hasta que termina la fase map
    reduce_tasks: Vec<TaskEntry>,

    // como mucho un lease activo por tarea
    leases: HashMap<TaskId, Lease>,

    // por partición: índice de tarea map -> archivo intermedio
    manifests: Vec<BTreeMap<usize, String>>,

    recycled_tasks: u64,
    duplicate_reports: u64,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl Coordinator {
    /// Una tarea map por archivo de entrada, en el orden recibido.
    pub fn new(
        inputs: Vec<String>,
        n_reduce: usize,
        lease_timeout: Duration,
    ) -> mr_common::Result<Self> {
        if n_reduce == 0 {
            return Err(MrError::InvalidConfig(
                "n_reduce tiene que ser mayor que 0".to_string(),
            ));
        }

        let map_tasks = inputs
            .into_iter()
            .enumerate()
            .map(|(i, location)| TaskEntry::new(TaskId::map(i), TaskInput::Map { location }))
            .collect::<Vec<_>>();

        info!(
            "job creado: {} tareas map, n_reduce={}, lease={:?}",
            map_tasks.len(),
            n_reduce,
            lease_timeout
        );

        let mut c = Self {
            n_reduce,
            lease_timeout,
            phase: JobPhase::Map,
            map_tasks,
            reduce_tasks: Vec::new(),
            leases: HashMap::new(),
            manifests: vec![BTreeMap::new(); n_reduce],
            recycled_tasks: 0,
            duplicate_reports: 0,
            started_at: Utc::now(),
            finished_at: None,
        };
        // sin entradas la fase map ya está completa
        c.advance_phase();
        Ok(c)
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    pub fn done(&self) -> bool {
        self.phase == JobPhase::Done
    }

    pub fn task_status(&self, id: TaskId) -> Option<TaskStatus> {
        self.task(id).map(|t| t.status)
    }

    pub fn lease(&self, id: TaskId) -> Option<&Lease> {
        self.leases.get(&id)
    }

    /// Archivos intermedios acumulados para `partition`, ordenados por tarea map.
    pub fn manifest(&self, partition: usize) -> Vec<String> {
        self.manifests
            .get(partition)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default()
    }

    /// AssignTask: entrega la tarea libre de menor índice de la fase actual.
    pub fn assign_task(&mut self, req: &WorkerRequest, now: Instant) -> MasterResponse {
        self.advance_phase();
        if self.done() {
            return MasterResponse::end();
        }

        let n_reduce = self.n_reduce;
        let lease_timeout = self.lease_timeout;
        let Some(task) = self
            .current_tasks_mut()
            .iter_mut()
            .find(|t| t.status == TaskStatus::Unallocated)
        else {
            debug!(
                "worker {} pidió tarea pero no hay libres, que reintente",
                req.worker_id
            );
            return MasterResponse::retry_later();
        };

        task.status = TaskStatus::Allocated;
        task.attempts += 1;
        let descriptor = TaskDescriptor {
            id: task.id,
            n_reduce,
            attempt: task.attempts,
            input: task.input.clone(),
        };
        let lease = Lease {
            worker_id: req.worker_id.clone(),
            attempt: task.attempts,
            started_at: now,
            deadline: now + lease_timeout,
        };
        task.status = TaskStatus::InProgress;

        if let Some(prev) = self.leases.insert(descriptor.id, lease) {
            // no debería pasar: el sweep quita el lease antes de liberar la tarea
            warn!(
                "tarea {} tenía un lease de {} que se reemplaza",
                descriptor.id, prev.worker_id
            );
        }

        info!(
            "asignando tarea {} (intento {}) al worker {}",
            descriptor.id, descriptor.attempt, req.worker_id
        );
        MasterResponse::assigned(descriptor)
    }

    /// ReportCompletion: registra el manifiesto y completa la tarea.
    /// Un segundo reporte de la misma tarea no cambia nada.
    pub fn report_completion(&mut self, req: &WorkerRequest) -> MasterResponse {
        let outcome = self.record_completion(req);
        if outcome == ReportOutcome::Recorded {
            self.advance_phase();
        }
        MasterResponse::report(outcome, self.done())
    }

    fn record_completion(&mut self, req: &WorkerRequest) -> ReportOutcome {
        let Some(id) = req.completed_task else {
            warn!(
                "reporte de {} sin tarea completada, se ignora",
                req.worker_id
            );
            return ReportOutcome::Rejected;
        };

        let n_reduce = self.n_reduce;
        let Some(task) = self.task(id) else {
            warn!(
                "worker {} reportó la tarea desconocida {}, se ignora",
                req.worker_id, id
            );
            return ReportOutcome::Rejected;
        };

        if task.status == TaskStatus::Completed {
            self.duplicate_reports += 1;
            info!(
                "reporte duplicado de {} para la tarea {}, sin efecto",
                req.worker_id, id
            );
            return ReportOutcome::Duplicate;
        }

        let produced: &[PartitionOutput] = req.produced_partitions.as_deref().unwrap_or(&[]);
        if id.phase == TaskPhase::Map {
            if let Some(bad) = produced.iter().find(|p| p.partition >= n_reduce) {
                warn!(
                    "worker {} reportó la partición {} fuera de rango (n_reduce={}) para {}, se ignora",
                    req.worker_id, bad.partition, n_reduce, id
                );
                return ReportOutcome::Rejected;
            }
            for p in produced {
                self.manifests[p.partition].insert(id.index, p.location.clone());
            }
        }

        if let Some(task) = self.task_mut(id) {
            task.status = TaskStatus::Completed;
        }
        match self.leases.remove(&id) {
            Some(lease) if lease.worker_id != req.worker_id => info!(
                "tarea {} completada por {} (el lease era de {})",
                id, req.worker_id, lease.worker_id
            ),
            Some(_) => info!("tarea {} completada por {}", id, req.worker_id),
            None => info!(
                "tarea {} completada por {} con el lease ya vencido",
                id, req.worker_id
            ),
        }
        ReportOutcome::Recorded
    }

    /// Libera las tareas cuyo lease venció. Devuelve las tareas recicladas.
    pub fn sweep_expired(&mut self, now: Instant) -> Vec<TaskId> {
        let expired: Vec<TaskId> = self
            .leases
            .iter()
            .filter(|(_, lease)| lease.deadline <= now)
            .map(|(id, _)| *id)
            .collect();

        let mut recycled = Vec::with_capacity(expired.len());
        for id in expired {
            let Some(lease) = self.leases.remove(&id) else {
                continue;
            };
            if let Some(task) = self.task_mut(id) {
                if task.status == TaskStatus::InProgress {
                    task.status = TaskStatus::Unallocated;
                    warn!(
                        "lease de {} sobre {} (intento {}) vencido tras {:?}, tarea liberada",
                        lease.worker_id,
                        id,
                        lease.attempt,
                        now.saturating_duration_since(lease.started_at)
                    );
                    recycled.push(id);
                }
            }
        }
        recycled.sort();
        self.recycled_tasks += recycled.len() as u64;
        recycled
    }

    /// Map -> Reduce cuando todas las map están completas; Reduce -> Done igual.
    fn advance_phase(&mut self) {
        if self.phase == JobPhase::Map && all_completed(&self.map_tasks) {
            self.reduce_tasks = (0..self.n_reduce)
                .map(|r| {
                    let manifest = self.manifest(r);
                    TaskEntry::new(
                        TaskId::reduce(r),
                        TaskInput::Reduce {
                            partition: r,
                            manifest,
                        },
                    )
                })
                .collect();
            self.phase = JobPhase::Reduce;
            info!(
                "fase map terminada, {} tareas reduce creadas",
                self.reduce_tasks.len()
            );
        }

        if self.phase == JobPhase::Reduce && all_completed(&self.reduce_tasks) {
            self.phase = JobPhase::Done;
            self.finished_at = Some(Utc::now());
            info!("fase reduce terminada, job completo");
        }
    }

    fn current_tasks_mut(&mut self) -> &mut [TaskEntry] {
        match self.phase {
            JobPhase::Map => &mut self.map_tasks,
            JobPhase::Reduce => &mut self.reduce_tasks,
            JobPhase::Done => &mut [],
        }
    }

    fn task(&self, id: TaskId) -> Option<&TaskEntry> {
        match id.phase {
            TaskPhase::Map => self.map_tasks.get(id.index),
            TaskPhase::Reduce => self.reduce_tasks.get(id.index),
        }
    }

    fn task_mut(&mut self, id: TaskId) -> Option<&mut TaskEntry> {
        match id.phase {
            TaskPhase::Map => self.map_tasks.get_mut(id.index),
            TaskPhase::Reduce => self.reduce_tasks.get_mut(id.index),
        }
    }

    pub fn info(&self) -> JobInfo {
        JobInfo {
            phase: self.phase,
            n_reduce: self.n_reduce,
            map_tasks: count(&self.map_tasks),
            reduce_tasks: count(&self.reduce_tasks),
            active_leases: self.leases.len() as u32,
            recycled_tasks: self.recycled_tasks,
            duplicate_reports: self.duplicate_reports,
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }

    /// Nombres de salida de las tareas reduce ya completadas.
    pub fn completed_outputs(&self) -> Vec<String> {
        self.reduce_tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .map(|t| output_name(t.id.index))
            .collect()
    }
}

fn all_completed(tasks: &[TaskEntry]) -> bool {
    tasks.iter().all(|t| t.status == TaskStatus::Completed)
}

fn count(tasks: &[TaskEntry]) -> TaskCounts {
    let mut c = TaskCounts {
        total: tasks.len() as u32,
        ..TaskCounts::default()
    };
    for t in tasks {
        match t.status {
            TaskStatus::Unallocated => c.unallocated += 1,
            TaskStatus::Allocated | TaskStatus::InProgress => c.in_progress += 1,
            TaskStatus::Completed => c.completed += 1,
        }
    }
    c
}
