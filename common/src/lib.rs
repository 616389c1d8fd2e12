pub mod apps;
pub mod config;
pub mod error;
pub mod job;
pub mod partition;
pub mod results;
pub mod rpc;
pub mod shuffle;
pub mod storage;
pub mod task;

pub use error::{MrError, Result};
pub use job::{JobInfo, JobPhase, TaskCounts};
pub use results::JobResults;
pub use rpc::{
    DoneResponse, MasterResponse, PartitionOutput, ReportOutcome, WorkerId, WorkerRequest,
    WorkerStatus,
};
pub use shuffle::KeyValue;
pub use task::{TaskDescriptor, TaskId, TaskInput, TaskPhase, TaskStatus};
