use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerState {
    Idle,
    Busy,
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerState::Idle => write!(f, "IDLE"),
            WorkerState::Busy => write!(f, "BUSY"),
        }
    }
}

/// A processing unit. Executes at most one job at a time; while busy it holds
/// the cancellation token for its scheduled completion.
///
/// State invariant: busy iff `current_job` is set iff a token is held.
#[derive(Debug)]
pub struct Worker {
    id: u64,
    state: WorkerState,
    current_job: Option<u64>,
    cancel: Option<CancellationToken>,
}

impl Worker {
    fn new(id: u64) -> Self {
        Self {
            id,
            state: WorkerState::Idle,
            current_job: None,
            cancel: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn current_job(&self) -> Option<u64> {
        self.current_job
    }

    pub fn is_idle(&self) -> bool {
        self.state == WorkerState::Idle
    }

    /// Transition to busy on assignment, taking custody of the completion's
    /// cancellation token.
    pub(crate) fn start(&mut self, job_id: u64, cancel: CancellationToken) {
        assert!(self.is_idle(), "worker #{} assigned while busy", self.id);
        self.state = WorkerState::Busy;
        self.current_job = Some(job_id);
        self.cancel = Some(cancel);
    }

    /// Transition back to idle after the completion committed.
    pub(crate) fn finish(&mut self) {
        self.state = WorkerState::Idle;
        self.current_job = None;
        self.cancel = None;
    }

    /// Abort the scheduled completion and return the interrupted job's id.
    /// No-op (returns `None`) when the worker is idle.
    pub(crate) fn cancel_inflight(&mut self) -> Option<u64> {
        let job_id = self.current_job.take()?;
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        self.state = WorkerState::Idle;
        Some(job_id)
    }

    pub fn snapshot(&self) -> WorkerSnapshot {
        WorkerSnapshot {
            id: self.id,
            state: self.state,
            current_job: self.current_job,
        }
    }
}

/// Token-free copy of a worker for the outer layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSnapshot {
    pub id: u64,
    pub state: WorkerState,
    pub current_job: Option<u64>,
}

/// Active workers in creation order. Removal is stack-like: the most
/// recently added worker goes first.
#[derive(Debug, Default)]
pub struct WorkerRoster {
    workers: Vec<Worker>,
}

impl WorkerRoster {
    pub fn new() -> Self {
        Self {
            workers: Vec::new(),
        }
    }

    pub fn add(&mut self, id: u64) -> WorkerSnapshot {
        let worker = Worker::new(id);
        let snapshot = worker.snapshot();
        self.workers.push(worker);
        snapshot
    }

    pub fn remove_last(&mut self) -> Option<Worker> {
        self.workers.pop()
    }

    /// Ids of idle workers in roster order.
    pub fn idle_ids(&self) -> Vec<u64> {
        self.workers
            .iter()
            .filter(|w| w.is_idle())
            .map(|w| w.id())
            .collect()
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut Worker> {
        self.workers.iter_mut().find(|w| w.id() == id)
    }

    pub fn snapshot(&self) -> Vec<WorkerSnapshot> {
        self.workers.iter().map(Worker::snapshot).collect()
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}
