use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::DispatchConfig;
use crate::dispatch::job::{Job, JobPriority, JobState};
use crate::dispatch::log::EventLog;
use crate::dispatch::queue::JobQueue;
use crate::dispatch::roster::{WorkerRoster, WorkerSnapshot};

/// Aggregate counts exposed to the reporting layer.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DispatchStatus {
    pub workers: usize,
    pub queued: usize,
    pub in_progress: usize,
    pub done: usize,
    pub total_jobs: usize,
}

/// Consistent point-in-time copy of everything the reporting layer needs,
/// taken under a single lock acquisition.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchSnapshot {
    pub status: DispatchStatus,
    pub jobs: Vec<Job>,
    pub log: Vec<String>,
}

/// One idle-worker/queued-job pairing produced by an assignment pass.
struct Assignment {
    worker_id: u64,
    job_id: u64,
    cancel: CancellationToken,
}

/// Everything the dispatcher may mutate. Lives behind one lock so that
/// submissions, worker add/remove, assignment passes, and completion commits
/// never interleave.
struct DispatchState {
    queue: JobQueue,
    roster: WorkerRoster,
    log: EventLog,
    next_job_id: u64,
    next_worker_id: u64,
}

impl DispatchState {
    fn new() -> Self {
        Self {
            queue: JobQueue::new(),
            roster: WorkerRoster::new(),
            log: EventLog::new(),
            next_job_id: 1,
            next_worker_id: 1,
        }
    }

    /// Pair idle workers (roster order) with queued jobs (priority order)
    /// until no pair matches. Marks each pairing busy/in-progress and hands
    /// back the assignments for the caller to schedule; a pass over unchanged
    /// state matches nothing and mutates nothing.
    fn assign(&mut self) -> Vec<Assignment> {
        let mut assignments = Vec::new();
        loop {
            let pairs: Vec<(u64, u64)> = self
                .roster
                .idle_ids()
                .into_iter()
                .zip(self.queue.queued_ids())
                .collect();
            if pairs.is_empty() {
                break;
            }
            for (worker_id, job_id) in pairs {
                let cancel = CancellationToken::new();
                let priority = self.queue.start(job_id).priority;
                self.roster
                    .get_mut(worker_id)
                    .expect("idle worker vanished during assignment pass")
                    .start(job_id, cancel.clone());
                self.log.append(format!(
                    "Worker #{} started job #{} ({})",
                    worker_id, job_id, priority
                ));
                assignments.push(Assignment {
                    worker_id,
                    job_id,
                    cancel,
                });
            }
        }
        assignments
    }

    fn status(&self) -> DispatchStatus {
        DispatchStatus {
            workers: self.roster.len(),
            queued: self.queue.count(JobState::Queued),
            in_progress: self.queue.count(JobState::InProgress),
            done: self.queue.count(JobState::Done),
            total_jobs: self.queue.len(),
        }
    }
}

/// Owns the job sequence, the worker roster, and the event log, and is the
/// single entry point through which any of them change.
///
/// Cancellation is synchronous from the caller's perspective: once
/// [`remove_worker`](Dispatcher::remove_worker) returns, the evicted
/// worker's completion can never commit, because it re-checks its token
/// inside the same lock under which the token was cancelled.
#[derive(Clone)]
pub struct Dispatcher {
    state: Arc<Mutex<DispatchState>>,
    processing: Duration,
}

impl Dispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(DispatchState::new())),
            processing: config.processing_duration(),
        }
    }

    /// Admit a new job and run an assignment pass. Returns a snapshot of the
    /// job as admitted (an idle worker may already have picked it up).
    pub async fn submit_job(&self, high_priority: bool) -> Job {
        let mut state = self.state.lock().await;
        let id = state.next_job_id;
        state.next_job_id += 1;
        let priority = if high_priority {
            JobPriority::High
        } else {
            JobPriority::Standard
        };
        let job = Job::new(id, priority);
        let snapshot = job.clone();
        state.queue.submit(job);
        state
            .log
            .append(format!("New {} job #{} queued", priority, id));
        let assignments = state.assign();
        drop(state);
        self.schedule(assignments);
        snapshot
    }

    /// Add an idle worker to the end of the roster and run an assignment
    /// pass.
    pub async fn add_worker(&self) -> WorkerSnapshot {
        let mut state = self.state.lock().await;
        let id = state.next_worker_id;
        state.next_worker_id += 1;
        let snapshot = state.roster.add(id);
        state.log.append(format!("Worker #{} added", id));
        let assignments = state.assign();
        drop(state);
        self.schedule(assignments);
        snapshot
    }

    /// Remove the most recently added worker, aborting its in-flight job if
    /// any; the job returns to the head of its priority class. No-op when
    /// the roster is empty. Never blocks on the in-flight work.
    pub async fn remove_worker(&self) {
        let mut state = self.state.lock().await;
        let Some(mut worker) = state.roster.remove_last() else {
            return;
        };
        if let Some(job_id) = worker.cancel_inflight() {
            let priority = state.queue.requeue(job_id).priority;
            state.log.append(format!(
                "Worker #{} stopped job #{} ({}), returned to queue",
                worker.id(),
                job_id,
                priority
            ));
        }
        state.log.append(format!("Worker #{} removed", worker.id()));
        let assignments = state.assign();
        drop(state);
        self.schedule(assignments);
    }

    pub async fn status(&self) -> DispatchStatus {
        self.state.lock().await.status()
    }

    /// Ordered job snapshots: in-progress, queued HIGH, queued STANDARD,
    /// done.
    pub async fn jobs(&self) -> Vec<Job> {
        self.state.lock().await.queue.snapshot()
    }

    pub async fn workers(&self) -> Vec<WorkerSnapshot> {
        self.state.lock().await.roster.snapshot()
    }

    pub async fn log(&self) -> Vec<String> {
        self.state.lock().await.log.snapshot()
    }

    pub async fn snapshot(&self) -> DispatchSnapshot {
        let state = self.state.lock().await;
        DispatchSnapshot {
            status: state.status(),
            jobs: state.queue.snapshot(),
            log: state.log.snapshot(),
        }
    }

    fn schedule(&self, assignments: Vec<Assignment>) {
        for assignment in assignments {
            tracing::debug!(
                worker_id = assignment.worker_id,
                job_id = assignment.job_id,
                "Processing task scheduled"
            );
            let dispatcher = self.clone();
            tokio::spawn(dispatcher.process(assignment));
        }
    }

    /// Deferred completion for one assignment. Sleeps for the processing
    /// duration, then commits under the dispatcher lock unless the token
    /// was cancelled first. The re-check happens inside the lock, so a
    /// cancellation that won the lock has already reverted the job and this
    /// task commits nothing.
    async fn process(self, assignment: Assignment) {
        tokio::select! {
            _ = assignment.cancel.cancelled() => return,
            _ = tokio::time::sleep(self.processing) => {}
        }

        let mut state = self.state.lock().await;
        if assignment.cancel.is_cancelled() {
            return;
        }
        let Assignment {
            worker_id, job_id, ..
        } = assignment;
        let priority = state.queue.complete(job_id, Utc::now()).priority;
        state
            .roster
            .get_mut(worker_id)
            .expect("busy worker missing at completion")
            .finish();
        state.log.append(format!(
            "Worker #{} completed job #{} ({})",
            worker_id, job_id, priority
        ));
        let next = state.assign();
        drop(state);
        self.schedule(next);
    }
}
