use std::time::Duration;

use dispatch_lite::config::DispatchConfig;
use dispatch_lite::dispatch::{Dispatcher, JobState, WorkerSnapshot, WorkerState};

const PROCESSING_MS: u64 = 120;

fn test_dispatcher() -> Dispatcher {
    Dispatcher::new(DispatchConfig::new(PROCESSING_MS))
}

async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// A worker is busy exactly when it references a job.
fn assert_worker_invariant(workers: &[WorkerSnapshot]) {
    for worker in workers {
        assert_eq!(
            worker.state == WorkerState::Busy,
            worker.current_job.is_some(),
            "worker #{} state/current_job mismatch",
            worker.id
        );
    }
}

async fn assert_counts_consistent(dispatcher: &Dispatcher) {
    let status = dispatcher.status().await;
    assert_eq!(
        status.queued + status.in_progress + status.done,
        status.total_jobs
    );
}

#[tokio::test]
async fn submissions_queue_by_priority() {
    let dispatcher = test_dispatcher();
    dispatcher.submit_job(false).await;
    dispatcher.submit_job(false).await;
    dispatcher.submit_job(true).await;

    let ids: Vec<u64> = dispatcher.jobs().await.iter().map(|j| j.id).collect();
    assert_eq!(ids, vec![3, 1, 2]);
    assert_counts_consistent(&dispatcher).await;
}

#[tokio::test]
async fn job_ids_are_unique_and_increasing() {
    let dispatcher = test_dispatcher();
    for _ in 0..4 {
        dispatcher.submit_job(false).await;
    }
    dispatcher.submit_job(true).await;

    let mut ids: Vec<u64> = dispatcher.jobs().await.iter().map(|j| j.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn worker_ids_are_never_reused() {
    let dispatcher = test_dispatcher();
    dispatcher.add_worker().await;
    dispatcher.add_worker().await;
    dispatcher.remove_worker().await;
    let readded = dispatcher.add_worker().await;

    assert_eq!(readded.id, 3);
    let ids: Vec<u64> = dispatcher.workers().await.iter().map(|w| w.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn worker_processes_job_to_done() {
    let dispatcher = test_dispatcher();
    dispatcher.add_worker().await;
    dispatcher.submit_job(false).await;

    // Assignment happens inside the submit call, so the transition to busy
    // is already visible.
    let workers = dispatcher.workers().await;
    assert_eq!(workers[0].state, WorkerState::Busy);
    assert_eq!(workers[0].current_job, Some(1));
    assert_worker_invariant(&workers);

    sleep_ms(PROCESSING_MS * 3).await;

    let status = dispatcher.status().await;
    assert_eq!(status.done, 1);
    assert_eq!(status.in_progress, 0);

    let workers = dispatcher.workers().await;
    assert_eq!(workers[0].state, WorkerState::Idle);
    assert_eq!(workers[0].current_job, None);
    assert_worker_invariant(&workers);

    let job = &dispatcher.jobs().await[0];
    assert_eq!(job.state, JobState::Done);
    assert!(job.completed_at.is_some());
    assert_counts_consistent(&dispatcher).await;
}

#[tokio::test]
async fn removed_worker_returns_job_and_completion_never_fires() {
    let dispatcher = test_dispatcher();
    dispatcher.add_worker().await;
    dispatcher.submit_job(false).await;
    assert_eq!(dispatcher.status().await.in_progress, 1);

    dispatcher.remove_worker().await;

    // Once remove_worker returned the job must already read as queued again.
    let status = dispatcher.status().await;
    assert_eq!(status.workers, 0);
    assert_eq!(status.queued, 1);
    assert_eq!(status.done, 0);

    // The cancelled completion must not commit even after its timer was due.
    sleep_ms(PROCESSING_MS * 3).await;
    let status = dispatcher.status().await;
    assert_eq!(status.queued, 1);
    assert_eq!(status.done, 0);

    let log = dispatcher.log().await;
    assert!(log.iter().any(|l| l.contains("stopped job #1")));
    assert!(!log.iter().any(|l| l.contains("completed job #1")));
    assert_counts_consistent(&dispatcher).await;
}

#[tokio::test]
async fn single_job_engages_a_single_worker() {
    let dispatcher = test_dispatcher();
    dispatcher.add_worker().await;
    dispatcher.add_worker().await;
    dispatcher.submit_job(false).await;

    let workers = dispatcher.workers().await;
    let busy: Vec<&WorkerSnapshot> = workers
        .iter()
        .filter(|w| w.state == WorkerState::Busy)
        .collect();
    assert_eq!(busy.len(), 1);
    assert_eq!(busy[0].current_job, Some(1));
    assert_worker_invariant(&workers);
}

#[tokio::test]
async fn new_worker_does_not_disturb_existing_assignment() {
    let dispatcher = test_dispatcher();
    dispatcher.add_worker().await;
    dispatcher.submit_job(false).await;

    // A fresh assignment pass with nothing to match must change nothing.
    dispatcher.add_worker().await;

    let workers = dispatcher.workers().await;
    assert_eq!(workers[0].current_job, Some(1));
    assert_eq!(workers[1].state, WorkerState::Idle);
    assert_eq!(dispatcher.status().await.in_progress, 1);
}

#[tokio::test]
async fn freed_worker_drains_the_queue() {
    let dispatcher = test_dispatcher();
    dispatcher.add_worker().await;
    for _ in 0..3 {
        dispatcher.submit_job(false).await;
    }

    let status = dispatcher.status().await;
    assert_eq!(status.in_progress, 1);
    assert_eq!(status.queued, 2);

    // One worker, three jobs, back to back.
    sleep_ms(PROCESSING_MS * 5).await;

    let status = dispatcher.status().await;
    assert_eq!(status.done, 3);
    assert_eq!(status.queued, 0);

    let log = dispatcher.log().await;
    let completions = log.iter().filter(|l| l.contains("completed job")).count();
    assert_eq!(completions, 3);
    assert_counts_consistent(&dispatcher).await;
}

#[tokio::test]
async fn high_priority_waits_for_in_progress_job() {
    let dispatcher = test_dispatcher();
    dispatcher.add_worker().await;
    dispatcher.submit_job(false).await;
    dispatcher.submit_job(false).await;
    dispatcher.submit_job(true).await;

    // No pre-emption: the worker keeps its STANDARD job.
    let workers = dispatcher.workers().await;
    assert_eq!(workers[0].current_job, Some(1));

    // After the first completion the HIGH job is dispatched ahead of the
    // earlier STANDARD one.
    sleep_ms(PROCESSING_MS + PROCESSING_MS / 2).await;
    let workers = dispatcher.workers().await;
    assert_eq!(workers[0].current_job, Some(3));
    assert_eq!(
        dispatcher
            .jobs()
            .await
            .iter()
            .find(|j| j.id == 2)
            .map(|j| j.state),
        Some(JobState::Queued)
    );
}

#[tokio::test]
async fn requeued_job_is_picked_up_by_remaining_worker() {
    let dispatcher = test_dispatcher();
    dispatcher.add_worker().await;
    dispatcher.add_worker().await;
    dispatcher.submit_job(false).await;
    dispatcher.submit_job(false).await;
    assert_eq!(dispatcher.status().await.in_progress, 2);

    // Worker #2 is evicted mid-flight; #2's job goes back to the queue and
    // worker #1 picks it up after finishing its own.
    dispatcher.remove_worker().await;
    let status = dispatcher.status().await;
    assert_eq!(status.workers, 1);
    assert_eq!(status.queued, 1);
    assert_eq!(status.in_progress, 1);

    sleep_ms(PROCESSING_MS * 4).await;
    let status = dispatcher.status().await;
    assert_eq!(status.done, 2);
    assert_counts_consistent(&dispatcher).await;
}

#[tokio::test]
async fn remove_worker_without_workers_is_a_noop() {
    let dispatcher = test_dispatcher();
    dispatcher.remove_worker().await;

    let status = dispatcher.status().await;
    assert_eq!(status.workers, 0);
    assert_eq!(status.total_jobs, 0);
    assert!(dispatcher.log().await.is_empty());
}

#[tokio::test]
async fn log_narrates_the_job_lifecycle() {
    let dispatcher = test_dispatcher();
    dispatcher.submit_job(false).await;
    dispatcher.add_worker().await;
    sleep_ms(PROCESSING_MS * 3).await;

    let log = dispatcher.log().await;
    let position = |needle: &str| {
        log.iter()
            .position(|l| l.contains(needle))
            .unwrap_or_else(|| panic!("log line missing: {}", needle))
    };

    let queued = position("New STANDARD job #1 queued");
    let added = position("Worker #1 added");
    let started = position("Worker #1 started job #1 (STANDARD)");
    let completed = position("Worker #1 completed job #1 (STANDARD)");
    assert!(queued < added && added < started && started < completed);
}
