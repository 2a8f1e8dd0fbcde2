use chrono::{DateTime, Utc};

use crate::dispatch::job::{Job, JobPriority, JobState};

/// Owns the full ordered job sequence; the vector order is the display order.
///
/// Layout invariant, maintained by every mutation: in-progress jobs first (in
/// the order their processing began), then queued HIGH jobs, then queued
/// STANDARD jobs (each class in submission order), then done jobs.
#[derive(Debug, Default)]
pub struct JobQueue {
    jobs: Vec<Job>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self { jobs: Vec::new() }
    }

    /// Insert a newly submitted job at its priority position: a HIGH job goes
    /// behind existing queued HIGH jobs but ahead of any queued STANDARD job;
    /// a STANDARD job goes behind all queued jobs. In-progress jobs are never
    /// displaced.
    pub fn submit(&mut self, job: Job) {
        let at = match job.priority {
            JobPriority::High => self.jobs.partition_point(|j| {
                j.state == JobState::InProgress
                    || (j.state == JobState::Queued && j.priority == JobPriority::High)
            }),
            JobPriority::Standard => self.jobs.partition_point(|j| j.state != JobState::Done),
        };
        self.jobs.insert(at, job);
    }

    /// Mark a queued job in-progress and move it to the end of the
    /// in-progress prefix.
    pub fn start(&mut self, id: u64) -> &Job {
        let pos = self.position(id);
        let mut job = self.jobs.remove(pos);
        assert!(
            job.state == JobState::Queued,
            "job #{} started while {}",
            id,
            job.state
        );
        job.state = JobState::InProgress;
        let at = self
            .jobs
            .partition_point(|j| j.state == JobState::InProgress);
        self.jobs.insert(at, job);
        &self.jobs[at]
    }

    /// Mark an in-progress job done and move it to the tail of the sequence.
    pub fn complete(&mut self, id: u64, at: DateTime<Utc>) -> &Job {
        let pos = self.position(id);
        let mut job = self.jobs.remove(pos);
        assert!(
            job.state == JobState::InProgress,
            "job #{} completed while {}",
            id,
            job.state
        );
        job.state = JobState::Done;
        job.completed_at = Some(at);
        self.jobs.push(job);
        // push keeps done jobs in commit order, which under a single fixed
        // processing duration is also start order
        &self.jobs[self.jobs.len() - 1]
    }

    /// Return a cancelled in-progress job to the queue, at the head of its
    /// priority class: ahead of every queued job of the same class, behind
    /// queued HIGH jobs when the job is STANDARD.
    pub fn requeue(&mut self, id: u64) -> &Job {
        let pos = self.position(id);
        let mut job = self.jobs.remove(pos);
        assert!(
            job.state == JobState::InProgress,
            "job #{} requeued while {}",
            id,
            job.state
        );
        job.state = JobState::Queued;
        let at = match job.priority {
            JobPriority::High => self
                .jobs
                .partition_point(|j| j.state == JobState::InProgress),
            JobPriority::Standard => self.jobs.partition_point(|j| {
                j.state == JobState::InProgress
                    || (j.state == JobState::Queued && j.priority == JobPriority::High)
            }),
        };
        self.jobs.insert(at, job);
        &self.jobs[at]
    }

    /// Ids of queued jobs in dispatch order.
    pub fn queued_ids(&self) -> Vec<u64> {
        self.jobs
            .iter()
            .filter(|j| j.state == JobState::Queued)
            .map(|j| j.id)
            .collect()
    }

    pub fn get(&self, id: u64) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn snapshot(&self) -> Vec<Job> {
        self.jobs.clone()
    }

    pub fn count(&self, state: JobState) -> usize {
        self.jobs.iter().filter(|j| j.state == state).count()
    }

    /// Total number of jobs ever submitted (jobs are never dropped).
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    fn position(&self, id: u64) -> usize {
        self.jobs
            .iter()
            .position(|j| j.id == id)
            .unwrap_or_else(|| panic!("job #{} missing from the sequence", id))
    }
}
