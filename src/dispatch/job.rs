use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobPriority {
    High,
    Standard,
}

impl std::fmt::Display for JobPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobPriority::High => write!(f, "HIGH"),
            JobPriority::Standard => write!(f, "STANDARD"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Queued,
    InProgress,
    Done,
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Queued => write!(f, "QUEUED"),
            JobState::InProgress => write!(f, "IN_PROGRESS"),
            JobState::Done => write!(f, "DONE"),
        }
    }
}

/// A unit of work. Ids are assigned by the dispatcher in submission order
/// and never reused; a job is retained after completion for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
    pub priority: JobPriority,
    pub state: JobState,
    pub submitted_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn new(id: u64, priority: JobPriority) -> Self {
        Self {
            id,
            priority,
            state: JobState::Queued,
            submitted_at: Utc::now(),
            completed_at: None,
        }
    }
}
