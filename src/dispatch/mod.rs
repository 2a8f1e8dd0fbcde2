//! The dispatch core: priority queue, worker roster, and assignment.
//!
//! All state mutation goes through the [`Dispatcher`], which serializes
//! admission, worker add/remove, assignment passes, and completion commits
//! behind a single lock. Everything the outer layers see (status counts,
//! job snapshots, log lines) is a plain copy with no handles inside.

pub mod dispatcher;
pub mod job;
pub mod log;
pub mod queue;
pub mod roster;

pub use dispatcher::{DispatchSnapshot, DispatchStatus, Dispatcher};
pub use job::{Job, JobPriority, JobState};
pub use queue::JobQueue;
pub use roster::{WorkerSnapshot, WorkerState};
