//! Reporting collaborator: renders dispatcher snapshots into the flat
//! report and persists it. Consumes only plain snapshots; the core has no
//! knowledge of the output format.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dispatch::{DispatchStatus, Dispatcher, Job};
use crate::error::Result;

const TIME_FORMAT: &str = "%H:%M:%S";

/// Point-in-time view of the dispatcher, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub status: DispatchStatus,
    pub log: Vec<String>,
    pub jobs: Vec<Job>,
}

impl Report {
    pub async fn capture(dispatcher: &Dispatcher) -> Self {
        let snapshot = dispatcher.snapshot().await;
        Self {
            generated_at: Utc::now(),
            status: snapshot.status,
            log: snapshot.log,
            jobs: snapshot.jobs,
        }
    }

    /// Render the report as a UTF-8 text block: header, status block, log
    /// block, then one detail line per job.
    pub fn render_text(&self) -> String {
        let mut out = vec![
            "=== Dispatch Report ===".to_string(),
            format!("Generated: {}", self.generated_at.format(TIME_FORMAT)),
            String::new(),
            "--- System Status ---".to_string(),
            format!("Total Workers: {}", self.status.workers),
            format!("Queued Jobs: {}", self.status.queued),
            format!("In-Progress Jobs: {}", self.status.in_progress),
            format!("Done Jobs: {}", self.status.done),
            format!("Total Jobs: {}", self.status.total_jobs),
            String::new(),
            "--- Event Log ---".to_string(),
        ];
        out.extend(self.log.iter().cloned());
        out.push(String::new());
        out.push("--- Job Details ---".to_string());
        for job in &self.jobs {
            out.push(detail_line(job));
        }
        out.join("\n")
    }

    pub fn render_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub async fn write_text(&self, path: &Path) -> Result<()> {
        tokio::fs::write(path, self.render_text()).await?;
        Ok(())
    }

    pub async fn write_json(&self, path: &Path) -> Result<()> {
        tokio::fs::write(path, self.render_json()?).await?;
        Ok(())
    }
}

fn detail_line(job: &Job) -> String {
    let completed = match job.completed_at {
        Some(at) => at.format(TIME_FORMAT).to_string(),
        None => "N/A".to_string(),
    };
    format!(
        "Job #{} ({}) - Status: {} | Created: {} | Completed: {}",
        job.id,
        job.priority,
        job.state,
        job.submitted_at.format(TIME_FORMAT),
        completed
    )
}
