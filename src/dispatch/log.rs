use chrono::Utc;

/// Append-only event log the dispatcher narrates into.
///
/// Lines carry a wall-clock timestamp for the report; each append is also
/// mirrored to `tracing` so a live run shows progress as it happens.
#[derive(Debug, Default)]
pub struct EventLog {
    lines: Vec<String>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn append(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::info!("{}", message);
        self.lines
            .push(format!("{} - {}", Utc::now().format("%H:%M:%S"), message));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.lines.clone()
    }
}
