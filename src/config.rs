use std::time::Duration;

/// Processing duration applied to every assignment when none is configured.
pub const DEFAULT_PROCESSING_MS: u64 = 10_000;

/// Tunables for the dispatch engine.
///
/// Every job takes the same fixed amount of processing time; there is no
/// per-job or per-priority duration policy.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Time a worker spends on one job, in milliseconds.
    pub processing_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            processing_ms: DEFAULT_PROCESSING_MS,
        }
    }
}

impl DispatchConfig {
    pub fn new(processing_ms: u64) -> Self {
        Self { processing_ms }
    }

    pub fn processing_duration(&self) -> Duration {
        Duration::from_millis(self.processing_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_config_default() {
        let cfg = DispatchConfig::default();
        assert_eq!(cfg.processing_ms, DEFAULT_PROCESSING_MS);
    }

    #[test]
    fn processing_duration_conversion() {
        let cfg = DispatchConfig::new(250);
        assert_eq!(cfg.processing_duration(), Duration::from_millis(250));
    }
}
