use std::time::Duration;

/// Shard router configuration
#[derive(Debug, Clone, Default)]
pub struct RouterConfig {
    /// Upper bound for one settings fetch. `None` waits as long as the
    /// provider does.
    pub fetch_timeout: Option<Duration>,
}

impl RouterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set settings fetch timeout
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }
}
