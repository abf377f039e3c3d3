#![allow(dead_code)]

use async_trait::async_trait;
use shardroute::{IndexSettings, Result, RoutingError, SettingsProvider};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Provider that always gives the same answer, optionally after a delay,
/// and counts how often it was asked.
pub struct ScriptedProvider {
    response: Result<IndexSettings>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn answering(settings: IndexSettings) -> Self {
        Self {
            response: Ok(settings),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(err: RoutingError) -> Self {
        Self {
            response: Err(err),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SettingsProvider for ScriptedProvider {
    async fn fetch_settings(&self, _index_name: &str) -> Result<IndexSettings> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.response.clone()
    }
}
