//! Short-lived idempotency cache for alert payloads

use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Default window in which identical alerts are ignored
pub const DEFAULT_DEDUPE_TTL: Duration = Duration::from_millis(5000);

/// Suppresses identical alert bodies seen within the TTL window
///
/// The key is the compact JSON of the whole body with field order kept,
/// so two payloads carrying the same values in a different key order are
/// distinct alerts.
pub struct DedupeGuard {
    ttl: Duration,
    seen: Mutex<HashMap<String, Instant>>,
}

impl DedupeGuard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns true the first time a body is seen within the window
    pub async fn should_process(&self, payload: &Value) -> bool {
        let key = payload.to_string();
        let now = Instant::now();

        let mut seen = self.seen.lock().await;
        seen.retain(|_, expires_at| *expires_at > now);

        if seen.contains_key(&key) {
            debug!("duplicate alert within {:?}", self.ttl);
            return false;
        }

        seen.insert(key, now + self.ttl);
        true
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.seen
            .lock()
            .await
            .values()
            .filter(|expires_at| **expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for DedupeGuard {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUPE_TTL)
    }
}
