use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::rate_provider::RateKey;

/// Append-only in-memory store of fetched conversion rates, shared between
/// concurrent fetches. A rate is a pure function of its (from, to, date) key,
/// so a racing double-insert is harmless.
#[derive(Clone)]
pub struct RateCache {
    inner: Arc<Mutex<HashMap<RateKey, f64>>>,
}

impl RateCache {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn get(&self, key: &RateKey) -> Option<f64> {
        let rates = self.inner.lock().await;
        let rate = rates.get(key).copied();
        if rate.is_some() {
            debug!("Rate cache HIT for {}->{} on {}", key.from, key.to, key.date);
        } else {
            debug!("Rate cache MISS for {}->{} on {}", key.from, key.to, key.date);
        }
        rate
    }

    pub async fn put(&self, key: RateKey, rate: f64) {
        let mut rates = self.inner.lock().await;
        debug!("Rate cache PUT {} for {}->{} on {}", rate, key.from, key.to, key.date);
        rates.insert(key, rate);
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new()
    }
}
