use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::AnalysisResult;

/// Default lifetime of a cached analysis.
pub const DEFAULT_RESULT_TTL: Duration = Duration::from_secs(60 * 60);

type Key = (String, String);

struct Entry {
    stored_at: Instant,
    result: Arc<AnalysisResult>,
}

/// Per-user analysis cache keyed by the normalized headline.
///
/// Entries expire after the configured TTL. `lock_for` hands out a per-key
/// async mutex so concurrent requests for the identical (user, headline)
/// pair compute at most once; duplicates wait and then hit the cache.
pub struct AnalysisCache {
    ttl: Duration,
    entries: Mutex<HashMap<Key, Entry>>,
    last_by_user: Mutex<HashMap<String, Arc<AnalysisResult>>>,
    in_flight: Mutex<HashMap<Key, Arc<tokio::sync::Mutex<()>>>>,
}

impl AnalysisCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
            last_by_user: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn key(user: &str, headline: &str) -> Key {
        (user.to_string(), headline.trim().to_lowercase())
    }

    pub fn get(&self, key: &Key) -> Option<Arc<AnalysisResult>> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                Some(Arc::clone(&entry.result))
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn store(&self, key: Key, result: Arc<AnalysisResult>) {
        self.last_by_user
            .lock()
            .expect("cache mutex poisoned")
            .insert(key.0.clone(), Arc::clone(&result));
        self.entries.lock().expect("cache mutex poisoned").insert(
            key,
            Entry {
                stored_at: Instant::now(),
                result,
            },
        );
    }

    /// Most recent result stored for a user, regardless of headline.
    pub fn last_for_user(&self, user: &str) -> Option<Arc<AnalysisResult>> {
        self.last_by_user
            .lock()
            .expect("cache mutex poisoned")
            .get(user)
            .cloned()
    }

    /// Per-key computation guard. Callers hold the returned mutex across
    /// the compute-and-store sequence and call [`release`] afterwards.
    ///
    /// [`release`]: AnalysisCache::release
    pub fn lock_for(&self, key: &Key) -> Arc<tokio::sync::Mutex<()>> {
        let mut in_flight = self.in_flight.lock().expect("cache mutex poisoned");
        Arc::clone(
            in_flight
                .entry(key.clone())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }

    pub fn release(&self, key: &Key) {
        self.in_flight
            .lock()
            .expect("cache mutex poisoned")
            .remove(key);
    }
}
