use std::time::Duration;

use mini_moka::sync::Cache;

/// Most responses kept at once; the least recently used go first.
const MAX_ENTRIES: u64 = 1_000;

/// Response bodies keyed by request URL, fresh for a fixed window.
///
/// Entries expire once the window has passed since they were fetched. A zero
/// window disables caching.
pub struct QueryCache {
    entries: Option<Cache<String, String>>,
}

impl QueryCache {
    pub fn new(stale_after: Duration) -> Self {
        let entries = (!stale_after.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .time_to_live(stale_after)
                .build()
        });
        Self { entries }
    }

    pub fn get(&self, url: &str) -> Option<String> {
        self.entries.as_ref()?.get(&url.to_string())
    }

    pub fn insert(&self, url: &str, body: String) {
        if let Some(entries) = &self.entries {
            entries.insert(url.to_string(), body);
        }
    }

    /// Drop every entry, e.g. after a write made cached reads outdated.
    pub fn clear(&self) {
        if let Some(entries) = &self.entries {
            entries.invalidate_all();
        }
    }
}
