//! [`DecodeCache`]: thread-safe memo of encoded element → decrypted username.

use moka::sync::Cache;

/// Shared cache of successful decodes, keyed by the exact encoded element.
///
/// Cloning is cheap and every clone sees the same entries, so one cache is
/// built at startup and handed to every orchestrator that should share it.
///
/// The default cache never evicts: entries live until the process exits. An
/// attacker who can mint many distinct valid cookies could grow it without
/// limit; [`DecodeCache::with_capacity`] bounds it instead.
#[derive(Clone)]
pub struct DecodeCache {
    inner: Cache<String, String>,
    capacity: Option<u64>,
}

impl DecodeCache {
    /// Create a new, empty, unbounded [`DecodeCache`].
    pub fn new() -> Self {
        Self {
            inner: Cache::builder().build(),
            capacity: None,
        }
    }

    /// Create a cache holding at most `max_entries` entries.
    pub fn with_capacity(max_entries: u64) -> Self {
        Self {
            inner: Cache::builder().max_capacity(max_entries).build(),
            capacity: Some(max_entries),
        }
    }

    /// Build from an optional configured capacity (`None` = unbounded).
    pub fn from_capacity(capacity: Option<u64>) -> Self {
        capacity.map_or_else(Self::new, Self::with_capacity)
    }

    /// Configured bound, if any.
    pub fn capacity(&self) -> Option<u64> {
        self.capacity
    }

    /// Return the cached plaintext for `field`, if a decode of it has succeeded before.
    pub fn lookup(&self, field: &str) -> Option<String> {
        self.inner.get(field)
    }

    /// Record a successful decode. Only call this with a verified plaintext.
    pub fn insert(&self, field: &str, plaintext: &str) {
        self.inner.insert(field.to_owned(), plaintext.to_owned());
    }

    /// Number of entries currently held.
    ///
    /// Flushes pending maintenance first so the count reflects every insert
    /// that has returned.
    pub fn len(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for DecodeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Entries are decrypted usernames; never print them.
        f.debug_struct("DecodeCache")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl Default for DecodeCache {
    fn default() -> Self {
        Self::new()
    }
}
