use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-key mutual exclusion for the save, convert and read sequence.
///
/// Requests for different keys never wait on each other. Entries are kept for
/// the life of the process, one per distinct key seen.
#[derive(Clone, Default)]
pub struct FileLocks {
    inner: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl FileLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive use of `key`; released when the guard drops.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = self.inner.entry(key.to_string()).or_default().clone();
        lock.lock_owned().await
    }
}
