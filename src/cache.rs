use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Lazily filled, wholesale-replaced cache with a single-flight refresh
///
/// The slot lock is held across the refresh, so callers that miss at the
/// same time queue behind the one doing the work and then take its outcome
/// instead of issuing their own request. A refresh that yields `None` leaves
/// the cell cold; callers arriving after it has finished try again.
pub(crate) struct RefreshCell<T> {
    slot: Mutex<Option<Arc<T>>>,
    // Completed refresh attempts, bumped while the slot is held
    attempts: AtomicU64,
}

impl<T> RefreshCell<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            attempts: AtomicU64::new(0),
        }
    }

    /// Return the cached value, running `refresh` first if the cell is cold
    ///
    /// A caller that waited on someone else's refresh gets that refresh's
    /// result, `None` included.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Option<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        let observed = self.attempts.load(Ordering::Acquire);
        let mut slot = self.slot.lock().await;
        if slot.is_some() || self.attempts.load(Ordering::Acquire) != observed {
            return slot.clone();
        }

        let refreshed = refresh().await.map(Arc::new);
        *slot = refreshed.clone();
        self.attempts.fetch_add(1, Ordering::Release);
        refreshed
    }

    /// Run `refresh` unconditionally and store its result
    ///
    /// Holds the slot while refreshing; a `None` result keeps the previous
    /// value.
    pub async fn refresh_with<F, Fut>(&self, refresh: F) -> Option<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(value) = refresh().await {
            *slot = Some(Arc::new(value));
        }
        self.attempts.fetch_add(1, Ordering::Release);
        slot.clone()
    }

    /// Drop the cached value; the next lookup refreshes
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }
}
