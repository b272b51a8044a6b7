use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default lifetime of a cached data snapshot (one hour).
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Single-slot cache holding an immutable snapshot for a fixed time-to-live.
///
/// Invalidation is time based only; the content is never compared.
#[derive(Debug)]
pub struct TtlCache<T> {
    ttl: Duration,
    slot: Option<(Instant, Arc<T>)>,
}

impl<T> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        TtlCache { ttl, slot: None }
    }

    pub fn is_fresh(&self) -> bool {
        self.slot
            .as_ref()
            .is_some_and(|(loaded, _)| loaded.elapsed() < self.ttl)
    }

    /// Returns the cached snapshot, or runs `load` if the slot is empty or
    /// expired. A failed load leaves any stale snapshot untouched.
    pub fn get_or_try_load<E, F>(&mut self, load: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some((_, value)) = self.slot.as_ref().filter(|_| self.is_fresh()) {
            return Ok(Arc::clone(value));
        }
        let value = Arc::new(load()?);
        self.slot = Some((Instant::now(), Arc::clone(&value)));
        Ok(value)
    }

    pub fn invalidate(&mut self) {
        self.slot = None;
    }
}

impl<T> Default for TtlCache<T> {
    fn default() -> Self {
        TtlCache::new(DEFAULT_TTL)
    }
}
