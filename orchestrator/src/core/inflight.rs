//! In-flight computation registry
//!
//! Identical requests arriving together may both miss the cache and both
//! compute; the last cache write wins. The registry does not prevent this,
//! it makes it observable: each computation holds a guard for its
//! fingerprint and overlapping guards are counted as duplicates.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::core::fingerprint::Fingerprint;

#[derive(Debug, Default)]
struct Registry {
    running: Mutex<HashMap<Fingerprint, usize>>,
    duplicates: AtomicU64,
}

/// Shared handle to the registry
#[derive(Debug, Clone, Default)]
pub struct InFlightRegistry {
    inner: Arc<Registry>,
}

/// Marks a computation as running until dropped
#[derive(Debug)]
pub struct InFlightGuard {
    registry: Arc<Registry>,
    fingerprint: Fingerprint,
    duplicate: bool,
}

impl InFlightGuard {
    /// Whether another computation with the same fingerprint was already running
    pub fn is_duplicate(&self) -> bool {
        self.duplicate
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut running = match self.registry.running.lock() {
            Ok(running) => running,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(count) = running.get_mut(&self.fingerprint) {
            *count -= 1;
            if *count == 0 {
                running.remove(&self.fingerprint);
            }
        }
    }
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a computation for `fingerprint`
    pub fn begin(&self, fingerprint: &Fingerprint) -> InFlightGuard {
        let mut running = match self.inner.running.lock() {
            Ok(running) => running,
            Err(poisoned) => poisoned.into_inner(),
        };
        let count = running.entry(fingerprint.clone()).or_insert(0);
        let duplicate = *count > 0;
        *count += 1;
        if duplicate {
            self.inner.duplicates.fetch_add(1, Ordering::Relaxed);
        }

        InFlightGuard {
            registry: Arc::clone(&self.inner),
            fingerprint: fingerprint.clone(),
            duplicate,
        }
    }

    /// Number of computations that started while an identical one was running
    pub fn duplicate_computations(&self) -> u64 {
        self.inner.duplicates.load(Ordering::Relaxed)
    }

    pub fn running(&self, fingerprint: &Fingerprint) -> usize {
        let running = match self.inner.running.lock() {
            Ok(running) => running,
            Err(poisoned) => poisoned.into_inner(),
        };
        running.get(fingerprint).copied().unwrap_or(0)
    }
}
