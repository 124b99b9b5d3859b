// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock source, injected wherever a timestamp is stamped onto
/// data (category mapping, quiz attempts, migration records).
///
/// Canonicalization and hashing must never read the clock; equality
/// checks in the engine ignore stamped timestamps.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0)
    }
}

/// Test clock: starts at a fixed instant and advances only when told.
#[derive(Debug, Clone, Default)]
pub struct FixedClock {
    now_ms: Arc<AtomicU64>,
}

impl FixedClock {
    #[must_use]
    pub fn at(now_ms: u64) -> Self {
        Self {
            now_ms: Arc::new(AtomicU64::new(now_ms)),
        }
    }

    pub fn advance_ms(&self, delta: u64) {
        self.now_ms.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

static CORRELATION_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique correlation id for error logs.
#[must_use]
pub fn next_correlation_id() -> String {
    let n = CORRELATION_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("azubi-{n:08x}")
}
