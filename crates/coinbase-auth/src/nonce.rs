//! Monotonic nonce sequencing
//!
//! The first nonce is seeded from the wall clock in microseconds, every
//! later one is the previous value plus one. The clock is read at most once
//! per sequencer, so nonces stay strictly increasing even if the system
//! clock steps backwards.

use parking_lot::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{AuthError, AuthResult};

/// Largest value a nonce may start from; nonces are signed 64-bit on the wire
pub const MAX_NONCE_SEED: u64 = i64::MAX as u64;

/// Source of wall-clock time used to seed nonces
pub trait Clock: Send + Sync {
    /// Microseconds since the Unix epoch
    fn now_micros(&self) -> u64;
}

/// [`Clock`] backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_micros(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0)
    }
}

/// Per-client nonce generator
///
/// Owned by exactly one signer. `next()` is a critical section, so a signer
/// shared between threads still never hands out the same nonce twice.
pub struct NonceSequencer {
    clock: Box<dyn Clock>,
    /// Fixed first value, used instead of the clock when set
    seed: Option<u64>,
    last: Mutex<Option<u64>>,
}

impl NonceSequencer {
    /// Create a sequencer seeded from the system clock
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Create a sequencer seeded from a custom clock
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            seed: None,
            last: Mutex::new(None),
        }
    }

    /// Create a sequencer whose first nonce is `seed`
    ///
    /// # Errors
    /// [`AuthError::Configuration`] if `seed` exceeds [`MAX_NONCE_SEED`].
    pub fn with_seed(seed: u64) -> AuthResult<Self> {
        if seed > MAX_NONCE_SEED {
            return Err(AuthError::Configuration(format!(
                "Nonce seed {} exceeds {}",
                seed, MAX_NONCE_SEED
            )));
        }

        Ok(Self {
            clock: Box::new(SystemClock),
            seed: Some(seed),
            last: Mutex::new(None),
        })
    }

    /// Produce the next nonce
    pub fn next(&self) -> u64 {
        let mut last = self.last.lock();
        let nonce = match *last {
            Some(previous) => previous + 1,
            // Starting at most at i64::MAX leaves 2^63 increments before u64 overflow
            None => self
                .seed
                .unwrap_or_else(|| self.clock.now_micros().min(MAX_NONCE_SEED)),
        };
        *last = Some(nonce);
        nonce
    }

    /// The most recently issued nonce, if any
    pub fn last(&self) -> Option<u64> {
        *self.last.lock()
    }
}

impl Default for NonceSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NonceSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonceSequencer")
            .field("seed", &self.seed)
            .field("last", &self.last())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    struct SteppingClock(AtomicU64);

    impl Clock for SteppingClock {
        fn now_micros(&self) -> u64 {
            // Goes backwards on every read
            self.0.fetch_sub(1_000, Ordering::SeqCst)
        }
    }

    #[test]
    fn test_seeded_sequence_increments_by_one() {
        let nonces = NonceSequencer::with_seed(1000).unwrap();
        assert_eq!(nonces.last(), None);
        assert_eq!(nonces.next(), 1000);
        assert_eq!(nonces.next(), 1001);
        assert_eq!(nonces.next(), 1002);
        assert_eq!(nonces.last(), Some(1002));
    }

    #[test]
    fn test_seed_above_signed_range_rejected() {
        assert!(matches!(
            NonceSequencer::with_seed(u64::MAX),
            Err(AuthError::Configuration(_))
        ));
        assert!(NonceSequencer::with_seed(MAX_NONCE_SEED + 1).is_err());
    }

    #[test]
    fn test_largest_seed_keeps_increasing() {
        let nonces = NonceSequencer::with_seed(MAX_NONCE_SEED).unwrap();
        assert_eq!(nonces.next(), MAX_NONCE_SEED);
        assert_eq!(nonces.next(), MAX_NONCE_SEED + 1);
        assert_eq!(nonces.next(), MAX_NONCE_SEED + 2);
    }

    #[test]
    fn test_huge_clock_reading_is_clamped() {
        let nonces = NonceSequencer::with_clock(SteppingClock(AtomicU64::new(u64::MAX)));
        assert_eq!(nonces.next(), MAX_NONCE_SEED);
        assert_eq!(nonces.next(), MAX_NONCE_SEED + 1);
    }

    #[test]
    fn test_clock_read_only_once() {
        let nonces = NonceSequencer::with_clock(SteppingClock(AtomicU64::new(5_000_000)));
        let first = nonces.next();
        assert_eq!(first, 5_000_000);
        for i in 1..100 {
            assert_eq!(nonces.next(), first + i);
        }
    }

    #[test]
    fn test_system_clock_seed_is_recent() {
        let before = SystemClock.now_micros();
        let nonce = NonceSequencer::new().next();
        assert!(nonce >= before);
    }

    #[test]
    fn test_concurrent_nonces_are_unique() {
        let nonces = Arc::new(NonceSequencer::with_seed(1).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let nonces = Arc::clone(&nonces);
                std::thread::spawn(move || (0..250).map(|_| nonces.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for nonce in handle.join().unwrap() {
                assert!(seen.insert(nonce), "duplicate nonce {}", nonce);
            }
        }

        assert_eq!(seen.len(), 2000);
        assert_eq!(nonces.last(), Some(2000));
    }
}
