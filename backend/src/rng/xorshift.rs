//! xorshift64* random number generator
//!
//! This is a fast, high-quality PRNG that is deterministic and suitable
//! for simulation purposes.
//!
//! # Determinism
//!
//! Same seed → same sequence of random numbers. Agents wander randomly, so
//! replaying a session (or asserting on it in a test) requires the whole
//! office to draw from one seeded source.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use virtual_office_core::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let value = rng.next();
/// let ms = rng.range(4000, 7000); // [4000, 7000)
/// assert!((4000..7000).contains(&ms));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit)
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// A zero seed is replaced by 1 (xorshift cannot leave the all-zero state).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        // xorshift64* algorithm
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate random value in range [min, max)
    ///
    /// # Panics
    /// Panics if min >= max
    pub fn range(&mut self, min: u64, max: u64) -> u64 {
        assert!(min < max, "min must be less than max");

        let value = self.next();
        min + value % (max - min)
    }

    /// Get current RNG state (for snapshots/replay)
    ///
    /// # Example
    /// ```
    /// use virtual_office_core::RngManager;
    ///
    /// let mut rng = RngManager::new(7);
    /// rng.next();
    /// let mut resumed = RngManager::new(rng.get_state());
    /// assert_eq!(rng.next(), resumed.next());
    /// ```
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Generate random f64 in range [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        // Convert to [0.0, 1.0) by dividing by 2^53
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Generate random f64 uniformly distributed in [min, max)
    ///
    /// Returns `min` when the interval is empty (`max <= min`).
    pub fn uniform(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        min + self.next_f64() * (max - min)
    }
}
