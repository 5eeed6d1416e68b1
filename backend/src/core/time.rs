//! Time management for the office
//!
//! The office advances in frames (ticks). Each tick carries the wall time
//! that elapsed since the previous one, so timers are expressed as absolute
//! millisecond deadlines on this clock rather than tick counts. Nothing in
//! the crate reads the system clock directly.

use serde::{Deserialize, Serialize};

/// Manages simulated time in ticks and elapsed milliseconds
///
/// # Example
/// ```
/// use virtual_office_core::SimClock;
///
/// let mut clock = SimClock::new();
/// assert_eq!(clock.current_tick(), 0);
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(16);
/// assert_eq!(clock.current_tick(), 1);
/// assert_eq!(clock.now_ms(), 16);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimClock {
    /// Ticks elapsed since the session started
    current_tick: u64,
    /// Simulated milliseconds elapsed since the session started
    now_ms: u64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance time by one tick that lasted `dt_ms` milliseconds
    pub fn advance(&mut self, dt_ms: u64) {
        self.current_tick += 1;
        self.now_ms = self.now_ms.saturating_add(dt_ms);
    }

    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Absolute deadline `delay_ms` from now
    ///
    /// # Example
    /// ```
    /// use virtual_office_core::SimClock;
    ///
    /// let mut clock = SimClock::new();
    /// clock.advance(100);
    /// assert_eq!(clock.deadline_after(600), 700);
    /// ```
    pub fn deadline_after(&self, delay_ms: u64) -> u64 {
        self.now_ms.saturating_add(delay_ms)
    }

    /// Whether an absolute deadline has been reached
    pub fn is_due(&self, deadline_ms: u64) -> bool {
        self.now_ms >= deadline_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_length_tick_still_counts() {
        let mut clock = SimClock::new();
        clock.advance(0);
        assert_eq!(clock.current_tick(), 1);
        assert_eq!(clock.now_ms(), 0);
    }

    #[test]
    fn test_deadline_is_due_exactly_at_boundary() {
        let mut clock = SimClock::new();
        let deadline = clock.deadline_after(32);
        clock.advance(16);
        assert!(!clock.is_due(deadline));
        clock.advance(16);
        assert!(clock.is_due(deadline));
    }
}
