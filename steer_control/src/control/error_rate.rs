//! Windowed error-rate estimate.
//!
//! Backward difference over the last `N` samples:
//! ```text
//! rate[t] = (e[t] - e[t-N]) / N
//! ```
//! The rate is 0 until `N` earlier samples are available.

use heapless::Deque;
use steer_common::consts::ERROR_RATE_FRAME;

/// Fixed-capacity history of the last `N` errors.
#[derive(Debug, Clone)]
pub struct ErrorRateFilter<const N: usize = ERROR_RATE_FRAME> {
    history: Deque<f64, N>,
}

impl<const N: usize> Default for ErrorRateFilter<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ErrorRateFilter<N> {
    pub const fn new() -> Self {
        Self {
            history: Deque::new(),
        }
    }

    /// Record `error` and return the error rate for this tick.
    ///
    /// The oldest sample is evicted once the history holds `N` entries.
    #[inline]
    pub fn push(&mut self, error: f64) -> f64 {
        let rate = match self.history.front() {
            Some(&oldest) if self.history.is_full() => (error - oldest) / N as f64,
            _ => 0.0,
        };

        if self.history.is_full() {
            self.history.pop_front();
        }
        // Cannot fail: a slot was freed above when full. N == 0 stores nothing.
        let _ = self.history.push_back(error);

        rate
    }

    /// Drop all samples.
    #[inline]
    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Number of stored samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// True once a rate can be computed.
    #[inline]
    pub fn is_warm(&self) -> bool {
        N > 0 && self.history.is_full()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_until_history_full() {
        let mut f = ErrorRateFilter::<5>::new();
        for i in 0..5 {
            assert_eq!(f.push(i as f64 * 10.0), 0.0, "push {i}");
        }
        assert!(f.is_warm());
    }

    #[test]
    fn backward_difference_over_window() {
        let mut f = ErrorRateFilter::<5>::new();
        let samples = [1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0, 128.0];
        let mut rates = [0.0; 8];
        for (i, &e) in samples.iter().enumerate() {
            rates[i] = f.push(e);
        }
        // e[5] - e[0] = 32 - 1 = 31
        assert_eq!(rates[5], 31.0 / 5.0);
        assert_eq!(rates[6], (64.0 - 2.0) / 5.0);
        assert_eq!(rates[7], (128.0 - 4.0) / 5.0);
    }

    #[test]
    fn length_never_exceeds_capacity() {
        let mut f = ErrorRateFilter::<3>::new();
        for i in 0..100 {
            f.push(i as f64);
            assert!(f.len() <= 3);
        }
        assert_eq!(f.len(), 3);
    }

    #[test]
    fn constant_error_has_zero_rate() {
        let mut f = ErrorRateFilter::<5>::new();
        for _ in 0..20 {
            assert_eq!(f.push(0.7), 0.0);
        }
    }

    #[test]
    fn clear_restarts_warm_up() {
        let mut f = ErrorRateFilter::<2>::new();
        f.push(1.0);
        f.push(2.0);
        assert_ne!(f.push(5.0), 0.0);
        f.clear();
        assert!(f.is_empty());
        assert!(!f.is_warm());
        assert_eq!(f.push(100.0), 0.0);
        assert_eq!(f.push(200.0), 0.0);
        assert_eq!(f.push(300.0), (300.0 - 100.0) / 2.0);
    }

    #[test]
    fn default_frame_length() {
        let f = ErrorRateFilter::<ERROR_RATE_FRAME>::default();
        assert!(f.is_empty());
        let g: ErrorRateFilter = ErrorRateFilter::new();
        assert_eq!(g.len(), 0);
    }
}
