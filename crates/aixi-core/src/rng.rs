//! The process-wide randomness source.
//!
//! Everything stochastic (tree sampling, UCB tie-breaking, exploration,
//! the environments themselves) draws from one thread-local, seedable
//! linear congruential generator, so a single `random-seed` option makes a
//! whole run reproducible and tests can pin their outcomes.
//!
//! Not cryptographically secure, and not meant to be.

use std::cell::RefCell;

/// Linear congruential generator (Numerical Recipes constants).
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        self.state
    }

    /// Uniform f64 in [0, 1), using the top 53 bits of the state.
    pub fn rand01(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform integer in [0, end), end > 0, via rejection sampling to
    /// remove the modulo bias of the raw generator.
    pub fn rand_range(&mut self, end: u64) -> u64 {
        assert!(end > 0, "rand_range requires a non-empty range");
        let zone = (u64::MAX / end) * end;
        loop {
            let r = self.next_u64();
            if r < zone {
                return r % end;
            }
        }
    }

    /// Uniform integer in [start, end).
    pub fn rand_range_from(&mut self, start: u64, end: u64) -> u64 {
        assert!(start < end);
        start + self.rand_range(end - start)
    }
}

thread_local! {
    static SOURCE: RefCell<Lcg> = RefCell::new(Lcg::new(0));
}

/// Reseed the thread's generator. Called once by the driver, and by tests
/// that need a fixed stream.
pub fn seed(seed: u64) {
    SOURCE.with(|s| *s.borrow_mut() = Lcg::new(seed));
}

/// Uniform f64 in [0, 1).
pub fn rand01() -> f64 {
    SOURCE.with(|s| s.borrow_mut().rand01())
}

/// Uniform integer in [0, end).
pub fn rand_range(end: u64) -> u64 {
    SOURCE.with(|s| s.borrow_mut().rand_range(end))
}

/// Uniform integer in [start, end).
pub fn rand_range_from(start: u64, end: u64) -> u64 {
    SOURCE.with(|s| s.borrow_mut().rand_range_from(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = Lcg::new(7);
        let mut b = Lcg::new(7);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn rand01_is_in_unit_interval() {
        let mut rng = Lcg::new(0);
        for _ in 0..10_000 {
            let x = rng.rand01();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn rand_range_stays_in_bounds() {
        let mut rng = Lcg::new(3);
        for end in [1, 2, 3, 7, 1000] {
            for _ in 0..1000 {
                assert!(rng.rand_range(end) < end);
            }
        }
    }

    #[test]
    fn rand_range_hits_every_value() {
        let mut rng = Lcg::new(11);
        let mut seen = [false; 5];
        for _ in 0..1000 {
            seen[rng.rand_range(5) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn rand_range_from_offsets() {
        let mut rng = Lcg::new(5);
        for _ in 0..1000 {
            let x = rng.rand_range_from(10, 13);
            assert!((10..13).contains(&x));
        }
    }

    #[test]
    fn reseeding_restarts_the_stream() {
        seed(99);
        let first: Vec<u64> = (0..8).map(|_| rand_range(1 << 30)).collect();
        seed(99);
        let second: Vec<u64> = (0..8).map(|_| rand_range(1 << 30)).collect();
        assert_eq!(first, second);
    }
}
