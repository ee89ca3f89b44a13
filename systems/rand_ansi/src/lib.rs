#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded linear congruential generator matching the ANSI C `rand()` recipe.
//!
//! Replays only reproduce recorded games when every draw matches the
//! generator the logs were recorded against, so the constants, the returned
//! bit window, and the modulo bias of [`AnsiRand::between`] are fixed.

use serde::{Deserialize, Serialize};

const MULTIPLIER: u64 = 1_103_515_245;
const INCREMENT: u64 = 12_345;
const MODULUS_MASK: u64 = (1 << 31) - 1;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u32 = 1;

/// Largest value returned by [`AnsiRand::next`].
pub const RAND_MAX: u32 = 0x7fff;

/// Deterministic generator owned by a single game session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnsiRand {
    seed: u32,
}

impl AnsiRand {
    /// Creates a generator starting from `seed`.
    ///
    /// Only the low 31 bits participate in the recurrence.
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self {
            seed: seed & MODULUS_MASK as u32,
        }
    }

    /// Restarts the sequence from `seed`.
    pub fn reseed(&mut self, seed: u32) {
        self.seed = seed & MODULUS_MASK as u32;
    }

    /// Current internal state.
    #[must_use]
    pub const fn seed(&self) -> u32 {
        self.seed
    }

    /// Advances the generator and returns a value in `0..=RAND_MAX`.
    pub fn next(&mut self) -> u32 {
        let advanced = (u64::from(self.seed) * MULTIPLIER + INCREMENT) & MODULUS_MASK;
        self.seed = advanced as u32;
        (self.seed >> 16) & RAND_MAX
    }

    /// Returns `min + next() % (max - min)`, a value in `min..max`.
    ///
    /// Ranges that do not divide 32768 evenly favour lower values; the bias
    /// is part of the recorded behaviour. An empty range yields `min` without
    /// advancing the generator.
    pub fn between(&mut self, min: i32, max: i32) -> i32 {
        let span = i64::from(max) - i64::from(min);
        if span <= 0 {
            return min;
        }
        let offset = i64::from(self.next()) % span;
        (i64::from(min) + offset) as i32
    }
}

impl Default for AnsiRand {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_seed_reproduces_ansi_c_sequence() {
        let mut rand = AnsiRand::default();
        let drawn: Vec<u32> = (0..6).map(|_| rand.next()).collect();
        assert_eq!(drawn, vec![16838, 5758, 10113, 17515, 31051, 5627]);
    }

    #[test]
    fn reseed_restarts_the_sequence() {
        let mut rand = AnsiRand::new(1);
        let first = rand.next();
        let _ = rand.next();
        rand.reseed(1);
        assert_eq!(rand.next(), first);
    }

    #[test]
    fn state_stays_within_thirty_one_bits() {
        let mut rand = AnsiRand::new(u32::MAX);
        assert!(rand.seed() <= MODULUS_MASK as u32);
        for _ in 0..1000 {
            assert!(rand.next() <= RAND_MAX);
            assert!(rand.seed() <= MODULUS_MASK as u32);
        }
    }

    #[test]
    fn between_applies_plain_modulo() {
        let mut rand = AnsiRand::default();
        // 16838 % 20 == 18, 5758 % 30 == 28
        assert_eq!(rand.between(0, 20), 18);
        assert_eq!(rand.between(0, 30), 28);
        // 10113 % 9 == 6
        assert_eq!(rand.between(1, 10), 7);
    }

    #[test]
    fn between_stays_in_half_open_range() {
        let mut rand = AnsiRand::new(77);
        for _ in 0..500 {
            let value = rand.between(-3, 4);
            assert!((-3..4).contains(&value));
        }
    }

    #[test]
    fn empty_range_returns_min_without_advancing() {
        let mut rand = AnsiRand::new(9);
        assert_eq!(rand.between(5, 5), 5);
        assert_eq!(rand.seed(), 9);
    }
}
