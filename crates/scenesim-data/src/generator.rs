//! Seeded value generator.
//!
//! A linear congruential generator plus a per-prefix id allocator. Given the
//! same seed and the same sequence of calls, every output is reproduced
//! exactly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// LCG multiplier.
pub const LCG_MULTIPLIER: u64 = 1_664_525;
/// LCG increment.
pub const LCG_INCREMENT: u64 = 1_013_904_223;
/// LCG modulus (2^32).
pub const LCG_MODULUS: u64 = 1 << 32;

/// Snapshot of a generator, restorable with [`SeededGenerator::restore_state`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorState {
    pub seed: u32,
    pub current_seed: u32,
    pub counters: BTreeMap<String, u64>,
}

/// Deterministic pseudo-random source and unique id allocator.
#[derive(Debug, Clone)]
pub struct SeededGenerator {
    seed: u32,
    current_seed: u32,
    counters: BTreeMap<String, u64>,
}

impl Default for SeededGenerator {
    fn default() -> Self {
        Self::new(12345)
    }
}

impl SeededGenerator {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            current_seed: seed,
            counters: BTreeMap::new(),
        }
    }

    /// The seed this generator was created with.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Advance the recurrence and return a float in `[0, 1)`.
    pub fn random(&mut self) -> f64 {
        let next = (self.current_seed as u64 * LCG_MULTIPLIER + LCG_INCREMENT) % LCG_MODULUS;
        self.current_seed = next as u32;
        next as f64 / LCG_MODULUS as f64
    }

    /// Integer in `[min, max]`, both ends inclusive. Swapped bounds are
    /// normalised. One draw.
    pub fn random_int(&mut self, min: i64, max: i64) -> i64 {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        // Up to 2^64 values, so the span and offset live in i128.
        let span = max as i128 - min as i128 + 1;
        let offset = ((self.random() * span as f64).floor() as i128).min(span - 1);
        (min as i128 + offset) as i64
    }

    /// Float in `[min, max)`. One draw.
    pub fn random_float(&mut self, min: f64, max: f64) -> f64 {
        min + self.random() * (max - min)
    }

    /// `true` with probability `p`. One draw.
    pub fn random_bool(&mut self, p: f64) -> bool {
        self.random() < p
    }

    /// Pick one element uniformly. One draw, or none for an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.random_int(0, items.len() as i64 - 1);
        items.get(index as usize)
    }

    /// Allocate `"{prefix}-{n}"`, with `n` counting from 1 per prefix.
    pub fn generate_unique_id(&mut self, prefix: &str) -> String {
        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        *counter += 1;
        format!("{prefix}-{counter}")
    }

    /// Rewind the random sequence. Id counters are kept.
    pub fn reset_seed(&mut self) {
        self.current_seed = self.seed;
    }

    /// Clear every id counter and rewind the random sequence.
    pub fn reset_counters(&mut self) {
        self.counters.clear();
        self.reset_seed();
    }

    pub fn save_state(&self) -> GeneratorState {
        GeneratorState {
            seed: self.seed,
            current_seed: self.current_seed,
            counters: self.counters.clone(),
        }
    }

    pub fn restore_state(&mut self, state: GeneratorState) {
        self.seed = state.seed;
        self.current_seed = state.current_seed;
        self.counters = state.counters;
    }
}
