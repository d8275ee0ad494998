// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! Noise sources and deterministic per-entity random streams

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh64::xxh64;

/// Probability distribution sampled by noisy rules and by randomization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoiseSource {
    Uniform { min: f64, max: f64 },
    Normal { mean: f64, std_dev: f64 },
}

impl Default for NoiseSource {
    fn default() -> Self {
        NoiseSource::Uniform { min: 0.0, max: 1.0 }
    }
}

impl NoiseSource {
    pub fn validate(&self) -> Result<(), &'static str> {
        match *self {
            NoiseSource::Uniform { min, max } => {
                if !(min.is_finite() && max.is_finite()) {
                    return Err("noise: uniform bounds must be finite");
                }
                if max < min {
                    return Err("noise: uniform max must be >= min");
                }
            }
            NoiseSource::Normal { mean, std_dev } => {
                if !(mean.is_finite() && std_dev.is_finite()) {
                    return Err("noise: normal parameters must be finite");
                }
                if std_dev < 0.0 {
                    return Err("noise: standard deviation must be >= 0");
                }
            }
        }
        Ok(())
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            NoiseSource::Uniform { min, max } => {
                if max > min {
                    rng.gen_range(min..max)
                } else {
                    min
                }
            }
            NoiseSource::Normal { mean, std_dev } => match Normal::new(mean, std_dev) {
                Ok(normal) => normal.sample(rng),
                Err(_) => mean,
            },
        }
    }
}

/// Derive the seed of one neuron's random stream for one iteration
#[inline]
pub(crate) fn stream_seed(network_seed: u64, iteration: u64, index: u32) -> u64 {
    let mut key = [0u8; 12];
    key[..8].copy_from_slice(&iteration.to_le_bytes());
    key[8..].copy_from_slice(&index.to_le_bytes());
    xxh64(&key, network_seed)
}

/// Lazily seeded RNG
///
/// Most rules never draw a sample, so the generator is only built on first use.
/// Because the seed depends on the entity and the iteration but not on which
/// worker thread runs the rule, parallel steps stay reproducible.
pub struct EntityRng {
    seed: u64,
    inner: Option<StdRng>,
}

impl EntityRng {
    pub fn new(seed: u64) -> Self {
        Self { seed, inner: None }
    }

    #[inline]
    fn rng(&mut self) -> &mut StdRng {
        let seed = self.seed;
        self.inner.get_or_insert_with(|| StdRng::seed_from_u64(seed))
    }
}

impl RngCore for EntityRng {
    fn next_u32(&mut self) -> u32 {
        self.rng().next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng().next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng().fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng().try_fill_bytes(dest)
    }
}
