//! Reproducible source: a `StdRng` seeded once at construction.

use num_bigint::BigUint;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use sha2::{Digest, Sha256};

use crate::source::{DEFAULT_BITS, RandomnessSource, SourceKind, byte_len, uniform_from_bytes};

/// Deterministic source. The same seed and the same call sequence always
/// yield the same values.
pub struct Seeded {
    rng: StdRng,
    bits: u64,
    drawn: u64,
}

impl Seeded {
    /// Seed from a 64-bit value, drawing `DEFAULT_BITS`-bit values.
    pub fn new(seed: u64) -> Self {
        Self::with_bits(seed, DEFAULT_BITS)
    }

    /// Seed from a 64-bit value, drawing values below `2^bits`.
    pub fn with_bits(seed: u64, bits: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            bits,
            drawn: 0,
        }
    }

    /// Seed from arbitrary-length material (e.g. a 4096-bit integer's bytes).
    /// The material is compressed to the generator's 32-byte seed with SHA-256.
    pub fn from_seed_bytes(material: &[u8], bits: u64) -> Self {
        let seed: [u8; 32] = Sha256::digest(material).into();
        Self {
            rng: StdRng::from_seed(seed),
            bits,
            drawn: 0,
        }
    }

    /// Width of each drawn value in bits.
    pub fn bits(&self) -> u64 {
        self.bits
    }
}

impl RandomnessSource for Seeded {
    fn kind(&self) -> SourceKind {
        SourceKind::Seeded
    }

    fn draw(&mut self, count: usize) -> Vec<BigUint> {
        let mut buf = vec![0u8; byte_len(self.bits)];
        let values = (0..count)
            .map(|_| {
                self.rng.fill_bytes(&mut buf);
                uniform_from_bytes(&buf, self.bits)
            })
            .collect();
        self.drawn += count as u64;
        values
    }

    fn drawn(&self) -> u64 {
        self.drawn
    }
}
