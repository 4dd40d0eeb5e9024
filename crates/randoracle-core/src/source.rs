//! Abstract randomness source trait.
//!
//! Every source implements [`RandomnessSource`], which hands out batches of
//! non-negative arbitrary-precision integers. The generator only ever asks for
//! three values at a time (one quadratic's coefficients), but the contract is
//! batch-shaped so buffered sources can amortize their refills.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// Default coefficient width in bits: one 32-hex-digit quantum value.
pub const DEFAULT_BITS: u64 = 128;

/// Which family a randomness source belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// OS CSPRNG, never reproducible.
    SystemSecure,
    /// Deterministic PRNG from an explicit seed.
    Seeded,
    /// Remote quantum service, served from a local buffer.
    QuantumBuffered,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SystemSecure => write!(f, "system_secure"),
            Self::Seeded => write!(f, "seeded"),
            Self::QuantumBuffered => write!(f, "quantum_buffered"),
        }
    }
}

/// Trait that every randomness source must implement.
///
/// Sources are stateful (a PRNG advances, a buffer drains), so drawing takes
/// `&mut self`. They are `Send` so an oracle can sit behind a mutex.
pub trait RandomnessSource: Send {
    /// Source family.
    fn kind(&self) -> SourceKind;

    /// Draw exactly `count` independent values.
    ///
    /// Returning any other number of values is a contract violation; the
    /// generator panics on a short or long batch.
    fn draw(&mut self, count: usize) -> Vec<BigUint>;

    /// Total values handed out so far.
    fn drawn(&self) -> u64;

    /// Convenience: display name from the kind.
    fn name(&self) -> String {
        self.kind().to_string()
    }
}

/// Turn `ceil(bits / 8)` random bytes into an integer below `2^bits`.
pub(crate) fn uniform_from_bytes(bytes: &[u8], bits: u64) -> BigUint {
    let value = BigUint::from_bytes_be(bytes);
    let excess = (bytes.len() as u64 * 8).saturating_sub(bits);
    value >> excess
}

/// Number of bytes needed to cover `bits` bits.
pub(crate) fn byte_len(bits: u64) -> usize {
    bits.div_ceil(8) as usize
}
