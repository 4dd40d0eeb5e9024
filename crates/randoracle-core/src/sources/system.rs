//! Non-reproducible source backed by the OS CSPRNG.

use num_bigint::BigUint;

use crate::source::{DEFAULT_BITS, RandomnessSource, SourceKind, byte_len, uniform_from_bytes};

/// Draws every value straight from the operating system's CSPRNG.
pub struct SystemSecure {
    bits: u64,
    drawn: u64,
}

impl SystemSecure {
    /// Source producing values below `2^bits`.
    pub fn new(bits: u64) -> Self {
        Self { bits, drawn: 0 }
    }

    /// Width of each drawn value in bits.
    pub fn bits(&self) -> u64 {
        self.bits
    }
}

impl Default for SystemSecure {
    fn default() -> Self {
        Self::new(DEFAULT_BITS)
    }
}

impl RandomnessSource for SystemSecure {
    fn kind(&self) -> SourceKind {
        SourceKind::SystemSecure
    }

    fn draw(&mut self, count: usize) -> Vec<BigUint> {
        let mut buf = vec![0u8; byte_len(self.bits)];
        let values = (0..count)
            .map(|_| {
                getrandom(&mut buf);
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

/// Fill buffer with OS random bytes via the `getrandom` crate.
///
/// # Panics
/// Panics if the OS CSPRNG fails; this indicates a fatal platform issue.
pub(crate) fn getrandom(buf: &mut [u8]) {
    getrandom::fill(buf).expect("OS CSPRNG failed");
}
