//! Digest stage: fold an oracle value into a fixed-size keyed digest.
//!
//! # Pipeline
//!
//! ```text
//! oracle digits → integer → big-endian fixed-width bytes → keyed hash → Digest
//! ```
//!
//! The hash itself is an external primitive behind [`KeyedHash`]. The default
//! is BLAKE2b with its salt, personalization and key parameters.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::error::{OracleError, Result};
use crate::sources::system::getrandom;

/// Digest size used when none is configured.
pub const DEFAULT_DIGEST_SIZE: usize = 32;

/// Keyed hash parameters.
///
/// Empty salt, person and key mean "algorithm default" (all zero for BLAKE2b).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestParameters {
    pub salt: Vec<u8>,
    pub person: Vec<u8>,
    pub key: Vec<u8>,
    pub digest_size: usize,
}

impl Default for DigestParameters {
    fn default() -> Self {
        Self {
            salt: Vec::new(),
            person: Vec::new(),
            key: Vec::new(),
            digest_size: DEFAULT_DIGEST_SIZE,
        }
    }
}

impl DigestParameters {
    /// Parameters with OS-random salt (16), person (16) and key (64).
    /// Drawn once; the returned value is as deterministic as any other.
    pub fn random() -> Self {
        let mut salt = vec![0u8; 16];
        let mut person = vec![0u8; 16];
        let mut key = vec![0u8; 64];
        getrandom(&mut salt);
        getrandom(&mut person);
        getrandom(&mut key);
        Self {
            salt,
            person,
            key,
            digest_size: DEFAULT_DIGEST_SIZE,
        }
    }

    pub fn with_digest_size(mut self, digest_size: usize) -> Self {
        self.digest_size = digest_size;
        self
    }

    /// Check byte fields against `hasher`'s limits and clamp the digest size
    /// into `1..=max_digest_size`.
    pub fn resolve(&self, hasher: &dyn KeyedHash) -> Result<DigestParameters> {
        check_len("salt", &self.salt, hasher.max_salt_size())?;
        check_len("person", &self.person, hasher.max_person_size())?;
        check_len("key", &self.key, hasher.max_key_size())?;

        let digest_size = self.digest_size.clamp(1, hasher.max_digest_size());
        if digest_size != self.digest_size {
            log::debug!(
                "{}: digest size {} clamped to {digest_size}",
                hasher.name(),
                self.digest_size
            );
        }
        Ok(DigestParameters {
            digest_size,
            ..self.clone()
        })
    }
}

fn check_len(field: &str, value: &[u8], max: usize) -> Result<()> {
    if value.len() > max {
        return Err(OracleError::InvalidParameter(format!(
            "{field} is {} bytes, maximum is {max}",
            value.len()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Keyed hash primitive
// ---------------------------------------------------------------------------

/// Narrow interface to an external keyed hash.
///
/// `hash` receives parameters already resolved against this primitive's
/// limits and must return exactly `params.digest_size` bytes.
pub trait KeyedHash: Send + Sync {
    fn name(&self) -> &'static str;
    fn max_digest_size(&self) -> usize;
    fn max_key_size(&self) -> usize;
    fn max_salt_size(&self) -> usize;
    fn max_person_size(&self) -> usize;
    fn hash(&self, message: &[u8], params: &DigestParameters) -> Vec<u8>;
}

/// BLAKE2b.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake2b;

impl KeyedHash for Blake2b {
    fn name(&self) -> &'static str {
        "blake2b"
    }

    fn max_digest_size(&self) -> usize {
        blake2b_simd::OUTBYTES
    }

    fn max_key_size(&self) -> usize {
        blake2b_simd::KEYBYTES
    }

    fn max_salt_size(&self) -> usize {
        blake2b_simd::SALTBYTES
    }

    fn max_person_size(&self) -> usize {
        blake2b_simd::PERSONALBYTES
    }

    fn hash(&self, message: &[u8], params: &DigestParameters) -> Vec<u8> {
        blake2b_simd::Params::new()
            .hash_length(params.digest_size)
            .key(&params.key)
            .salt(&params.salt)
            .personal(&params.person)
            .hash(message)
            .as_bytes()
            .to_vec()
    }
}

// ---------------------------------------------------------------------------
// Fixed-width serialization
// ---------------------------------------------------------------------------

/// Big-endian encoding of `value`, left-padded with zeros to `width` bytes.
///
/// Fails with [`OracleError::Overflow`] instead of truncating.
pub fn to_fixed_width(value: &BigUint, width: usize) -> Result<Vec<u8>> {
    let required = value.bits().div_ceil(8) as usize;
    if required > width {
        return Err(OracleError::Overflow { required, width });
    }
    let mut out = vec![0u8; width];
    if required > 0 {
        out[width - required..].copy_from_slice(&value.to_bytes_be());
    }
    Ok(out)
}

/// Smallest byte width that holds every `digits`-digit decimal value.
///
/// `InvalidParameter` if `digits` does not fit the `u32` exponent.
pub fn min_byte_width(digits: usize) -> Result<usize> {
    let exp = u32::try_from(digits).map_err(|_| {
        OracleError::InvalidParameter(format!("{digits} digits exceeds the supported exponent"))
    })?;
    let max = BigUint::from(10u32).pow(exp) - 1u32;
    Ok(max.bits().div_ceil(8) as usize)
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

/// Output of the digest stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
    bytes: Vec<u8>,
}

impl Digest {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Effective digest size, after clamping.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Serializes oracle values and runs them through the keyed hash.
pub struct DigestAdapter {
    hasher: Box<dyn KeyedHash>,
}

impl DigestAdapter {
    pub fn new(hasher: Box<dyn KeyedHash>) -> Self {
        Self { hasher }
    }

    pub fn hasher(&self) -> &dyn KeyedHash {
        self.hasher.as_ref()
    }

    /// Digest `value` as a `byte_width`-byte big-endian message.
    pub fn digest(
        &self,
        value: &BigUint,
        byte_width: usize,
        params: &DigestParameters,
    ) -> Result<Digest> {
        let resolved = params.resolve(self.hasher.as_ref())?;
        let message = to_fixed_width(value, byte_width)?;
        Ok(Digest {
            bytes: self.hasher.hash(&message, &resolved),
        })
    }
}

impl Default for DigestAdapter {
    fn default() -> Self {
        Self::new(Box::new(Blake2b))
    }
}
