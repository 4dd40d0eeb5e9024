//! Public oracle surface: `oracle(input, digits)` and `hash(input, width, params)`.

use std::sync::{Mutex, PoisonError};

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::digest::{Digest, DigestAdapter, DigestParameters, KeyedHash};
use crate::error::Result;
use crate::generator::CoefficientMode;
use crate::source::RandomnessSource;
use crate::store::{InputId, OracleStore, StoreStats};

/// Digits digested by default.
pub const DEFAULT_DIGEST_DIGITS: usize = 64;

/// Which oracle value the digest stage consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigestInput {
    /// The first `n` digits. Stable however far the entry later grows.
    Digits(usize),
    /// Everything stored for the input at call time.
    Stored,
}

impl Default for DigestInput {
    fn default() -> Self {
        Self::Digits(DEFAULT_DIGEST_DIGITS)
    }
}

/// A random oracle: memoized digit streams plus a keyed digest over them.
pub struct RandomOracle {
    store: OracleStore,
    adapter: DigestAdapter,
    digest_input: DigestInput,
    default_params: DigestParameters,
}

impl RandomOracle {
    pub fn new(source: Box<dyn RandomnessSource>) -> Self {
        Self::from_store(OracleStore::new(source))
    }

    pub fn from_store(store: OracleStore) -> Self {
        Self {
            store,
            adapter: DigestAdapter::default(),
            digest_input: DigestInput::default(),
            default_params: DigestParameters::default(),
        }
    }

    /// Oracle whose store uses `mode` for coefficients.
    pub fn with_coefficient_mode(
        source: Box<dyn RandomnessSource>,
        mode: CoefficientMode,
    ) -> Self {
        Self::from_store(OracleStore::with_mode(source, mode))
    }

    pub fn with_digest_input(mut self, digest_input: DigestInput) -> Self {
        self.digest_input = digest_input;
        self
    }

    pub fn with_hasher(mut self, hasher: Box<dyn KeyedHash>) -> Self {
        self.adapter = DigestAdapter::new(hasher);
        self
    }

    pub fn with_default_params(mut self, params: DigestParameters) -> Self {
        self.default_params = params;
        self
    }

    /// First `digits` decimal digits of the oracle output for `input`.
    pub fn oracle(&mut self, input: impl Into<InputId>, digits: usize) -> String {
        self.store.ensure_length(&input.into(), digits)
    }

    /// Keyed digest of `input`'s oracle value serialized to `byte_width` bytes.
    pub fn hash(
        &mut self,
        input: impl Into<InputId>,
        byte_width: usize,
        params: &DigestParameters,
    ) -> Result<Digest> {
        let input = input.into();
        let value = self.digest_value(&input);
        self.adapter.digest(&value, byte_width, params)
    }

    /// [`hash`](Self::hash) with the oracle's default parameters.
    pub fn hash_default(&mut self, input: impl Into<InputId>, byte_width: usize) -> Result<Digest> {
        let params = self.default_params.clone();
        self.hash(input, byte_width, &params)
    }

    fn digest_value(&mut self, input: &InputId) -> BigUint {
        let digits = match self.digest_input {
            DigestInput::Digits(n) => self.store.ensure_length(input, n),
            DigestInput::Stored => {
                self.store.ensure_length(input, 1);
                self.store
                    .get(input)
                    .map(|e| e.output().to_string())
                    .unwrap_or_default()
            }
        };
        BigUint::parse_bytes(digits.as_bytes(), 10).unwrap_or_default()
    }

    pub fn digest_input(&self) -> DigestInput {
        self.digest_input
    }

    pub fn default_params(&self) -> &DigestParameters {
        &self.default_params
    }

    pub fn store(&self) -> &OracleStore {
        &self.store
    }

    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }
}

/// Thread-safe oracle. Every call holds one lock for the whole operation,
/// since entry growth and buffer pops are read-modify-write sequences.
pub struct SharedOracle {
    inner: Mutex<RandomOracle>,
}

impl SharedOracle {
    pub fn new(oracle: RandomOracle) -> Self {
        Self {
            inner: Mutex::new(oracle),
        }
    }

    pub fn oracle(&self, input: impl Into<InputId>, digits: usize) -> String {
        self.lock().oracle(input, digits)
    }

    pub fn hash(
        &self,
        input: impl Into<InputId>,
        byte_width: usize,
        params: &DigestParameters,
    ) -> Result<Digest> {
        self.lock().hash(input, byte_width, params)
    }

    pub fn stats(&self) -> StoreStats {
        self.lock().stats()
    }

    pub fn into_inner(self) -> RandomOracle {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RandomOracle> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
