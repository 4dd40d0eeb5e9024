//! Oracle configuration, loadable from JSON.
//!
//! ```json
//! {
//!   "source": { "kind": "seeded", "seed": 1, "bits": 128 },
//!   "coefficient_mode": "per_chunk",
//!   "digest_input": { "digits": 64 },
//!   "digest": { "digest_size": 32, "person": [111, 114, 97, 99, 108, 101] }
//! }
//! ```
//!
//! Every field is optional; omitted fields take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::digest::{Blake2b, DigestParameters};
use crate::error::{OracleError, Result};
use crate::generator::CoefficientMode;
use crate::oracle::{DigestInput, RandomOracle};
use crate::source::{DEFAULT_BITS, RandomnessSource};
use crate::sources::quantum::{
    DEFAULT_BATCH_SIZE, DEFAULT_BLOCK_SIZE, DEFAULT_ENDPOINT, MAX_BATCH_SIZE, MAX_BLOCK_SIZE,
};
use crate::sources::{HttpFetcher, QuantumBuffered, Seeded, SystemSecure};

/// Which randomness source backs the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    SystemSecure {
        #[serde(default = "default_bits")]
        bits: u64,
    },
    Seeded {
        seed: u64,
        #[serde(default = "default_bits")]
        bits: u64,
    },
    Quantum {
        #[serde(default = "default_endpoint")]
        endpoint: String,
        #[serde(default = "default_batch_size")]
        batch_size: usize,
        #[serde(default = "default_block_size")]
        block_size: usize,
    },
}

fn default_bits() -> u64 {
    DEFAULT_BITS
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::SystemSecure {
            bits: DEFAULT_BITS,
        }
    }
}

impl SourceConfig {
    /// Construct the configured source.
    pub fn build(&self) -> Result<Box<dyn RandomnessSource>> {
        match self {
            Self::SystemSecure { bits } => {
                check_positive("bits", *bits as usize)?;
                Ok(Box::new(SystemSecure::new(*bits)))
            }
            Self::Seeded { seed, bits } => {
                check_positive("bits", *bits as usize)?;
                Ok(Box::new(Seeded::with_bits(*seed, *bits)))
            }
            Self::Quantum {
                endpoint,
                batch_size,
                block_size,
            } => {
                check_range("batch_size", *batch_size, MAX_BATCH_SIZE)?;
                check_range("block_size", *block_size, MAX_BLOCK_SIZE)?;
                let fetcher = HttpFetcher::new(endpoint.clone());
                Ok(Box::new(QuantumBuffered::with_fetcher(
                    Box::new(fetcher),
                    *batch_size,
                    *block_size,
                )))
            }
        }
    }
}

fn check_positive(field: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(OracleError::InvalidParameter(format!(
            "{field} must be positive"
        )));
    }
    Ok(())
}

fn check_range(field: &str, value: usize, max: usize) -> Result<()> {
    check_positive(field, value)?;
    if value > max {
        return Err(OracleError::InvalidParameter(format!(
            "{field} {value} exceeds the service limit of {max}"
        )));
    }
    Ok(())
}

/// Full oracle configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub source: SourceConfig,
    pub coefficient_mode: CoefficientMode,
    pub digest_input: DigestInput,
    pub digest: DigestParameters,
}

impl OracleConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate and construct the oracle.
    pub fn build(&self) -> Result<RandomOracle> {
        // Reject bad digest parameters up front rather than on first hash.
        self.digest.resolve(&Blake2b)?;
        let source = self.source.build()?;
        log::debug!(
            "building oracle: source={}, mode={}",
            source.name(),
            self.coefficient_mode
        );
        Ok(
            RandomOracle::with_coefficient_mode(source, self.coefficient_mode)
                .with_digest_input(self.digest_input)
                .with_default_params(self.digest.clone()),
        )
    }
}
