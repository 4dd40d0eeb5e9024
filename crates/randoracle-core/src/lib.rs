//! # randoracle-core
//!
//! A memoized random oracle for experimenting with idealized hash functions.
//!
//! Each query input maps to an arbitrarily long pseudorandom decimal string.
//! The string is generated lazily, one quadratic-polynomial chunk at a time,
//! and memoized: asking for more digits later extends it without changing any
//! digit already handed out. A keyed BLAKE2b digest over the oracle value
//! gives a fixed-size output.
//!
//! ## Quick Start
//!
//! ```no_run
//! use randoracle_core::{DigestParameters, RandomOracle, Seeded, min_byte_width};
//!
//! let mut oracle = RandomOracle::new(Box::new(Seeded::new(1)));
//!
//! let short = oracle.oracle(0u32, 32);
//! let long = oracle.oracle(0u32, 64);
//! assert_eq!(&long[..32], short);
//!
//! let digest = oracle
//!     .hash(0u32, min_byte_width(64).unwrap(), &DigestParameters::default())
//!     .unwrap();
//! println!("{digest}");
//! ```
//!
//! ## Architecture
//!
//! RandomnessSource → QuadraticGenerator → OracleStore → DigestAdapter
//!
//! Three randomness sources:
//! - **SystemSecure**: the OS CSPRNG, never reproducible.
//! - **Seeded**: `StdRng` from an explicit seed, reproducible.
//! - **QuantumBuffered**: batches from a remote quantum RNG service, served
//!   from a local buffer. A failed refill while drawing ends the process.
//!
//! Nothing here is global: every oracle owns its store and its source.

pub mod config;
pub mod digest;
pub mod error;
pub mod generator;
pub mod oracle;
pub mod source;
pub mod sources;
pub mod store;

pub use config::{OracleConfig, SourceConfig};
pub use digest::{
    Blake2b, Digest, DigestAdapter, DigestParameters, KeyedHash, min_byte_width, to_fixed_width,
};
pub use error::{OracleError, Result};
pub use generator::{CoefficientMode, Coefficients, QuadraticGenerator};
pub use oracle::{DigestInput, RandomOracle, SharedOracle};
pub use source::{RandomnessSource, SourceKind};
pub use sources::{BatchFetcher, BatchRequest, HttpFetcher, QuantumBuffered, Seeded, SystemSecure};
pub use store::{InputId, OracleEntry, OracleStore, StoreStats};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
