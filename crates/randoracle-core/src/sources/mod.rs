//! The three randomness source implementations.

pub mod quantum;
pub mod seeded;
pub mod system;

pub use quantum::{BatchFetcher, BatchRequest, HttpFetcher, QuantumBuffered, parse_batch};
pub use seeded::Seeded;
pub use system::SystemSecure;
