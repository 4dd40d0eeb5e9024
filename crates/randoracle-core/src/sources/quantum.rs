//! Buffered source backed by a remote quantum random number service.
//!
//! Values are fetched in batches of hexadecimal strings and kept in a local
//! stack. `draw` pops from the top (most recently fetched first) and refills
//! synchronously whenever the stack holds fewer values than requested.
//!
//! A refill that fails inside `draw` terminates the process. Embedders that
//! need resilience should prefetch with [`QuantumBuffered::refill`], which
//! returns the error instead, or isolate the oracle behind a process boundary.

use num_bigint::BigUint;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::{OracleError, Result};
use crate::source::{RandomnessSource, SourceKind};

/// Default service endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://qrng.anu.edu.au/API/jsonI.php";
/// Default number of values fetched per refill.
pub const DEFAULT_BATCH_SIZE: usize = 1024;
/// Default hex digits per value.
pub const DEFAULT_BLOCK_SIZE: usize = 32;
/// Largest batch the service answers in one request.
pub const MAX_BATCH_SIZE: usize = 1024;
/// Largest block the service answers in one request.
pub const MAX_BLOCK_SIZE: usize = 1024;

/// Parameters of one batch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    /// Number of values.
    pub length: usize,
    /// Hex digits per value.
    pub size: usize,
}

impl BatchRequest {
    /// Value type requested from the service.
    pub const TYPE: &'static str = "hex16";
}

/// Transport seam: performs one batch request and returns the raw JSON body.
pub trait BatchFetcher: Send {
    /// Perform the request; transport failures and non-200 answers are errors.
    fn fetch(&self, request: &BatchRequest) -> Result<String>;
}

/// Blocking HTTPS fetcher for the quantum service.
pub struct HttpFetcher {
    client: Client,
    endpoint: String,
}

impl HttpFetcher {
    /// Fetcher for `endpoint` with a default blocking client.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Service URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl BatchFetcher for HttpFetcher {
    fn fetch(&self, request: &BatchRequest) -> Result<String> {
        let response = self
            .client
            .get(self.endpoint.as_str())
            .query(&[
                ("length", request.length.to_string()),
                ("type", BatchRequest::TYPE.to_string()),
                ("size", request.size.to_string()),
            ])
            .send()
            .map_err(|e| OracleError::SourceUnavailable(format!("transport: {e}")))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(OracleError::SourceUnavailable(format!(
                "service answered {status}"
            )));
        }

        response
            .text()
            .map_err(|e| OracleError::SourceUnavailable(format!("reading body: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    data: Option<Vec<String>>,
}

/// Parse a service response body into integers.
///
/// The body must be JSON with a `data` array of exactly `expected` non-empty
/// hexadecimal strings, all of the same width. Signs and `_` separators are
/// rejected.
pub fn parse_batch(body: &str, expected: usize) -> Result<Vec<BigUint>> {
    let response: BatchResponse = serde_json::from_str(body)
        .map_err(|e| OracleError::SourceUnavailable(format!("malformed response: {e}")))?;
    let data = response
        .data
        .ok_or_else(|| OracleError::SourceUnavailable("response has no `data` field".into()))?;

    if data.len() != expected {
        return Err(OracleError::SourceUnavailable(format!(
            "expected {expected} values, got {}",
            data.len()
        )));
    }

    let width = data.first().map_or(0, String::len);
    data.iter()
        .map(|hex| {
            if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(OracleError::SourceUnavailable(format!(
                    "not a hex value: {hex:?}"
                )));
            }
            if hex.len() != width {
                return Err(OracleError::SourceUnavailable(format!(
                    "hex value {hex:?} is {} digits, batch width is {width}",
                    hex.len()
                )));
            }
            BigUint::parse_bytes(hex.as_bytes(), 16).ok_or_else(|| {
                OracleError::SourceUnavailable(format!("not a hex value: {hex:?}"))
            })
        })
        .collect()
}

/// Quantum source with client-side buffering.
pub struct QuantumBuffered {
    fetcher: Box<dyn BatchFetcher>,
    buffer: Vec<BigUint>,
    batch_size: usize,
    block_size: usize,
    fetches: u64,
    drawn: u64,
}

impl QuantumBuffered {
    /// HTTPS-backed source with default batch and block sizes.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_fetcher(
            Box::new(HttpFetcher::new(endpoint)),
            DEFAULT_BATCH_SIZE,
            DEFAULT_BLOCK_SIZE,
        )
    }

    /// Source using a custom transport. `batch_size` is the target buffer
    /// size per refill, clamped into `1..=MAX_BATCH_SIZE`.
    pub fn with_fetcher(
        fetcher: Box<dyn BatchFetcher>,
        batch_size: usize,
        block_size: usize,
    ) -> Self {
        Self {
            fetcher,
            buffer: Vec::new(),
            batch_size: batch_size.clamp(1, MAX_BATCH_SIZE),
            block_size,
            fetches: 0,
            drawn: 0,
        }
    }

    /// Fetch one batch and push it onto the buffer. Returns the new buffer length.
    pub fn refill(&mut self) -> Result<usize> {
        let request = BatchRequest {
            length: self.batch_size,
            size: self.block_size,
        };
        let body = self.fetcher.fetch(&request)?;
        let values = parse_batch(&body, request.length)?;
        self.buffer.extend(values);
        self.fetches += 1;
        log::info!(
            "quantum refill #{}: {} values buffered",
            self.fetches,
            self.buffer.len()
        );
        Ok(self.buffer.len())
    }

    /// Values currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Number of successful refills.
    pub fn fetches(&self) -> u64 {
        self.fetches
    }

    /// Values requested per refill.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl RandomnessSource for QuantumBuffered {
    fn kind(&self) -> SourceKind {
        SourceKind::QuantumBuffered
    }

    fn draw(&mut self, count: usize) -> Vec<BigUint> {
        while self.buffer.len() < count {
            log::debug!(
                "quantum buffer underflow: {} buffered, {count} requested",
                self.buffer.len()
            );
            if let Err(e) = self.refill() {
                log::error!("quantum randomness source failed, terminating: {e}");
                std::process::exit(1);
            }
        }
        let split = self.buffer.len() - count;
        let mut values = self.buffer.split_off(split);
        values.reverse();
        self.drawn += count as u64;
        values
    }

    fn drawn(&self) -> u64 {
        self.drawn
    }
}
