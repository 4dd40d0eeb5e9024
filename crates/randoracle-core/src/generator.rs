//! Quadratic chunk generator.
//!
//! Each chunk is `f(i) = (x*(i+1))^2 + y*(i+1) + z` evaluated with
//! arbitrary-precision arithmetic and rendered in decimal. Chunk length is not
//! fixed; the store concatenates chunks until it has enough digits.

use std::collections::HashMap;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::source::RandomnessSource;
use crate::store::InputId;

/// How quadratic coefficients are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoefficientMode {
    /// Three fresh coefficients for every chunk (default).
    #[default]
    PerChunk,
    /// Coefficients drawn on an input's first chunk and reused for all of
    /// that input's later chunks. Every chunk of an input is then identical.
    FixedPerInput,
}

impl std::fmt::Display for CoefficientMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PerChunk => write!(f, "per_chunk"),
            Self::FixedPerInput => write!(f, "fixed_per_input"),
        }
    }
}

/// The `(x, y, z)` of one quadratic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coefficients {
    pub x: BigUint,
    pub y: BigUint,
    pub z: BigUint,
}

impl Coefficients {
    /// # Panics
    /// Panics if `source` breaks the `draw` contract and returns a batch of
    /// the wrong size.
    fn draw(source: &mut dyn RandomnessSource) -> Self {
        let [x, y, z]: [BigUint; 3] =
            source.draw(3).try_into().unwrap_or_else(|v: Vec<BigUint>| {
                panic!("{} source returned {} values for a draw of 3", source.name(), v.len())
            });
        Self { x, y, z }
    }

    /// Evaluate `(x*(i+1))^2 + y*(i+1) + z`.
    pub fn evaluate(&self, input: &InputId) -> BigUint {
        let point = input + 1u32;
        let scaled = &self.x * &point;
        &scaled * &scaled + &self.y * &point + &self.z
    }
}

/// Produces decimal chunks for the oracle store.
pub struct QuadraticGenerator {
    source: Box<dyn RandomnessSource>,
    mode: CoefficientMode,
    fixed: HashMap<InputId, Coefficients>,
    chunks: u64,
}

impl QuadraticGenerator {
    pub fn new(source: Box<dyn RandomnessSource>) -> Self {
        Self::with_mode(source, CoefficientMode::default())
    }

    pub fn with_mode(source: Box<dyn RandomnessSource>, mode: CoefficientMode) -> Self {
        Self {
            source,
            mode,
            fixed: HashMap::new(),
            chunks: 0,
        }
    }

    /// Evaluate one quadratic for `input` and return it in decimal.
    pub fn generate_chunk(&mut self, input: &InputId) -> String {
        let value = match self.mode {
            CoefficientMode::PerChunk => Coefficients::draw(self.source.as_mut()).evaluate(input),
            CoefficientMode::FixedPerInput => {
                let source = self.source.as_mut();
                self.fixed
                    .entry(input.clone())
                    .or_insert_with(|| Coefficients::draw(source))
                    .evaluate(input)
            }
        };
        self.chunks += 1;
        value.to_str_radix(10)
    }

    /// Forget every cached per-input quadratic. Later chunks draw new ones.
    pub fn clear_fixed(&mut self) {
        self.fixed.clear();
    }

    /// Inputs with cached coefficients (always zero in `PerChunk` mode).
    pub fn fixed_len(&self) -> usize {
        self.fixed.len()
    }

    pub fn mode(&self) -> CoefficientMode {
        self.mode
    }

    /// Chunks produced so far.
    pub fn chunks(&self) -> u64 {
        self.chunks
    }

    pub fn source(&self) -> &dyn RandomnessSource {
        self.source.as_ref()
    }
}
