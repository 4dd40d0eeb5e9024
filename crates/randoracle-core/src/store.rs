//! Memoization engine.
//!
//! The store maps each input to the decimal digits generated for it so far.
//! Growth is append-only: asking for more digits appends whole chunks until
//! the stored output is long enough, and the caller receives a front-anchored
//! view of exactly the requested length. Asking for fewer digits never
//! truncates storage, so every digit ever returned for an input stays fixed
//! for the lifetime of the store.

use std::collections::HashMap;

use num_bigint::BigUint;

use crate::generator::{CoefficientMode, QuadraticGenerator};
use crate::source::RandomnessSource;

/// Query identifier: any non-negative integer.
pub type InputId = BigUint;

/// Everything generated for one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleEntry {
    input: InputId,
    output: String,
    chunks: usize,
}

impl OracleEntry {
    fn new(input: InputId) -> Self {
        Self {
            input,
            output: String::new(),
            chunks: 0,
        }
    }

    pub fn input(&self) -> &InputId {
        &self.input
    }

    /// Full stored digit string.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Stored length in digits.
    pub fn len(&self) -> usize {
        self.output.len()
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    /// Number of chunks appended so far.
    pub fn chunks(&self) -> usize {
        self.chunks
    }
}

/// Summary of store contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of memoized inputs.
    pub entries: usize,
    /// Digits stored across all entries.
    pub total_digits: usize,
    /// Chunks generated over the store's lifetime.
    pub chunks_generated: u64,
    /// Randomness values drawn from the source.
    pub values_drawn: u64,
    /// Source name.
    pub source: String,
}

/// Owns the input → entry mapping and the generator that extends it.
pub struct OracleStore {
    generator: QuadraticGenerator,
    entries: HashMap<InputId, OracleEntry>,
}

impl OracleStore {
    /// Empty store drawing fresh coefficients per chunk.
    pub fn new(source: Box<dyn RandomnessSource>) -> Self {
        Self::from_generator(QuadraticGenerator::new(source))
    }

    pub fn with_mode(source: Box<dyn RandomnessSource>, mode: CoefficientMode) -> Self {
        Self::from_generator(QuadraticGenerator::with_mode(source, mode))
    }

    pub fn from_generator(generator: QuadraticGenerator) -> Self {
        Self {
            generator,
            entries: HashMap::new(),
        }
    }

    /// Return the first `digits` digits of `input`'s output, generating and
    /// memoizing chunks until at least that many are stored.
    ///
    /// `digits == 0` returns an empty string and leaves the store untouched.
    pub fn ensure_length(&mut self, input: &InputId, digits: usize) -> String {
        if digits == 0 {
            return String::new();
        }

        let entry = self
            .entries
            .entry(input.clone())
            .or_insert_with(|| OracleEntry::new(input.clone()));

        let before = entry.output.len();
        while entry.output.len() < digits {
            let chunk = self.generator.generate_chunk(input);
            entry.output.push_str(&chunk);
            entry.chunks += 1;
        }
        if entry.output.len() != before {
            log::debug!(
                "oracle input {input}: grew {before} -> {} digits ({} chunks)",
                entry.output.len(),
                entry.chunks
            );
        }

        entry.output[..digits].to_string()
    }

    pub fn get(&self, input: &InputId) -> Option<&OracleEntry> {
        self.entries.get(input)
    }

    /// Stored digits for `input`, zero if never queried.
    pub fn stored_len(&self, input: &InputId) -> usize {
        self.entries.get(input).map_or(0, OracleEntry::len)
    }

    /// Full stored output of `input` as an integer, if any digits exist.
    pub fn raw_value(&self, input: &InputId) -> Option<BigUint> {
        self.entries
            .get(input)
            .filter(|e| !e.is_empty())
            .and_then(|e| BigUint::parse_bytes(e.output.as_bytes(), 10))
    }

    /// Number of memoized inputs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every memoized entry and cached coefficient. Source state is
    /// kept, so the store behaves like a fresh one over the same source.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.generator.clear_fixed();
    }

    pub fn coefficient_mode(&self) -> CoefficientMode {
        self.generator.mode()
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            entries: self.entries.len(),
            total_digits: self.entries.values().map(OracleEntry::len).sum(),
            chunks_generated: self.generator.chunks(),
            values_drawn: self.generator.source().drawn(),
            source: self.generator.source().name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::Seeded;

    fn seeded(seed: u64) -> OracleStore {
        OracleStore::new(Box::new(Seeded::new(seed)))
    }

    fn id(i: u32) -> InputId {
        BigUint::from(i)
    }

    // -----------------------------------------------------------------------
    // ensure_length
    // -----------------------------------------------------------------------

    #[test]
    fn test_returns_exact_length() {
        let mut store = seeded(1);
        for digits in [1, 7, 32, 100, 333] {
            let out = store.ensure_length(&id(0), digits);
            assert_eq!(out.len(), digits);
            assert!(out.bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_zero_digits_creates_no_entry() {
        let mut store = seeded(1);
        assert_eq!(store.ensure_length(&id(5), 0), "");
        assert!(store.get(&id(5)).is_none());
        assert!(store.is_empty());
        assert_eq!(store.stats().chunks_generated, 0);
    }

    #[test]
    fn test_zero_digits_keeps_existing_entry() {
        let mut store = seeded(1);
        store.ensure_length(&id(5), 10);
        let stored = store.stored_len(&id(5));
        assert_eq!(store.ensure_length(&id(5), 0), "");
        assert_eq!(store.stored_len(&id(5)), stored);
    }

    #[test]
    fn test_longer_request_extends_prefix() {
        let mut store = seeded(1);
        let short = store.ensure_length(&id(0), 32);
        let long = store.ensure_length(&id(0), 64);
        assert_eq!(long.len(), 64);
        assert_eq!(&long[..32], short);
    }

    #[test]
    fn test_prefix_stable_across_many_requests() {
        let mut store = seeded(3);
        let lengths = [5, 200, 17, 600, 1, 450, 1000];
        let outputs: Vec<String> = lengths
            .iter()
            .map(|&d| store.ensure_length(&id(9), d))
            .collect();
        let longest = outputs.iter().max_by_key(|o| o.len()).unwrap();
        for out in &outputs {
            assert!(longest.starts_with(out.as_str()));
        }
    }

    #[test]
    fn test_shorter_request_never_shrinks_storage() {
        let mut store = seeded(1);
        store.ensure_length(&id(0), 300);
        let stored = store.stored_len(&id(0));
        assert!(stored >= 300);

        let chunks_before = store.stats().chunks_generated;
        let out = store.ensure_length(&id(0), 10);
        assert_eq!(out.len(), 10);
        assert_eq!(store.stored_len(&id(0)), stored);
        assert_eq!(store.stats().chunks_generated, chunks_before);
    }

    #[test]
    fn test_repeat_query_is_memoized() {
        let mut store = seeded(1);
        let a = store.ensure_length(&id(2), 50);
        let drawn = store.stats().values_drawn;
        let b = store.ensure_length(&id(2), 50);
        assert_eq!(a, b);
        assert_eq!(store.stats().values_drawn, drawn);
    }

    #[test]
    fn test_stored_length_monotonic() {
        let mut store = seeded(11);
        let mut last = 0;
        for d in [3, 90, 10, 250, 0, 40, 251] {
            store.ensure_length(&id(1), d);
            let now = store.stored_len(&id(1));
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn test_seeded_stores_agree() {
        let mut a = seeded(77);
        let mut b = seeded(77);
        for (i, d) in [(0, 10), (1, 80), (0, 200), (42, 5)] {
            assert_eq!(a.ensure_length(&id(i), d), b.ensure_length(&id(i), d));
        }
    }

    #[test]
    fn test_distinct_inputs_each_draw_coefficients() {
        let mut store = seeded(1);
        store.ensure_length(&id(0), 1);
        store.ensure_length(&id(1), 1);
        let stats = store.stats();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.chunks_generated, 2);
        assert_eq!(stats.values_drawn, 6);
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[test]
    fn test_raw_value_matches_stored_digits() {
        let mut store = seeded(4);
        assert!(store.raw_value(&id(0)).is_none());
        store.ensure_length(&id(0), 20);
        let entry = store.get(&id(0)).unwrap();
        let value = store.raw_value(&id(0)).unwrap();
        assert_eq!(
            value,
            BigUint::parse_bytes(entry.output().as_bytes(), 10).unwrap()
        );
        assert_eq!(entry.input(), &id(0));
        assert!(entry.chunks() >= 1);
    }

    #[test]
    fn test_clear_forgets_entries() {
        let mut store = seeded(1);
        store.ensure_length(&id(0), 10);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.stored_len(&id(0)), 0);
    }

    #[test]
    fn test_clear_in_fixed_mode_draws_new_coefficients() {
        let mut store = OracleStore::with_mode(
            Box::new(Seeded::new(1)),
            CoefficientMode::FixedPerInput,
        );
        let before = store.ensure_length(&id(0), 10);
        let drawn_before = store.stats().values_drawn;

        store.clear();
        let after = store.ensure_length(&id(0), 10);
        assert_eq!(store.stats().values_drawn, drawn_before + 3);
        assert_ne!(after, before);
    }

    #[test]
    fn test_cleared_store_matches_fresh_store_on_same_source_state() {
        // Both sources have handed out three values before the final query.
        let mut cleared =
            OracleStore::with_mode(Box::new(Seeded::new(5)), CoefficientMode::FixedPerInput);
        let mut fresh =
            OracleStore::with_mode(Box::new(Seeded::new(5)), CoefficientMode::FixedPerInput);
        cleared.ensure_length(&id(0), 10);
        cleared.clear();
        fresh.ensure_length(&id(1), 10);

        assert_eq!(cleared.ensure_length(&id(0), 50), fresh.ensure_length(&id(0), 50));
    }

    #[test]
    fn test_stats_totals() {
        let mut store = seeded(1);
        store.ensure_length(&id(0), 10);
        store.ensure_length(&id(1), 10);
        let stats = store.stats();
        assert_eq!(stats.source, "seeded");
        assert_eq!(
            stats.total_digits,
            store.stored_len(&id(0)) + store.stored_len(&id(1))
        );
    }

    #[test]
    fn test_fixed_mode_repeats_chunk() {
        let mut store = OracleStore::with_mode(
            Box::new(Seeded::new(1)),
            CoefficientMode::FixedPerInput,
        );
        store.ensure_length(&id(3), 1);
        let chunk = store.get(&id(3)).unwrap().output().to_string();
        let grown = store.ensure_length(&id(3), chunk.len() * 2);
        assert_eq!(grown, chunk.repeat(2));
        assert_eq!(store.coefficient_mode(), CoefficientMode::FixedPerInput);
    }
}
