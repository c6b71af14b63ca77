//! Per-generator mutable state.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

/// Value remembered for a field between records.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    /// Previous integer of a fuzzy walk
    Int(i64),
    /// Previous float of a fuzzy walk
    Float(f64),
    /// Stable token of a constant keyword
    Token(String),
    /// Distinct rendered fragments of a cardinality-bounded field
    Fragments(Vec<Vec<u8>>),
}

/// Free list of scratch buffers reused across records.
#[derive(Debug, Default)]
pub(crate) struct BufferPool {
    free: Vec<Vec<u8>>,
}

impl BufferPool {
    /// Take an empty buffer.
    pub(crate) fn take(&mut self) -> Vec<u8> {
        let mut buf = self.free.pop().unwrap_or_default();
        buf.clear();
        buf
    }

    /// Return a buffer for reuse.
    pub(crate) fn give(&mut self, buf: Vec<u8>) {
        self.free.push(buf);
    }
}

/// Mutable state of one generator instance.
///
/// A `GenState` belongs to exactly one caller. Workers emitting in parallel
/// from a shared generator each own their own state and therefore their own
/// RNG.
#[derive(Debug)]
pub struct GenState {
    /// Records emitted so far
    pub(crate) counter: u64,
    /// Per-field values carried between records
    pub(crate) prev_cache: HashMap<String, CachedValue>,
    /// Scratch buffers for wrappers
    pub(crate) pool: BufferPool,
    /// Random source for every provider
    pub(crate) rng: StdRng,
}

impl GenState {
    /// Create a state seeded from the operating system.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Create a state with a deterministic seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Create a state around an existing RNG.
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            counter: 0,
            prev_cache: HashMap::new(),
            pool: BufferPool::default(),
            rng,
        }
    }

    /// Number of records emitted so far.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Value remembered for a field, if any.
    pub fn cached(&self, name: &str) -> Option<&CachedValue> {
        self.prev_cache.get(name)
    }

    /// Forget all per-field state and restart the counter. The RNG keeps its
    /// position.
    pub fn reset(&mut self) {
        self.counter = 0;
        self.prev_cache.clear();
    }

    pub(crate) fn advance(&mut self) {
        self.counter += 1;
    }

    /// Store a value for a field without reallocating its key when present.
    pub(crate) fn store(&mut self, name: &str, value: CachedValue) {
        match self.prev_cache.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.prev_cache.insert(name.to_owned(), value);
            }
        }
    }
}

impl Default for GenState {
    fn default() -> Self {
        Self::new()
    }
}

/// Dynamic keys already used in the record being emitted.
#[derive(Debug, Default)]
pub struct RecordKeys {
    used: HashSet<Cow<'static, str>>,
}

impl RecordKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.used.contains(key)
    }

    /// Register a key; returns false if it was already used.
    pub fn insert(&mut self, key: impl Into<Cow<'static, str>>) -> bool {
        self.used.insert(key.into())
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_seeded_states_agree() {
        let mut a = GenState::with_seed(42);
        let mut b = GenState::with_seed(42);

        let x: u64 = a.rng.random();
        let y: u64 = b.rng.random();
        assert_eq!(x, y);
    }

    #[test]
    fn test_store_and_reset() {
        let mut state = GenState::with_seed(42);
        state.store("bytes", CachedValue::Int(10));
        state.store("bytes", CachedValue::Int(11));
        state.advance();

        assert_eq!(state.cached("bytes"), Some(&CachedValue::Int(11)));
        assert_eq!(state.counter(), 1);

        state.reset();
        assert!(state.cached("bytes").is_none());
        assert_eq!(state.counter(), 0);
    }

    #[test]
    fn test_buffer_pool_returns_empty_buffers() {
        let mut pool = BufferPool::default();
        let mut buf = pool.take();
        buf.extend_from_slice(b"leftover");
        pool.give(buf);

        assert!(pool.take().is_empty());
    }

    #[test]
    fn test_record_keys() {
        let mut keys = RecordKeys::new();
        assert!(keys.insert("river"));
        assert!(!keys.insert(String::from("river")));
        assert!(keys.contains("river"));
        assert_eq!(keys.len(), 1);
    }
}
