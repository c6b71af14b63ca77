//! Cardinality wrapper.
//!
//! A field configured with cardinality `c` shows roughly `c` distinct values
//! per 1000 records. The wrapper renders up to `K = ceil(1000 / c)` distinct
//! fragments, one per record, and afterwards only replays them:
//!
//! ```text
//! record:   0  1  2 .. K-1 | K  K+1 ..
//! emits:    f0 f1 f2   fK-1| f0 f1  ..   (pool[counter % K])
//! ```

use crate::binder::BoundField;
use crate::error::GeneratorError;
use crate::state::{CachedValue, GenState, RecordKeys};
use tracing::debug;

/// Attempts at finding a fragment not already in the pool.
pub const MAX_DEDUP_TRIES: usize = 11;

/// Number of distinct fragments for a cardinality setting.
pub fn distinct_target(cardinality: u32) -> usize {
    let cardinality = cardinality.max(1) as usize;
    1000usize.div_ceil(cardinality)
}

/// Wraps a bound field so it cycles through a bounded pool of fragments.
pub struct CardinalityField {
    inner: Box<dyn BoundField>,
    target: usize,
}

impl CardinalityField {
    pub fn new(inner: Box<dyn BoundField>, cardinality: u32) -> Self {
        Self {
            inner,
            target: distinct_target(cardinality),
        }
    }

    /// Render one more fragment into the pool, retrying on duplicates.
    fn grow(
        &self,
        pool: &mut Vec<Vec<u8>>,
        state: &mut GenState,
        keys: &mut RecordKeys,
    ) -> Result<(), GeneratorError> {
        let mut candidate = Vec::new();

        for attempt in 1..=MAX_DEDUP_TRIES {
            candidate.clear();
            self.inner.emit(state, keys, &mut candidate)?;

            if !pool.contains(&candidate) {
                break;
            }
            if attempt == MAX_DEDUP_TRIES {
                debug!(
                    "Field '{}': no distinct value after {} tries, accepting a duplicate",
                    self.inner.name(),
                    MAX_DEDUP_TRIES
                );
            }
        }

        pool.push(candidate);
        Ok(())
    }

    fn write_choice(&self, pool: &[Vec<u8>], counter: u64, buf: &mut Vec<u8>) {
        // The pool lags behind the counter when the field is not emitted on
        // every record; fall back to the newest fragment.
        let idx = ((counter % self.target as u64) as usize).min(pool.len() - 1);
        buf.extend_from_slice(&pool[idx]);
    }
}

impl BoundField for CardinalityField {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn emit(
        &self,
        state: &mut GenState,
        keys: &mut RecordKeys,
        buf: &mut Vec<u8>,
    ) -> Result<(), GeneratorError> {
        let name = self.inner.name();

        if let Some(CachedValue::Fragments(pool)) = state.prev_cache.get(name) {
            if pool.len() >= self.target {
                self.write_choice(pool, state.counter, buf);
                return Ok(());
            }
        }

        let mut pool = match state.prev_cache.remove(name) {
            Some(CachedValue::Fragments(pool)) => pool,
            _ => Vec::with_capacity(self.target),
        };

        let result = self.grow(&mut pool, state, keys);
        if result.is_ok() {
            self.write_choice(&pool, state.counter, buf);
        }
        if !pool.is_empty() {
            state.store(name, CachedValue::Fragments(pool));
        }
        result
    }
}
