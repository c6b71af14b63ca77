//! Bounded random walk for numeric fields.
//!
//! With fuzziness `f`, each value after the first is the previous value times
//! `1 ± uniform[0, f) / 100`, so consecutive values never drift more than `f`
//! percent apart.

use crate::state::{CachedValue, GenState};
use rand::Rng;

/// Draw a multiplicative drift ratio for a fuzziness percentage (`1..=100`).
pub(crate) fn drift_ratio<R: Rng>(rng: &mut R, fuzziness: u32) -> f64 {
    let delta = f64::from(rng.random_range(0..fuzziness)) / 100.0;
    if rng.random_bool(0.5) {
        1.0 + delta
    } else {
        1.0 - delta
    }
}

/// Step an integer walk. The first call for a field returns `fresh`.
pub(crate) fn walk_int(state: &mut GenState, name: &str, fresh: i64, fuzziness: u32) -> i64 {
    let value = match state.prev_cache.get(name) {
        Some(CachedValue::Int(prev)) => {
            let prev = *prev as f64;
            (prev * drift_ratio(&mut state.rng, fuzziness)).ceil() as i64
        }
        _ => fresh,
    };
    state.store(name, CachedValue::Int(value));
    value
}

/// Step a float walk. The first call for a field returns `fresh`.
pub(crate) fn walk_float(state: &mut GenState, name: &str, fresh: f64, fuzziness: u32) -> f64 {
    let value = match state.prev_cache.get(name) {
        Some(CachedValue::Float(prev)) => *prev * drift_ratio(&mut state.rng, fuzziness),
        _ => fresh,
    };
    state.store(name, CachedValue::Float(value));
    value
}
