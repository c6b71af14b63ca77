//! Dynamic-field wrapper for `root.*` object fields.
//!
//! The wrapped field is bound under its literal `root.*` name. On each record
//! the wrapper fires with probability 1/2, renders the wrapped field, and
//! swaps the `"root.*":` key for `"root.<token>":` where `<token>` has not been
//! used by any other dynamic key in the same record.

use crate::binder::{key_prefix, BoundField};
use crate::error::GeneratorError;
use crate::providers;
use crate::state::{GenState, RecordKeys};
use rand::Rng;
use std::borrow::Cow;
use tracing::debug;

/// Attempts at drawing an unused noun before falling back to a unique token.
pub const MAX_KEY_TRIES: usize = 10;

pub struct DynamicField {
    inner: Box<dyn BoundField>,
    /// `"root.*":` as the wrapped field writes it
    target: Vec<u8>,
    /// `"root.` with the root JSON-escaped
    key_open: Vec<u8>,
}

impl DynamicField {
    pub fn new(
        inner: Box<dyn BoundField>,
        name: &str,
        root: &str,
    ) -> Result<Self, GeneratorError> {
        let target = key_prefix(name)?;

        // "root": minus the closing quote and colon
        let mut key_open = key_prefix(root)?;
        key_open.truncate(key_open.len() - 2);
        key_open.push(b'.');

        Ok(Self {
            inner,
            target,
            key_open,
        })
    }

    fn render(
        &self,
        state: &mut GenState,
        keys: &mut RecordKeys,
        tmp: &mut Vec<u8>,
        buf: &mut Vec<u8>,
    ) -> Result<(), GeneratorError> {
        self.inner.emit(state, keys, tmp)?;

        if tmp.len() <= self.target.len() {
            return Ok(());
        }
        if !tmp.starts_with(&self.target) {
            return Err(GeneratorError::MalformedDynamicPayload(
                String::from_utf8_lossy(tmp).into_owned(),
            ));
        }

        let token = pick_key(&mut state.rng, keys);
        buf.extend_from_slice(&self.key_open);
        buf.extend_from_slice(token.as_bytes());
        buf.extend_from_slice(b"\":");
        buf.extend_from_slice(&tmp[self.target.len()..]);
        keys.insert(token);
        Ok(())
    }
}

/// Draw a noun not yet used in this record, or a unique token when nouns keep
/// colliding.
fn pick_key<R: Rng>(rng: &mut R, keys: &RecordKeys) -> Cow<'static, str> {
    match draw_unused(keys, || providers::noun(rng)) {
        Some(noun) => Cow::Borrowed(noun),
        None => {
            debug!(
                "No unused dynamic key after {} tries, using a unique token",
                MAX_KEY_TRIES
            );
            Cow::Owned(providers::unique_token(rng))
        }
    }
}

/// One draw plus up to [`MAX_KEY_TRIES`] retries while the key is taken.
fn draw_unused(
    keys: &RecordKeys,
    mut draw: impl FnMut() -> &'static str,
) -> Option<&'static str> {
    let mut key = draw();
    for _ in 0..MAX_KEY_TRIES {
        if !keys.contains(key) {
            return Some(key);
        }
        key = draw();
    }
    (!keys.contains(key)).then_some(key)
}

impl BoundField for DynamicField {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn emit(
        &self,
        state: &mut GenState,
        keys: &mut RecordKeys,
        buf: &mut Vec<u8>,
    ) -> Result<(), GeneratorError> {
        if state.rng.random_bool(0.5) {
            return Ok(());
        }

        let mut tmp = state.pool.take();
        let result = self.render(state, keys, &mut tmp, buf);
        state.pool.give(tmp);
        result
    }
}
