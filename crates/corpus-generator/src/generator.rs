//! JSON record assembler.

use crate::binder::{bind_all, BoundField, RenderMode};
use crate::error::GeneratorError;
use crate::state::{GenState, RecordKeys};
use corpus_core::{Config, Fields};
use tracing::debug;

/// Something that appends one record per call to a byte sink.
///
/// Generators are immutable once built and may be shared between threads;
/// all per-record mutation goes through the caller's [`GenState`].
pub trait Generator: Send + Sync {
    /// Append one record to `buf`.
    ///
    /// On error nothing is left behind in `buf` and the counter does not
    /// advance.
    fn emit(&self, state: &mut GenState, buf: &mut Vec<u8>) -> Result<(), GeneratorError>;
}

/// Emits one flat JSON object per record, fields in schema order.
pub struct JsonGenerator {
    fields: Vec<Box<dyn BoundField>>,
}

impl JsonGenerator {
    /// Bind every schema field against the configuration.
    pub fn new(config: &Config, fields: &Fields) -> Result<Self, GeneratorError> {
        let bound = bind_all(config, fields, RenderMode::Json)?;
        debug!(
            "Built JSON generator with {} fields ({} in schema)",
            bound.len(),
            fields.len()
        );
        Ok(Self { fields: bound })
    }

    /// Number of bound fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn write_record(
        &self,
        state: &mut GenState,
        buf: &mut Vec<u8>,
    ) -> Result<(), GeneratorError> {
        let mut keys = RecordKeys::new();

        buf.push(b'{');
        for field in &self.fields {
            let before = buf.len();
            field.emit(state, &mut keys, buf)?;
            if buf.len() > before {
                buf.push(b',');
            }
        }

        // Drop the comma after the last field that wrote something
        if buf.last() == Some(&b',') {
            buf.pop();
        }
        buf.push(b'}');
        Ok(())
    }
}

impl Generator for JsonGenerator {
    fn emit(&self, state: &mut GenState, buf: &mut Vec<u8>) -> Result<(), GeneratorError> {
        let start = buf.len();
        if let Err(e) = self.write_record(state, buf) {
            buf.truncate(start);
            return Err(e);
        }
        state.advance();
        Ok(())
    }
}
