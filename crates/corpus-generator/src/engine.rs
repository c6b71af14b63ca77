//! Adapter for external template engines.
//!
//! The engine owns control flow (loops, conditionals, formatting). The only
//! thing it gets from this crate is [`FieldSource::generate`], which renders
//! one bound field in raw mode and hands back its value. See
//! [`crate::jinja::JinjaEngine`] for the bundled Jinja engine.

use crate::binder::{bind_all, BoundField, RenderMode};
use crate::error::GeneratorError;
use crate::generator::Generator;
use crate::state::{GenState, RecordKeys};
use corpus_core::{Config, Fields};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

type FieldMap = HashMap<String, Box<dyn BoundField>>;

/// A template engine driven once per record.
pub trait TemplateEngine: Send + Sync {
    /// Render one record into `out`, pulling field values from `source`.
    fn render(
        &self,
        source: &mut FieldSource<'_>,
        out: &mut Vec<u8>,
    ) -> Result<(), GeneratorError>;
}

impl<F> TemplateEngine for F
where
    F: Fn(&mut FieldSource<'_>, &mut Vec<u8>) -> Result<(), GeneratorError> + Send + Sync,
{
    fn render(
        &self,
        source: &mut FieldSource<'_>,
        out: &mut Vec<u8>,
    ) -> Result<(), GeneratorError> {
        self(source, out)
    }
}

/// Field values for the record currently being rendered.
pub struct FieldSource<'a> {
    fields: &'a Arc<FieldMap>,
    state: &'a mut GenState,
    keys: RecordKeys,
}

impl FieldSource<'_> {
    /// Generate a fresh value for `name`.
    pub fn generate(&mut self, name: &str) -> Result<String, GeneratorError> {
        let mut buf = Vec::new();
        self.generate_into(name, &mut buf)?;
        String::from_utf8(buf).map_err(|e| {
            GeneratorError::Engine(format!("field '{}' produced invalid UTF-8: {}", name, e))
        })
    }

    /// Generate a fresh value for `name` straight into `out`.
    pub fn generate_into(&mut self, name: &str, out: &mut Vec<u8>) -> Result<(), GeneratorError> {
        let field = self
            .fields
            .get(name)
            .ok_or_else(|| GeneratorError::UnknownField(name.to_string()))?;
        field.emit(self.state, &mut self.keys, out)
    }

    /// Whether `name` is a bound field.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Run `f` with an owned handle to this source.
    ///
    /// For engines whose callbacks must be `'static`. The generator state is
    /// moved into the handle for the duration of `f` and moved back after,
    /// even if `f` kept a clone of the handle.
    pub fn detach<R>(&mut self, f: impl FnOnce(&SharedFieldSource) -> R) -> R {
        let owned = OwnedSource {
            fields: Arc::clone(self.fields),
            state: std::mem::replace(self.state, GenState::with_seed(0)),
            keys: std::mem::take(&mut self.keys),
        };
        let shared = SharedFieldSource(Arc::new(Mutex::new(owned)));

        let result = f(&shared);

        let mut owned = shared.lock();
        std::mem::swap(self.state, &mut owned.state);
        self.keys = std::mem::take(&mut owned.keys);
        result
    }
}

struct OwnedSource {
    fields: Arc<FieldMap>,
    state: GenState,
    keys: RecordKeys,
}

/// Owned, clonable handle handed out by [`FieldSource::detach`].
#[derive(Clone)]
pub struct SharedFieldSource(Arc<Mutex<OwnedSource>>);

impl SharedFieldSource {
    fn lock(&self) -> MutexGuard<'_, OwnedSource> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Generate a fresh value for `name`, as [`FieldSource::generate`].
    pub fn generate(&self, name: &str) -> Result<String, GeneratorError> {
        let mut guard = self.lock();
        let owned = &mut *guard;
        let mut source = FieldSource {
            fields: &owned.fields,
            state: &mut owned.state,
            keys: std::mem::take(&mut owned.keys),
        };
        let result = source.generate(name);
        owned.keys = source.keys;
        result
    }

    /// Whether `name` is a bound field.
    pub fn has_field(&self, name: &str) -> bool {
        self.lock().fields.contains_key(name)
    }
}

impl std::fmt::Debug for SharedFieldSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedFieldSource").finish_non_exhaustive()
    }
}

/// Emits records by running an external engine over the bound fields.
pub struct EngineGenerator<E> {
    fields: Arc<FieldMap>,
    engine: E,
}

impl<E: TemplateEngine> EngineGenerator<E> {
    /// Bind every schema field in raw mode and attach the engine.
    pub fn new(engine: E, config: &Config, fields: &Fields) -> Result<Self, GeneratorError> {
        let fields: FieldMap = bind_all(config, fields, RenderMode::Raw)?
            .into_iter()
            .map(|bound| (bound.name().to_string(), bound))
            .collect();
        debug!("Built engine generator with {} fields", fields.len());

        Ok(Self {
            fields: Arc::new(fields),
            engine,
        })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl<E: TemplateEngine> Generator for EngineGenerator<E> {
    fn emit(&self, state: &mut GenState, buf: &mut Vec<u8>) -> Result<(), GeneratorError> {
        let start = buf.len();
        let mut source = FieldSource {
            fields: &self.fields,
            state: &mut *state,
            keys: RecordKeys::new(),
        };

        if let Err(e) = self.engine.render(&mut source, buf) {
            buf.truncate(start);
            return Err(e);
        }
        state.advance();
        Ok(())
    }
}
