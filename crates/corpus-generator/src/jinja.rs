//! [`TemplateEngine`] backed by `minijinja`.
//!
//! Templates pull values with `generate("Field")`; each call renders the bound
//! field once more in raw mode. Everything else is plain Jinja:
//!
//! ```text
//! {% set action = generate("Action") %}{{ generate("SrcAddr") }} {{ action }}
//! {%- if action == "REJECT" %} blocked{% endif %}
//! ```

use crate::engine::{FieldSource, SharedFieldSource, TemplateEngine};
use crate::error::GeneratorError;
use minijinja::value::{Object, Value};
use minijinja::{context, Environment, Error, ErrorKind, State};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

const TEMPLATE_NAME: &str = "record";

/// Context variable holding the [`RenderScope`]; must match the `context!` key.
const SCOPE_VAR: &str = "__corpus_fields";

/// Field values for one render, stored in the template context.
#[derive(Debug)]
struct RenderScope {
    source: SharedFieldSource,
    /// First field error raised while rendering
    failure: Mutex<Option<GeneratorError>>,
}

impl Object for RenderScope {}

impl RenderScope {
    fn take_failure(&self) -> Option<GeneratorError> {
        self.failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// `generate(name)` as seen by templates.
fn generate(state: &State, name: &str) -> Result<String, Error> {
    let value = state.lookup(SCOPE_VAR).ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidOperation,
            "generate() is only available while rendering a record",
        )
    })?;
    let scope = value.downcast_object_ref::<RenderScope>().ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("'{SCOPE_VAR}' is reserved for generated fields"),
        )
    })?;

    scope.source.generate(name).map_err(|e| {
        let err = Error::new(
            ErrorKind::InvalidOperation,
            format!("generate(\"{name}\") failed: {e}"),
        );
        scope
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert(e);
        err
    })
}

fn engine_error(e: Error) -> GeneratorError {
    GeneratorError::Engine(e.to_string())
}

/// A Jinja template rendered once per record.
pub struct JinjaEngine {
    env: Environment<'static>,
}

impl JinjaEngine {
    /// Compile `template`. Syntax errors are reported here, not per record.
    pub fn new(template: impl Into<String>) -> Result<Self, GeneratorError> {
        let mut env = Environment::new();
        env.add_function("generate", generate);
        env.add_template_owned(TEMPLATE_NAME, template.into())
            .map_err(engine_error)?;
        debug!("Compiled Jinja record template");

        Ok(Self { env })
    }
}

impl TemplateEngine for JinjaEngine {
    fn render(
        &self,
        source: &mut FieldSource<'_>,
        out: &mut Vec<u8>,
    ) -> Result<(), GeneratorError> {
        let template = self.env.get_template(TEMPLATE_NAME).map_err(engine_error)?;

        source.detach(|shared| {
            let scope = Value::from_object(RenderScope {
                source: shared.clone(),
                failure: Mutex::new(None),
            });
            let rendered =
                template.render_to_write(context! { __corpus_fields => scope.clone() }, &mut *out);

            // A field error beats the template error that wraps it
            let failure = scope
                .downcast_object_ref::<RenderScope>()
                .and_then(RenderScope::take_failure);
            match (failure, rendered) {
                (Some(e), _) => Err(e),
                (None, Err(e)) => Err(engine_error(e)),
                (None, Ok(_)) => Ok(()),
            }
        })
    }
}
