//! `{{.Field}}` templates.
//!
//! A template is literal text with placeholders of the form `{{.Name}}`.
//! Anything that does not match that shape exactly, including stray `{` and
//! `}`, is literal text. Parsing splits the template into placeholders, each
//! carrying the literal run before it, and one trailing literal:
//!
//! ```text
//! "A{{.X}}B{{.Y}}C"  =>  [("A", X), ("B", Y)] + "C"
//! ```

use crate::binder::{bind_all, BoundField, RenderMode};
use crate::error::GeneratorError;
use crate::generator::Generator;
use crate::state::{GenState, RecordKeys};
use corpus_core::{Config, Fields};
use std::collections::HashMap;
use tracing::debug;

const OPEN: &[u8] = b"{{.";
const CLOSE: &[u8] = b"}}";

/// A placeholder and the literal text immediately before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub prefix: Vec<u8>,
    pub field: String,
}

/// Result of scanning a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTemplate {
    pub placeholders: Vec<Placeholder>,
    pub trailing: Vec<u8>,
}

impl ParsedTemplate {
    /// Distinct field names in order of first appearance.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.placeholders.len());
        for placeholder in &self.placeholders {
            if !names.contains(&placeholder.field.as_str()) {
                names.push(&placeholder.field);
            }
        }
        names
    }

    /// Literal text before the first placeholder naming `field`.
    ///
    /// This is only a lookup. When a field appears more than once, rendering
    /// still writes each occurrence's own prefix, so `<{{.X}}|{{.X}}>`
    /// renders as `<1|1>` rather than repeating the first prefix as `<1<1>`.
    pub fn prefix_of(&self, field: &str) -> Option<&[u8]> {
        self.placeholders
            .iter()
            .find(|p| p.field == field)
            .map(|p| p.prefix.as_slice())
    }
}

/// Scan a template into placeholders and literal text.
pub fn parse_template(template: &[u8]) -> Result<ParsedTemplate, GeneratorError> {
    let mut parsed = ParsedTemplate::default();
    let mut literal = Vec::new();
    let mut pos = 0;

    while pos < template.len() {
        if let Some((field, end)) = placeholder_at(template, pos)? {
            parsed.placeholders.push(Placeholder {
                prefix: std::mem::take(&mut literal),
                field,
            });
            pos = end;
        } else {
            literal.push(template[pos]);
            pos += 1;
        }
    }

    parsed.trailing = literal;
    Ok(parsed)
}

/// Match `{{.Name}}` at `pos`, returning the name and the position after it.
fn placeholder_at(
    template: &[u8],
    pos: usize,
) -> Result<Option<(String, usize)>, GeneratorError> {
    let rest = &template[pos..];
    if !rest.starts_with(OPEN) {
        return Ok(None);
    }

    let name_start = OPEN.len();
    let name_len = rest[name_start..]
        .iter()
        .take_while(|&&b| b != b'}')
        .count();
    let name_end = name_start + name_len;

    if name_len == 0 || !rest[name_end..].starts_with(CLOSE) {
        return Ok(None);
    }

    let name = std::str::from_utf8(&rest[name_start..name_end]).map_err(|_| {
        GeneratorError::InvalidTemplate(format!(
            "placeholder name at byte {} is not valid UTF-8",
            pos + name_start
        ))
    })?;

    Ok(Some((name.to_string(), pos + name_end + CLOSE.len())))
}

/// One placeholder paired with the field that fills it.
struct Segment {
    prefix: Vec<u8>,
    field: usize,
}

/// Emits records by filling a `{{.Field}}` template.
pub struct TemplateGenerator {
    fields: Vec<Box<dyn BoundField>>,
    segments: Vec<Segment>,
    trailing: Vec<u8>,
}

impl TemplateGenerator {
    /// Parse `template` and bind the fields it references.
    ///
    /// Schema fields the template never mentions are dropped. A placeholder
    /// naming a field missing from the schema is an error.
    pub fn new(template: &[u8], config: &Config, fields: &Fields) -> Result<Self, GeneratorError> {
        let parsed = parse_template(template)?;

        let mut by_name: HashMap<String, Box<dyn BoundField>> =
            bind_all(config, fields, RenderMode::Raw)?
                .into_iter()
                .map(|bound| (bound.name().to_string(), bound))
                .collect();

        let mut bound = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut segments = Vec::with_capacity(parsed.placeholders.len());

        for placeholder in parsed.placeholders {
            let field = match index.get(&placeholder.field) {
                Some(&idx) => idx,
                None => {
                    let field = by_name
                        .remove(&placeholder.field)
                        .ok_or_else(|| GeneratorError::UnknownField(placeholder.field.clone()))?;
                    bound.push(field);
                    index.insert(placeholder.field, bound.len() - 1);
                    bound.len() - 1
                }
            };
            segments.push(Segment {
                prefix: placeholder.prefix,
                field,
            });
        }

        debug!(
            "Built template generator with {} placeholders over {} fields ({} unused)",
            segments.len(),
            bound.len(),
            by_name.len()
        );

        Ok(Self {
            fields: bound,
            segments,
            trailing: parsed.trailing,
        })
    }

    fn write_record(&self, state: &mut GenState, buf: &mut Vec<u8>) -> Result<(), GeneratorError> {
        let mut keys = RecordKeys::new();
        for segment in &self.segments {
            buf.extend_from_slice(&segment.prefix);
            self.fields[segment.field].emit(state, &mut keys, buf)?;
        }
        buf.extend_from_slice(&self.trailing);
        Ok(())
    }
}

impl Generator for TemplateGenerator {
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
