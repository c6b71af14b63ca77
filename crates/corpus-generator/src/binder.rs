//! Field binder: compiles a field and its configuration into a [`BoundField`].
//!
//! Binding happens once per generator. Everything that can be decided up
//! front (key prefixes, rendered enum choices, static payloads, ranges) is
//! decided here so that [`BoundField::emit`] only draws random values and
//! appends bytes.
//!
//! Precedence for a field:
//!
//! 1. a configured `value` is replayed verbatim;
//! 2. otherwise the field is bound by type, then wrapped by
//!    [`CardinalityField`] when a cardinality is configured, then by
//!    [`DynamicField`] when the name ends in `.*` (JSON mode only).

use crate::cardinality::CardinalityField;
use crate::dynamic::DynamicField;
use crate::error::GeneratorError;
use crate::fuzziness::{walk_float, walk_int};
use crate::providers::{self, NEAR_TIME_WINDOW_SECS};
use crate::state::{CachedValue, GenState, RecordKeys};
use corpus_core::{Config, ConfigField, Field, FieldType, Fields};
use rand::Rng;
use std::collections::HashSet;
use std::io::Write;
use tracing::debug;

/// Maximum number of nouns in a free-text value (exclusive).
pub const MAX_TEXT_WORDS: usize = 25;

/// How a bound field renders itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// `"name":value`, strings quoted and escaped
    Json,
    /// The bare value, for templates
    Raw,
}

/// A field compiled into an emitter.
pub trait BoundField: Send + Sync {
    /// Name of the field this emitter was bound for.
    fn name(&self) -> &str;

    /// Append this field's fragment for one record to `buf`.
    ///
    /// Writing nothing is allowed; the assemblers treat it as "field absent".
    fn emit(
        &self,
        state: &mut GenState,
        keys: &mut RecordKeys,
        buf: &mut Vec<u8>,
    ) -> Result<(), GeneratorError>;
}

/// Bytes written around a value.
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    prefix: Vec<u8>,
    suffix: &'static [u8],
}

impl Frame {
    /// Build the frame for a field. `quoted` values become JSON strings in
    /// JSON mode.
    pub(crate) fn new(name: &str, mode: RenderMode, quoted: bool) -> Result<Self, GeneratorError> {
        match mode {
            RenderMode::Raw => Ok(Self {
                prefix: Vec::new(),
                suffix: b"",
            }),
            RenderMode::Json => {
                let mut prefix = key_prefix(name)?;
                if quoted {
                    prefix.push(b'"');
                }
                Ok(Self {
                    prefix,
                    suffix: if quoted { b"\"".as_slice() } else { b"".as_slice() },
                })
            }
        }
    }

    #[inline]
    pub(crate) fn open(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.prefix);
    }

    #[inline]
    pub(crate) fn close(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.suffix);
    }

    pub(crate) fn write(&self, buf: &mut Vec<u8>, value: &[u8]) {
        self.open(buf);
        buf.extend_from_slice(value);
        self.close(buf);
    }
}

/// `"name":` with the name JSON-escaped.
pub(crate) fn key_prefix(name: &str) -> Result<Vec<u8>, GeneratorError> {
    let mut prefix = serde_json::to_vec(name)?;
    prefix.push(b':');
    Ok(prefix)
}

/// Text as it must appear between the quotes of a JSON string (JSON mode) or
/// verbatim (raw mode).
fn string_content(text: &str, mode: RenderMode) -> Result<Vec<u8>, GeneratorError> {
    match mode {
        RenderMode::Raw => Ok(text.as_bytes().to_vec()),
        RenderMode::Json => {
            let quoted = serde_json::to_vec(text)?;
            Ok(quoted[1..quoted.len() - 1].to_vec())
        }
    }
}

/// Bind every schema field, in schema order.
///
/// When a name appears more than once, the first definition is bound and the
/// later ones are skipped, so the field keeps its first position and type.
/// This matches [`Config`], where the first entry for a name wins.
pub fn bind_all(
    config: &Config,
    fields: &Fields,
    mode: RenderMode,
) -> Result<Vec<Box<dyn BoundField>>, GeneratorError> {
    let mut seen = HashSet::with_capacity(fields.len());
    let mut bound = Vec::with_capacity(fields.len());

    for field in fields {
        if !seen.insert(field.name.as_str()) {
            debug!("Skipping duplicate field '{}'", field.name);
            continue;
        }
        bound.push(bind(config, field, mode)?);
    }

    Ok(bound)
}

/// Bind one field against the configuration.
pub fn bind(
    config: &Config,
    field: &Field,
    mode: RenderMode,
) -> Result<Box<dyn BoundField>, GeneratorError> {
    let field_cfg = config.get_field(&field.name);
    if let Some(cfg) = field_cfg {
        cfg.validate()?;
    }

    if let Some(value) = field_cfg.and_then(|cfg| cfg.value.as_ref()) {
        return Ok(Box::new(StaticField::new(field, value, mode)?));
    }

    let mut bound = bind_by_type(field_cfg, field, &field.field_type, mode)?;

    if let Some(cardinality) = field_cfg.and_then(|cfg| cfg.cardinality) {
        bound = Box::new(CardinalityField::new(bound, cardinality));
    }

    if mode == RenderMode::Json {
        if let Some(root) = field.dynamic_root() {
            bound = Box::new(DynamicField::new(bound, &field.name, root)?);
        }
    }

    Ok(bound)
}

fn bind_by_type(
    cfg: Option<&ConfigField>,
    field: &Field,
    field_type: &FieldType,
    mode: RenderMode,
) -> Result<Box<dyn BoundField>, GeneratorError> {
    let name = field.name.as_str();
    let fuzziness = cfg.map(ConfigField::fuzziness).unwrap_or(0);
    let range = cfg
        .and_then(|c| c.range)
        .unwrap_or_else(|| providers::default_range(field.example()));

    let bound: Box<dyn BoundField> = match field_type {
        FieldType::Date => Box::new(DateField {
            name: name.to_string(),
            frame: Frame::new(name, mode, true)?,
            window_secs: NEAR_TIME_WINDOW_SECS,
        }),
        FieldType::Ip => Box::new(IpField {
            name: name.to_string(),
            frame: Frame::new(name, mode, true)?,
        }),
        FieldType::Double | FieldType::Float | FieldType::HalfFloat | FieldType::ScaledFloat => {
            Box::new(DoubleField {
                name: name.to_string(),
                frame: Frame::new(name, mode, false)?,
                range,
                fuzziness,
            })
        }
        FieldType::Long | FieldType::Integer | FieldType::UnsignedLong => Box::new(LongField {
            name: name.to_string(),
            frame: Frame::new(name, mode, false)?,
            range,
            fuzziness,
        }),
        FieldType::ConstantKeyword => Box::new(ConstantKeywordField {
            name: name.to_string(),
            frame: Frame::new(name, mode, true)?,
        }),
        FieldType::Keyword | FieldType::Wildcard => bind_keyword(cfg, field, mode)?,
        FieldType::Boolean => Box::new(BoolField {
            name: name.to_string(),
            frame: Frame::new(name, mode, false)?,
        }),
        FieldType::GeoPoint => Box::new(GeoPointField {
            name: name.to_string(),
            frame: Frame::new(name, mode, true)?,
        }),
        FieldType::Object | FieldType::Nested | FieldType::Flattened => {
            match &field.object_type {
                Some(value_type)
                    if !matches!(
                        value_type,
                        FieldType::Object | FieldType::Nested | FieldType::Flattened
                    ) =>
                {
                    bind_by_type(cfg, field, value_type, mode)?
                }
                _ => bind_text(name, mode)?,
            }
        }
        FieldType::Text | FieldType::Other(_) => bind_text(name, mode)?,
    };

    Ok(bound)
}

fn bind_text(name: &str, mode: RenderMode) -> Result<Box<dyn BoundField>, GeneratorError> {
    Ok(Box::new(TextField {
        name: name.to_string(),
        frame: Frame::new(name, mode, true)?,
        max_words: MAX_TEXT_WORDS,
    }))
}

fn bind_keyword(
    cfg: Option<&ConfigField>,
    field: &Field,
    mode: RenderMode,
) -> Result<Box<dyn BoundField>, GeneratorError> {
    let name = field.name.as_str();

    if let Some(values) = cfg.map(|c| &c.enum_values).filter(|v| !v.is_empty()) {
        let frame = Frame::new(name, mode, true)?;
        let choices = values
            .iter()
            .map(|value| {
                let mut choice = Vec::new();
                frame.write(&mut choice, &string_content(value, mode)?);
                Ok(choice)
            })
            .collect::<Result<Vec<_>, GeneratorError>>()?;
        return Ok(Box::new(EnumField {
            name: name.to_string(),
            choices,
        }));
    }

    if let Some(example) = field.example() {
        let (words, joiner) = example_shape(example);
        return Ok(Box::new(JoinedWordsField {
            name: name.to_string(),
            frame: Frame::new(name, mode, true)?,
            words,
            joiner: string_content(joiner, mode)?,
        }));
    }

    Ok(Box::new(WordField {
        name: name.to_string(),
        frame: Frame::new(name, mode, true)?,
    }))
}

/// Word count and joiner that make generated keywords look like `example`.
///
/// Words are the segments between `.`, `-`, `_` and whitespace. The joiner is
/// the first of an escaped dot, a hyphen, an underscore or a space found in the
/// example.
pub fn example_shape(example: &str) -> (usize, &'static str) {
    let words = example
        .split(|c: char| matches!(c, '.' | '-' | '_') || c.is_whitespace())
        .count();

    let joiner = if example.contains("\\.") {
        "\\."
    } else if example.contains('-') {
        "-"
    } else if example.contains('_') {
        "_"
    } else if example.contains(' ') {
        " "
    } else {
        ""
    };

    (words, joiner)
}

/// Configured literal replayed on every record.
struct StaticField {
    name: String,
    payload: Vec<u8>,
}

impl StaticField {
    fn new(
        field: &Field,
        value: &serde_yaml::Value,
        mode: RenderMode,
    ) -> Result<Self, GeneratorError> {
        let rendered =
            providers::render_static(value, mode).map_err(|source| GeneratorError::StaticValue {
                field: field.name.clone(),
                source,
            })?;

        let payload = match mode {
            RenderMode::Raw => rendered,
            RenderMode::Json => {
                let mut payload = key_prefix(&field.name)?;
                payload.extend_from_slice(&rendered);
                payload
            }
        };

        Ok(Self {
            name: field.name.clone(),
            payload,
        })
    }
}

impl BoundField for StaticField {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(
        &self,
        _: &mut GenState,
        _: &mut RecordKeys,
        buf: &mut Vec<u8>,
    ) -> Result<(), GeneratorError> {
        buf.extend_from_slice(&self.payload);
        Ok(())
    }
}

/// Token drawn once and repeated for the lifetime of the state.
struct ConstantKeywordField {
    name: String,
    frame: Frame,
}

impl BoundField for ConstantKeywordField {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(
        &self,
        state: &mut GenState,
        _: &mut RecordKeys,
        buf: &mut Vec<u8>,
    ) -> Result<(), GeneratorError> {
        if let Some(CachedValue::Token(token)) = state.prev_cache.get(self.name.as_str()) {
            self.frame.write(buf, token.as_bytes());
            return Ok(());
        }

        let token = providers::noun(&mut state.rng);
        state.store(&self.name, CachedValue::Token(token.to_string()));
        self.frame.write(buf, token.as_bytes());
        Ok(())
    }
}

/// Keyword picked from configured values, each pre-rendered with its key.
struct EnumField {
    name: String,
    choices: Vec<Vec<u8>>,
}

impl BoundField for EnumField {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(
        &self,
        state: &mut GenState,
        _: &mut RecordKeys,
        buf: &mut Vec<u8>,
    ) -> Result<(), GeneratorError> {
        // The last configured value is never drawn; see DESIGN.md.
        let idx = if self.choices.len() > 1 {
            state.rng.random_range(0..self.choices.len() - 1)
        } else {
            0
        };
        buf.extend_from_slice(&self.choices[idx]);
        Ok(())
    }
}

/// Keyword shaped like the schema example (`eni-xxxx` → `noun-noun`).
struct JoinedWordsField {
    name: String,
    frame: Frame,
    words: usize,
    joiner: Vec<u8>,
}

impl BoundField for JoinedWordsField {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(
        &self,
        state: &mut GenState,
        _: &mut RecordKeys,
        buf: &mut Vec<u8>,
    ) -> Result<(), GeneratorError> {
        self.frame.open(buf);
        providers::write_nouns(&mut state.rng, self.words, &self.joiner, buf);
        self.frame.close(buf);
        Ok(())
    }
}

/// Single random token.
struct WordField {
    name: String,
    frame: Frame,
}

impl BoundField for WordField {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(
        &self,
        state: &mut GenState,
        _: &mut RecordKeys,
        buf: &mut Vec<u8>,
    ) -> Result<(), GeneratorError> {
        self.frame.write(buf, providers::noun(&mut state.rng).as_bytes());
        Ok(())
    }
}

/// Free text of up to `max_words` nouns.
struct TextField {
    name: String,
    frame: Frame,
    max_words: usize,
}

impl BoundField for TextField {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(
        &self,
        state: &mut GenState,
        _: &mut RecordKeys,
        buf: &mut Vec<u8>,
    ) -> Result<(), GeneratorError> {
        let count = state.rng.random_range(0..self.max_words);
        self.frame.open(buf);
        providers::write_nouns(&mut state.rng, count, b" ", buf);
        self.frame.close(buf);
        Ok(())
    }
}

struct LongField {
    name: String,
    frame: Frame,
    range: i64,
    fuzziness: u32,
}

impl BoundField for LongField {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(
        &self,
        state: &mut GenState,
        _: &mut RecordKeys,
        buf: &mut Vec<u8>,
    ) -> Result<(), GeneratorError> {
        let mut value = providers::random_int(&mut state.rng, self.range);
        if self.fuzziness > 0 {
            value = walk_int(state, &self.name, value, self.fuzziness);
        }

        self.frame.open(buf);
        buf.extend_from_slice(itoa::Buffer::new().format(value).as_bytes());
        self.frame.close(buf);
        Ok(())
    }
}

struct DoubleField {
    name: String,
    frame: Frame,
    range: i64,
    fuzziness: u32,
}

impl BoundField for DoubleField {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(
        &self,
        state: &mut GenState,
        _: &mut RecordKeys,
        buf: &mut Vec<u8>,
    ) -> Result<(), GeneratorError> {
        let mut value = providers::random_jittered_float(&mut state.rng, self.range);
        if self.fuzziness > 0 {
            value = walk_float(state, &self.name, value, self.fuzziness);
        }

        self.frame.open(buf);
        write!(buf, "{value:.6}")?;
        self.frame.close(buf);
        Ok(())
    }
}

struct BoolField {
    name: String,
    frame: Frame,
}

impl BoundField for BoolField {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(
        &self,
        state: &mut GenState,
        _: &mut RecordKeys,
        buf: &mut Vec<u8>,
    ) -> Result<(), GeneratorError> {
        let value = if state.rng.random_bool(0.5) {
            b"true".as_slice()
        } else {
            b"false".as_slice()
        };
        self.frame.write(buf, value);
        Ok(())
    }
}

struct IpField {
    name: String,
    frame: Frame,
}

impl BoundField for IpField {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(
        &self,
        state: &mut GenState,
        _: &mut RecordKeys,
        buf: &mut Vec<u8>,
    ) -> Result<(), GeneratorError> {
        self.frame.open(buf);
        providers::write_ipv4(&mut state.rng, buf);
        self.frame.close(buf);
        Ok(())
    }
}

struct GeoPointField {
    name: String,
    frame: Frame,
}

impl BoundField for GeoPointField {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(
        &self,
        state: &mut GenState,
        _: &mut RecordKeys,
        buf: &mut Vec<u8>,
    ) -> Result<(), GeneratorError> {
        self.frame.open(buf);
        providers::write_geo_point(&mut state.rng, buf);
        self.frame.close(buf);
        Ok(())
    }
}

/// Timestamp within the look-back window before now.
struct DateField {
    name: String,
    frame: Frame,
    window_secs: i64,
}

impl BoundField for DateField {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(
        &self,
        state: &mut GenState,
        _: &mut RecordKeys,
        buf: &mut Vec<u8>,
    ) -> Result<(), GeneratorError> {
        self.frame.open(buf);
        providers::write_near_time(&mut state.rng, self.window_secs, buf)?;
        self.frame.close(buf);
        Ok(())
    }
}
