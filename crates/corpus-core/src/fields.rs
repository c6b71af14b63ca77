//! Field schema definitions.
//!
//! A field schema is an ordered list of [`Field`]s. It is normally produced by
//! an external field catalog; this module only knows how to read it from YAML.
//!
//! ## YAML Format
//!
//! ```yaml
//! - name: InterfaceID
//!   type: keyword
//!   example: eni-1235b8ca123456789
//! - name: labels.*
//!   type: object
//!   object_type: keyword
//! ```

use crate::ConfigError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

/// Suffix marking an object field whose keys are generated per record.
pub const DYNAMIC_SUFFIX: &str = ".*";

/// Semantic type of a field.
///
/// Unknown type names are kept as [`FieldType::Other`] and generated as free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Long,
    Integer,
    UnsignedLong,
    Double,
    Float,
    HalfFloat,
    ScaledFloat,
    Keyword,
    ConstantKeyword,
    Wildcard,
    Text,
    Ip,
    Boolean,
    GeoPoint,
    Date,
    Object,
    Nested,
    Flattened,
    Other(String),
}

impl FieldType {
    /// Get the canonical type name.
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Long => "long",
            FieldType::Integer => "integer",
            FieldType::UnsignedLong => "unsigned_long",
            FieldType::Double => "double",
            FieldType::Float => "float",
            FieldType::HalfFloat => "half_float",
            FieldType::ScaledFloat => "scaled_float",
            FieldType::Keyword => "keyword",
            FieldType::ConstantKeyword => "constant_keyword",
            FieldType::Wildcard => "wildcard",
            FieldType::Text => "text",
            FieldType::Ip => "ip",
            FieldType::Boolean => "boolean",
            FieldType::GeoPoint => "geo_point",
            FieldType::Date => "date",
            FieldType::Object => "object",
            FieldType::Nested => "nested",
            FieldType::Flattened => "flattened",
            FieldType::Other(name) => name,
        }
    }
}

impl From<&str> for FieldType {
    fn from(name: &str) -> Self {
        match name {
            "long" => FieldType::Long,
            "integer" => FieldType::Integer,
            "unsigned_long" => FieldType::UnsignedLong,
            "double" => FieldType::Double,
            "float" => FieldType::Float,
            "half_float" => FieldType::HalfFloat,
            "scaled_float" => FieldType::ScaledFloat,
            "keyword" => FieldType::Keyword,
            "constant_keyword" => FieldType::ConstantKeyword,
            "wildcard" => FieldType::Wildcard,
            "text" => FieldType::Text,
            "ip" => FieldType::Ip,
            "boolean" | "bool" => FieldType::Boolean,
            "geo_point" => FieldType::GeoPoint,
            "date" => FieldType::Date,
            "object" => FieldType::Object,
            "nested" => FieldType::Nested,
            "flattened" => FieldType::Flattened,
            other => FieldType::Other(other.to_string()),
        }
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        FieldType::from(name.as_str())
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.as_str().to_string()
    }
}

/// A single schema field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field name, used verbatim as the JSON key
    pub name: String,

    /// Semantic type
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Example value from the schema catalog
    #[serde(
        default,
        deserialize_with = "scalar_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub example: Option<String>,

    /// Value type of an object field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<FieldType>,
}

impl Field {
    /// Create a new field without example or object type.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            example: None,
            object_type: None,
        }
    }

    /// Set the example value.
    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Set the object value type.
    pub fn with_object_type(mut self, object_type: FieldType) -> Self {
        self.object_type = Some(object_type);
        self
    }

    /// Whether the field's key is regenerated per record (`labels.*`).
    pub fn is_dynamic(&self) -> bool {
        self.name.ends_with(DYNAMIC_SUFFIX)
    }

    /// Object root of a dynamic field (`labels` for `labels.*`).
    pub fn dynamic_root(&self) -> Option<&str> {
        self.name.strip_suffix(DYNAMIC_SUFFIX)
    }

    /// Example value, if present and non-empty.
    pub fn example(&self) -> Option<&str> {
        self.example.as_deref().filter(|e| !e.is_empty())
    }
}

/// Accept any YAML scalar as an example; catalogs write numeric examples unquoted.
fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_yaml::Value::Null) => None,
        Some(serde_yaml::Value::String(s)) => Some(s),
        Some(serde_yaml::Value::Bool(b)) => Some(b.to_string()),
        Some(serde_yaml::Value::Number(n)) => Some(n.to_string()),
        Some(_) => None,
    })
}

/// Ordered list of schema fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(Vec<Field>);

impl Fields {
    /// Create a field list.
    pub fn new(fields: Vec<Field>) -> Self {
        Self(fields)
    }

    /// Load fields from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse fields from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Get a field by name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.0.iter().find(|f| f.name == name)
    }

    /// Iterate over the fields in schema order.
    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Field>> for Fields {
    fn from(fields: Vec<Field>) -> Self {
        Self(fields)
    }
}

impl FromIterator<Field> for Fields {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_FIELDS: &str = r#"
- name: Version
  type: long
- name: InterfaceID
  type: keyword
  example: eni-1235b8ca123456789
- name: AccountID
  type: long
  example: 627286350134
- name: labels.*
  type: object
  object_type: keyword
- name: geo
  type: geo_point
- name: custom
  type: histogram
"#;

    #[test]
    fn test_parse_fields() {
        let fields = Fields::from_yaml(SAMPLE_FIELDS).unwrap();

        assert_eq!(fields.len(), 6);
        let version = fields.get("Version").unwrap();
        assert_eq!(version.field_type, FieldType::Long);
        assert!(version.example.is_none());

        let interface = fields.get("InterfaceID").unwrap();
        assert_eq!(interface.example(), Some("eni-1235b8ca123456789"));
    }

    #[test]
    fn test_numeric_example_is_kept_as_text() {
        let fields = Fields::from_yaml(SAMPLE_FIELDS).unwrap();
        let account = fields.get("AccountID").unwrap();
        assert_eq!(account.example(), Some("627286350134"));
    }

    #[test]
    fn test_dynamic_field() {
        let fields = Fields::from_yaml(SAMPLE_FIELDS).unwrap();
        let labels = fields.get("labels.*").unwrap();

        assert!(labels.is_dynamic());
        assert_eq!(labels.dynamic_root(), Some("labels"));
        assert_eq!(labels.object_type, Some(FieldType::Keyword));
        assert!(!fields.get("geo").unwrap().is_dynamic());
    }

    #[test]
    fn test_unknown_type_is_preserved() {
        let fields = Fields::from_yaml(SAMPLE_FIELDS).unwrap();
        let custom = fields.get("custom").unwrap();
        assert_eq!(custom.field_type, FieldType::Other("histogram".to_string()));
        assert_eq!(custom.field_type.as_str(), "histogram");
    }

    #[test]
    fn test_field_type_names_round_trip() {
        for name in ["long", "double", "constant_keyword", "geo_point", "date", "ip"] {
            let field_type = FieldType::from(name);
            assert_eq!(field_type.as_str(), name);
        }
        assert_eq!(FieldType::from("bool"), FieldType::Boolean);
    }

    #[test]
    fn test_field_serde() {
        let field = Field::new("host.name", FieldType::Keyword).with_example("web-01");

        let yaml = serde_yaml::to_string(&field).unwrap();
        let parsed: Field = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(field, parsed);
    }

    #[test]
    fn test_empty_yaml() {
        let fields = Fields::from_yaml("  \n").unwrap();
        assert!(fields.is_empty());
    }
}
