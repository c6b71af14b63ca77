//! Per-field generation configuration.
//!
//! ## YAML Format
//!
//! The configuration is a list of entries keyed by field name:
//!
//! ```yaml
//! - name: Version
//!   value: 2
//! - name: DstPort
//!   range: 65535
//!   cardinality: 100
//! - name: Bytes
//!   fuzziness: 10
//! - name: Action
//!   enum: ["ACCEPT", "REJECT"]
//! ```
//!
//! The same list nested under a top-level `fields:` key is accepted as well.
//! Entries naming fields that do not exist in the schema are ignored.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Generation settings for one field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigField {
    /// Field name this entry applies to
    pub name: String,

    /// Fixed value emitted verbatim on every record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_yaml::Value>,

    /// Exclusive upper bound for numeric draws
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<i64>,

    /// Roughly how many distinct values appear per 1000 records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<u32>,

    /// Maximum percentage drift between consecutive numeric values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzziness: Option<u32>,

    /// Values a keyword field picks from
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
}

impl ConfigField {
    /// Create an empty entry for a field.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set a fixed value.
    pub fn with_value(mut self, value: serde_yaml::Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Set the numeric range.
    pub fn with_range(mut self, range: i64) -> Self {
        self.range = Some(range);
        self
    }

    /// Set the cardinality.
    pub fn with_cardinality(mut self, cardinality: u32) -> Self {
        self.cardinality = Some(cardinality);
        self
    }

    /// Set the fuzziness percentage.
    pub fn with_fuzziness(mut self, fuzziness: u32) -> Self {
        self.fuzziness = Some(fuzziness);
        self
    }

    /// Set the enum values.
    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Fuzziness as a percentage, zero when unset.
    pub fn fuzziness(&self) -> u32 {
        self.fuzziness.unwrap_or(0)
    }

    /// Check the numeric settings are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cardinality == Some(0) {
            return Err(ConfigError::InvalidCardinality {
                field: self.name.clone(),
            });
        }
        if let Some(value) = self.fuzziness.filter(|f| *f > 100) {
            return Err(ConfigError::InvalidFuzziness {
                field: self.name.clone(),
                value,
            });
        }
        if let Some(value) = self.range.filter(|r| *r <= 0) {
            return Err(ConfigError::InvalidRange {
                field: self.name.clone(),
                value,
            });
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ConfigRepr {
    List(Vec<ConfigField>),
    Wrapped { fields: Vec<ConfigField> },
}

/// Full generation configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Entries in file order
    fields: Vec<ConfigField>,

    /// Field name to entry index; the first entry for a name wins
    lookup: HashMap<String, usize>,
}

impl Config {
    /// Create a configuration from entries.
    pub fn new(fields: Vec<ConfigField>) -> Self {
        let mut lookup = HashMap::with_capacity(fields.len());
        for (idx, field) in fields.iter().enumerate() {
            lookup.entry(field.name.clone()).or_insert(idx);
        }
        Self { fields, lookup }
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    ///
    /// Entries are not validated here: an entry whose name matches no schema
    /// field is never used, so only the entries a generator binds are checked.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let fields = match serde_yaml::from_str(yaml)? {
            ConfigRepr::List(fields) => fields,
            ConfigRepr::Wrapped { fields } => fields,
        };
        Ok(Self::new(fields))
    }

    /// Validate every entry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fields.iter().try_for_each(ConfigField::validate)
    }

    /// Get the entry for a field name.
    pub fn get_field(&self, name: &str) -> Option<&ConfigField> {
        self.lookup.get(name).and_then(|&idx| self.fields.get(idx))
    }

    /// All entries in file order.
    pub fn fields(&self) -> &[ConfigField] {
        &self.fields
    }
}
