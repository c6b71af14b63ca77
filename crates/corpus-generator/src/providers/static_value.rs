//! Static value rendering.

use crate::binder::RenderMode;
use serde_yaml::Value as YamlValue;

/// Render a configured literal once, ready to be replayed on every record.
///
/// JSON mode always produces the JSON encoding of the literal. Raw mode
/// writes strings verbatim and everything else as JSON.
pub fn render_static(value: &YamlValue, mode: RenderMode) -> Result<Vec<u8>, serde_json::Error> {
    match (mode, value) {
        (RenderMode::Raw, YamlValue::String(s)) => Ok(s.as_bytes().to_vec()),
        (_, YamlValue::Tagged(tagged)) => render_static(&tagged.value, mode),
        _ => serde_json::to_vec(value),
    }
}
