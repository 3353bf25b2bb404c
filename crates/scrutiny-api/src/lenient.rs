// Field-level decoding that never fails the surrounding record.
//
// Scrutiny collectors of different versions disagree on field types
// (`temp` as `35` or `35.5`, `capacity` as a number or a string). One odd
// value must not cost the whole roster entry, let alone the roster.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Decode `T`, or fall back to `T::default()` when the value has the
/// wrong shape.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        debug!(error = %e, "ignoring malformed Scrutiny field");
        T::default()
    }))
}
