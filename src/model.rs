//! Generic model (de)serialization contract shared by every record and request type.
//!
//! Every DTO in the crate implements [`Model`]: it can be built from an
//! associative JSON structure (checking required fields and enum values on the
//! way in), exported back to one, and validated before it is sent.
//!
//! ```ignore
//! use bizdesk::{Invoice, Model};
//! use serde_json::json;
//!
//! let invoice = Invoice::from_value(json!({"client_id": 7, "state": "draft"}))?;
//! let map = invoice.to_map()?;
//! ```

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::errors::{Error, Result, ValidationError};

pub trait Model: Serialize + DeserializeOwned {
    /// Human-readable model name used in error messages.
    const NAME: &'static str;

    /// Wire names of the fields that must be present and non-null.
    fn required_fields() -> &'static [&'static str] {
        &[]
    }

    /// Builds the model from an associative structure keyed by wire names.
    fn from_map(map: Map<String, Value>) -> Result<Self> {
        check_required(&map, Self::required_fields(), false)?;
        let model: Self = serde_json::from_value(Value::Object(map))
            .map_err(|err| decode_error(Self::NAME, err))?;
        model.check_values()?;
        Ok(model)
    }

    /// Range checks serde types cannot express, applied to decoded and
    /// outgoing models alike.
    fn check_values(&self) -> Result<()> {
        Ok(())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Self::from_map(map),
            other => Err(ValidationError::new(format!(
                "{} must be a JSON object, got {}",
                Self::NAME,
                value_kind(&other)
            ))
            .into()),
        }
    }

    fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Exports the model keyed by wire names; unset optional fields are omitted.
    fn to_map(&self) -> Result<Map<String, Value>> {
        match self.to_value()? {
            Value::Object(map) => Ok(map),
            other => Err(ValidationError::new(format!(
                "{} did not serialize to an object ({})",
                Self::NAME,
                value_kind(&other)
            ))
            .into()),
        }
    }

    /// Local checks run before the model is sent. Required string fields must
    /// also be non-blank.
    fn validate(&self) -> Result<()> {
        validate_required(self)?;
        self.check_values()
    }
}

/// Required-field check of the exported form of `model`.
pub(crate) fn validate_required<M: Model>(model: &M) -> Result<()> {
    let map = model.to_map()?;
    check_required(&map, M::required_fields(), true)
}

/// Reads an explicit `null` as the field's default, like an absent key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Partial updates must carry at least one field.
pub(crate) fn validate_update<M: Model>(model: &M) -> Result<()> {
    if model.to_map()?.is_empty() {
        return Err(ValidationError::new(format!("{} has no fields to update", M::NAME)).into());
    }
    Ok(())
}

/// Fails on the first required field that is absent or null. With `strict`,
/// blank strings count as absent.
pub(crate) fn check_required(
    map: &Map<String, Value>,
    fields: &[&str],
    strict: bool,
) -> Result<()> {
    for field in fields {
        let present = match map.get(*field) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) if strict => !s.trim().is_empty(),
            Some(_) => true,
        };
        if !present {
            return Err(ValidationError::required(field).into());
        }
    }
    Ok(())
}

fn decode_error(name: &str, err: serde_json::Error) -> Error {
    if err.is_data() {
        ValidationError::new(format!("invalid {name}: {err}")).into()
    } else {
        Error::Serialization(err)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
