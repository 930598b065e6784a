//! Property-bearing object sources.

use serde::Serialize;
use serde_json::{Map, Value};

use super::{ExtractContext, SourceKind};
use crate::errors::{BuilderError, Result};
use crate::pipeline::CanonicalFieldMap;

/// An object that exposes named properties.
#[cfg_attr(test, mockall::automock)]
pub trait PropertySource {
    /// True if the object has a property called `name`.
    fn has_property(&self, name: &str) -> bool;

    /// Reads a property.
    fn property(&self, name: &str) -> Option<Value>;
}

/// Property snapshot of any serializable value.
///
/// Struct fields become properties under their serialized names, so any
/// `#[derive(Serialize)]` type can be used as a source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSource {
    type_name: &'static str,
    properties: Map<String, Value>,
}

impl ObjectSource {
    /// Snapshots `value`, which must serialize to an object.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let type_name = std::any::type_name::<T>();
        let serialized = serde_json::to_value(value).map_err(|e| {
            BuilderError::extraction(type_name, SourceKind::Object, e.to_string())
        })?;
        match serialized {
            Value::Object(properties) => Ok(Self {
                type_name,
                properties,
            }),
            other => Err(BuilderError::extraction(
                type_name,
                SourceKind::Object,
                format!(
                    "value serializes to {}, not an object",
                    crate::contract::value_type_name(&other)
                ),
            )),
        }
    }

    /// Rust type the snapshot was taken from.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Property names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }
}

impl PropertySource for ObjectSource {
    fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    fn property(&self, name: &str) -> Option<Value> {
        self.properties.get(name).cloned()
    }
}

/// Reads the same-named property for every field.
///
/// Presence is checked before the value is read. Source-name overrides do
/// not apply to objects.
pub(super) fn extract(
    object: &dyn PropertySource,
    ctx: &ExtractContext<'_>,
) -> Result<CanonicalFieldMap> {
    let mut out = CanonicalFieldMap::with_capacity(ctx.fields.len());
    for field in ctx.fields {
        let value = if object.has_property(&field.name) {
            object.property(&field.name)
        } else {
            None
        };
        let Some(value) = value else {
            ctx.policy.on_missing(ctx.contract, &field.name, SourceKind::Object)?;
            continue;
        };
        if let Some(value) = ctx.policy.check(ctx.contract, field, value)? {
            out.insert(field.name.as_str(), value);
        }
    }
    Ok(out)
}
