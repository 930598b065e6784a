//! String-keyed map sources.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use super::{ExtractContext, SourceKind};
use crate::errors::Result;
use crate::pipeline::CanonicalFieldMap;

/// A map from string keys to values.
pub trait MapSource {
    /// Value stored under `key`.
    fn get_value(&self, key: &str) -> Option<&Value>;
}

impl MapSource for HashMap<String, Value> {
    fn get_value(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

impl MapSource for BTreeMap<String, Value> {
    fn get_value(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

impl MapSource for serde_json::Map<String, Value> {
    fn get_value(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

/// Copies each field's value from the key matching its source name.
///
/// Values are not type checked here; the instance builder does that when it
/// assigns them.
pub(super) fn extract(map: &dyn MapSource, ctx: &ExtractContext<'_>) -> Result<CanonicalFieldMap> {
    let mut out = CanonicalFieldMap::with_capacity(ctx.fields.len());
    for field in ctx.fields {
        match map.get_value(ctx.source_name(field)) {
            Some(value) => out.insert(field.name.as_str(), value.clone()),
            None => ctx
                .policy
                .on_missing(ctx.contract, &field.name, SourceKind::Map)?,
        }
    }
    Ok(out)
}
