//! Per-field value transformation.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::canonical::CanonicalFieldMap;

type TransformFn = dyn Fn(&str, Value) -> Value + Send + Sync;

/// A function `(field_name, raw_value) -> value` applied to every extracted
/// field before materialization.
#[derive(Clone)]
pub struct ValueTransform(Arc<TransformFn>);

impl ValueTransform {
    /// Wraps a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str, Value) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Applies the transform to one value.
    #[must_use]
    pub fn apply(&self, field: &str, value: Value) -> Value {
        (self.0)(field, value)
    }

    /// Runs `self`, then `next`, on every value.
    #[must_use]
    pub fn then(self, next: ValueTransform) -> Self {
        Self::new(move |field, value| next.apply(field, self.apply(field, value)))
    }
}

impl fmt::Debug for ValueTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueTransform(..)")
    }
}

/// Runs `transform` exactly once on each entry of `map`.
#[must_use]
pub fn apply_transform(
    mut map: CanonicalFieldMap,
    transform: Option<&ValueTransform>,
) -> CanonicalFieldMap {
    if let Some(transform) = transform {
        for (field, value) in map.iter_mut() {
            *value = transform.apply(field, std::mem::take(value));
        }
    }
    map
}
