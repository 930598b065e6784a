//! Factory configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::errors::{BuilderError, Result};
use crate::pipeline::{TypePolicy, ValueTransform};

/// Mapping configuration attached to a [`BuilderFactory`](super::BuilderFactory).
///
/// ```rust,ignore
/// let options = BuilderOptions::new()
///     .map_field("FirstName", "given_name")
///     .with_transform(|_, value| value)
///     .with_fail_on_missing_field(true);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BuilderOptions {
    /// Applied to every extracted value.
    pub transform: Option<ValueTransform>,
    /// Contract field name to source name.
    pub source_names: HashMap<String, String>,
    /// Raise on fields with no source data.
    pub fail_on_missing_field: bool,
    /// Raise on source values the field cannot hold.
    pub fail_on_incompatible_type: bool,
}

impl BuilderOptions {
    /// Creates empty options: no transform, no renames, skip on mismatch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options that fail on both missing and incompatible fields.
    #[must_use]
    pub fn strict() -> Self {
        Self::new()
            .with_fail_on_missing_field(true)
            .with_fail_on_incompatible_type(true)
    }

    /// Sets the value transform.
    #[must_use]
    pub fn with_transform<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, Value) -> Value + Send + Sync + 'static,
    {
        self.transform = Some(ValueTransform::new(f));
        self
    }

    /// Sets a prepared value transform.
    #[must_use]
    pub fn with_value_transform(mut self, transform: ValueTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Reads `field` from `source_name` in map, tuple and document sources.
    #[must_use]
    pub fn map_field(mut self, field: impl Into<String>, source_name: impl Into<String>) -> Self {
        self.source_names.insert(field.into(), source_name.into());
        self
    }

    /// Sets missing-field handling.
    #[must_use]
    pub fn with_fail_on_missing_field(mut self, fail: bool) -> Self {
        self.fail_on_missing_field = fail;
        self
    }

    /// Sets incompatible-type handling.
    #[must_use]
    pub fn with_fail_on_incompatible_type(mut self, fail: bool) -> Self {
        self.fail_on_incompatible_type = fail;
        self
    }

    /// The skip/fail policy these options describe.
    #[must_use]
    pub fn policy(&self) -> TypePolicy {
        TypePolicy {
            fail_on_missing_field: self.fail_on_missing_field,
            fail_on_incompatible_type: self.fail_on_incompatible_type,
        }
    }

    /// Builds options from loaded settings. No transform is set.
    #[must_use]
    pub fn from_settings(settings: BuilderSettings) -> Self {
        Self {
            transform: None,
            source_names: settings.source_names,
            fail_on_missing_field: settings.fail_on_missing_field,
            fail_on_incompatible_type: settings.fail_on_incompatible_type,
        }
    }

    /// The serializable part of these options.
    #[must_use]
    pub fn settings(&self) -> BuilderSettings {
        BuilderSettings {
            fail_on_missing_field: self.fail_on_missing_field,
            fail_on_incompatible_type: self.fail_on_incompatible_type,
            source_names: self.source_names.clone(),
        }
    }
}

/// Serializable builder settings.
///
/// ```json
/// {
///   "fail_on_missing_field": true,
///   "source_names": {"FirstName": "given_name"}
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuilderSettings {
    /// Raise on fields with no source data.
    pub fail_on_missing_field: bool,
    /// Raise on source values the field cannot hold.
    pub fail_on_incompatible_type: bool,
    /// Contract field name to source name.
    pub source_names: HashMap<String, String>,
}

impl BuilderSettings {
    /// Loads settings from a JSON string.
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| BuilderError::Configuration(e.to_string()))
    }

    /// Loads settings from a JSON value.
    pub fn from_json(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| BuilderError::Configuration(e.to_string()))
    }
}

impl From<BuilderSettings> for BuilderOptions {
    fn from(settings: BuilderSettings) -> Self {
        Self::from_settings(settings)
    }
}
