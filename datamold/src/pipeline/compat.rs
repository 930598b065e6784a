//! Missing-field and incompatible-type policy.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::contract::{value_type_name, FieldDescriptor};
use crate::errors::{BuilderError, Result};
use crate::sources::SourceKind;

/// What to do when a field has no source data or the data does not fit.
///
/// Both flags default to `false`: the field is skipped and keeps its
/// default value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypePolicy {
    /// Raise [`BuilderError::MissingSourceField`] instead of skipping.
    pub fail_on_missing_field: bool,
    /// Raise [`BuilderError::IncompatibleType`] instead of skipping.
    pub fail_on_incompatible_type: bool,
}

impl TypePolicy {
    /// Skip everything.
    #[must_use]
    pub const fn lenient() -> Self {
        Self {
            fail_on_missing_field: false,
            fail_on_incompatible_type: false,
        }
    }

    /// Fail on everything.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            fail_on_missing_field: true,
            fail_on_incompatible_type: true,
        }
    }

    /// Sets missing-field handling.
    #[must_use]
    pub const fn with_missing(mut self, fail: bool) -> Self {
        self.fail_on_missing_field = fail;
        self
    }

    /// Sets incompatible-type handling.
    #[must_use]
    pub const fn with_incompatible(mut self, fail: bool) -> Self {
        self.fail_on_incompatible_type = fail;
        self
    }

    /// Handles a field with no source data. `Ok(())` means skip it.
    pub fn on_missing(&self, contract: &str, field: &str, source_kind: SourceKind) -> Result<()> {
        if self.fail_on_missing_field {
            return Err(BuilderError::missing_field(contract, field, source_kind));
        }
        debug!(contract, field, source = %source_kind, "Skipping missing source field");
        Ok(())
    }

    /// Handles a value the field cannot hold. `Ok(())` means skip it.
    pub fn on_incompatible(
        &self,
        contract: &str,
        field: &FieldDescriptor,
        found: &str,
    ) -> Result<()> {
        if self.fail_on_incompatible_type {
            return Err(BuilderError::incompatible_type(
                contract,
                &field.name,
                field.declared_type.clone(),
                found,
            ));
        }
        debug!(
            contract,
            field = %field.name,
            expected = %field.declared_type,
            found,
            "Skipping incompatible source value"
        );
        Ok(())
    }

    /// Returns `Some(value)` if the field accepts it, `None` if it should be
    /// skipped, or an error under strict handling.
    pub fn check(
        &self,
        contract: &str,
        field: &FieldDescriptor,
        value: Value,
    ) -> Result<Option<Value>> {
        if field.declared_type.accepts(&value) {
            return Ok(Some(value));
        }
        self.on_incompatible(contract, field, value_type_name(&value))?;
        Ok(None)
    }
}
