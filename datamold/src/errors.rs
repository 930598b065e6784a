//! Error types for contract instantiation.
//!
//! Every failure surfaced by the factory is a [`BuilderError`]. Errors carry
//! the contract name and, where one is involved, the field name and the type
//! of the offending source value.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::contract::FieldType;
use crate::sources::SourceKind;

/// Result alias used across the crate.
pub type Result<T, E = BuilderError> = std::result::Result<T, E>;

/// The main error type for datamold operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuilderError {
    /// The contract does not describe a valid field set.
    #[error("Invalid contract '{contract}': {reason}")]
    InvalidContract {
        /// The contract name.
        contract: String,
        /// Why the contract was rejected.
        reason: String,
    },

    /// A field has no matching source data and strict missing-field
    /// handling is enabled.
    #[error("Missing source field '{field}' for contract '{contract}' ({source_kind} source)")]
    MissingSourceField {
        /// The contract name.
        contract: String,
        /// The field with no source data.
        field: String,
        /// The shape of the source that was searched.
        source_kind: SourceKind,
    },

    /// A located source value cannot satisfy the field's declared type.
    #[error("Incompatible type for field '{field}' of contract '{contract}': expected {expected}, found {found}")]
    IncompatibleType {
        /// The contract name.
        contract: String,
        /// The target field.
        field: String,
        /// The declared field type.
        expected: FieldType,
        /// Type name of the offending source value.
        found: String,
    },

    /// A source adapter's own preconditions were violated.
    #[error("Extraction from {source_kind} source failed for contract '{contract}': {reason}")]
    Extraction {
        /// The contract name.
        contract: String,
        /// The source shape.
        source_kind: SourceKind,
        /// What went wrong.
        reason: String,
    },

    /// An internal invariant of the contract machinery does not hold.
    #[error("Contract violation in '{contract}': {reason}")]
    ContractViolation {
        /// The contract name.
        contract: String,
        /// The field involved, if any.
        field: Option<String>,
        /// What went wrong.
        reason: String,
    },

    /// Builder settings could not be loaded.
    #[error("Invalid builder configuration: {0}")]
    Configuration(String),
}

impl BuilderError {
    /// Creates an invalid contract error.
    #[must_use]
    pub fn invalid_contract(contract: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidContract {
            contract: contract.into(),
            reason: reason.into(),
        }
    }

    /// Creates a missing source field error.
    #[must_use]
    pub fn missing_field(
        contract: impl Into<String>,
        field: impl Into<String>,
        source_kind: SourceKind,
    ) -> Self {
        Self::MissingSourceField {
            contract: contract.into(),
            field: field.into(),
            source_kind,
        }
    }

    /// Creates an incompatible type error.
    #[must_use]
    pub fn incompatible_type(
        contract: impl Into<String>,
        field: impl Into<String>,
        expected: FieldType,
        found: impl Into<String>,
    ) -> Self {
        Self::IncompatibleType {
            contract: contract.into(),
            field: field.into(),
            expected,
            found: found.into(),
        }
    }

    /// Creates an extraction error.
    #[must_use]
    pub fn extraction(
        contract: impl Into<String>,
        source_kind: SourceKind,
        reason: impl Into<String>,
    ) -> Self {
        Self::Extraction {
            contract: contract.into(),
            source_kind,
            reason: reason.into(),
        }
    }

    /// Creates a contract violation error.
    #[must_use]
    pub fn contract_violation(contract: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ContractViolation {
            contract: contract.into(),
            field: None,
            reason: reason.into(),
        }
    }

    /// Creates a contract violation error tied to one field.
    #[must_use]
    pub fn field_violation(
        contract: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ContractViolation {
            contract: contract.into(),
            field: Some(field.into()),
            reason: reason.into(),
        }
    }

    /// Stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidContract { .. } => "BUILDER-001-INVALID_CONTRACT",
            Self::MissingSourceField { .. } => "BUILDER-002-MISSING_FIELD",
            Self::IncompatibleType { .. } => "BUILDER-003-INCOMPATIBLE_TYPE",
            Self::Extraction { .. } => "BUILDER-004-EXTRACTION",
            Self::ContractViolation { .. } => "BUILDER-005-CONTRACT_VIOLATION",
            Self::Configuration(_) => "BUILDER-006-CONFIGURATION",
        }
    }

    /// The contract the error refers to, if any.
    #[must_use]
    pub fn contract(&self) -> Option<&str> {
        match self {
            Self::InvalidContract { contract, .. }
            | Self::MissingSourceField { contract, .. }
            | Self::IncompatibleType { contract, .. }
            | Self::Extraction { contract, .. }
            | Self::ContractViolation { contract, .. } => Some(contract),
            Self::Configuration(_) => None,
        }
    }

    /// The field the error refers to, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingSourceField { field, .. } | Self::IncompatibleType { field, .. } => {
                Some(field)
            }
            Self::ContractViolation { field, .. } => field.as_deref(),
            _ => None,
        }
    }

    /// A hint for fixing the error.
    #[must_use]
    pub fn fix_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidContract { .. } => Some(
                "Declare at least one field, use identifier-style field names \
                 and keep names unique within the contract.",
            ),
            Self::MissingSourceField { .. } => Some(
                "Add the field to the source, map it with a source-name override, \
                 or disable fail_on_missing_field.",
            ),
            Self::IncompatibleType { .. } => Some(
                "Convert the source value before building, use a value transform, \
                 or disable fail_on_incompatible_type.",
            ),
            Self::Extraction { .. } | Self::ContractViolation { .. } | Self::Configuration(_) => {
                None
            }
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("code".to_string(), serde_json::json!(self.code()));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));

        if let Some(contract) = self.contract() {
            map.insert("contract".to_string(), serde_json::json!(contract));
        }
        if let Some(field) = self.field() {
            map.insert("field".to_string(), serde_json::json!(field));
        }
        match self {
            Self::MissingSourceField { source_kind, .. } | Self::Extraction { source_kind, .. } => {
                map.insert("source_kind".to_string(), serde_json::json!(source_kind));
            }
            Self::IncompatibleType {
                expected, found, ..
            } => {
                map.insert("expected".to_string(), serde_json::json!(expected.to_string()));
                map.insert("found".to_string(), serde_json::json!(found));
            }
            _ => {}
        }
        if let Some(hint) = self.fix_hint() {
            map.insert("fix_hint".to_string(), serde_json::json!(hint));
        }

        map
    }
}

/// Serializable snapshot of an error, for logs and reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Error code.
    pub code: String,
    /// Rendered message.
    pub message: String,
    /// Contract name, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract: Option<String>,
    /// Field name, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl From<&BuilderError> for ErrorReport {
    fn from(err: &BuilderError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            contract: err.contract().map(String::from),
            field: err.field().map(String::from),
        }
    }
}
