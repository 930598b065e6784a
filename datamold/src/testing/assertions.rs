//! Test assertions for builder results.

use serde_json::Value;

use crate::contract::DynamicObject;
use crate::errors::BuilderError;

/// Asserts that `err` reports a missing source field called `field`.
pub fn assert_missing_field(err: &BuilderError, field: &str) {
    assert!(
        matches!(err, BuilderError::MissingSourceField { .. }),
        "Expected a missing source field error, got: {err}"
    );
    assert_eq!(err.field(), Some(field), "Unexpected field in: {err}");
}

/// Asserts that `err` reports an incompatible value for `field`.
pub fn assert_incompatible_type(err: &BuilderError, field: &str) {
    assert!(
        matches!(err, BuilderError::IncompatibleType { .. }),
        "Expected an incompatible type error, got: {err}"
    );
    assert_eq!(err.field(), Some(field), "Unexpected field in: {err}");
}

/// Asserts that `err` is a contract violation.
pub fn assert_contract_violation(err: &BuilderError) {
    assert!(
        matches!(err, BuilderError::ContractViolation { .. }),
        "Expected a contract violation, got: {err}"
    );
}

/// Asserts that a dynamic instance holds `expected` under `field`.
pub fn assert_dynamic_field(object: &DynamicObject, field: &str, expected: &Value) {
    let actual = object.get(field);
    assert_eq!(
        actual,
        Some(expected),
        "Expected value {:?} for field '{}' of '{}', got {:?}",
        expected,
        field,
        object.contract_name(),
        actual
    );
}
