//! Testing utilities for datamold contracts.
//!
//! This module provides:
//! - Person fixtures in every source shape
//! - Assertions for builder errors and dynamic instances
//! - Tracing setup for tests

mod assertions;
mod fixtures;

pub use assertions::{
    assert_contract_violation, assert_dynamic_field, assert_incompatible_type,
    assert_missing_field,
};
pub use fixtures::{
    init_test_tracing, person_document, person_map, person_object, person_schema, person_tuple,
    Person,
};
