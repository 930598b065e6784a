//! Shared fixtures: the Riccardo Marzi person in every source shape.

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::contract::{ContractSchema, FieldType};
use crate::sources::ObjectSource;

crate::contract! {
    /// A person with three string fields.
    pub struct Person {
        /// `FirstName`.
        pub first_name: String => "FirstName",
        /// `LastName`.
        pub last_name: String => "LastName",
        /// `Gender`.
        pub gender: String => "Gender",
    }
}

impl Person {
    /// Creates a person.
    #[must_use]
    pub fn new(first_name: &str, last_name: &str, gender: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            gender: gender.to_string(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PersonRecord<'a> {
    first_name: &'a str,
    last_name: &'a str,
    gender: &'a str,
}

/// The person as a map.
#[must_use]
pub fn person_map(first_name: &str, last_name: &str, gender: &str) -> HashMap<String, Value> {
    let mut map = HashMap::new();
    map.insert("FirstName".to_string(), json!(first_name));
    map.insert("LastName".to_string(), json!(last_name));
    map.insert("Gender".to_string(), json!(gender));
    map
}

/// The person as a positional tuple.
#[must_use]
pub fn person_tuple(first_name: &str, last_name: &str, gender: &str) -> Vec<Value> {
    vec![json!(first_name), json!(last_name), json!(gender)]
}

/// The person as a document.
#[must_use]
pub fn person_document(first_name: &str, last_name: &str, gender: &str) -> Value {
    json!({
        "FirstName": first_name,
        "LastName": last_name,
        "Gender": gender,
    })
}

/// The person as a property-bearing object.
pub fn person_object(
    first_name: &str,
    last_name: &str,
    gender: &str,
) -> crate::errors::Result<ObjectSource> {
    ObjectSource::from_serialize(&PersonRecord {
        first_name,
        last_name,
        gender,
    })
}

/// The person contract as a runtime schema.
#[must_use]
pub fn person_schema() -> ContractSchema {
    ContractSchema::new("PersonSchema")
        .field("FirstName", FieldType::String)
        .field("LastName", FieldType::String)
        .field("Gender", FieldType::String)
}

/// Installs a test-writer tracing subscriber filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs it.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
