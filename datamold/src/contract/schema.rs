//! Runtime-declared contracts and the generic instances they produce.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use super::field::{validate_fields, FieldDescriptor, FieldType, FieldValue};
use super::plan::{Constructor, ContractKey, ContractPlan, RejectedValue, Setter};
use crate::errors::{BuilderError, Result};

/// A contract declared at runtime, for example from a JSON document.
///
/// ```json
/// {
///   "name": "Person",
///   "fields": [
///     {"name": "FirstName", "type": "string", "required": true},
///     {"name": "Tags", "type": {"list": "string"}}
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSchema {
    /// Contract name; also the registry key.
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
}

impl ContractSchema {
    /// Starts an empty schema.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a writable field.
    #[must_use]
    pub fn field(self, name: impl Into<String>, declared_type: FieldType) -> Self {
        self.with_field(FieldDescriptor::new(name, declared_type))
    }

    /// Adds a required field.
    #[must_use]
    pub fn required_field(self, name: impl Into<String>, declared_type: FieldType) -> Self {
        self.with_field(FieldDescriptor::new(name, declared_type).required())
    }

    /// Adds a read-only field.
    #[must_use]
    pub fn read_only_field(self, name: impl Into<String>, declared_type: FieldType) -> Self {
        self.with_field(FieldDescriptor::new(name, declared_type).read_only())
    }

    /// Adds a prepared descriptor.
    #[must_use]
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Parses and validates a schema from JSON.
    pub fn from_json(value: Value) -> Result<Self> {
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("<unnamed>")
            .to_string();
        let schema: Self = serde_json::from_value(value)
            .map_err(|e| BuilderError::invalid_contract(name, e.to_string()))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Parses and validates a schema from a JSON string.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| BuilderError::invalid_contract("<unparsed>", e.to_string()))?;
        Self::from_json(value)
    }

    /// Checks the schema describes a valid field set.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(BuilderError::invalid_contract(
                &self.name,
                "contract name must not be empty",
            ));
        }
        validate_fields(&self.fields)
            .map_err(|reason| BuilderError::invalid_contract(&self.name, reason))
    }

    /// SHA-256 over the canonical JSON of the field list.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.fields)
    }

    /// Builds the materialization strategy for this schema.
    pub(crate) fn plan(&self) -> Result<ContractPlan<DynamicObject>> {
        self.validate()?;

        let fields: Arc<[FieldDescriptor]> = self.fields.clone().into();
        let setters: Vec<Setter<DynamicObject>> = fields
            .iter()
            .enumerate()
            .map(|(slot, field)| {
                let declared = field.declared_type.clone();
                let setter: Setter<DynamicObject> =
                    Box::new(move |target: &mut DynamicObject, value: Value| {
                        if !declared.accepts(&value) {
                            return Err(RejectedValue::of(&value));
                        }
                        if let Some((_, current)) = target.values.get_index_mut(slot) {
                            *current = value;
                        }
                        Ok(())
                    });
                setter
            })
            .collect();

        let contract = self.name.clone();
        let blank_fields = Arc::clone(&fields);
        let constructor: Constructor<DynamicObject> =
            Box::new(move || DynamicObject::blank(&contract, Arc::clone(&blank_fields)));

        Ok(ContractPlan::new(
            ContractKey::schema(&self.name),
            fields,
            setters,
            constructor,
        ))
    }
}

pub(crate) fn fingerprint(fields: &[FieldDescriptor]) -> String {
    let canonical = serde_json::to_vec(fields).unwrap_or_default();
    hex::encode(Sha256::digest(&canonical))
}

/// Generic contract instance keyed by field name.
///
/// Holds exactly the declared fields of its schema, keyed by name in
/// declaration order. Unassigned fields hold their type's default value.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicObject {
    contract: String,
    fields: Arc<[FieldDescriptor]>,
    values: IndexMap<String, Value>,
}

impl DynamicObject {
    fn blank(contract: &str, fields: Arc<[FieldDescriptor]>) -> Self {
        let values = fields
            .iter()
            .map(|field| (field.name.clone(), field.declared_type.default_value()))
            .collect();
        Self {
            contract: contract.to_string(),
            fields,
            values,
        }
    }

    /// The contract this instance satisfies.
    #[must_use]
    pub fn contract_name(&self) -> &str {
        &self.contract
    }

    /// Field descriptors in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Value of a declared field. `None` for undeclared names.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Value of a declared field converted to a Rust type.
    #[must_use]
    pub fn get_as<V: FieldValue>(&self, name: &str) -> Option<V> {
        self.get(name).cloned().and_then(V::from_value)
    }

    /// Shorthand for string fields.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Updates a writable field.
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        let Some(slot) = self.values.get_index_of(name) else {
            return Err(BuilderError::field_violation(
                &self.contract,
                name,
                "field is not declared",
            ));
        };
        let field = &self.fields[slot];
        if !field.is_writable {
            return Err(BuilderError::field_violation(
                &self.contract,
                name,
                "field is read-only",
            ));
        }
        if !field.declared_type.accepts(&value) {
            return Err(BuilderError::incompatible_type(
                &self.contract,
                name,
                field.declared_type.clone(),
                RejectedValue::of(&value).found,
            ));
        }
        if let Some((_, current)) = self.values.get_index_mut(slot) {
            *current = value;
        }
        Ok(())
    }

    /// Iterates over `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Converts to a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        )
    }
}

impl Serialize for DynamicObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}
