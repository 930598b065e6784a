//! Static contract declarations.

use serde_json::Value;
use std::sync::Arc;

use super::field::{validate_fields, FieldDescriptor, FieldValue};
use super::plan::{ContractKey, ContractPlan, RejectedValue, Setter};
use crate::errors::{BuilderError, Result};

/// A Rust type that can be produced by a [`BuilderFactory`](crate::builder::BuilderFactory).
///
/// Implementors list their fields once; the registry turns the declaration
/// into a cached [`ContractPlan`]. Unassigned fields keep their
/// `Default` value.
///
/// ```rust,ignore
/// #[derive(Debug, Default)]
/// struct Person {
///     first_name: String,
///     age: Option<u32>,
/// }
///
/// impl Contract for Person {
///     fn define(definition: ContractDefinition<Self>) -> ContractDefinition<Self> {
///         definition
///             .field("FirstName", |p: &mut Self, v: String| p.first_name = v)
///             .field("Age", |p: &mut Self, v: Option<u32>| p.age = v)
///     }
/// }
/// ```
pub trait Contract: Default + Send + Sync + 'static {
    /// Declares the contract's fields in order.
    fn define(definition: ContractDefinition<Self>) -> ContractDefinition<Self>;

    /// Name used in diagnostics.
    fn contract_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Field list and setter table under construction for one contract.
pub struct ContractDefinition<T> {
    name: String,
    fields: Vec<FieldDescriptor>,
    setters: Vec<Setter<T>>,
}

impl<T: 'static> ContractDefinition<T> {
    /// Starts an empty definition.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            setters: Vec::new(),
        }
    }

    /// Declares a writable field.
    #[must_use]
    pub fn field<V, F>(self, name: &str, set: F) -> Self
    where
        V: FieldValue + 'static,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.declare(FieldDescriptor::new(name, V::field_type()), set)
    }

    /// Declares a field every instance must have assigned.
    #[must_use]
    pub fn required_field<V, F>(self, name: &str, set: F) -> Self
    where
        V: FieldValue + 'static,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.declare(FieldDescriptor::new(name, V::field_type()).required(), set)
    }

    /// Declares a field that is only populated at construction.
    #[must_use]
    pub fn read_only_field<V, F>(self, name: &str, set: F) -> Self
    where
        V: FieldValue + 'static,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.declare(FieldDescriptor::new(name, V::field_type()).read_only(), set)
    }

    fn declare<V, F>(mut self, descriptor: FieldDescriptor, set: F) -> Self
    where
        V: FieldValue + 'static,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let setter: Setter<T> = Box::new(move |target: &mut T, value: Value| {
            let rejected = RejectedValue::of(&value);
            let converted = V::from_value(value).ok_or(rejected)?;
            set(target, converted);
            Ok(())
        });
        self.fields.push(descriptor);
        self.setters.push(setter);
        self
    }

    /// The contract name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields declared so far.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}

impl<T: Contract> ContractDefinition<T> {
    /// Runs `T::define` and validates the result into a plan.
    pub(crate) fn plan_for() -> Result<ContractPlan<T>> {
        let definition = T::define(Self::new(T::contract_name()));
        definition.build(ContractKey::of::<T>())
    }

    fn build(self, key: ContractKey) -> Result<ContractPlan<T>> {
        validate_fields(&self.fields)
            .map_err(|reason| BuilderError::invalid_contract(&self.name, reason))?;
        let fields: Arc<[FieldDescriptor]> = self.fields.into();
        Ok(ContractPlan::new(key, fields, self.setters, Box::new(T::default)))
    }
}

impl<T> std::fmt::Debug for ContractDefinition<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractDefinition")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}
