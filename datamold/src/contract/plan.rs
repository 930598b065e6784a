//! Cached materialization strategies.

use serde_json::Value;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::field::{value_type_name, FieldDescriptor};

/// Stable identity of a contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContractKey {
    /// A Rust type implementing [`Contract`](super::Contract).
    Type {
        /// The type's id.
        id: TypeId,
        /// The contract name, for diagnostics.
        name: &'static str,
    },
    /// A runtime schema, keyed by its name.
    Schema(String),
}

impl ContractKey {
    /// Key for a static contract type.
    #[must_use]
    pub fn of<T: super::Contract>() -> Self {
        Self::Type {
            id: TypeId::of::<T>(),
            name: T::contract_name(),
        }
    }

    /// Key for a runtime schema.
    #[must_use]
    pub fn schema(name: impl Into<String>) -> Self {
        Self::Schema(name.into())
    }

    /// The contract name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Type { name, .. } => name,
            Self::Schema(name) => name,
        }
    }
}

impl fmt::Display for ContractKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Writes one field of an instance. Returns the rejected value's type name
/// when the value does not fit the field.
pub type Setter<T> = Box<dyn Fn(&mut T, Value) -> Result<(), RejectedValue> + Send + Sync>;

/// Constructs a blank instance.
pub type Constructor<T> = Box<dyn Fn() -> T + Send + Sync>;

/// A value a setter refused to store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectedValue {
    /// Type name of the refused value.
    pub found: &'static str,
}

impl RejectedValue {
    /// Records the type of `value`.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        Self {
            found: value_type_name(value),
        }
    }
}

/// Materialization strategy for one contract.
///
/// Holds the contract's field layout, a constructor for blank instances and
/// one setter per field. Built once per contract and shared.
pub struct ContractPlan<T> {
    key: ContractKey,
    fields: Arc<[FieldDescriptor]>,
    slots: HashMap<String, usize>,
    setters: Vec<Setter<T>>,
    constructor: Constructor<T>,
}

impl<T> ContractPlan<T> {
    /// Assembles a plan. `setters[i]` writes `fields[i]`.
    pub(crate) fn new(
        key: ContractKey,
        fields: Arc<[FieldDescriptor]>,
        setters: Vec<Setter<T>>,
        constructor: Constructor<T>,
    ) -> Self {
        debug_assert_eq!(fields.len(), setters.len());
        let slots = fields
            .iter()
            .enumerate()
            .map(|(slot, field)| (field.name.clone(), slot))
            .collect();

        Self {
            key,
            fields,
            slots,
            setters,
            constructor,
        }
    }

    /// The contract key.
    #[must_use]
    pub fn key(&self) -> &ContractKey {
        &self.key
    }

    /// The contract name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.key.name()
    }

    /// Field descriptors in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Shared handle to the field descriptors.
    #[must_use]
    pub fn shared_fields(&self) -> Arc<[FieldDescriptor]> {
        Arc::clone(&self.fields)
    }

    /// Slot index of a declared field.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<usize> {
        self.slots.get(name).copied()
    }

    /// Descriptor of a declared field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.slot(name).map(|slot| &self.fields[slot])
    }

    /// Creates a blank instance.
    #[must_use]
    pub fn instantiate(&self) -> T {
        (self.constructor)()
    }

    /// Writes `value` into the field at `slot`.
    pub fn assign(&self, target: &mut T, slot: usize, value: Value) -> Result<(), RejectedValue> {
        match self.setters.get(slot) {
            Some(setter) => setter(target, value),
            None => Err(RejectedValue::of(&value)),
        }
    }
}

impl<T> fmt::Debug for ContractPlan<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractPlan")
            .field("key", &self.key)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}
