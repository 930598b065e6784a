//! Contract declarations and the registry of their materialization strategies.
//!
//! This module provides:
//! - Field descriptors and type tags
//! - Static contracts (`Contract` trait, `contract!` macro)
//! - Runtime schemas and `DynamicObject` instances
//! - The process-wide contract registry

mod definition;
mod field;
mod macros;
mod plan;
mod registry;
mod schema;

pub use definition::{Contract, ContractDefinition};
pub use field::{value_type_name, FieldDescriptor, FieldType, FieldValue};
pub use plan::{Constructor, ContractKey, ContractPlan, RejectedValue, Setter};
pub use registry::{global_registry, ContractInfo, ContractRegistry, REGISTRY};
pub use schema::{ContractSchema, DynamicObject};
