//! # Datamold
//!
//! A contract instantiation engine.
//!
//! A *contract* is an ordered, named, typed set of fields. Datamold builds
//! instances of a contract from differently shaped sources without a
//! hand-written conversion per shape:
//!
//! - **Maps**: `HashMap`, `BTreeMap` or `serde_json::Map` keyed by field name
//! - **Tuples**: positional values, optionally named by an element-name table
//! - **Objects**: anything `Serialize`, or a custom [`sources::PropertySource`]
//! - **Documents**: parsed trees, with values coerced to the declared types
//!
//! The materialization strategy for each contract is built once, cached in a
//! process-wide registry and shared by every factory.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use datamold::prelude::*;
//!
//! datamold::contract! {
//!     pub struct Person {
//!         pub first_name: String => "FirstName",
//!         pub last_name: String => "LastName",
//!         pub gender: String => "Gender",
//!     }
//! }
//!
//! let factory = BuilderFactory::new().with_options(BuilderOptions::strict());
//! let from_tuple: Person = factory.create(("Riccardo", "Marzi", "Male"))?;
//! let from_json: Person = factory.create(&serde_json::json!({
//!     "FirstName": "Riccardo",
//!     "LastName": "Marzi",
//!     "Gender": "Male",
//! }))?;
//! assert_eq!(from_tuple, from_json);
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod builder;
pub mod contract;
pub mod errors;
pub mod pipeline;
pub mod sources;
pub mod testing;

pub use serde_json::Value;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::builder::{
        default_factory, BuilderFactory, BuilderOptions, BuilderSettings, InstanceBuilder,
        TypedFactory,
    };
    pub use crate::contract::{
        global_registry, Contract, ContractDefinition, ContractInfo, ContractKey,
        ContractRegistry, ContractSchema, DynamicObject, FieldDescriptor, FieldType, FieldValue,
    };
    pub use crate::errors::{BuilderError, ErrorReport, Result};
    pub use crate::pipeline::{CanonicalFieldMap, TypePolicy, ValueTransform};
    pub use crate::sources::{
        DocumentNode, MapSource, ObjectSource, PropertySource, Source, SourceKind,
    };
}
