//! Builder factory, instance builder and their configuration.

mod factory;
mod instance;
mod options;

#[cfg(test)]
mod property_tests;

pub use factory::{default_factory, BuilderFactory, TypedFactory};
pub use instance::InstanceBuilder;
pub use options::{BuilderOptions, BuilderSettings};
