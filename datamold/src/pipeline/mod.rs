//! The value pipeline between source adapters and instance builders.

mod canonical;
mod compat;
mod transform;

pub use canonical::CanonicalFieldMap;
pub use compat::TypePolicy;
pub use transform::{apply_transform, ValueTransform};
