//! Positional tuple sources.

use serde_json::Value;

use super::{ExtractContext, SourceKind};
use crate::errors::{BuilderError, Result};
use crate::pipeline::CanonicalFieldMap;

/// Matches each field to a tuple element.
///
/// A field named in the element-name table reads the element at that
/// position; any other field reads the element at its declaration index.
/// A `null` or absent element for a non-nullable field is always an
/// incompatible type.
pub(super) fn extract(elements: &[Value], ctx: &ExtractContext<'_>) -> Result<CanonicalFieldMap> {
    if let Some(names) = ctx.element_names {
        if names.len() > elements.len() {
            return Err(BuilderError::extraction(
                ctx.contract,
                SourceKind::Tuple,
                format!(
                    "{} element names given for a tuple of arity {}",
                    names.len(),
                    elements.len()
                ),
            ));
        }
    }

    let mut out = CanonicalFieldMap::with_capacity(ctx.fields.len());
    for (declared, field) in ctx.fields.iter().enumerate() {
        let source_name = ctx.source_name(field);
        let index = ctx
            .element_names
            .and_then(|names| names.iter().position(|name| name == source_name))
            .unwrap_or(declared);

        let Some(value) = elements.get(index) else {
            if !field.declared_type.is_nullable() {
                return Err(BuilderError::incompatible_type(
                    ctx.contract,
                    &field.name,
                    field.declared_type.clone(),
                    "absent",
                ));
            }
            ctx.policy.on_missing(ctx.contract, &field.name, SourceKind::Tuple)?;
            continue;
        };

        if value.is_null() && !field.declared_type.is_nullable() {
            return Err(BuilderError::incompatible_type(
                ctx.contract,
                &field.name,
                field.declared_type.clone(),
                "null",
            ));
        }

        if let Some(value) = ctx.policy.check(ctx.contract, field, value.clone())? {
            out.insert(field.name.as_str(), value);
        }
    }
    Ok(out)
}
