//! Parsed document sources.

use serde_json::Value;

use super::{ExtractContext, SourceKind};
use crate::contract::{value_type_name, FieldType};
use crate::errors::{BuilderError, Result};
use crate::pipeline::CanonicalFieldMap;

/// A node of a parsed document tree.
///
/// Containers have named children. Any node can be coerced to a
/// [`FieldType`].
pub trait DocumentNode {
    /// True if the node has named children.
    fn is_container(&self) -> bool;

    /// The child called `name`.
    fn child(&self, name: &str) -> Option<&dyn DocumentNode>;

    /// Converts the node to a value of `target`, or `None` if it cannot be.
    fn coerce(&self, target: &FieldType) -> Option<Value>;

    /// Short name of the node's kind, used in diagnostics.
    fn node_kind(&self) -> &'static str;
}

impl DocumentNode for Value {
    fn is_container(&self) -> bool {
        self.is_object()
    }

    fn child(&self, name: &str) -> Option<&dyn DocumentNode> {
        self.as_object()?
            .get(name)
            .map(|child| child as &dyn DocumentNode)
    }

    fn coerce(&self, target: &FieldType) -> Option<Value> {
        coerce_value(self, target)
    }

    fn node_kind(&self) -> &'static str {
        value_type_name(self)
    }
}

/// Converts a JSON value to `target` using canonical parse rules.
///
/// Numeric strings parse, numbers and booleans stringify, `"true"` and
/// `"false"` parse case-insensitively, integral floats narrow to integers
/// and arrays convert element-wise. `null` only converts to `Any` or
/// `Optional`.
#[must_use]
pub fn coerce_value(value: &Value, target: &FieldType) -> Option<Value> {
    match target {
        FieldType::Any => Some(value.clone()),
        FieldType::Optional(inner) => {
            if value.is_null() {
                Some(Value::Null)
            } else {
                coerce_value(value, inner)
            }
        }
        FieldType::String => match value {
            Value::String(_) => Some(value.clone()),
            Value::Number(n) => Some(Value::String(n.to_string())),
            Value::Bool(b) => Some(Value::String(b.to_string())),
            _ => None,
        },
        FieldType::Int => match value {
            Value::Number(n) => n
                .as_i64()
                .map(Value::from)
                .or_else(|| n.as_u64().map(Value::from))
                .or_else(|| n.as_f64().and_then(integral)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .map(Value::from)
                    .or_else(|_| s.parse::<u64>().map(Value::from))
                    .ok()
            }
            _ => None,
        },
        FieldType::Float => match value {
            Value::Number(_) => Some(value.clone()),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Value::from),
            _ => None,
        },
        FieldType::Bool => match value {
            Value::Bool(_) => Some(value.clone()),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(Value::Bool(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(Value::Bool(false)),
            _ => None,
        },
        FieldType::List(inner) => match value {
            Value::Array(items) => items
                .iter()
                .map(|item| coerce_value(item, inner))
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            _ => None,
        },
        FieldType::Object => value.is_object().then(|| value.clone()),
    }
}

#[allow(
    clippy::float_cmp,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
fn integral(f: f64) -> Option<Value> {
    if f.trunc() == f && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(Value::from(f as i64))
    } else {
        None
    }
}

/// Reads each field from the root's child of the same source name.
pub(super) fn extract(
    node: &dyn DocumentNode,
    ctx: &ExtractContext<'_>,
) -> Result<CanonicalFieldMap> {
    if !node.is_container() {
        return Err(BuilderError::extraction(
            ctx.contract,
            SourceKind::Document,
            format!("document root is a {} node, not a container", node.node_kind()),
        ));
    }

    let mut out = CanonicalFieldMap::with_capacity(ctx.fields.len());
    for field in ctx.fields {
        let Some(child) = node.child(ctx.source_name(field)) else {
            ctx.policy.on_missing(ctx.contract, &field.name, SourceKind::Document)?;
            continue;
        };
        match child.coerce(&field.declared_type) {
            Some(value) => out.insert(field.name.as_str(), value),
            None => ctx
                .policy
                .on_incompatible(ctx.contract, field, child.node_kind())?,
        }
    }
    Ok(out)
}
