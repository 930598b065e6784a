//! Field descriptors and the type tags they carry.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;

static FIELD_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("field name regex"));

/// Declared type of a contract field.
///
/// Types describe what a field will accept when a value is assigned to it.
/// Only `Any` and `Optional` accept `null`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Any JSON-like value, including `null`.
    Any,
    /// A boolean.
    Bool,
    /// A signed or unsigned integer.
    Int,
    /// Any number. Integers widen to floats.
    Float,
    /// A string.
    String,
    /// A homogeneous list.
    List(Box<FieldType>),
    /// A nested object / document.
    Object,
    /// The inner type or `null`.
    Optional(Box<FieldType>),
}

impl FieldType {
    /// Creates a list type.
    #[must_use]
    pub fn list(inner: FieldType) -> Self {
        Self::List(Box::new(inner))
    }

    /// Creates an optional type.
    #[must_use]
    pub fn optional(inner: FieldType) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// True when `null` is an acceptable value.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Any | Self::Optional(_))
    }

    /// Returns true if `value` can be assigned to a field of this type.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::Optional(inner) => value.is_null() || inner.accepts(value),
            Self::Bool => value.is_boolean(),
            Self::Int => value.is_i64() || value.is_u64(),
            Self::Float => value.is_number(),
            Self::String => value.is_string(),
            Self::List(inner) => value
                .as_array()
                .is_some_and(|items| items.iter().all(|item| inner.accepts(item))),
            Self::Object => value.is_object(),
        }
    }

    /// The value an unassigned field of this type holds.
    #[must_use]
    pub fn default_value(&self) -> Value {
        match self {
            Self::Any | Self::Optional(_) => Value::Null,
            Self::Bool => Value::Bool(false),
            Self::Int => Value::from(0),
            Self::Float => Value::from(0.0),
            Self::String => Value::String(String::new()),
            Self::List(_) => Value::Array(Vec::new()),
            Self::Object => Value::Object(serde_json::Map::new()),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::String => write!(f, "string"),
            Self::List(inner) => write!(f, "list<{inner}>"),
            Self::Object => write!(f, "object"),
            Self::Optional(inner) => write!(f, "optional<{inner}>"),
        }
    }
}

/// Short type name of a runtime value, used in diagnostics.
#[must_use]
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Metadata for one contract field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name, unique within its contract.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub declared_type: FieldType,
    /// Whether the field may be written after construction.
    #[serde(default = "default_writable")]
    pub is_writable: bool,
    /// Whether every instance must have this field assigned.
    #[serde(default)]
    pub required: bool,
}

fn default_writable() -> bool {
    true
}

impl FieldDescriptor {
    /// Creates a writable, non-required descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, declared_type: FieldType) -> Self {
        Self {
            name: name.into(),
            declared_type,
            is_writable: true,
            required: false,
        }
    }

    /// Marks the field as read-only once constructed.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.is_writable = false;
        self
    }

    /// Marks the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Checks that a field name is a plain identifier.
pub(crate) fn validate_field_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("field name must not be empty".to_string());
    }
    if !FIELD_NAME.is_match(name) {
        return Err(format!("field name '{name}' is not a valid identifier"));
    }
    Ok(())
}

/// Checks a whole descriptor list: non-empty, valid and unique names.
pub(crate) fn validate_fields(fields: &[FieldDescriptor]) -> Result<(), String> {
    if fields.is_empty() {
        return Err("contract declares no fields".to_string());
    }
    for (index, field) in fields.iter().enumerate() {
        validate_field_name(&field.name)?;
        if fields[..index].iter().any(|earlier| earlier.name == field.name) {
            return Err(format!("field '{}' is declared more than once", field.name));
        }
    }
    Ok(())
}

/// A Rust type that can be stored in a contract field.
///
/// `from_value` returns `None` when the value does not fit.
pub trait FieldValue: Sized {
    /// The type tag for this Rust type.
    fn field_type() -> FieldType;

    /// Converts a runtime value into this type.
    fn from_value(value: Value) -> Option<Self>;
}

impl FieldValue for String {
    fn field_type() -> FieldType {
        FieldType::String
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl FieldValue for bool {
    fn field_type() -> FieldType {
        FieldType::Bool
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_bool()
    }
}

macro_rules! int_field_value {
    ($($ty:ty),+) => {
        $(
            impl FieldValue for $ty {
                fn field_type() -> FieldType {
                    FieldType::Int
                }

                fn from_value(value: Value) -> Option<Self> {
                    if let Some(n) = value.as_i64() {
                        return <$ty>::try_from(n).ok();
                    }
                    value.as_u64().and_then(|n| <$ty>::try_from(n).ok())
                }
            }
        )+
    };
}

int_field_value!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl FieldValue for f64 {
    fn field_type() -> FieldType {
        FieldType::Float
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FieldValue for f32 {
    fn field_type() -> FieldType {
        FieldType::Float
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_value(value: Value) -> Option<Self> {
        value
            .as_f64()
            .map(|n| n as f32)
            .filter(|n| n.is_finite())
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn field_type() -> FieldType {
        FieldType::optional(T::field_type())
    }

    fn from_value(value: Value) -> Option<Self> {
        if value.is_null() {
            return Some(None);
        }
        T::from_value(value).map(Some)
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn field_type() -> FieldType {
        FieldType::list(T::field_type())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Array(items) => items.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

impl FieldValue for Value {
    fn field_type() -> FieldType {
        FieldType::Any
    }

    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl FieldValue for serde_json::Map<String, Value> {
    fn field_type() -> FieldType {
        FieldType::Object
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts_scalars() {
        assert!(FieldType::String.accepts(&json!("x")));
        assert!(!FieldType::String.accepts(&json!(1)));
        assert!(FieldType::Int.accepts(&json!(-3)));
        assert!(!FieldType::Int.accepts(&json!(1.5)));
        assert!(FieldType::Float.accepts(&json!(2)));
        assert!(FieldType::Bool.accepts(&json!(true)));
        assert!(FieldType::Any.accepts(&Value::Null));
    }

    #[test]
    fn test_accepts_null_only_when_nullable() {
        assert!(!FieldType::String.accepts(&Value::Null));
        assert!(FieldType::optional(FieldType::String).accepts(&Value::Null));
        assert!(FieldType::optional(FieldType::String).accepts(&json!("a")));
        assert!(!FieldType::optional(FieldType::String).accepts(&json!(1)));
    }

    #[test]
    fn test_accepts_list_elements() {
        let ty = FieldType::list(FieldType::Int);
        assert!(ty.accepts(&json!([1, 2, 3])));
        assert!(!ty.accepts(&json!([1, "two"])));
        assert!(!ty.accepts(&json!({"a": 1})));
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldType::list(FieldType::String).to_string(), "list<string>");
        assert_eq!(
            FieldType::optional(FieldType::Int).to_string(),
            "optional<int>"
        );
    }

    #[test]
    fn test_default_values() {
        assert_eq!(FieldType::String.default_value(), json!(""));
        assert_eq!(FieldType::Int.default_value(), json!(0));
        assert_eq!(FieldType::optional(FieldType::Int).default_value(), Value::Null);
        assert_eq!(FieldType::list(FieldType::Int).default_value(), json!([]));
    }

    #[test]
    fn test_validate_fields() {
        let ok = vec![
            FieldDescriptor::new("FirstName", FieldType::String),
            FieldDescriptor::new("age", FieldType::Int),
        ];
        assert!(validate_fields(&ok).is_ok());

        let dup = vec![
            FieldDescriptor::new("Name", FieldType::String),
            FieldDescriptor::new("Name", FieldType::Int),
        ];
        assert!(validate_fields(&dup).unwrap_err().contains("more than once"));

        let bad = vec![FieldDescriptor::new("first name", FieldType::String)];
        assert!(validate_fields(&bad).is_err());

        assert!(validate_fields(&[]).is_err());
    }

    #[test]
    fn test_field_value_conversions() {
        assert_eq!(String::from_value(json!("a")), Some("a".to_string()));
        assert_eq!(i32::from_value(json!(7)), Some(7));
        assert_eq!(u8::from_value(json!(300)), None);
        assert_eq!(u8::from_value(json!(-1)), None);
        assert_eq!(Option::<String>::from_value(Value::Null), Some(None));
        assert_eq!(Vec::<i64>::from_value(json!([1, 2])), Some(vec![1, 2]));
        assert_eq!(Vec::<i64>::from_value(json!([1, "x"])), None);
        assert_eq!(f32::from_value(json!(1.5)), Some(1.5));
        assert_eq!(f32::from_value(json!(1e300)), None);
        assert_eq!(f32::from_value(json!(-1e300)), None);
        assert_eq!(<Option<i64>>::field_type(), FieldType::optional(FieldType::Int));
    }

    #[test]
    fn test_descriptor_serde() {
        let field: FieldDescriptor =
            serde_json::from_value(json!({"name": "Tags", "type": {"list": "string"}})).unwrap();
        assert_eq!(field.declared_type, FieldType::list(FieldType::String));
        assert!(field.is_writable);
        assert!(!field.required);
    }
}
