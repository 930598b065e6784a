//! Source adapters.
//!
//! Every supported source shape is a variant of [`Source`]. [`extract`]
//! dispatches on the variant and turns the source into a
//! [`CanonicalFieldMap`] holding one entry per contract field that had
//! usable data.
//!
//! | Variant | Matches fields by |
//! |---|---|
//! | `Map` | key (source name) |
//! | `Tuple` | element-name table, else declaration index |
//! | `Object` | property name |
//! | `Document` | child node name, with value coercion |

mod document;
mod map;
mod object;
mod tuple;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::contract::FieldDescriptor;
use crate::errors::Result;
use crate::pipeline::{CanonicalFieldMap, TypePolicy};

pub use document::{coerce_value, DocumentNode};
pub use map::MapSource;
pub use object::{ObjectSource, PropertySource};

#[cfg(test)]
pub use object::MockPropertySource;

/// Shape of a source value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// String-keyed map.
    Map,
    /// Fixed-arity positional sequence.
    Tuple,
    /// Property-bearing object.
    Object,
    /// Parsed document tree.
    Document,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Map => "map",
            Self::Tuple => "tuple",
            Self::Object => "object",
            Self::Document => "document",
        })
    }
}

/// A source value to build a contract instance from.
///
/// Build one with the `From` impls:
///
/// ```rust,ignore
/// let from_map = Source::from(&map);
/// let from_tuple = Source::from(("Riccardo", "Marzi", "Male"));
/// let from_document = Source::from(&json);
/// let from_object = Source::from(&ObjectSource::from_serialize(&person)?);
/// ```
pub enum Source<'a> {
    /// A string-keyed map.
    Map(&'a dyn MapSource),
    /// A positional tuple.
    Tuple(Cow<'a, [Value]>),
    /// A property-bearing object.
    Object(&'a dyn PropertySource),
    /// A document node.
    Document(&'a dyn DocumentNode),
}

impl<'a> Source<'a> {
    /// Wraps any map source.
    pub fn map(map: &'a dyn MapSource) -> Self {
        Self::Map(map)
    }

    /// Wraps borrowed tuple elements.
    pub fn tuple(elements: &'a [Value]) -> Self {
        Self::Tuple(Cow::Borrowed(elements))
    }

    /// Wraps any property source.
    pub fn object(object: &'a dyn PropertySource) -> Self {
        Self::Object(object)
    }

    /// Wraps any document node.
    pub fn document(node: &'a dyn DocumentNode) -> Self {
        Self::Document(node)
    }

    /// The source's shape.
    #[must_use]
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Map(_) => SourceKind::Map,
            Self::Tuple(_) => SourceKind::Tuple,
            Self::Object(_) => SourceKind::Object,
            Self::Document(_) => SourceKind::Document,
        }
    }
}

impl fmt::Debug for Source<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tuple(elements) => f.debug_tuple("Tuple").field(elements).finish(),
            other => write!(f, "{:?}(..)", other.kind()),
        }
    }
}

impl<'a> From<&'a HashMap<String, Value>> for Source<'a> {
    fn from(map: &'a HashMap<String, Value>) -> Self {
        Self::Map(map)
    }
}

impl<'a> From<&'a BTreeMap<String, Value>> for Source<'a> {
    fn from(map: &'a BTreeMap<String, Value>) -> Self {
        Self::Map(map)
    }
}

impl<'a> From<&'a serde_json::Map<String, Value>> for Source<'a> {
    fn from(map: &'a serde_json::Map<String, Value>) -> Self {
        Self::Map(map)
    }
}

impl<'a> From<&'a [Value]> for Source<'a> {
    fn from(elements: &'a [Value]) -> Self {
        Self::Tuple(Cow::Borrowed(elements))
    }
}

impl<'a> From<&'a Vec<Value>> for Source<'a> {
    fn from(elements: &'a Vec<Value>) -> Self {
        Self::Tuple(Cow::Borrowed(elements.as_slice()))
    }
}

impl From<Vec<Value>> for Source<'_> {
    fn from(elements: Vec<Value>) -> Self {
        Self::Tuple(Cow::Owned(elements))
    }
}

impl<'a> From<&'a Value> for Source<'a> {
    fn from(node: &'a Value) -> Self {
        Self::Document(node)
    }
}

impl<'a> From<&'a ObjectSource> for Source<'a> {
    fn from(object: &'a ObjectSource) -> Self {
        Self::Object(object)
    }
}

macro_rules! tuple_source {
    ($($name:ident),+) => {
        impl<$($name: Into<Value>),+> From<($($name,)+)> for Source<'_> {
            #[allow(non_snake_case)]
            fn from(($($name,)+): ($($name,)+)) -> Self {
                Self::Tuple(Cow::Owned(vec![$($name.into()),+]))
            }
        }
    };
}

tuple_source!(A);
tuple_source!(A, B);
tuple_source!(A, B, C);
tuple_source!(A, B, C, D);
tuple_source!(A, B, C, D, E);
tuple_source!(A, B, C, D, E, F);
tuple_source!(A, B, C, D, E, F, G);
tuple_source!(A, B, C, D, E, F, G, H);

/// Everything an adapter needs to know about the target contract.
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext<'a> {
    /// Contract name, for diagnostics.
    pub contract: &'a str,
    /// Contract fields in declaration order.
    pub fields: &'a [FieldDescriptor],
    /// Per-field source-name overrides.
    pub source_names: &'a HashMap<String, String>,
    /// Tuple element names, by position.
    pub element_names: Option<&'a [String]>,
    /// Missing and incompatible handling.
    pub policy: TypePolicy,
}

impl ExtractContext<'_> {
    /// Name to look a field up under in the source.
    #[must_use]
    pub fn source_name<'f>(&'f self, field: &'f FieldDescriptor) -> &'f str {
        self.source_names
            .get(&field.name)
            .map_or(field.name.as_str(), String::as_str)
    }
}

/// Extracts the canonical field map for a contract from any source.
pub fn extract(source: &Source<'_>, ctx: &ExtractContext<'_>) -> Result<CanonicalFieldMap> {
    match source {
        Source::Map(map) => map::extract(*map, ctx),
        Source::Tuple(elements) => tuple::extract(elements, ctx),
        Source::Object(object) => object::extract(*object, ctx),
        Source::Document(node) => document::extract(*node, ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_display_and_serde() {
        assert_eq!(SourceKind::Document.to_string(), "document");
        assert_eq!(serde_json::to_value(SourceKind::Tuple).unwrap(), json!("tuple"));
    }

    #[test]
    fn test_from_impls_pick_variant() {
        let map: HashMap<String, Value> = HashMap::new();
        let doc = json!({});
        let elements = vec![json!(1)];

        assert_eq!(Source::from(&map).kind(), SourceKind::Map);
        assert_eq!(Source::from(&doc).kind(), SourceKind::Document);
        assert_eq!(Source::from(&elements).kind(), SourceKind::Tuple);
        assert_eq!(Source::from(("a", 1, true)).kind(), SourceKind::Tuple);
    }

    #[test]
    fn test_native_tuple_elements() {
        let Source::Tuple(elements) = Source::from(("Riccardo", 42, None::<String>)) else {
            panic!("expected tuple source");
        };
        assert_eq!(
            elements.into_owned(),
            vec![json!("Riccardo"), json!(42), Value::Null]
        );
    }

    #[test]
    fn test_source_name_override() {
        let fields = [crate::contract::FieldDescriptor::new(
            "FirstName",
            crate::contract::FieldType::String,
        )];
        let mut names = HashMap::new();
        names.insert("FirstName".to_string(), "first_name".to_string());
        let ctx = ExtractContext {
            contract: "Person",
            fields: &fields,
            source_names: &names,
            element_names: None,
            policy: TypePolicy::default(),
        };
        assert_eq!(ctx.source_name(&fields[0]), "first_name");
    }
}
