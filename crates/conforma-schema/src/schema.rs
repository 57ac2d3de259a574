//! Type descriptors
//!
//! A [`Schema`] describes the shape a decoded document must take. It is
//! an explicit, statically-constructed tree: host programs build one
//! per target shape with the constructor helpers and keep it for the
//! lifetime of the program. Nothing here is derived from reflection,
//! and schemas are never mutated after construction.

use conforma_yaml::Value;
use std::fmt;

/// Primitive scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Str,
    Int,
    Float,
    Bool,
}

impl ScalarKind {
    /// Human-readable name, used in messages and example placeholders.
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Str => "string",
            ScalarKind::Int => "integer",
            ScalarKind::Float => "float",
            ScalarKind::Bool => "boolean",
        }
    }
}

/// A named record field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub schema: Schema,
    /// Default value used when the document omits the field, and
    /// emitted verbatim by the example synthesizer.
    pub default: Option<Value>,
}

impl Field {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            default: None,
        }
    }

    pub fn with_default(name: impl Into<String>, schema: Schema, default: Value) -> Self {
        Self {
            name: name.into(),
            schema,
            default: Some(default),
        }
    }
}

/// A record: named, ordered fields. Field order matters for example
/// synthesis and error messages, not for decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    pub name: String,
    pub fields: Vec<Field>,
}

impl RecordSchema {
    /// Find a declared field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A tagged union: named alternative shapes, ordered. Variant names
/// are unique; order decides untagged fallback resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct SumSchema {
    pub variants: Vec<(String, Schema)>,
}

impl SumSchema {
    /// Find a variant by exact name.
    pub fn variant(&self, name: &str) -> Option<&Schema> {
        self.variants
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }
}

/// Description of an expected decoded shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Record(RecordSchema),
    Optional(Box<Schema>),
    Sum(SumSchema),
    Sequence(Box<Schema>),
    Mapping(Box<Schema>, Box<Schema>),
    /// Accept only the listed scalar values.
    Literal(Vec<Value>),
    /// Accept anything; shape is inferred from the data at decode time.
    Any,
    Scalar(ScalarKind),
}

impl Schema {
    pub fn string() -> Schema {
        Schema::Scalar(ScalarKind::Str)
    }

    pub fn integer() -> Schema {
        Schema::Scalar(ScalarKind::Int)
    }

    pub fn float() -> Schema {
        Schema::Scalar(ScalarKind::Float)
    }

    pub fn boolean() -> Schema {
        Schema::Scalar(ScalarKind::Bool)
    }

    pub fn record(name: impl Into<String>, fields: Vec<Field>) -> Schema {
        Schema::Record(RecordSchema {
            name: name.into(),
            fields,
        })
    }

    pub fn optional(inner: Schema) -> Schema {
        Schema::Optional(Box::new(inner))
    }

    pub fn sum(variants: Vec<(impl Into<String>, Schema)>) -> Schema {
        Schema::Sum(SumSchema {
            variants: variants
                .into_iter()
                .map(|(name, schema)| (name.into(), schema))
                .collect(),
        })
    }

    pub fn sequence(element: Schema) -> Schema {
        Schema::Sequence(Box::new(element))
    }

    pub fn mapping(key: Schema, value: Schema) -> Schema {
        Schema::Mapping(Box::new(key), Box::new(value))
    }

    pub fn literal(allowed: Vec<Value>) -> Schema {
        Schema::Literal(allowed)
    }
}

/// Compact human-readable type names, quoted by every error message.
impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Record(record) => write!(f, "record {}", record.name),
            Schema::Optional(inner) => write!(f, "optional {}", inner),
            Schema::Sum(sum) => {
                let names: Vec<&str> = sum.variants.iter().map(|(n, _)| n.as_str()).collect();
                write!(f, "one of {}", names.join(" | "))
            }
            Schema::Sequence(element) => write!(f, "list of {}", element),
            Schema::Mapping(key, value) => write!(f, "mapping of {} to {}", key, value),
            Schema::Literal(allowed) => {
                let values: Vec<String> = allowed.iter().map(|v| v.to_string()).collect();
                write!(f, "literal {}", values.join(" | "))
            }
            Schema::Any => write!(f, "any"),
            Schema::Scalar(kind) => write!(f, "{}", kind.name()),
        }
    }
}
