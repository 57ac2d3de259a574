// Error types for schema-directed decoding

use conforma_yaml::Value;
use std::fmt;
use thiserror::Error;

/// Result type for decode operations
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Structured decode error kinds
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DecodeErrorKind {
    /// Value does not have the kind the schema asks for
    TypeMismatch { expected: String },

    /// Required record field absent from the document
    MissingField { field: String },

    /// Document key with no declared field (strict field policy only)
    UnknownField { field: String },

    /// `ALT` tag names a variant the sum type does not have
    UnknownVariant { variant: String, expected: String },

    /// Untagged node matches no variant of the sum type
    InvalidUnion { expected: String },

    /// `FUNC` names no builtin function
    UnknownFunction { name: String },

    /// `Placeholder` key has no binding in the current scope
    UnboundPlaceholder { key: String },

    /// Value is not among the allowed literals
    InvalidLiteral { allowed: Vec<String> },

    /// Wildcard or substitution pattern cannot be compiled
    InvalidPattern { pattern: String },

    /// Builtin function result does not fit the caller's expected shape
    StructuralMismatch { function: String, expected: String },
}

impl DecodeErrorKind {
    /// Format a human-readable message from this error kind
    pub fn message(&self) -> String {
        match self {
            DecodeErrorKind::TypeMismatch { expected } => {
                format!("expected to be {}", expected)
            }
            DecodeErrorKind::MissingField { field } => {
                format!("missing required field '{}'", field)
            }
            DecodeErrorKind::UnknownField { field } => {
                format!("unknown field '{}'", field)
            }
            DecodeErrorKind::UnknownVariant { variant, expected } => {
                format!("unknown variant '{}', expected to be {}", variant, expected)
            }
            DecodeErrorKind::InvalidUnion { expected } => {
                format!("expected to contain 'ALT' or be {}", expected)
            }
            DecodeErrorKind::UnknownFunction { name } => {
                format!("'{}' is not a built-in function", name)
            }
            DecodeErrorKind::UnboundPlaceholder { key } => {
                format!("Matrix mapping should contain '{}'", key)
            }
            DecodeErrorKind::InvalidLiteral { allowed } => {
                format!("expected one of: {}", allowed.join(", "))
            }
            DecodeErrorKind::InvalidPattern { pattern } => {
                format!("invalid pattern '{}'", pattern)
            }
            DecodeErrorKind::StructuralMismatch { function, expected } => {
                format!("result of {} expected to be {}", function, expected)
            }
        }
    }
}

/// Decode error with document location information.
///
/// Carries the source identifier (file name or `"<unknown>"`), the
/// dotted instance path at the point of failure, and a truncated
/// rendering of the offending value. The first error anywhere in the
/// recursive descent aborts the whole decode call.
#[derive(Debug, Clone, PartialEq, Error)]
pub struct DecodeError {
    /// The structured error kind
    pub kind: DecodeErrorKind,
    /// Instance path where the error occurred (e.g., ["rules", "list", "target"])
    pub path: InstancePath,
    /// Source identifier: document file name, or `"<unknown>"`
    pub source_name: String,
    /// Rendering of the offending value, truncated to 80 characters
    pub actual: String,
}

impl DecodeError {
    /// Create a new decode error, rendering and truncating the
    /// offending value.
    pub fn new(
        kind: DecodeErrorKind,
        path: InstancePath,
        source_name: impl Into<String>,
        actual: &Value,
    ) -> Self {
        Self {
            kind,
            path,
            source_name: source_name.into(),
            actual: truncate(actual.to_string()),
        }
    }

    /// Get the human-readable message for this error
    pub fn message(&self) -> String {
        self.kind.message()
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}: {}", self.source_name, self.message())?;
        } else {
            write!(f, "{}:{}: {}", self.source_name, self.path, self.message())?;
        }
        write!(f, "\nactual: {}", self.actual)
    }
}

/// Truncate a rendered value to at most 80 characters, counting
/// characters rather than bytes so multi-byte text cannot split.
fn truncate(s: String) -> String {
    if s.chars().count() <= 80 {
        return s;
    }
    let head: String = s.chars().take(77).collect();
    format!("{}...", head)
}

/// Instance path: the document keys walked to reach the failing node,
/// plus the synthetic segments `ARGS`, `Optional`, `list` and `dict`
/// added by the engine. Affects error reporting only, never decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstancePath {
    segments: Vec<String>,
}

impl InstancePath {
    /// Create a new empty instance path
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Return a new path with one more segment appended
    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Get the segments as a slice
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Check if the path is empty
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Get the length of the path
    pub fn len(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "(root)")
        } else {
            write!(f, "{}", self.segments.join("."))
        }
    }
}

/// Error returned by the [`load`](crate::load) front door: either the
/// document failed to parse, or it failed to decode.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Yaml(#[from] conforma_yaml::Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
