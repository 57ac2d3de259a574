//! # conforma-schema
//!
//! Schema-directed bidirectional mapping between a type description
//! and an untyped document tree.
//!
//! A host program declares its configuration shape once as a
//! [`Schema`], then:
//!
//! - decodes an arbitrary document into that shape with precise,
//!   located error messages ([`Decoder`], [`load`]), and
//! - synthesizes a self-documenting example document from the shape
//!   alone ([`synthesize`], [`emit_example`]).
//!
//! Documents can request computed values through the reserved `FUNC`
//! key: file-path queries, pattern substitution, filesystem wildcard
//! expansion, and the Matrix combinator, which expands a template
//! against the Cartesian product of named value lists with placeholder
//! variables bound per expansion. See [`Builtin`] for the catalog.
//!
//! ## Example
//!
//! ```rust
//! use conforma_schema::{Decoder, Field, Schema};
//! use conforma_yaml::parse;
//!
//! let schema = Schema::record(
//!     "Greeting",
//!     vec![
//!         Field::new("msg", Schema::string()),
//!         Field::with_default("times", Schema::integer(), 1i64.into()),
//!     ],
//! );
//!
//! let node = parse("msg: Hello world!").unwrap();
//! let value = Decoder::new().decode(&schema, &node).unwrap();
//! assert_eq!(value.get("times").and_then(|v| v.as_i64()), Some(1));
//! ```

mod builtins;
mod decode;
mod error;
mod matcher;
mod matrix;
mod schema;
mod scope;
mod synth;

pub use builtins::{Builtin, UNKNOWN_SOURCE};
pub use decode::{Decoder, FieldPolicy};
pub use error::{DecodeError, DecodeErrorKind, DecodeResult, InstancePath, LoadError};
pub use matcher::matches;
pub use schema::{Field, RecordSchema, ScalarKind, Schema, SumSchema};
pub use scope::Scope;
pub use synth::synthesize;

use conforma_yaml::Value;
use std::path::Path;

/// Reserved key requesting evaluation of a builtin function.
pub const FUNC_KEY: &str = "FUNC";
/// Reserved key carrying function or variant arguments.
pub const ARGS_KEY: &str = "ARGS";
/// Reserved key selecting a sum-type variant.
pub const ALT_KEY: &str = "ALT";

/// Read a YAML file and decode it against a schema.
///
/// The file path becomes the decode call's source: the file-path
/// builtins consume it and error messages quote its base name.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the YAML is invalid,
/// or the document does not decode against the schema.
pub fn load(schema: &Schema, path: &Path) -> Result<Value, LoadError> {
    let document = conforma_yaml::parse_file(path)?;
    let value = Decoder::new().with_source(path).decode(schema, &document)?;
    Ok(value)
}

/// Synthesize an example document for a schema and render it as YAML,
/// ready to be written out for a user to hand-edit.
pub fn emit_example(schema: &Schema) -> String {
    conforma_yaml::emit(&synthesize(schema))
}
