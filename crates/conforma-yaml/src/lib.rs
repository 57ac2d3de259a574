//! # conforma-yaml
//!
//! The untyped document model for conforma, with a YAML bridge.
//!
//! This crate provides [`Value`], an ordered untyped value tree (null,
//! booleans, numbers, strings, sequences, mappings), plus a parser from
//! YAML text and an emitter back to YAML text. Mapping entries preserve
//! insertion order so that emitted documents keep the order their schema
//! declared.
//!
//! The emitter understands multi-line strings and renders them as
//! literal block scalars, which the schema layer relies on to embed
//! generated documentation blocks inside example documents.
//!
//! ## Example
//!
//! ```rust
//! use conforma_yaml::{parse, emit};
//!
//! let value = parse("title: My Document").unwrap();
//! assert_eq!(value.get("title").and_then(|v| v.as_str()), Some("My Document"));
//! assert_eq!(emit(&value), "title: My Document\n");
//! ```

mod emitter;
mod error;
mod parser;
mod value;

pub use emitter::{emit, emit_to_file};
pub use error::{Error, Result};
pub use parser::{parse, parse_file};
pub use value::Value;
