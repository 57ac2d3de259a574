//! Schema-directed decode engine
//!
//! A recursive descent over (schema, node) pairs. Dispatch order is
//! fixed and matters, because a node can structurally look like more
//! than one kind: a computed-function node wins over everything, then
//! the schema decides. Errors are fail-fast: the first one anywhere in
//! the descent aborts the whole call, and no partial value escapes.

use crate::builtins::{Builtin, UNKNOWN_SOURCE};
use crate::error::{DecodeError, DecodeErrorKind, DecodeResult, InstancePath};
use crate::matcher::matches;
use crate::matrix;
use crate::schema::{RecordSchema, ScalarKind, Schema, SumSchema};
use crate::scope::Scope;
use crate::{ALT_KEY, ARGS_KEY, FUNC_KEY};
use conforma_yaml::Value;
use std::path::{Path, PathBuf};

/// What to do with document keys that have no declared record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldPolicy {
    /// Pass unknown keys through verbatim.
    #[default]
    Lenient,
    /// Reject unknown keys with an `UnknownField` error.
    Strict,
}

/// Decodes untyped document values against a schema.
///
/// ```rust
/// use conforma_schema::{Decoder, Schema};
/// use conforma_yaml::{parse, Value};
///
/// let node = parse("[1, 2, 3]").unwrap();
/// let decoder = Decoder::new();
/// let value = decoder
///     .decode(&Schema::sequence(Schema::integer()), &node)
///     .unwrap();
/// assert_eq!(value.as_seq().map(<[Value]>::len), Some(3));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    source: Option<PathBuf>,
    fields: FieldPolicy,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate the path of the document being decoded; consumed by
    /// the file-path builtins and quoted in error messages.
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn with_field_policy(mut self, fields: FieldPolicy) -> Self {
        self.fields = fields;
        self
    }

    /// Decode `node` against `schema`, with an empty placeholder scope.
    pub fn decode(&self, schema: &Schema, node: &Value) -> DecodeResult<Value> {
        self.run(schema, node, &InstancePath::new(), &Scope::new())
    }

    fn source_name(&self) -> String {
        self.source
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string())
    }

    fn error(&self, kind: DecodeErrorKind, path: &InstancePath, actual: &Value) -> DecodeError {
        DecodeError::new(kind, path.clone(), self.source_name(), actual)
    }

    fn type_mismatch(&self, schema: &Schema, path: &InstancePath, actual: &Value) -> DecodeError {
        self.error(
            DecodeErrorKind::TypeMismatch {
                expected: schema.to_string(),
            },
            path,
            actual,
        )
    }

    fn run(
        &self,
        schema: &Schema,
        node: &Value,
        path: &InstancePath,
        scope: &Scope,
    ) -> DecodeResult<Value> {
        // A mapping carrying the reserved FUNC key is a computed-value
        // request no matter what the schema expects.
        if let Some(func) = node.get(FUNC_KEY) {
            return self.run_function(func, schema, node, path, scope);
        }
        match schema {
            Schema::Record(record) => self.run_record(record, node, path, scope),
            Schema::Optional(inner) => {
                if node.is_null() {
                    Ok(Value::Null)
                } else {
                    self.run(inner, node, &path.join("Optional"), scope)
                }
            }
            Schema::Sum(sum) => self.run_sum(sum, schema, node, path, scope),
            Schema::Sequence(element) => {
                let Some(items) = node.as_seq() else {
                    return Err(self.type_mismatch(schema, path, node));
                };
                let item_path = path.join("list");
                let decoded: DecodeResult<Vec<Value>> = items
                    .iter()
                    .map(|item| self.run(element, item, &item_path, scope))
                    .collect();
                Ok(Value::Seq(decoded?))
            }
            Schema::Mapping(key, value) => {
                let Some(entries) = node.as_map() else {
                    return Err(self.type_mismatch(schema, path, node));
                };
                let entry_path = path.join("dict");
                let mut decoded = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    decoded.push((
                        self.run(key, k, &entry_path, scope)?,
                        self.run(value, v, &entry_path, scope)?,
                    ));
                }
                Ok(Value::Map(decoded))
            }
            Schema::Literal(allowed) => {
                if allowed.contains(node) {
                    Ok(node.clone())
                } else {
                    Err(self.error(
                        DecodeErrorKind::InvalidLiteral {
                            allowed: allowed.iter().map(|v| v.to_string()).collect(),
                        },
                        path,
                        node,
                    ))
                }
            }
            Schema::Any => self.run_any(node, path, scope),
            Schema::Scalar(kind) => self.coerce_scalar(*kind, node, path),
        }
    }

    fn run_function(
        &self,
        func: &Value,
        expected: &Schema,
        node: &Value,
        path: &InstancePath,
        scope: &Scope,
    ) -> DecodeResult<Value> {
        let Some(name) = func.as_str() else {
            return Err(self.error(
                DecodeErrorKind::UnknownFunction {
                    name: func.to_string(),
                },
                path,
                node,
            ));
        };
        let Some(builtin) = Builtin::lookup(name) else {
            return Err(self.error(
                DecodeErrorKind::UnknownFunction {
                    name: name.to_string(),
                },
                path,
                node,
            ));
        };

        if builtin == Builtin::Matrix {
            return self.run_matrix(expected, node, path, scope);
        }

        let args_node = node.get(ARGS_KEY).cloned().unwrap_or(Value::Map(Vec::new()));
        let args = self.run(&builtin.args_schema(), &args_node, &path.join(ARGS_KEY), scope)?;

        let result = builtin
            .eval(&args, self.source.as_deref(), scope)
            .map_err(|(kind, actual)| self.error(kind, path, &actual))?;

        if !matches(&result, expected) {
            return Err(self.error(
                DecodeErrorKind::StructuralMismatch {
                    function: name.to_string(),
                    expected: expected.to_string(),
                },
                path,
                &result,
            ));
        }
        Ok(result)
    }

    /// Matrix expansion: decode the mapping argument, then re-enter
    /// the engine once per product combination with an extended scope.
    /// The template stays raw until each entry.
    fn run_matrix(
        &self,
        expected: &Schema,
        node: &Value,
        path: &InstancePath,
        scope: &Scope,
    ) -> DecodeResult<Value> {
        let Schema::Sequence(element) = expected else {
            return Err(self.type_mismatch(expected, path, node));
        };

        let Some(args) = node.get(ARGS_KEY) else {
            return Err(self.error(
                DecodeErrorKind::MissingField {
                    field: ARGS_KEY.to_string(),
                },
                path,
                node,
            ));
        };
        let args_path = path.join(ARGS_KEY);

        let Some(mapping_node) = args.get("mapping") else {
            return Err(self.error(
                DecodeErrorKind::MissingField {
                    field: "mapping".to_string(),
                },
                &args_path,
                args,
            ));
        };
        // The lists themselves may be computed (e.g. a Wildcard).
        let mapping_schema = Schema::mapping(Schema::string(), Schema::sequence(Schema::Any));
        let mapping = self.run(
            &mapping_schema,
            mapping_node,
            &args_path.join("mapping"),
            scope,
        )?;

        let Some(template) = args.get("template") else {
            return Err(self.error(
                DecodeErrorKind::MissingField {
                    field: "template".to_string(),
                },
                &args_path,
                args,
            ));
        };
        let template_path = args_path.join("template");

        let entries = mapping.as_map().unwrap_or(&[]);
        let mut expanded = Vec::new();
        for combination in matrix::product(entries) {
            let extended = scope.extend(combination);
            expanded.push(self.run(element, template, &template_path, &extended)?);
        }
        Ok(Value::Seq(expanded))
    }

    fn run_record(
        &self,
        record: &RecordSchema,
        node: &Value,
        path: &InstancePath,
        scope: &Scope,
    ) -> DecodeResult<Value> {
        let Some(entries) = node.as_map() else {
            return Err(self.error(
                DecodeErrorKind::TypeMismatch {
                    expected: format!("record {}", record.name),
                },
                path,
                node,
            ));
        };

        let mut decoded = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let field = key.as_str().and_then(|name| record.field(name));
            match field {
                Some(field) => {
                    let field_path = path.join(&field.name);
                    decoded.push((key.clone(), self.run(&field.schema, value, &field_path, scope)?));
                }
                None => match self.fields {
                    FieldPolicy::Lenient => decoded.push((key.clone(), value.clone())),
                    FieldPolicy::Strict => {
                        let field = key
                            .as_str()
                            .map(str::to_string)
                            .unwrap_or_else(|| key.to_string());
                        return Err(self.error(
                            DecodeErrorKind::UnknownField { field },
                            path,
                            value,
                        ));
                    }
                },
            }
        }

        // Fill omitted fields from defaults, in declaration order.
        for field in &record.fields {
            if node.contains_key(&field.name) {
                continue;
            }
            if let Some(default) = &field.default {
                decoded.push((Value::Str(field.name.clone()), default.clone()));
            } else if matches!(field.schema, Schema::Optional(_)) {
                decoded.push((Value::Str(field.name.clone()), Value::Null));
            } else {
                return Err(self.error(
                    DecodeErrorKind::MissingField {
                        field: field.name.clone(),
                    },
                    path,
                    node,
                ));
            }
        }
        Ok(Value::Map(decoded))
    }

    fn run_sum(
        &self,
        sum: &SumSchema,
        schema: &Schema,
        node: &Value,
        path: &InstancePath,
        scope: &Scope,
    ) -> DecodeResult<Value> {
        if let Some(tag) = node.get(ALT_KEY) {
            let variant = tag.as_str().and_then(|name| sum.variant(name));
            let Some(variant_schema) = variant else {
                return Err(self.error(
                    DecodeErrorKind::UnknownVariant {
                        variant: tag
                            .as_str()
                            .map(str::to_string)
                            .unwrap_or_else(|| tag.to_string()),
                        expected: schema.to_string(),
                    },
                    path,
                    node,
                ));
            };
            let args = node.get(ARGS_KEY).cloned().unwrap_or(Value::Map(Vec::new()));
            return self.run(variant_schema, &args, &path.join(ARGS_KEY), scope);
        }

        // Untagged fallback: the first structurally matching variant
        // accepts the node unchanged. Order-dependent for overlapping
        // shapes; an inherent limitation of tagless resolution.
        if sum.variants.iter().any(|(_, s)| matches(node, s)) {
            Ok(node.clone())
        } else {
            Err(self.error(
                DecodeErrorKind::InvalidUnion {
                    expected: schema.to_string(),
                },
                path,
                node,
            ))
        }
    }

    /// Under an `Any` slot the shape is the data's own: mappings and
    /// sequences are walked so nested computed-function nodes are
    /// still honored, scalars pass through.
    fn run_any(&self, node: &Value, path: &InstancePath, scope: &Scope) -> DecodeResult<Value> {
        match node {
            Value::Map(_) => self.run(
                &Schema::mapping(Schema::Any, Schema::Any),
                node,
                path,
                scope,
            ),
            Value::Seq(_) => self.run(&Schema::sequence(Schema::Any), node, path, scope),
            other => Ok(other.clone()),
        }
    }

    fn coerce_scalar(
        &self,
        kind: ScalarKind,
        node: &Value,
        path: &InstancePath,
    ) -> DecodeResult<Value> {
        let coerced = match (kind, node) {
            (ScalarKind::Str, Value::Str(_)) => Some(node.clone()),
            // Strings absorb the other scalars, like a text config
            // slot reading `version: 1.0` would expect.
            (ScalarKind::Str, Value::Bool(_) | Value::Int(_) | Value::Float(_)) => {
                Some(Value::Str(node.to_string()))
            }
            (ScalarKind::Int, Value::Int(_)) => Some(node.clone()),
            (ScalarKind::Float, Value::Float(_)) => Some(node.clone()),
            (ScalarKind::Float, Value::Int(i)) => Some(Value::Float(*i as f64)),
            (ScalarKind::Bool, Value::Bool(_)) => Some(node.clone()),
            _ => None,
        };
        coerced.ok_or_else(|| {
            self.error(
                DecodeErrorKind::TypeMismatch {
                    expected: kind.name().to_string(),
                },
                path,
                node,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;
    use conforma_yaml::parse;

    fn decode(schema: &Schema, text: &str) -> DecodeResult<Value> {
        Decoder::new().decode(schema, &parse(text).unwrap())
    }

    #[test]
    fn test_scalar_coercion() {
        assert_eq!(decode(&Schema::integer(), "42"), Ok(Value::Int(42)));
        assert_eq!(decode(&Schema::float(), "42"), Ok(Value::Float(42.0)));
        assert_eq!(decode(&Schema::string(), "42"), Ok(Value::from("42")));
        assert_eq!(decode(&Schema::boolean(), "true"), Ok(Value::Bool(true)));
        assert!(decode(&Schema::integer(), "2.5").is_err());
        assert!(decode(&Schema::boolean(), "yes please").is_err());
    }

    #[test]
    fn test_record_decodes_fields_and_fills_defaults() {
        let schema = Schema::record(
            "Main",
            vec![
                Field::new("output", Schema::string()),
                Field::with_default("retries", Schema::integer(), Value::Int(0)),
                Field::new("timeout", Schema::optional(Schema::float())),
            ],
        );
        let value = decode(&schema, "output: out.txt").unwrap();
        assert_eq!(value.get("output"), Some(&Value::from("out.txt")));
        assert_eq!(value.get("retries"), Some(&Value::Int(0)));
        assert_eq!(value.get("timeout"), Some(&Value::Null));
    }

    #[test]
    fn test_record_missing_required_field() {
        let schema = Schema::record("Main", vec![Field::new("output", Schema::string())]);
        let err = decode(&schema, "other: 1").unwrap_err();
        assert_eq!(
            err.kind,
            DecodeErrorKind::MissingField {
                field: "output".to_string()
            }
        );
    }

    #[test]
    fn test_record_unknown_keys_pass_through_by_default() {
        let schema = Schema::record("Main", vec![Field::new("output", Schema::string())]);
        let value = decode(&schema, "output: x\nundeclared: 7").unwrap();
        assert_eq!(value.get("undeclared"), Some(&Value::Int(7)));
    }

    #[test]
    fn test_record_strict_policy_rejects_unknown_keys() {
        let schema = Schema::record("Main", vec![Field::new("output", Schema::string())]);
        let node = parse("output: x\nundeclared: 7").unwrap();
        let err = Decoder::new()
            .with_field_policy(FieldPolicy::Strict)
            .decode(&schema, &node)
            .unwrap_err();
        assert_eq!(
            err.kind,
            DecodeErrorKind::UnknownField {
                field: "undeclared".to_string()
            }
        );
    }

    #[test]
    fn test_optional_null_and_value() {
        let schema = Schema::optional(Schema::integer());
        assert_eq!(decode(&schema, "null"), Ok(Value::Null));
        assert_eq!(decode(&schema, "3"), Ok(Value::Int(3)));
        let err = decode(&schema, "three").unwrap_err();
        assert_eq!(err.path.to_string(), "Optional");
    }

    #[test]
    fn test_sequence_element_path() {
        let schema = Schema::sequence(Schema::integer());
        let err = decode(&schema, "[1, 2, oops]").unwrap_err();
        assert_eq!(err.path.to_string(), "list");
    }

    #[test]
    fn test_mapping_decodes_keys_and_values() {
        let schema = Schema::mapping(Schema::string(), Schema::integer());
        let value = decode(&schema, "a: 1\nb: 2").unwrap();
        assert_eq!(value.get("a"), Some(&Value::Int(1)));
        let err = decode(&schema, "a: x").unwrap_err();
        assert_eq!(err.path.to_string(), "dict");
    }

    #[test]
    fn test_literal() {
        let schema = Schema::literal(vec![Value::from("debug"), Value::from("release")]);
        assert_eq!(decode(&schema, "debug"), Ok(Value::from("debug")));
        let err = decode(&schema, "profile").unwrap_err();
        assert_eq!(
            err.kind,
            DecodeErrorKind::InvalidLiteral {
                allowed: vec!["\"debug\"".to_string(), "\"release\"".to_string()]
            }
        );
    }

    #[test]
    fn test_untagged_sum_accepts_first_match_unchanged() {
        let schema = Schema::sum(vec![("str", Schema::string()), ("int", Schema::integer())]);
        assert_eq!(decode(&schema, "7"), Ok(Value::Int(7)));
        assert_eq!(decode(&schema, "hello"), Ok(Value::from("hello")));
        let err = decode(&schema, "[1]").unwrap_err();
        assert_eq!(
            err.kind,
            DecodeErrorKind::InvalidUnion {
                expected: "one of str | int".to_string()
            }
        );
    }

    #[test]
    fn test_any_passes_plain_data_through() {
        let node = parse("k: [1, two, null]").unwrap();
        assert_eq!(Decoder::new().decode(&Schema::Any, &node), Ok(node));
    }

    #[test]
    fn test_error_names_source_file() {
        let node = parse("nope").unwrap();
        let err = Decoder::new()
            .with_source("configs/app.yaml")
            .decode(&Schema::integer(), &node)
            .unwrap_err();
        assert_eq!(err.source_name, "app.yaml");
        assert!(err.to_string().starts_with("app.yaml: "));
    }
}
