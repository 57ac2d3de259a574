//! Structural matcher
//!
//! `matches` decides whether an untyped value already conforms to a
//! schema. It is a pure predicate: no coercion, no mutation, no
//! errors. The decode engine uses it to validate builtin function
//! results against the caller's expected shape and to resolve
//! untagged sum nodes.

use crate::schema::{ScalarKind, Schema};
use conforma_yaml::Value;

/// Check whether `value` structurally satisfies `schema`.
pub fn matches(value: &Value, schema: &Schema) -> bool {
    match schema {
        Schema::Any => true,
        Schema::Scalar(kind) => match kind {
            ScalarKind::Str => value.as_str().is_some(),
            ScalarKind::Int => value.as_i64().is_some(),
            // YAML renders 1.0 as 1, so a float slot accepts integers.
            ScalarKind::Float => value.as_f64().is_some(),
            ScalarKind::Bool => value.as_bool().is_some(),
        },
        Schema::Literal(allowed) => allowed.contains(value),
        Schema::Optional(inner) => value.is_null() || matches(value, inner),
        Schema::Sequence(element) => match value.as_seq() {
            Some(items) => items.iter().all(|item| matches(item, element)),
            None => false,
        },
        Schema::Mapping(key, val) => match value.as_map() {
            Some(entries) => entries
                .iter()
                .all(|(k, v)| matches(k, key) && matches(v, val)),
            None => false,
        },
        Schema::Sum(sum) => sum.variants.iter().any(|(_, s)| matches(value, s)),
        Schema::Record(record) => {
            if value.as_map().is_none() {
                return false;
            }
            // Extra keys are ignored, mirroring the lenient decode
            // policy. A field may be absent if a default or an
            // optional shape covers it.
            record.fields.iter().all(|field| match value.get(&field.name) {
                Some(v) => matches(v, &field.schema),
                None => field.default.is_some() || matches!(field.schema, Schema::Optional(_)),
            })
        }
    }
}
