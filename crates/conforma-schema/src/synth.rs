//! Example synthesizer
//!
//! The inverse traversal: produce a canonical example document from a
//! schema alone, so a user can emit it, hand-edit it, and feed it back
//! as input.

use crate::schema::{Schema, ScalarKind};
use crate::{ALT_KEY, ARGS_KEY};
use conforma_yaml::Value;

/// Synthesize an example document for a schema.
///
/// Records use declared field defaults verbatim and recurse otherwise.
/// Sum types become a single multi-line string documenting every
/// variant as `{ALT: name}` / `{ALT: name, ARGS: …}` entries, which
/// the emitter renders as a literal block; the user replaces the block
/// with the alternative they want. Scalars without defaults become
/// `<type>` placeholder strings, since no literal value can be
/// inferred from the shape alone.
pub fn synthesize(schema: &Schema) -> Value {
    match schema {
        Schema::Record(record) => Value::Map(
            record
                .fields
                .iter()
                .map(|field| {
                    let example = field
                        .default
                        .clone()
                        .unwrap_or_else(|| synthesize(&field.schema));
                    (Value::Str(field.name.clone()), example)
                })
                .collect(),
        ),
        // Examples never show the absent case.
        Schema::Optional(inner) => synthesize(inner),
        Schema::Sum(sum) => {
            let alternatives: Vec<Value> = sum
                .variants
                .iter()
                .map(|(name, variant)| {
                    let args = synthesize(variant);
                    let mut entry = vec![(Value::from(ALT_KEY), Value::from(name.as_str()))];
                    let takes_no_args = matches!(&args, Value::Map(m) if m.is_empty());
                    if !takes_no_args {
                        entry.push((Value::from(ARGS_KEY), args));
                    }
                    Value::Map(entry)
                })
                .collect();
            Value::Str(conforma_yaml::emit(&Value::Seq(alternatives)))
        }
        Schema::Sequence(element) => Value::Seq(vec![synthesize(element)]),
        Schema::Mapping(key, value) => Value::Map(vec![(synthesize(key), synthesize(value))]),
        Schema::Literal(allowed) => {
            let values: Vec<String> = allowed.iter().map(|v| v.to_string()).collect();
            Value::Str(format!("<one of {}>", values.join(", ")))
        }
        Schema::Any => Value::Str("<any>".to_string()),
        Schema::Scalar(kind) => Value::Str(format!("<{}>", kind.name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;

    #[test]
    fn test_scalar_placeholders() {
        assert_eq!(synthesize(&Schema::string()), Value::from("<string>"));
        assert_eq!(synthesize(&Schema::integer()), Value::from("<integer>"));
        assert_eq!(synthesize(&Schema::float()), Value::from("<float>"));
        assert_eq!(synthesize(&Schema::boolean()), Value::from("<boolean>"));
        assert_eq!(synthesize(&Schema::Any), Value::from("<any>"));
    }

    #[test]
    fn test_record_uses_defaults_verbatim() {
        let schema = Schema::record(
            "Main",
            vec![
                Field::new("msg", Schema::string()),
                Field::with_default("retries", Schema::integer(), Value::Int(3)),
            ],
        );
        let example = synthesize(&schema);
        assert_eq!(example.get("msg"), Some(&Value::from("<string>")));
        assert_eq!(example.get("retries"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_optional_shows_inner() {
        assert_eq!(
            synthesize(&Schema::optional(Schema::float())),
            Value::from("<float>")
        );
    }

    #[test]
    fn test_sequence_and_mapping_show_one_entry() {
        assert_eq!(
            synthesize(&Schema::sequence(Schema::integer())),
            Value::Seq(vec![Value::from("<integer>")])
        );
        assert_eq!(
            synthesize(&Schema::mapping(Schema::string(), Schema::boolean())),
            Value::Map(vec![(Value::from("<string>"), Value::from("<boolean>"))])
        );
    }

    #[test]
    fn test_sum_documents_every_variant_as_block() {
        let schema = Schema::sum(vec![
            (
                "Print",
                Schema::record("Print", vec![Field::new("msg", Schema::string())]),
            ),
            ("int", Schema::integer()),
        ]);
        assert_eq!(
            synthesize(&schema),
            Value::from("- ALT: Print\n  ARGS:\n    msg: <string>\n- ALT: int\n  ARGS: <integer>\n")
        );
    }

    #[test]
    fn test_sum_variant_without_arguments_omits_args() {
        let schema = Schema::sum(vec![
            ("Empty", Schema::record("Empty", vec![])),
            ("str", Schema::string()),
        ]);
        assert_eq!(
            synthesize(&schema),
            Value::from("- ALT: Empty\n- ALT: str\n  ARGS: <string>\n")
        );
    }

    #[test]
    fn test_literal_lists_choices() {
        let schema = Schema::literal(vec![Value::from("debug"), Value::from("release")]);
        assert_eq!(
            synthesize(&schema),
            Value::from("<one of \"debug\", \"release\">")
        );
    }
}
