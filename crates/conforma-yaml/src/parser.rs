//! YAML parser that builds Value trees.

use crate::{Error, Result, Value};
use std::path::Path;
use yaml_rust2::{Yaml, YamlLoader};

/// Parse YAML from a string, producing a [`Value`] tree.
///
/// This parses a single YAML document. If the input contains multiple
/// documents, only the first one is used. Empty input yields
/// [`Value::Null`].
///
/// # Example
///
/// ```rust
/// use conforma_yaml::parse;
///
/// let value = parse("title: My Document").unwrap();
/// assert!(value.as_map().is_some());
/// ```
///
/// # Errors
///
/// Returns an error if the YAML is syntactically invalid.
pub fn parse(content: &str) -> Result<Value> {
    let docs = YamlLoader::load_from_str(content)?;
    Ok(match docs.first() {
        Some(doc) => convert(doc),
        None => Value::Null,
    })
}

/// Read a file and parse it as a single YAML document.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the YAML is invalid.
pub fn parse_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content)
}

fn convert(yaml: &Yaml) -> Value {
    match yaml {
        Yaml::Null | Yaml::BadValue => Value::Null,
        Yaml::Boolean(b) => Value::Bool(*b),
        Yaml::Integer(i) => Value::Int(*i),
        // yaml-rust2 keeps reals as source text; anything it classified
        // as Real parses as f64, so the fallback is unreachable in
        // practice but kept total.
        Yaml::Real(r) => r.parse::<f64>().map(Value::Float).unwrap_or(Value::Null),
        Yaml::String(s) => Value::Str(s.clone()),
        Yaml::Array(items) => Value::Seq(items.iter().map(convert).collect()),
        Yaml::Hash(entries) => Value::Map(
            entries
                .iter()
                .map(|(k, v)| (convert(k), convert(v)))
                .collect(),
        ),
        // Anchors/aliases are not supported; an alias reads as null.
        Yaml::Alias(_) => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar() {
        assert_eq!(parse("hello").unwrap(), Value::from("hello"));
        assert_eq!(parse("42").unwrap(), Value::Int(42));
        assert_eq!(parse("2.5").unwrap(), Value::Float(2.5));
        assert_eq!(parse("true").unwrap(), Value::Bool(true));
        assert_eq!(parse("null").unwrap(), Value::Null);
    }

    #[test]
    fn test_parse_empty_input() {
        assert_eq!(parse("").unwrap(), Value::Null);
    }

    #[test]
    fn test_quoted_number_stays_string() {
        assert_eq!(parse("\"42\"").unwrap(), Value::from("42"));
    }

    #[test]
    fn test_parse_sequence() {
        let value = parse("[1, 2, 3]").unwrap();
        let items = value.as_seq().unwrap();
        assert_eq!(items, [Value::Int(1), Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn test_parse_mapping_preserves_order() {
        let value = parse("zebra: 1\nalpha: 2\nmiddle: 3").unwrap();
        let keys: Vec<_> = value
            .as_map()
            .unwrap()
            .iter()
            .map(|(k, _)| k.as_str().unwrap().to_string())
            .collect();
        assert_eq!(keys, ["zebra", "alpha", "middle"]);
    }

    #[test]
    fn test_parse_nested_structure() {
        let value = parse(
            r#"
project:
  title: My Project
  authors:
    - Alice
    - Bob
"#,
        )
        .unwrap();

        let project = value.get("project").unwrap();
        let authors = project.get("authors").unwrap().as_seq().unwrap();
        assert_eq!(authors.len(), 2);
        assert_eq!(authors[0], Value::from("Alice"));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        assert!(parse("key: [unclosed").is_err());
    }
}
