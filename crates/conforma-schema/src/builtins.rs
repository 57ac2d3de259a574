//! Builtin function catalog
//!
//! A document node can request evaluation of a builtin instead of
//! supplying a literal value, by being a mapping with the reserved
//! `FUNC` key. Each builtin has a fixed argument schema (a record) and
//! a deterministic evaluation rule. The decode engine decodes `ARGS`
//! against the argument schema before evaluation, so nested computed
//! functions inside arguments work, and checks every result against
//! the caller's expected schema afterwards.
//!
//! `Matrix` is listed here for dispatch but expanded by the engine
//! itself, because its `template` argument must stay undecoded until
//! each expansion binds its placeholders.

use crate::error::DecodeErrorKind;
use crate::schema::{Field, Schema};
use crate::scope::Scope;
use conforma_yaml::Value;
use regex::Regex;
use std::path::Path;

/// Sentinel used by the file-path builtins when the decode call has no
/// source path.
pub const UNKNOWN_SOURCE: &str = "<unknown>";

/// Evaluation either yields a value or an error kind plus the value to
/// quote as "actual"; the engine attaches path and source.
pub(crate) type EvalResult = Result<Value, (DecodeErrorKind, Value)>;

/// The closed set of builtin functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    FilePath,
    FileName,
    FileDir,
    FileFmt,
    PatSubst,
    Wildcard,
    Matrix,
    Placeholder,
}

impl Builtin {
    /// Resolve a document's `FUNC` string.
    pub fn lookup(name: &str) -> Option<Builtin> {
        match name {
            "FilePath" => Some(Builtin::FilePath),
            "FileName" => Some(Builtin::FileName),
            "FileDir" => Some(Builtin::FileDir),
            "FileFmt" => Some(Builtin::FileFmt),
            "PatSubst" => Some(Builtin::PatSubst),
            "Wildcard" => Some(Builtin::Wildcard),
            "Matrix" => Some(Builtin::Matrix),
            "Placeholder" => Some(Builtin::Placeholder),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::FilePath => "FilePath",
            Builtin::FileName => "FileName",
            Builtin::FileDir => "FileDir",
            Builtin::FileFmt => "FileFmt",
            Builtin::PatSubst => "PatSubst",
            Builtin::Wildcard => "Wildcard",
            Builtin::Matrix => "Matrix",
            Builtin::Placeholder => "Placeholder",
        }
    }

    /// The record schema the node's `ARGS` mapping is decoded against.
    pub fn args_schema(self) -> Schema {
        match self {
            Builtin::FilePath | Builtin::FileName | Builtin::FileDir => {
                Schema::record(self.name(), vec![])
            }
            Builtin::FileFmt => {
                Schema::record("FileFmt", vec![Field::new("fmt", Schema::string())])
            }
            Builtin::PatSubst => Schema::record(
                "PatSubst",
                vec![
                    Field::new("pattern", Schema::string()),
                    Field::new("replacement", Schema::string()),
                    Field::new(
                        "texts",
                        Schema::sum(vec![
                            ("str", Schema::string()),
                            ("list", Schema::sequence(Schema::string())),
                        ]),
                    ),
                ],
            ),
            Builtin::Wildcard => {
                Schema::record("Wildcard", vec![Field::new("pattern", Schema::string())])
            }
            Builtin::Matrix => Schema::record(
                "Matrix",
                vec![
                    Field::new(
                        "mapping",
                        Schema::mapping(Schema::string(), Schema::sequence(Schema::Any)),
                    ),
                    Field::new("template", Schema::Any),
                ],
            ),
            Builtin::Placeholder => {
                Schema::record("Placeholder", vec![Field::new("key", Schema::string())])
            }
        }
    }

    /// Evaluate the function body. `args` has already been decoded
    /// against [`args_schema`](Builtin::args_schema).
    pub(crate) fn eval(self, args: &Value, source: Option<&Path>, scope: &Scope) -> EvalResult {
        match self {
            Builtin::FilePath => Ok(Value::Str(
                source
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            )),
            Builtin::FileName => Ok(Value::Str(
                source
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            )),
            Builtin::FileDir => Ok(Value::Str(file_dir(source))),
            Builtin::FileFmt => Ok(Value::Str(file_fmt(arg_str(args, "fmt"), source))),
            Builtin::PatSubst => {
                let texts = args.get("texts").cloned().unwrap_or(Value::Null);
                pat_subst(
                    arg_str(args, "pattern"),
                    arg_str(args, "replacement"),
                    &texts,
                )
            }
            Builtin::Wildcard => wildcard(arg_str(args, "pattern")),
            Builtin::Placeholder => {
                let key = arg_str(args, "key");
                match scope.get(key) {
                    Some(value) => Ok(value.clone()),
                    None => Err((
                        DecodeErrorKind::UnboundPlaceholder {
                            key: key.to_string(),
                        },
                        scope.to_value(),
                    )),
                }
            }
            Builtin::Matrix => unreachable!("Matrix is expanded by the decode engine"),
        }
    }
}

/// Extract a string argument. The argument shape is enforced by the
/// `args_schema` decode, so a missing or non-string value cannot occur;
/// the empty-string fallback just keeps this total.
fn arg_str<'a>(args: &'a Value, name: &str) -> &'a str {
    args.get(name).and_then(Value::as_str).unwrap_or("")
}

fn file_dir(source: Option<&Path>) -> String {
    let Some(path) = source else {
        return UNKNOWN_SOURCE.to_string();
    };
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let mut rendered = parent.display().to_string();
    if parent.is_dir() && !rendered.ends_with('/') {
        rendered.push('/');
    }
    rendered
}

fn file_fmt(fmt: &str, source: Option<&Path>) -> String {
    let Some(path) = source else {
        return UNKNOWN_SOURCE.to_string();
    };
    let parent = path
        .parent()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    fmt.replace("${parent}", &parent)
        .replace("${stem}", &stem)
        .replace("${suffix}", &suffix)
}

/// Make-style pattern substitution: `%` in the pattern is a capturing
/// wildcard anchored at both ends of the whole text, `%` in the
/// replacement is the captured group. Texts that do not match pass
/// through unchanged. Operates per element when `texts` is a list,
/// preserving its shape.
fn pat_subst(pattern: &str, replacement: &str, texts: &Value) -> EvalResult {
    let anchored = format!("^{}$", regex::escape(pattern).replace('%', "(.*)"));
    let re = Regex::new(&anchored).map_err(|_| {
        (
            DecodeErrorKind::InvalidPattern {
                pattern: pattern.to_string(),
            },
            texts.clone(),
        )
    })?;
    // `$` must be literal in the replacement before `%` becomes a
    // group reference.
    let repl = replacement.replace('$', "$$").replace('%', "${1}");
    let apply = |text: &str| re.replace(text, repl.as_str()).into_owned();
    match texts {
        Value::Seq(items) => Ok(Value::Seq(
            items
                .iter()
                .map(|item| Value::Str(apply(item.as_str().unwrap_or(""))))
                .collect(),
        )),
        Value::Str(text) => Ok(Value::Str(apply(text))),
        other => Ok(other.clone()),
    }
}

/// Filesystem glob relative to the current working directory.
/// Directory matches are suffixed with a path separator.
fn wildcard(pattern: &str) -> EvalResult {
    let paths = glob::glob(pattern).map_err(|_| {
        (
            DecodeErrorKind::InvalidPattern {
                pattern: pattern.to_string(),
            },
            Value::Str(pattern.to_string()),
        )
    })?;
    let mut out = Vec::new();
    for path in paths.flatten() {
        let mut rendered = path.display().to_string();
        if path.is_dir() && !rendered.ends_with('/') {
            rendered.push('/');
        }
        out.push(Value::Str(rendered));
    }
    Ok(Value::Seq(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(entries: Vec<(&str, Value)>) -> Value {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (Value::from(k), v))
                .collect(),
        )
    }

    #[test]
    fn test_lookup() {
        assert_eq!(Builtin::lookup("PatSubst"), Some(Builtin::PatSubst));
        assert_eq!(Builtin::lookup("Matrix"), Some(Builtin::Matrix));
        assert_eq!(Builtin::lookup("patsubst"), None);
    }

    #[test]
    fn test_file_builtins_with_source() {
        let source = Path::new("a/b/report.yaml");
        let scope = Scope::new();
        let empty = args(vec![]);
        assert_eq!(
            Builtin::FilePath.eval(&empty, Some(source), &scope),
            Ok(Value::from("a/b/report.yaml"))
        );
        assert_eq!(
            Builtin::FileName.eval(&empty, Some(source), &scope),
            Ok(Value::from("report.yaml"))
        );
    }

    #[test]
    fn test_file_builtins_without_source() {
        let scope = Scope::new();
        let empty = args(vec![]);
        for builtin in [Builtin::FilePath, Builtin::FileName, Builtin::FileDir] {
            assert_eq!(
                builtin.eval(&empty, None, &scope),
                Ok(Value::from(UNKNOWN_SOURCE))
            );
        }
    }

    #[test]
    fn test_file_dir_suffixes_existing_directory() {
        // cwd during tests is the crate directory, so src/ exists
        let scope = Scope::new();
        assert_eq!(
            Builtin::FileDir.eval(&args(vec![]), Some(Path::new("src/builtins.rs")), &scope),
            Ok(Value::from("src/"))
        );
        // A parent that is not on disk keeps its bare rendering.
        assert_eq!(
            Builtin::FileDir.eval(&args(vec![]), Some(Path::new("elsewhere/x.yaml")), &scope),
            Ok(Value::from("elsewhere"))
        );
    }

    #[test]
    fn test_file_fmt() {
        let source = Path::new("a/b/report.yaml");
        let scope = Scope::new();
        let fmt_args = args(vec![("fmt", Value::from("${parent}/${stem}.out${suffix}"))]);
        assert_eq!(
            Builtin::FileFmt.eval(&fmt_args, Some(source), &scope),
            Ok(Value::from("a/b/report.out.yaml"))
        );
    }

    #[test]
    fn test_pat_subst_list() {
        let result = pat_subst(
            "%.c",
            "%.o",
            &Value::Seq(vec![Value::from("foo.c"), Value::from("bar.c")]),
        )
        .unwrap();
        assert_eq!(
            result,
            Value::Seq(vec![Value::from("foo.o"), Value::from("bar.o")])
        );
    }

    #[test]
    fn test_pat_subst_single_string() {
        assert_eq!(
            pat_subst("src/%", "build/%", &Value::from("src/main.c")).unwrap(),
            Value::from("build/main.c")
        );
    }

    #[test]
    fn test_pat_subst_no_match_passes_through() {
        assert_eq!(
            pat_subst("%.c", "%.o", &Value::from("notes.txt")).unwrap(),
            Value::from("notes.txt")
        );
    }

    #[test]
    fn test_pat_subst_dollar_in_replacement_is_literal() {
        assert_eq!(
            pat_subst("%", "$%", &Value::from("x")).unwrap(),
            Value::from("$x")
        );
    }

    #[test]
    fn test_wildcard_matches_manifest() {
        // cwd during tests is the crate directory
        let result = wildcard("Cargo.*").unwrap();
        assert_eq!(result, Value::Seq(vec![Value::from("Cargo.toml")]));
    }

    #[test]
    fn test_wildcard_suffixes_directories() {
        let result = wildcard("sr*").unwrap();
        assert_eq!(result, Value::Seq(vec![Value::from("src/")]));
    }

    #[test]
    fn test_placeholder_lookup() {
        let scope = Scope::new().extend([("n".to_string(), Value::Int(3))]);
        let found = Builtin::Placeholder.eval(&args(vec![("key", Value::from("n"))]), None, &scope);
        assert_eq!(found, Ok(Value::Int(3)));

        let missing =
            Builtin::Placeholder.eval(&args(vec![("key", Value::from("m"))]), None, &scope);
        assert_eq!(
            missing,
            Err((
                DecodeErrorKind::UnboundPlaceholder {
                    key: "m".to_string()
                },
                scope.to_value()
            ))
        );
    }
}
