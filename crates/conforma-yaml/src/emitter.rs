//! Block-style YAML emitter for Value trees.
//!
//! The emitter exists because the schema layer needs two things the
//! stock yaml-rust2 emitter does not give us: literal block scalars for
//! multi-line strings, and full control over plain-vs-quoted scalar
//! styles so that emitted documents re-parse to an equal [`Value`].

use crate::{Error, Result, Value};
use std::path::Path;

const INDENT: &str = "  ";

/// Render a value as a block-style YAML document.
///
/// Mapping keys keep their insertion order. Multi-line strings become
/// literal block scalars. Strings that would re-parse as a number,
/// boolean or null are double-quoted.
pub fn emit(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Map(entries) if !entries.is_empty() => emit_map(entries, 0, &mut out),
        Value::Seq(items) if !items.is_empty() => emit_seq(items, 0, &mut out),
        Value::Str(s) if s.contains('\n') && block_ok(s) => {
            emit_block_scalar(s, 1, &mut out);
            // Drop the separator space a key context would have needed.
            return out.strip_prefix(' ').unwrap_or(&out).to_string();
        }
        other => {
            out.push_str(&scalar_repr(other));
            out.push('\n');
        }
    }
    out
}

/// Render a value and write it to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn emit_to_file(value: &Value, path: &Path) -> Result<()> {
    std::fs::write(path, emit(value)).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str(INDENT);
    }
}

fn emit_map(entries: &[(Value, Value)], indent: usize, out: &mut String) {
    for (key, value) in entries {
        push_indent(out, indent);
        emit_entry(key, value, indent, out);
    }
}

/// Emit one `key: value` entry. The caller has already written the
/// indentation (or the `- ` of an enclosing sequence item).
fn emit_entry(key: &Value, value: &Value, indent: usize, out: &mut String) {
    out.push_str(&scalar_repr(key));
    out.push(':');
    match value {
        Value::Str(s) if s.contains('\n') && block_ok(s) => {
            emit_block_scalar(s, indent + 1, out);
        }
        Value::Seq(items) if !items.is_empty() => {
            out.push('\n');
            emit_seq(items, indent + 1, out);
        }
        Value::Map(entries) if !entries.is_empty() => {
            out.push('\n');
            emit_map(entries, indent + 1, out);
        }
        other => {
            out.push(' ');
            out.push_str(&scalar_repr(other));
            out.push('\n');
        }
    }
}

fn emit_seq(items: &[Value], indent: usize, out: &mut String) {
    for item in items {
        push_indent(out, indent);
        out.push('-');
        match item {
            Value::Map(entries) if !entries.is_empty() => {
                // First entry shares the dash line; the rest line up
                // under it.
                out.push(' ');
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        push_indent(out, indent + 1);
                    }
                    emit_entry(key, value, indent + 1, out);
                }
            }
            Value::Seq(inner) if !inner.is_empty() => {
                out.push('\n');
                emit_seq(inner, indent + 1, out);
            }
            Value::Str(s) if s.contains('\n') && block_ok(s) => {
                emit_block_scalar(s, indent + 1, out);
            }
            other => {
                out.push(' ');
                out.push_str(&scalar_repr(other));
                out.push('\n');
            }
        }
    }
}

/// A literal block scalar takes its indentation from the first
/// non-empty content line, so a string whose first line itself starts
/// with a space would set the block indent too deep and the following
/// lines would fail to scan. Such strings use double-quoted style
/// instead.
fn block_ok(s: &str) -> bool {
    s.split('\n')
        .find(|line| !line.is_empty())
        .is_none_or(|line| !line.starts_with(' '))
}

/// Write a multi-line string as a literal block scalar. The chomping
/// indicator is chosen so the parsed content equals the input exactly.
fn emit_block_scalar(s: &str, indent: usize, out: &mut String) {
    let trimmed = s.trim_end_matches('\n');
    let trailing_newlines = s.len() - trimmed.len();
    match trailing_newlines {
        0 => out.push_str(" |-\n"),
        1 => out.push_str(" |\n"),
        _ => out.push_str(" |+\n"),
    }
    for line in trimmed.split('\n') {
        if line.is_empty() {
            out.push('\n');
        } else {
            push_indent(out, indent);
            out.push_str(line);
            out.push('\n');
        }
    }
    for _ in 1..trailing_newlines {
        out.push('\n');
    }
}

fn scalar_repr(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(_) => value.to_string(),
        Value::Str(s) => {
            if plain_ok(s) {
                s.clone()
            } else {
                quoted(s)
            }
        }
        Value::Seq(items) if items.is_empty() => "[]".to_string(),
        Value::Map(entries) if entries.is_empty() => "{}".to_string(),
        // Non-empty containers only land here as mapping keys, which
        // the flow rendering covers.
        other => other.to_string(),
    }
}

/// Whether a string can be emitted as a plain scalar without changing
/// meaning on re-parse. Deliberately conservative.
fn plain_ok(s: &str) -> bool {
    if s.is_empty() || s.starts_with(' ') || s.ends_with(' ') {
        return false;
    }
    if s.parse::<i64>().is_ok() || s.parse::<f64>().is_ok() || yaml_number(s) {
        return false;
    }
    if matches!(
        s.to_ascii_lowercase().as_str(),
        "true" | "false" | "null" | "~" | "yes" | "no" | "on" | "off"
    ) {
        return false;
    }
    let first = s.chars().next().unwrap_or(' ');
    if "!&*?|>%@`\"'#,[]{}".contains(first) {
        return false;
    }
    if s == "-" || s.starts_with("- ") {
        return false;
    }
    !s.contains(':') && !s.contains('#') && !s.contains('\n') && !s.contains('\t')
}

/// Number spellings the YAML scanner resolves but Rust's `parse` does
/// not: hex and octal integers, and the `.inf`/`.nan` float forms.
fn yaml_number(s: &str) -> bool {
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    let lower = unsigned.to_ascii_lowercase();
    if let Some(digits) = lower.strip_prefix("0x") {
        if i64::from_str_radix(digits, 16).is_ok() {
            return true;
        }
    }
    if let Some(digits) = lower.strip_prefix("0o") {
        if i64::from_str_radix(digits, 8).is_ok() {
            return true;
        }
    }
    matches!(lower.as_str(), ".inf" | ".nan")
}

fn quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
