// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Hand-written parser for the `.msg` message-definition dialect.
//!
//! One field or constant per line. `#` starts a comment (to end of line);
//! `===` on its own line separates the primary definition from embedded
//! definitions, each introduced by a `MSG: <fqn>` line. Array syntax
//! `T[]`, `T[N]`, `T[<=N]` and constant lines `T NAME=value` are recognised.

use crate::schema::ast::{Constant, Field, FieldType, MessageSchema, MessageType, PrimitiveType};

/// Parse error kinds, matching the definition-parser failure modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MsgParseErrorKind {
    UnterminatedComment,
    UnknownToken,
    BadField,
    BadConstant,
    MissingType,
}

/// A parse error with its kind and source location (1-based line number).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgParseError {
    pub kind: MsgParseErrorKind,
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for MsgParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} at line {}: {}",
            self.kind, self.line, self.message
        )
    }
}

impl std::error::Error for MsgParseError {}

type ParseResult<T> = Result<T, MsgParseError>;

fn err(kind: MsgParseErrorKind, line: usize, message: impl Into<String>) -> MsgParseError {
    MsgParseError {
        kind,
        line,
        message: message.into(),
    }
}

/// Parse a `.msg` definition (with embedded `===`/`MSG:` blocks) into a
/// [`MessageSchema`] whose package is derived from `name`.
pub fn parse(name: &str, text: &str) -> ParseResult<MessageSchema> {
    let mut schema = MessageSchema::new(normalize_name(name));
    let package = schema.package.clone().unwrap_or_default();

    for block in split_blocks(text)? {
        let msg_type = parse_block(&block, &package)?;
        schema.add_type(msg_type);
    }

    Ok(schema)
}

/// A single `===`-delimited block: an optional `MSG: <fqn>` header line plus body lines.
struct Block {
    fqn: Option<String>,
    lines: Vec<(usize, String)>,
}

fn split_blocks(text: &str) -> ParseResult<Vec<Block>> {
    let mut blocks = Vec::new();
    let mut current_fqn: Option<String> = None;
    let mut current_lines: Vec<(usize, String)> = Vec::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = raw_line.trim_end();
        if trimmed.trim() == "===" {
            blocks.push(Block {
                fqn: current_fqn.take(),
                lines: std::mem::take(&mut current_lines),
            });
            continue;
        }
        if let Some(rest) = trimmed.trim_start().strip_prefix("MSG:") {
            // Only treat as a header if this is the first line of a fresh block
            // (i.e. right after a `===` separator, signalled by an empty accumulator
            // and a pending block boundary already flushed above).
            if current_lines.is_empty() && current_fqn.is_none() && !blocks.is_empty() {
                current_fqn = Some(rest.trim().to_string());
                continue;
            }
        }
        current_lines.push((line_no, trimmed.to_string()));
    }
    blocks.push(Block {
        fqn: current_fqn,
        lines: current_lines,
    });

    Ok(blocks)
}

fn parse_block(block: &Block, enclosing_package: &str) -> ParseResult<MessageType> {
    let type_name = block
        .fqn
        .clone()
        .unwrap_or_else(|| enclosing_package.to_string());
    let mut msg_type = MessageType::new(normalize_name(&type_name));
    let package = extract_package(&normalize_name(&type_name)).unwrap_or_default();

    for (line_no, raw) in &block.lines {
        let line = strip_comment(raw);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(constant) = try_parse_constant(line, *line_no)? {
            msg_type.add_constant(constant);
            continue;
        }

        let field = parse_field_line(line, *line_no, &package)?;
        msg_type.add_field(field);
    }

    Ok(msg_type)
}

/// Strip a `#` comment. A line beginning with `#` is a full comment.
/// Inline `#` is stripped unless it appears to be inside a string-constant
/// value (heuristically: the line's declared type is `string` and the `#`
/// follows an `=`), so that string constants may contain `#`.
fn strip_comment(line: &str) -> &str {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        return "";
    }
    if let Some(eq_pos) = find_constant_eq(line) {
        // Never strip text after the `=` of a constant assignment: the value
        // is taken verbatim to end of line (minus a trailing comment that
        // starts at whitespace-then-#, which we don't attempt to detect for
        // string constants since `#` is valid string content).
        let before = &line[..eq_pos];
        if let Some(hash) = before.find('#') {
            return &line[..hash];
        }
        return line;
    }
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Find the `=` that separates a constant name from its value, being careful
/// not to confuse it with the `===` block separator (already filtered out by
/// `split_blocks`) or with `<=` in bounded-array syntax `T[<=N]`.
fn find_constant_eq(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'=' {
            if i > 0 && bytes[i - 1] == b'<' {
                continue; // part of `<=`
            }
            return Some(i);
        }
    }
    None
}

fn try_parse_constant(line: &str, line_no: usize) -> ParseResult<Option<Constant>> {
    let Some(eq_pos) = find_constant_eq(line) else {
        return Ok(None);
    };
    let (decl, value) = (&line[..eq_pos], &line[eq_pos + 1..]);
    let mut parts = decl.trim().splitn(2, char::is_whitespace);
    let type_tok = parts.next().unwrap_or_default();
    let name_tok = parts.next().unwrap_or_default().trim();
    if name_tok.is_empty() || name_tok.contains('[') {
        // Not a constant: either malformed or actually an array field whose
        // default happens to contain `=` (not supported, treated as a field).
        return Ok(None);
    }
    let Some(prim) = PrimitiveType::try_from_str(type_tok) else {
        return Ok(None);
    };
    Ok(Some(Constant {
        type_name: prim,
        name: name_tok.to_string(),
        value: value.trim().to_string(),
    }))
}

fn parse_field_line(line: &str, line_no: usize, package: &str) -> ParseResult<Field> {
    let mut parts = line.splitn(2, char::is_whitespace);
    let type_tok = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| err(MsgParseErrorKind::MissingType, line_no, "missing field type"))?;
    let rest = parts.next().unwrap_or_default().trim();
    let name_tok = rest.split_whitespace().next().ok_or_else(|| {
        err(
            MsgParseErrorKind::BadField,
            line_no,
            format!("missing field name after type '{type_tok}'"),
        )
    })?;

    let field_type = build_field_type(type_tok, line_no, package)?;

    Ok(Field {
        name: name_tok.trim_end_matches(',').to_string(),
        type_name: field_type,
    })
}

/// Build a `FieldType` from a `.msg` type token, e.g. `int32`, `string`,
/// `geometry_msgs/Point`, `int32[]`, `int32[4]`, `int32[<=4]`.
fn build_field_type(token: &str, line_no: usize, package: &str) -> ParseResult<FieldType> {
    if let Some(bracket) = token.find('[') {
        let (base, array_part) = token.split_at(bracket);
        if !array_part.ends_with(']') {
            return Err(err(
                MsgParseErrorKind::BadField,
                line_no,
                format!("unterminated array suffix in '{token}'"),
            ));
        }
        let inner = &array_part[1..array_part.len() - 1];
        let base_type = build_scalar_field_type(base, line_no, package)?;
        return Ok(if inner.is_empty() {
            FieldType::Sequence {
                base_type: Box::new(base_type),
                max: None,
            }
        } else if let Some(bound) = inner.strip_prefix("<=") {
            let max = bound.trim().parse::<usize>().map_err(|_| {
                err(
                    MsgParseErrorKind::BadField,
                    line_no,
                    format!("invalid bounded array size in '{token}'"),
                )
            })?;
            FieldType::Sequence {
                base_type: Box::new(base_type),
                max: Some(max),
            }
        } else {
            let size = inner.trim().parse::<usize>().map_err(|_| {
                err(
                    MsgParseErrorKind::BadField,
                    line_no,
                    format!("invalid fixed array size in '{token}'"),
                )
            })?;
            FieldType::Array {
                base_type: Box::new(base_type),
                size,
            }
        });
    }
    build_scalar_field_type(token, line_no, package)
}

fn build_scalar_field_type(
    token: &str,
    line_no: usize,
    package: &str,
) -> ParseResult<FieldType> {
    if let Some(prim) = PrimitiveType::try_from_str(token) {
        return Ok(FieldType::Primitive(prim));
    }
    if token.is_empty() {
        return Err(err(
            MsgParseErrorKind::UnknownToken,
            line_no,
            "empty type token",
        ));
    }
    Ok(FieldType::Nested(resolve_nested_name(token, package)))
}

/// Resolve a relative `.msg` type reference against the enclosing package,
/// special-casing bare `Header` to `std_msgs/msg/Header`.
fn resolve_nested_name(token: &str, package: &str) -> String {
    if token == "Header" {
        return "std_msgs/msg/Header".to_string();
    }
    if token.contains('/') {
        return normalize_name(token);
    }
    if package.is_empty() {
        token.to_string()
    } else {
        format!("{package}/msg/{token}")
    }
}

/// Normalize a type name to `pkg/msg/Name` form when it looks like `pkg/Name`.
fn normalize_name(name: &str) -> String {
    let parts: Vec<&str> = name.split('/').collect();
    match parts.as_slice() {
        [pkg, ty] => format!("{pkg}/msg/{ty}"),
        _ => name.to_string(),
    }
}

fn extract_package(name: &str) -> Option<String> {
    name.split('/').next().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_fields() {
        let schema = parse("std_msgs/String", "string data\n").unwrap();
        let t = schema.get_type("std_msgs/msg/String").unwrap();
        assert_eq!(t.fields.len(), 1);
        assert_eq!(t.fields[0].name, "data");
    }

    #[test]
    fn test_parse_comment_and_blank_lines() {
        let text = "# a comment\n\nint32 value # trailing comment\n";
        let schema = parse("pkg/Foo", text).unwrap();
        let t = schema.get_type("pkg/msg/Foo").unwrap();
        assert_eq!(t.fields.len(), 1);
        assert_eq!(t.fields[0].name, "value");
    }

    #[test]
    fn test_parse_constant() {
        let schema = parse("pkg/Foo", "int32 ANSWER=42\nint32 value\n").unwrap();
        let t = schema.get_type("pkg/msg/Foo").unwrap();
        assert_eq!(t.constants.len(), 1);
        assert_eq!(t.constants[0].name, "ANSWER");
        assert_eq!(t.constants[0].value, "42");
        assert_eq!(t.fields.len(), 1);
    }

    #[test]
    fn test_string_constant_with_equals_in_value() {
        let schema = parse("pkg/Foo", "string EXPR=a=b\n").unwrap();
        let t = schema.get_type("pkg/msg/Foo").unwrap();
        assert_eq!(t.constants[0].value, "a=b");
    }

    #[test]
    fn test_array_syntax() {
        let schema = parse(
            "pkg/Foo",
            "int32[] dyn_arr\nint32[4] fixed_arr\nint32[<=4] bounded_arr\n",
        )
        .unwrap();
        let t = schema.get_type("pkg/msg/Foo").unwrap();
        assert!(matches!(
            t.fields[0].type_name,
            FieldType::Sequence { max: None, .. }
        ));
        assert!(matches!(
            t.fields[1].type_name,
            FieldType::Array { size: 4, .. }
        ));
        assert!(matches!(
            t.fields[2].type_name,
            FieldType::Sequence { max: Some(4), .. }
        ));
    }

    #[test]
    fn test_header_specialization() {
        let schema = parse("pkg/Foo", "Header header\n").unwrap();
        let t = schema.get_type("pkg/msg/Foo").unwrap();
        assert_eq!(
            t.fields[0].type_name,
            FieldType::Nested("std_msgs/msg/Header".to_string())
        );
    }

    #[test]
    fn test_embedded_definitions() {
        let text = "Header header\nstring data\n===\nMSG: std_msgs/Header\nuint32 seq\ntime stamp\nstring frame_id\n";
        let schema = parse("pkg/Foo", text).unwrap();
        assert!(schema.get_type("pkg/msg/Foo").is_some());
        let header = schema.get_type("std_msgs/msg/Header").unwrap();
        assert_eq!(header.fields.len(), 3);
        assert_eq!(header.fields[0].name, "seq");
    }

    #[test]
    fn test_relative_reference_resolves_to_package() {
        let schema = parse("geometry_msgs/PoseStamped", "Pose pose\n").unwrap();
        let t = schema.get_type("geometry_msgs/msg/PoseStamped").unwrap();
        assert_eq!(
            t.fields[0].type_name,
            FieldType::Nested("geometry_msgs/msg/Pose".to_string())
        );
    }
}
