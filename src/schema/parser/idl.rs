// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Hand-written parser for the OMG IDL subset emitted by ROS 2 message
//! generators: nested `module`s, `struct`, `const`, `sequence<T>` /
//! `sequence<T, N>`, fixed arrays `T name[N]`, and `@default(value=...)`
//! annotations (parsed and discarded; defaults are not enforced on the
//! wire).

use crate::schema::ast::{Constant, Field, FieldType, MessageSchema, MessageType, PrimitiveType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdlParseErrorKind {
    UnterminatedComment,
    UnknownToken,
    BadField,
    BadConstant,
    MissingType,
    UnexpectedEof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdlParseError {
    pub kind: IdlParseErrorKind,
    pub message: String,
}

impl std::fmt::Display for IdlParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for IdlParseError {}

type ParseResult<T> = Result<T, IdlParseError>;

fn err(kind: IdlParseErrorKind, message: impl Into<String>) -> IdlParseError {
    IdlParseError {
        kind,
        message: message.into(),
    }
}

/// Parse a `.idl` definition into a [`MessageSchema`].
pub fn parse(name: &str, text: &str) -> ParseResult<MessageSchema> {
    let stripped = strip_comments(text)?;
    let tokens = tokenize(&stripped);
    let mut cursor = TokenCursor::new(&tokens);

    let mut schema = MessageSchema::new(name.to_string());
    parse_modules(&mut cursor, Vec::new(), &mut schema)?;
    Ok(schema)
}

/// Remove `//` line comments and `/* ... */` block comments.
fn strip_comments(text: &str) -> ParseResult<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'/') => {
                for c2 in chars.by_ref() {
                    if c2 == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut closed = false;
                while let Some(c2) = chars.next() {
                    if c2 == '*' && chars.peek() == Some(&'/') {
                        chars.next();
                        closed = true;
                        break;
                    }
                    if c2 == '\n' {
                        out.push('\n');
                    }
                }
                if !closed {
                    return Err(err(
                        IdlParseErrorKind::UnterminatedComment,
                        "unterminated /* comment",
                    ));
                }
            }
            '"' => {
                out.push('"');
                for c2 in chars.by_ref() {
                    out.push(c2);
                    if c2 == '"' {
                        break;
                    }
                }
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

/// Split into tokens: identifiers/keywords, punctuation `{ } ; < > , [ ] ( ) = @ ::`, and quoted strings.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == ':' {
            chars.next();
            if chars.peek() == Some(&':') {
                chars.next();
                tokens.push("::".to_string());
            } else {
                tokens.push(":".to_string());
            }
            continue;
        }
        if "{};<>,[]()=@".contains(c) {
            chars.next();
            tokens.push(c.to_string());
            continue;
        }
        if c == '"' {
            let mut s = String::from("\"");
            chars.next();
            for c2 in chars.by_ref() {
                s.push(c2);
                if c2 == '"' {
                    break;
                }
            }
            tokens.push(s);
            continue;
        }
        let mut ident = String::new();
        while let Some(&c2) = chars.peek() {
            if c2.is_alphanumeric() || c2 == '_' || c2 == '.' || c2 == '-' {
                ident.push(c2);
                chars.next();
            } else {
                break;
            }
        }
        if !ident.is_empty() {
            tokens.push(ident);
        } else {
            chars.next();
        }
    }
    tokens
}

struct TokenCursor<'a> {
    tokens: &'a [String],
    pos: usize,
}

impl<'a> TokenCursor<'a> {
    fn new(tokens: &'a [String]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(|s| s.as_str())
    }

    fn next(&mut self) -> Option<&'a str> {
        let tok = self.tokens.get(self.pos).map(|s| s.as_str());
        self.pos += 1;
        tok
    }

    fn expect(&mut self, expected: &str) -> ParseResult<()> {
        match self.next() {
            Some(t) if t == expected => Ok(()),
            Some(t) => Err(err(
                IdlParseErrorKind::UnknownToken,
                format!("expected '{expected}', found '{t}'"),
            )),
            None => Err(err(
                IdlParseErrorKind::UnexpectedEof,
                format!("expected '{expected}', found end of input"),
            )),
        }
    }

    fn eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}

fn parse_modules(
    cursor: &mut TokenCursor,
    path: Vec<String>,
    schema: &mut MessageSchema,
) -> ParseResult<()> {
    while !cursor.eof() {
        match cursor.peek() {
            Some("module") => {
                cursor.next();
                let module_name = cursor
                    .next()
                    .ok_or_else(|| err(IdlParseErrorKind::MissingType, "expected module name"))?
                    .to_string();
                cursor.expect("{")?;
                let mut nested_path = path.clone();
                nested_path.push(module_name);
                parse_modules(cursor, nested_path, schema)?;
                cursor.expect("}")?;
                skip_optional_semicolon(cursor);
            }
            Some("struct") => {
                cursor.next();
                let struct_name = cursor
                    .next()
                    .ok_or_else(|| err(IdlParseErrorKind::MissingType, "expected struct name"))?
                    .to_string();
                let fqn = build_fqn(&path, &struct_name);
                let msg_type = parse_struct_body(cursor, &fqn)?;
                schema.add_type(msg_type);
                skip_optional_semicolon(cursor);
            }
            Some("const") => {
                // top-level const outside a struct: uncommon but tolerated, discarded.
                skip_to_semicolon(cursor);
            }
            Some(_) => {
                return Err(err(
                    IdlParseErrorKind::UnknownToken,
                    format!("unexpected token '{}'", cursor.peek().unwrap_or_default()),
                ));
            }
            None => break,
        }
        if cursor.peek() == Some("}") {
            break;
        }
    }
    Ok(())
}

fn build_fqn(path: &[String], leaf: &str) -> String {
    if path.is_empty() {
        leaf.to_string()
    } else if path.len() >= 2 {
        format!("{}/msg/{}", path[0], leaf)
    } else {
        format!("{}/{}", path[0], leaf)
    }
}

fn skip_optional_semicolon(cursor: &mut TokenCursor) {
    if cursor.peek() == Some(";") {
        cursor.next();
    }
}

fn skip_to_semicolon(cursor: &mut TokenCursor) {
    while let Some(t) = cursor.next() {
        if t == ";" {
            break;
        }
    }
}

fn parse_struct_body(cursor: &mut TokenCursor, fqn: &str) -> ParseResult<MessageType> {
    cursor.expect("{")?;
    let mut msg_type = MessageType::new(fqn.to_string());

    while cursor.peek() != Some("}") {
        if cursor.eof() {
            return Err(err(
                IdlParseErrorKind::UnexpectedEof,
                "unterminated struct body",
            ));
        }
        // Skip @default(...) and other annotations.
        if cursor.peek() == Some("@") {
            skip_annotation(cursor)?;
            continue;
        }
        if cursor.peek() == Some("const") {
            cursor.next();
            let constant = parse_const_decl(cursor)?;
            msg_type.add_constant(constant);
            continue;
        }
        let field = parse_field_decl(cursor)?;
        msg_type.add_field(field);
    }
    cursor.expect("}")?;
    Ok(msg_type)
}

fn skip_annotation(cursor: &mut TokenCursor) -> ParseResult<()> {
    cursor.expect("@")?;
    cursor.next(); // annotation name, e.g. `default`
    if cursor.peek() == Some("(") {
        let mut depth = 0;
        loop {
            match cursor.next() {
                Some("(") => depth += 1,
                Some(")") => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                Some(_) => {}
                None => {
                    return Err(err(
                        IdlParseErrorKind::UnexpectedEof,
                        "unterminated annotation",
                    ))
                }
            }
        }
    }
    Ok(())
}

fn parse_const_decl(cursor: &mut TokenCursor) -> ParseResult<Constant> {
    let type_tok = cursor
        .next()
        .ok_or_else(|| err(IdlParseErrorKind::MissingType, "expected const type"))?;
    let prim = PrimitiveType::try_from_str(type_tok).ok_or_else(|| {
        err(
            IdlParseErrorKind::BadConstant,
            format!("unknown const type '{type_tok}'"),
        )
    })?;
    let name = cursor
        .next()
        .ok_or_else(|| err(IdlParseErrorKind::BadConstant, "expected const name"))?
        .to_string();
    cursor.expect("=")?;
    let mut value = String::new();
    loop {
        match cursor.next() {
            Some(";") => break,
            Some(t) => {
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(t);
            }
            None => {
                return Err(err(
                    IdlParseErrorKind::UnexpectedEof,
                    "unterminated const declaration",
                ))
            }
        }
    }
    Ok(Constant {
        type_name: prim,
        name,
        value,
    })
}

fn parse_field_decl(cursor: &mut TokenCursor) -> ParseResult<Field> {
    let type_tok = cursor
        .next()
        .ok_or_else(|| err(IdlParseErrorKind::MissingType, "expected field type"))?
        .to_string();

    let base_type = if type_tok == "sequence" {
        cursor.expect("<")?;
        let inner_tok = cursor.next().ok_or_else(|| {
            err(
                IdlParseErrorKind::BadField,
                "expected element type in sequence<>",
            )
        })?;
        let inner = resolve_type_token(inner_tok);
        let max = if cursor.peek() == Some(",") {
            cursor.next();
            let bound_tok = cursor.next().ok_or_else(|| {
                err(IdlParseErrorKind::BadField, "expected sequence bound")
            })?;
            Some(bound_tok.parse::<usize>().map_err(|_| {
                err(
                    IdlParseErrorKind::BadField,
                    format!("invalid sequence bound '{bound_tok}'"),
                )
            })?)
        } else {
            None
        };
        cursor.expect(">")?;
        FieldType::Sequence {
            base_type: Box::new(inner),
            max,
        }
    } else {
        resolve_type_token(&type_tok)
    };

    let name = cursor
        .next()
        .ok_or_else(|| err(IdlParseErrorKind::BadField, "expected field name"))?
        .to_string();

    let field_type = if cursor.peek() == Some("[") {
        cursor.next();
        let size_tok = cursor
            .next()
            .ok_or_else(|| err(IdlParseErrorKind::BadField, "expected array size"))?;
        let size = size_tok.parse::<usize>().map_err(|_| {
            err(
                IdlParseErrorKind::BadField,
                format!("invalid array size '{size_tok}'"),
            )
        })?;
        cursor.expect("]")?;
        FieldType::Array {
            base_type: Box::new(base_type),
            size,
        }
    } else {
        base_type
    };

    // Optional `@default(value=...)` annotation or default literal, discarded.
    if cursor.peek() == Some("@") {
        skip_annotation(cursor)?;
    }
    cursor.expect(";")?;

    Ok(Field {
        name,
        type_name: field_type,
    })
}

fn resolve_type_token(token: &str) -> FieldType {
    if let Some(prim) = PrimitiveType::try_from_str(token) {
        return FieldType::Primitive(prim);
    }
    let normalized = token.replace("::", "/");
    let normalized = if normalized == "Header" {
        "std_msgs/msg/Header".to_string()
    } else {
        normalized
    };
    FieldType::Nested(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_struct() {
        let idl = "module std_msgs { module msg { struct String { string data; }; }; };";
        let schema = parse("std_msgs/msg/String", idl).unwrap();
        let t = schema.get_type("std_msgs/msg/String").unwrap();
        assert_eq!(t.fields.len(), 1);
        assert_eq!(t.fields[0].name, "data");
    }

    #[test]
    fn test_parse_sequence_bounded_and_unbounded() {
        let idl = r#"
            module pkg { module msg { struct Foo {
                sequence<int32> dyn_arr;
                sequence<int32, 4> bounded_arr;
            }; }; };
        "#;
        let schema = parse("pkg/msg/Foo", idl).unwrap();
        let t = schema.get_type("pkg/msg/Foo").unwrap();
        assert!(matches!(
            t.fields[0].type_name,
            FieldType::Sequence { max: None, .. }
        ));
        assert!(matches!(
            t.fields[1].type_name,
            FieldType::Sequence { max: Some(4), .. }
        ));
    }

    #[test]
    fn test_parse_fixed_array() {
        let idl = "module pkg { module msg { struct Foo { int32 arr[4]; }; }; };";
        let schema = parse("pkg/msg/Foo", idl).unwrap();
        let t = schema.get_type("pkg/msg/Foo").unwrap();
        assert!(matches!(
            t.fields[0].type_name,
            FieldType::Array { size: 4, .. }
        ));
    }

    #[test]
    fn test_parse_const_and_default_annotation() {
        let idl = r#"
            module pkg { module msg { struct Foo {
                const int32 ANSWER = 42;
                @default (value=0)
                int32 value;
            }; }; };
        "#;
        let schema = parse("pkg/msg/Foo", idl).unwrap();
        let t = schema.get_type("pkg/msg/Foo").unwrap();
        assert_eq!(t.constants.len(), 1);
        assert_eq!(t.constants[0].name, "ANSWER");
        assert_eq!(t.fields.len(), 1);
    }

    #[test]
    fn test_strip_block_and_line_comments() {
        let idl = "module pkg { // top\n module msg { struct Foo { /* f */ int32 v; }; }; };";
        let schema = parse("pkg/msg/Foo", idl).unwrap();
        assert!(schema.get_type("pkg/msg/Foo").is_some());
    }

    #[test]
    fn test_nested_struct_reference_resolves_namespace() {
        let idl = "module pkg { module msg { struct Foo { pkg::msg::Bar bar; }; }; };";
        let schema = parse("pkg/msg/Foo", idl).unwrap();
        let t = schema.get_type("pkg/msg/Foo").unwrap();
        assert_eq!(
            t.fields[0].type_name,
            FieldType::Nested("pkg/msg/Bar".to_string())
        );
    }
}
