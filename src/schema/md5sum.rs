// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! The ROS1 canonical message md5sum algorithm.
//!
//! ROS1 identifies a message definition by the MD5 digest of its "genmsg
//! text": constant lines (`type name=value`), then field lines (`type
//! name`, or `type[]`/`type[N]` for arrays), with one difference from the
//! raw `.msg` source — a field of a nested message type is represented not
//! by its type name but by the nested message's own md5sum, computed
//! recursively. This lets the digest change whenever any transitively
//! included definition changes, without embedding full definition text.

use crate::core::{CodecError, Result};
use crate::schema::ast::{FieldType, MessageType, PrimitiveType};
use crate::schema::registry::TypeRegistry;

/// Build the genmsg text used as the md5sum hash input for `msg_type`.
///
/// Nested message fields are resolved through `registry`; an unresolvable
/// nested type yields [`CodecError::UnknownType`].
fn genmsg_text(msg_type: &MessageType, registry: &TypeRegistry) -> Result<String> {
    let mut lines = Vec::new();

    for constant in &msg_type.constants {
        lines.push(format!(
            "{} {}={}",
            constant.type_name.ros1_name(),
            constant.name,
            constant.value
        ));
    }

    for field in &msg_type.fields {
        lines.push(field_line(field_type_and_name(field), registry)?);
    }

    Ok(lines.join("\n"))
}

/// A field's type and name, used to build its genmsg line.
fn field_type_and_name(field: &crate::schema::ast::Field) -> (&FieldType, &str) {
    (&field.type_name, &field.name)
}

fn field_line((field_type, name): (&FieldType, &str), registry: &TypeRegistry) -> Result<String> {
    match field_type {
        FieldType::Primitive(prim) => Ok(format!("{} {name}", ros1_type_str(*prim))),
        FieldType::Array { base_type, size } => {
            let base = base_suffix(base_type, registry, Some(*size))?;
            Ok(format!("{base} {name}"))
        }
        FieldType::Sequence { base_type, .. } => {
            let base = base_suffix(base_type, registry, None)?;
            Ok(format!("{base} {name}"))
        }
        FieldType::Nested(type_name) => {
            let digest = nested_digest(type_name, registry)?;
            Ok(format!("{digest} {name}"))
        }
    }
}

/// The type token for an array/sequence element, with the `[]`/`[N]` suffix.
fn base_suffix(
    base_type: &FieldType,
    registry: &TypeRegistry,
    fixed_len: Option<usize>,
) -> Result<String> {
    let suffix = match fixed_len {
        Some(n) => format!("[{n}]"),
        None => "[]".to_string(),
    };
    let base = match base_type {
        FieldType::Primitive(prim) => ros1_type_str(*prim).to_string(),
        FieldType::Nested(type_name) => nested_digest(type_name, registry)?,
        FieldType::Array { .. } | FieldType::Sequence { .. } => {
            return Err(CodecError::unsupported("nested arrays in md5sum computation"))
        }
    };
    Ok(format!("{base}{suffix}"))
}

fn nested_digest(type_name: &str, registry: &TypeRegistry) -> Result<String> {
    let nested = registry
        .get_variants(type_name)?
        .ok_or_else(|| CodecError::unknown_type(type_name))?;
    compute_md5sum(&nested, registry)
}

fn ros1_type_str(prim: PrimitiveType) -> &'static str {
    prim.ros1_name()
}

/// Compute the ROS1 canonical md5sum for `msg_type`, resolving nested
/// types through `registry`.
pub fn compute_md5sum(msg_type: &MessageType, registry: &TypeRegistry) -> Result<String> {
    let text = genmsg_text(msg_type, registry)?;
    let digest = md5::compute(text.as_bytes());
    Ok(format!("{digest:x}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ast::{Constant, Field, MessageType};

    fn simple(name: &str, field_name: &str, ty: PrimitiveType) -> MessageType {
        let mut t = MessageType::new(name.to_string());
        t.add_field(Field {
            name: field_name.to_string(),
            type_name: FieldType::Primitive(ty),
        });
        t
    }

    #[test]
    fn test_md5sum_single_primitive_field() {
        let registry = TypeRegistry::new();
        let t = simple("test/Int32Msg", "data", PrimitiveType::Int32);
        let digest = compute_md5sum(&t, &registry).unwrap();
        // "int32 data" hashed with MD5
        let expected = format!("{:x}", md5::compute(b"int32 data"));
        assert_eq!(digest, expected);
    }

    #[test]
    fn test_md5sum_is_stable_across_calls() {
        let registry = TypeRegistry::new();
        let t = simple("test/Int32Msg", "data", PrimitiveType::Int32);
        let a = compute_md5sum(&t, &registry).unwrap();
        let b = compute_md5sum(&t, &registry).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_md5sum_includes_constants() {
        let registry = TypeRegistry::new();
        let mut t = MessageType::new("test/WithConst".to_string());
        t.add_constant(Constant {
            type_name: PrimitiveType::Int32,
            name: "ANSWER".to_string(),
            value: "42".to_string(),
        });
        t.add_field(Field {
            name: "data".to_string(),
            type_name: FieldType::Primitive(PrimitiveType::Int32),
        });
        let digest = compute_md5sum(&t, &registry).unwrap();
        let expected = format!("{:x}", md5::compute(b"int32 ANSWER=42\nint32 data"));
        assert_eq!(digest, expected);
    }

    #[test]
    fn test_md5sum_array_suffix() {
        let registry = TypeRegistry::new();
        let mut t = MessageType::new("test/ArrayMsg".to_string());
        t.add_field(Field {
            name: "values".to_string(),
            type_name: FieldType::Sequence {
                base_type: Box::new(FieldType::Primitive(PrimitiveType::Float64)),
                max: None,
            },
        });
        let digest = compute_md5sum(&t, &registry).unwrap();
        let expected = format!("{:x}", md5::compute(b"float64[] values"));
        assert_eq!(digest, expected);
    }

    #[test]
    fn test_md5sum_fixed_array_suffix() {
        let registry = TypeRegistry::new();
        let mut t = MessageType::new("test/FixedArrayMsg".to_string());
        t.add_field(Field {
            name: "position".to_string(),
            type_name: FieldType::Array {
                base_type: Box::new(FieldType::Primitive(PrimitiveType::Float32)),
                size: 3,
            },
        });
        let digest = compute_md5sum(&t, &registry).unwrap();
        let expected = format!("{:x}", md5::compute(b"float32[3] position"));
        assert_eq!(digest, expected);
    }

    #[test]
    fn test_md5sum_nested_type_uses_sub_digest() {
        let registry = TypeRegistry::new();
        let inner = simple("test/Inner", "x", PrimitiveType::Int32);
        registry.register_type("test/Inner", inner.clone()).unwrap();

        let mut outer = MessageType::new("test/Outer".to_string());
        outer.add_field(Field {
            name: "inner".to_string(),
            type_name: FieldType::Nested("test/Inner".to_string()),
        });

        let inner_digest = compute_md5sum(&inner, &registry).unwrap();
        let expected = format!("{:x}", md5::compute(format!("{inner_digest} inner").as_bytes()));
        let outer_digest = compute_md5sum(&outer, &registry).unwrap();
        assert_eq!(outer_digest, expected);
    }

    #[test]
    fn test_md5sum_unknown_nested_type_errors() {
        let registry = TypeRegistry::new();
        let mut t = MessageType::new("test/Dangling".to_string());
        t.add_field(Field {
            name: "missing".to_string(),
            type_name: FieldType::Nested("nope/msg/Missing".to_string()),
        });
        let result = compute_md5sum(&t, &registry);
        assert!(matches!(result, Err(CodecError::UnknownType { .. })));
    }
}
