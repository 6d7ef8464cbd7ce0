// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Synthesizes the ROS1 "full message definition" text embedded in rosbag1
//! connection records: the message's own field/constant lines, followed by
//! one `===\nMSG: <name>` block per transitively-referenced nested type, in
//! first-use order. Mirrors the recursive walk in [`super::md5sum`], but
//! emits the full `.msg` source of each dependency instead of its digest.

use std::collections::HashSet;

use crate::core::Result;
use crate::schema::ast::{Field, FieldType, MessageType};
use crate::schema::registry::TypeRegistry;

const SEPARATOR: &str =
    "================================================================================\n";

/// Build the full message definition text for `msg_type`, resolving nested
/// types through `registry`.
pub fn generate_definition(msg_type: &MessageType, registry: &TypeRegistry) -> Result<String> {
    let mut seen = HashSet::new();
    seen.insert(msg_type.name.clone());

    let mut blocks = vec![own_text(msg_type)];
    collect_dependencies(msg_type, registry, &mut seen, &mut blocks)?;
    Ok(blocks.join("\n"))
}

fn own_text(msg_type: &MessageType) -> String {
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
        lines.push(field_text(field));
    }
    lines.join("\n")
}

fn field_text(field: &Field) -> String {
    match &field.type_name {
        FieldType::Primitive(prim) => format!("{} {}", prim.ros1_name(), field.name),
        FieldType::Array { base_type, size } => {
            format!("{} {}[{size}]", base_name(base_type), field.name)
        }
        FieldType::Sequence { base_type, .. } => {
            format!("{} {}[]", base_name(base_type), field.name)
        }
        FieldType::Nested(name) => format!("{} {}", ros1_msg_name(name), field.name),
    }
}

fn base_name(field_type: &FieldType) -> String {
    match field_type {
        FieldType::Primitive(prim) => prim.ros1_name().to_string(),
        FieldType::Nested(name) => ros1_msg_name(name),
        // Arrays of arrays/sequences do not occur in the message definitions
        // this crate parses; md5sum.rs makes the same assumption.
        FieldType::Array { .. } | FieldType::Sequence { .. } => String::new(),
    }
}

/// ROS1 text drops the `/msg/` infix ROS2 package names carry.
fn ros1_msg_name(name: &str) -> String {
    name.replace("/msg/", "/")
}

fn collect_dependencies(
    msg_type: &MessageType,
    registry: &TypeRegistry,
    seen: &mut HashSet<String>,
    blocks: &mut Vec<String>,
) -> Result<()> {
    for field in &msg_type.fields {
        let nested_name = match &field.type_name {
            FieldType::Nested(name) => Some(name.clone()),
            FieldType::Array { base_type, .. } | FieldType::Sequence { base_type, .. } => {
                match base_type.as_ref() {
                    FieldType::Nested(name) => Some(name.clone()),
                    _ => None,
                }
            }
            FieldType::Primitive(_) => None,
        };

        let Some(name) = nested_name else { continue };
        if seen.contains(&name) {
            continue;
        }

        let nested = registry
            .get_variants(&name)?
            .ok_or_else(|| crate::core::CodecError::unknown_type(name.clone()))?;
        seen.insert(name.clone());

        blocks.push(format!(
            "{SEPARATOR}MSG: {}\n{}",
            ros1_msg_name(&nested.name),
            own_text(&nested)
        ));
        collect_dependencies(&nested, registry, seen, blocks)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ast::{Field, FieldType, PrimitiveType};

    #[test]
    fn test_generate_definition_single_primitive_field() {
        let registry = TypeRegistry::new();
        let mut t = MessageType::new("test/Int32Msg".to_string());
        t.add_field(Field {
            name: "data".to_string(),
            type_name: FieldType::Primitive(PrimitiveType::Int32),
        });
        let text = generate_definition(&t, &registry).unwrap();
        assert_eq!(text, "int32 data");
    }

    #[test]
    fn test_generate_definition_includes_nested_block() {
        let registry = TypeRegistry::new();

        let mut inner = MessageType::new("std_msgs/msg/Header".to_string());
        inner.add_field(Field {
            name: "frame_id".to_string(),
            type_name: FieldType::Primitive(PrimitiveType::String),
        });
        registry
            .register_type("std_msgs/msg/Header", inner)
            .unwrap();

        let mut outer = MessageType::new("test/WithHeader".to_string());
        outer.add_field(Field {
            name: "header".to_string(),
            type_name: FieldType::Nested("std_msgs/msg/Header".to_string()),
        });

        let text = generate_definition(&outer, &registry).unwrap();
        assert!(text.starts_with("std_msgs/Header header"));
        assert!(text.contains("MSG: std_msgs/Header"));
        assert!(text.contains("string frame_id"));
    }

    #[test]
    fn test_generate_definition_unknown_nested_errors() {
        let registry = TypeRegistry::new();
        let mut t = MessageType::new("test/Dangling".to_string());
        t.add_field(Field {
            name: "missing".to_string(),
            type_name: FieldType::Nested("nope/msg/Missing".to_string()),
        });
        assert!(generate_definition(&t, &registry).is_err());
    }
}
