// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Converts between rosbag1 and rosbag2, dispatching on whether `source` is
//! a file (rosbag1) or a directory (rosbag2).
//!
//! Messages are moved through [`crate::codec::transcode`] byte cursors
//! directly; a [`crate::schema::MessageType`] is only ever materialized to
//! resolve field layout, never to build a [`crate::CodecValue`] tree.

use std::path::Path;

use tracing::{debug, warn};

use crate::bag1;
use crate::bag2;
use crate::bag2::metadata::{QosProfile, QosProfilesField};
use crate::codec::transcode::{cdr_to_ros1, ros1_to_cdr};
use crate::core::{CodecError, Result};
use crate::schema::ast::MessageType;
use crate::schema::registry::{global_registry, TypeRegistry};
use crate::schema::{parse_schema_with_encoding, MessageSchema, SchemaFormat};

/// Options controlling a conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub bag1_writer: bag1::WriterConfig,
    pub bag2_writer: bag2::WriterConfig,
}

/// Convert `source` to `dest`.
///
/// `source` being a regular file is read as rosbag1 and written to `dest`
/// as a rosbag2 directory. `source` being a directory is read as rosbag2
/// and written to `dest` as a rosbag1 file.
pub fn convert<P1: AsRef<Path>, P2: AsRef<Path>>(
    source: P1,
    dest: P2,
    options: &ConvertOptions,
) -> Result<()> {
    let source = source.as_ref();
    let dest = dest.as_ref();

    let is_dir = std::fs::metadata(source)
        .map_err(|e| CodecError::not_found(format!("{}: {e}", source.display())))?
        .is_dir();

    if is_dir {
        rosbag2_to_rosbag1(source, dest, options)
    } else {
        rosbag1_to_rosbag2(source, dest, options)
    }
}

/// Normalize a ROS1-text type name (`pkg/Type`) to its ROS2 registry form
/// (`pkg/msg/Type`).
fn to_ros2_name(name: &str) -> String {
    if name.contains("/msg/") || !name.contains('/') {
        return name.to_string();
    }
    let mut parts = name.splitn(2, '/');
    let package = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default();
    format!("{package}/msg/{rest}")
}

fn rosbag1_to_rosbag2(source: &Path, dest: &Path, options: &ConvertOptions) -> Result<()> {
    debug!(src = %source.display(), dst = %dest.display(), "converting rosbag1 -> rosbag2");

    let reader = bag1::BagReader::open(source)?;
    let mut writer = bag2::BagWriter::create(dest, options.bag2_writer)?;

    let mut schema = MessageSchema::new("converted".to_string());
    let mut topic_to_msgtype = std::collections::HashMap::new();

    let mut connection_ids: Vec<_> = reader.connections().keys().copied().collect();
    connection_ids.sort_unstable();

    for conn_id in &connection_ids {
        let conn = &reader.connections()[conn_id];

        let parsed = parse_schema_with_encoding(
            &conn.msgtype,
            &conn.message_definition,
            SchemaFormat::Msg,
        )?;
        for (name, msg_type) in parsed.types {
            schema.add_type(rename_type(msg_type, &to_ros2_name(&name)));
        }

        let msgtype = to_ros2_name(&conn.msgtype);
        let qos = if conn.latching {
            QosProfilesField::List(vec![QosProfile::transient_local_default()])
        } else {
            QosProfilesField::List(vec![QosProfile::volatile_default()])
        };
        writer.add_connection(conn.topic.as_str(), msgtype.as_str(), "cdr", qos)?;
        topic_to_msgtype.insert(conn.topic.clone(), msgtype);
    }

    for msg in reader.messages()? {
        let msgtype = topic_to_msgtype
            .get(&msg.topic)
            .ok_or_else(|| CodecError::not_found(format!("connection for topic '{}'", msg.topic)))?;
        let cdr = ros1_to_cdr(&schema, msgtype, &msg.data)?;
        writer.write_message(&msg.topic, msg.timestamp_ns as i64, &cdr)?;
    }

    writer.finish()?;
    debug!("rosbag1 -> rosbag2 conversion complete");
    Ok(())
}

fn rosbag2_to_rosbag1(source: &Path, dest: &Path, options: &ConvertOptions) -> Result<()> {
    debug!(src = %source.display(), dst = %dest.display(), "converting rosbag2 -> rosbag1");

    let reader = bag2::BagReader::open(source)?;
    let mut writer = bag1::BagWriter::create(dest, options.bag1_writer.clone())?;

    let registry = global_registry();
    let schema = schema_from_registry(registry)?;

    let mut topic_to_conn_id = std::collections::HashMap::new();
    let mut topic_to_msgtype = std::collections::HashMap::new();

    let mut topics: Vec<_> = reader.connections().keys().cloned().collect();
    topics.sort_unstable();

    for topic in &topics {
        let conn = &reader.connections()[topic];
        let msg_type = registry.get_variants(&conn.msgtype)?.ok_or_else(|| {
            warn!(msgtype = %conn.msgtype, "rosbag2 type not found in registry");
            CodecError::unknown_type(conn.msgtype.clone())
        })?;

        let latching = conn.offered_qos_profiles.has_transient_local_durability();
        let conn_id = writer.add_connection(conn.topic.as_str(), &msg_type, registry, "", latching)?;
        topic_to_conn_id.insert(conn.topic.clone(), conn_id);
        topic_to_msgtype.insert(conn.topic.clone(), conn.msgtype.clone());
    }

    for msg in reader.messages()? {
        let conn_id = *topic_to_conn_id
            .get(&msg.topic)
            .ok_or_else(|| CodecError::not_found(format!("connection for topic '{}'", msg.topic)))?;
        let msgtype = &topic_to_msgtype[&msg.topic];
        let ros1 = cdr_to_ros1(&schema, msgtype, &msg.data)?;
        writer.write_message(conn_id, msg.timestamp_ns as u64, &ros1)?;
    }

    writer.finish()?;
    debug!("rosbag2 -> rosbag1 conversion complete");
    Ok(())
}

/// Every registered type, assembled into one [`MessageSchema`] so
/// `get_type_variants` can resolve nested references during transcoding.
fn schema_from_registry(registry: &TypeRegistry) -> Result<MessageSchema> {
    let mut schema = MessageSchema::new("registry".to_string());
    for name in registry.names()? {
        if let Some(msg_type) = registry.get(&name)? {
            schema.add_type(msg_type);
        }
    }
    Ok(schema)
}

fn rename_type(mut msg_type: MessageType, name: &str) -> MessageType {
    msg_type.name = name.to_string();
    msg_type
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_ros2_name_inserts_msg_infix() {
        assert_eq!(to_ros2_name("std_msgs/String"), "std_msgs/msg/String");
    }

    #[test]
    fn test_to_ros2_name_is_idempotent() {
        assert_eq!(
            to_ros2_name("std_msgs/msg/String"),
            "std_msgs/msg/String"
        );
    }

    #[test]
    fn test_to_ros2_name_leaves_bare_name_alone() {
        assert_eq!(to_ros2_name("String"), "String");
    }

    #[test]
    fn test_roundtrip_rosbag1_to_rosbag2_to_rosbag1() {
        let dir = tempfile::tempdir().unwrap();
        let bag1_path = dir.path().join("input.bag");
        let bag2_path = dir.path().join("output_bag");
        let bag1_again_path = dir.path().join("roundtrip.bag");

        let registry = TypeRegistry::new();
        let mut msg_type = MessageType::new("test_msgs/Int32".to_string());
        msg_type.add_field(crate::schema::ast::Field {
            name: "data".to_string(),
            type_name: crate::schema::ast::FieldType::Primitive(
                crate::schema::ast::PrimitiveType::Int32,
            ),
        });

        let mut writer = bag1::BagWriter::create(&bag1_path, bag1::WriterConfig::default()).unwrap();
        let conn_id = writer
            .add_connection("/value", &msg_type, &registry, "/node", false)
            .unwrap();
        writer
            .write_message(conn_id, 1_000_000_000, &7i32.to_le_bytes())
            .unwrap();
        writer.finish().unwrap();

        convert(&bag1_path, &bag2_path, &ConvertOptions::default()).unwrap();

        let bag2_reader = bag2::BagReader::open(&bag2_path).unwrap();
        assert_eq!(bag2_reader.message_count(), 1);

        // Register the same type globally so the reverse direction resolves it.
        global_registry()
            .register_type("test_msgs/msg/Int32", {
                let mut t = MessageType::new("test_msgs/msg/Int32".to_string());
                t.add_field(crate::schema::ast::Field {
                    name: "data".to_string(),
                    type_name: crate::schema::ast::FieldType::Primitive(
                        crate::schema::ast::PrimitiveType::Int32,
                    ),
                });
                t
            })
            .unwrap();

        convert(&bag2_path, &bag1_again_path, &ConvertOptions::default()).unwrap();
        let bag1_reader = bag1::BagReader::open(&bag1_again_path).unwrap();
        let messages = bag1_reader.messages().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].data, 7i32.to_le_bytes());
    }
}
