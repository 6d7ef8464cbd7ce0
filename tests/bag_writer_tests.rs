// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! rosbag1 writer tests.
//!
//! Tests cover:
//! - BagWriter file creation and header layout
//! - Adding connections
//! - Writing messages and chunking behavior
//! - Round-trip verification (write and read back)
//! - Error handling for unfinished bags

use std::fs;
use std::path::PathBuf;

use robocodec::bag1::reader::BagReader;
use robocodec::bag1::writer::{BagWriter, WriterConfig};
use robocodec::schema::ast::{Field, FieldType, MessageType, PrimitiveType};
use robocodec::schema::registry::TypeRegistry;
use robocodec::CodecError;

fn temp_dir() -> PathBuf {
    let random = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    std::env::temp_dir().join(format!(
        "robocodec_bag_writer_test_{}_{}",
        std::process::id(),
        random
    ))
}

fn temp_bag_path(name: &str) -> (PathBuf, CleanupGuard) {
    let dir = temp_dir();
    fs::create_dir_all(&dir).ok();
    let path = dir.join(format!("{}.bag", name));
    let guard = CleanupGuard(dir);
    (path, guard)
}

struct CleanupGuard(PathBuf);

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn string_msg(name: &str) -> MessageType {
    let mut t = MessageType::new(name.to_string());
    t.add_field(Field {
        name: "data".to_string(),
        type_name: FieldType::Primitive(PrimitiveType::String),
    });
    t
}

fn int32_msg(name: &str) -> MessageType {
    let mut t = MessageType::new(name.to_string());
    t.add_field(Field {
        name: "data".to_string(),
        type_name: FieldType::Primitive(PrimitiveType::Int32),
    });
    t
}

// ============================================================================
// BagWriter Creation Tests
// ============================================================================

#[test]
fn test_writer_creates_file() {
    let (path, _guard) = temp_bag_path("test_creates_file");

    let writer = BagWriter::create(&path, WriterConfig::default());
    assert!(writer.is_ok(), "BagWriter::create should succeed: {:?}", writer.err());

    writer.unwrap().finish().unwrap();
    assert!(path.exists(), "bag file should be created at {:?}", path);
}

#[test]
fn test_writer_creates_valid_version_header() {
    let (path, _guard) = temp_bag_path("test_version_header");

    let writer = BagWriter::create(&path, WriterConfig::default()).unwrap();
    writer.finish().unwrap();

    let contents = fs::read(&path).unwrap();
    let version_line = "#ROSBAG V2.0\n";
    assert!(
        contents.starts_with(version_line.as_bytes()),
        "bag file should start with ROSBAG version line"
    );
}

#[test]
fn test_writer_file_header_is_4096_bytes() {
    let (path, _guard) = temp_bag_path("test_header_size");

    let writer = BagWriter::create(&path, WriterConfig::default()).unwrap();
    writer.finish().unwrap();

    let contents = fs::read(&path).unwrap();
    assert!(
        contents.len() >= 4096,
        "bag file should have at least a 4096-byte file header, got {}",
        contents.len()
    );
}

// ============================================================================
// Connection Tests
// ============================================================================

#[test]
fn test_add_single_connection() {
    let (path, _guard) = temp_bag_path("test_add_connection");
    let registry = TypeRegistry::new();

    let mut writer = BagWriter::create(&path, WriterConfig::default()).unwrap();
    let result = writer.add_connection("/chatter", &string_msg("std_msgs/String"), &registry, "/node", false);

    assert!(result.is_ok(), "add_connection should succeed: {:?}", result.err());
    writer.finish().unwrap();
}

#[test]
fn test_add_multiple_connections() {
    let (path, _guard) = temp_bag_path("test_multiple_connections");
    let registry = TypeRegistry::new();

    let mut writer = BagWriter::create(&path, WriterConfig::default()).unwrap();

    assert!(writer
        .add_connection("/chatter", &string_msg("std_msgs/String"), &registry, "/node", false)
        .is_ok());
    assert!(writer
        .add_connection("/numbers", &int32_msg("std_msgs/Int32"), &registry, "/node", false)
        .is_ok());
    assert!(writer
        .add_connection("/camera", &string_msg("sensor_msgs/Image"), &registry, "/node", false)
        .is_ok());

    writer.finish().unwrap();

    let reader = BagReader::open(&path).unwrap();
    assert_eq!(reader.connections().len(), 3);
}

// ============================================================================
// Message Writing Tests
// ============================================================================

#[test]
fn test_write_single_message() {
    let (path, _guard) = temp_bag_path("test_write_single");
    let registry = TypeRegistry::new();

    let mut writer = BagWriter::create(&path, WriterConfig::default()).unwrap();
    let conn_id = writer
        .add_connection("/chatter", &string_msg("std_msgs/String"), &registry, "/node", false)
        .unwrap();

    let result = writer.write_message(conn_id, 1_000_000_000, &[1, 2, 3, 4]);
    assert!(result.is_ok(), "write_message should succeed: {:?}", result.err());

    writer.finish().unwrap();
}

#[test]
fn test_write_multiple_messages_forces_chunk_flush() {
    let (path, _guard) = temp_bag_path("test_multiple_messages");
    let registry = TypeRegistry::new();

    // A tiny chunk threshold forces several chunk flushes across 10 messages.
    let config = WriterConfig {
        chunk_threshold: 16,
    };
    let mut writer = BagWriter::create(&path, config).unwrap();
    let conn_id = writer
        .add_connection("/chatter", &int32_msg("std_msgs/Int32"), &registry, "/node", false)
        .unwrap();

    for i in 0..10u64 {
        writer
            .write_message(conn_id, i * 1_000_000_000, &(i as i32).to_le_bytes())
            .unwrap();
    }
    writer.finish().unwrap();

    let reader = BagReader::open(&path).unwrap();
    let messages = reader.messages().unwrap();
    assert_eq!(messages.len(), 10, "all messages across chunk boundaries should survive");
}

// ============================================================================
// Round-Trip Integration Tests
// ============================================================================

#[test]
fn test_round_trip_single_message() {
    let (path, _guard) = temp_bag_path("test_round_trip_single");
    let registry = TypeRegistry::new();

    let mut writer = BagWriter::create(&path, WriterConfig::default()).unwrap();
    let conn_id = writer
        .add_connection("/chatter", &string_msg("std_msgs/String"), &registry, "/node", false)
        .unwrap();

    let data = vec![0x48, 0x65, 0x6c, 0x6c, 0x6f]; // "Hello"
    writer.write_message(conn_id, 1_500_000_000, &data).unwrap();
    writer.finish().unwrap();

    let reader = BagReader::open(&path).unwrap();
    let connections = reader.connections();
    assert_eq!(connections.len(), 1, "should have 1 connection");

    let conn = connections.values().next().unwrap();
    assert_eq!(conn.topic, "/chatter");
    assert_eq!(conn.msgtype, "std_msgs/String");
}

#[test]
fn test_round_trip_message_data_preserved() {
    let (path, _guard) = temp_bag_path("test_round_trip_data");
    let registry = TypeRegistry::new();

    let test_data_1 = vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
    let test_data_2 = vec![0xAA, 0xBB, 0xCC, 0xDD];
    let test_data_3 = vec![0xFF, 0xFE, 0xFD, 0xFC, 0xFB];

    let mut writer = BagWriter::create(&path, WriterConfig::default()).unwrap();
    let conn_id = writer
        .add_connection("/chatter", &string_msg("std_msgs/String"), &registry, "/node", false)
        .unwrap();

    writer.write_message(conn_id, 1_000_000_000, &test_data_1).unwrap();
    writer.write_message(conn_id, 2_000_000_000, &test_data_2).unwrap();
    writer.write_message(conn_id, 3_000_000_000, &test_data_3).unwrap();
    writer.finish().unwrap();

    assert!(path.exists(), "bag file should exist");

    let reader = BagReader::open(&path).unwrap();
    let mut messages = reader.messages().unwrap();
    messages.sort_by_key(|m| m.timestamp_ns);

    assert_eq!(messages.len(), 3, "should have 3 messages");
    assert_eq!(messages[0].timestamp_ns, 1_000_000_000);
    assert_eq!(messages[1].timestamp_ns, 2_000_000_000);
    assert_eq!(messages[2].timestamp_ns, 3_000_000_000);

    assert_eq!(messages[0].data, test_data_1, "first message data should match");
    assert_eq!(messages[1].data, test_data_2, "second message data should match");
    assert_eq!(messages[2].data, test_data_3, "third message data should match");
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[test]
fn test_opening_unfinished_bag_fails_unindexed() {
    let (path, _guard) = temp_bag_path("test_unfinished");
    let registry = TypeRegistry::new();

    let mut writer = BagWriter::create(&path, WriterConfig::default()).unwrap();
    writer
        .add_connection("/chatter", &string_msg("std_msgs/String"), &registry, "/node", false)
        .unwrap();
    writer.write_message(0, 1_000_000_000, &[1, 2, 3]).unwrap();
    // Dropped without calling `finish`: index_pos stays zeroed.
    drop(writer);

    let result = BagReader::open(&path);
    assert!(result.is_err(), "opening an unfinished bag should fail");
    assert!(matches!(result.unwrap_err(), CodecError::Unindexed { .. }));
}
