// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! rosbag1 decode integration tests.
//!
//! Verifies that messages written with [`bag1::BagWriter`] come back out of
//! [`bag1::BagReader`] byte-for-byte, and decode through [`CdrDecoder`] once
//! transcoded from the ROS1 wire format to CDR.

use robocodec::bag1;
use robocodec::codec::cdr::CdrDecoder;
use robocodec::codec::transcode::ros1_to_cdr;
use robocodec::schema::ast::{Field, FieldType, MessageType, PrimitiveType};
use robocodec::schema::registry::TypeRegistry;
use robocodec::schema::MessageSchema;

fn header_msg(name: &str) -> MessageType {
    let mut t = MessageType::new(name.to_string());
    t.add_field(Field {
        name: "data".to_string(),
        type_name: FieldType::Primitive(PrimitiveType::String),
    });
    t
}

#[test]
fn test_decode_messages_round_trips_through_reader() {
    let dir = tempfile::tempdir().unwrap();
    let bag_path = dir.path().join("test.bag");

    let registry = TypeRegistry::new();
    let msg_type = header_msg("std_msgs/String");

    let mut writer = bag1::BagWriter::create(&bag_path, bag1::WriterConfig::default()).unwrap();
    let conn_id = writer
        .add_connection("/chatter", &msg_type, &registry, "/node", false)
        .unwrap();

    let mut payload = 5u32.to_le_bytes().to_vec();
    payload.extend_from_slice(b"hello");
    writer.write_message(conn_id, 1_000_000_000, &payload).unwrap();
    writer.finish().unwrap();

    let reader = bag1::BagReader::open(&bag_path).unwrap();
    let messages = reader.messages().unwrap();

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].topic, "/chatter");
    assert_eq!(messages[0].msgtype, "std_msgs/String");
    assert_eq!(messages[0].data, payload);
}

#[test]
fn test_decode_ros1_message_via_cdr_transcode() {
    let mut schema = MessageSchema::new("test".to_string());
    schema.add_type(header_msg("std_msgs/String"));

    let mut payload = 5u32.to_le_bytes().to_vec();
    payload.extend_from_slice(b"hello");

    let cdr = ros1_to_cdr(&schema, "std_msgs/String", &payload).expect("transcode to CDR");

    let decoder = CdrDecoder::new();
    let decoded = decoder
        .decode(&schema, &cdr, Some("std_msgs/String"))
        .expect("decode CDR message");

    let value = decoded.get("data").expect("data field present");
    assert_eq!(value.as_str(), Some("hello"));
}
