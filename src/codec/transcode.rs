// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Direct ROS1 <-> CDR transcoding.
//!
//! Converting a message between the two wire formats never needs to
//! materialize a [`crate::CodecValue`] tree: every field is read from one
//! cursor and written straight to the other, byte by byte, guided by the
//! schema alone. This is cheaper than decode-then-encode and is what
//! [`crate::convert`] uses when moving messages between rosbag1 and
//! rosbag2 containers.
//!
//! ## Header bridging
//!
//! `std_msgs/msg/Header` is registered in its ROS2 form (`stamp`,
//! `frame_id`), but the ROS1 wire form of the same message carries a
//! leading `uint32 seq` that ROS2 dropped. Transcoding a nested `Header`
//! field therefore special-cases it: ROS1 -> CDR reads and discards the
//! leading 4 bytes; CDR -> ROS1 writes 4 zero bytes before the rest of
//! the fields.

use crate::codec::cdr::cursor::CdrCursor;
use crate::codec::cdr::encoder::CdrEncoder;
use crate::codec::ros1::{Ros1Reader, Ros1Writer};
use crate::core::{CodecError, Result};
use crate::schema::{FieldType, MessageSchema, MessageType, PrimitiveType as IdlPrimitiveType};

fn is_header_type(msg_type: &MessageType) -> bool {
    let name = msg_type.name.replace("::", "/");
    name == "std_msgs/msg/Header" || name == "std_msgs/Header" || name.ends_with("/msg/Header")
}

fn resolve<'a>(schema: &'a MessageSchema, type_name: &str) -> Result<&'a MessageType> {
    schema
        .get_type_variants(type_name)
        .ok_or_else(|| CodecError::unknown_type(type_name))
}

/// Transcode a single message from the ROS1 wire format to CDR.
///
/// `type_name` must resolve against `schema`. The result is a complete CDR
/// message, including the 4-byte encapsulation header.
pub fn ros1_to_cdr(schema: &MessageSchema, type_name: &str, data: &[u8]) -> Result<Vec<u8>> {
    let msg_type = resolve(schema, type_name)?;
    let mut reader = Ros1Reader::new(data);
    let mut writer = CdrEncoder::new();

    transcode_fields_ros1_to_cdr(msg_type, schema, &mut reader, &mut writer)?;

    if reader.remaining() > 0 {
        return Err(CodecError::excess_bytes(reader.remaining(), data.len()));
    }

    Ok(writer.finish())
}

/// Transcode a single message from CDR to the ROS1 wire format.
///
/// `data` must include the 4-byte CDR encapsulation header.
pub fn cdr_to_ros1(schema: &MessageSchema, type_name: &str, data: &[u8]) -> Result<Vec<u8>> {
    let msg_type = resolve(schema, type_name)?;
    let mut reader = CdrCursor::new(data)?;
    let mut writer = Ros1Writer::new();

    transcode_fields_cdr_to_ros1(msg_type, schema, &mut reader, &mut writer)?;

    if reader.remaining() > 0 {
        return Err(CodecError::excess_bytes(reader.remaining(), data.len()));
    }

    Ok(writer.into_bytes())
}

fn transcode_fields_ros1_to_cdr(
    msg_type: &MessageType,
    schema: &MessageSchema,
    reader: &mut Ros1Reader,
    writer: &mut CdrEncoder,
) -> Result<()> {
    for field in &msg_type.fields {
        transcode_field_ros1_to_cdr(&field.type_name, schema, reader, writer)?;
    }
    Ok(())
}

fn transcode_field_ros1_to_cdr(
    field_type: &FieldType,
    schema: &MessageSchema,
    reader: &mut Ros1Reader,
    writer: &mut CdrEncoder,
) -> Result<()> {
    match field_type {
        FieldType::Primitive(prim) => transcode_primitive_ros1_to_cdr(*prim, reader, writer),
        FieldType::Array { base_type, size } => {
            for _ in 0..*size {
                transcode_field_ros1_to_cdr(base_type, schema, reader, writer)?;
            }
            Ok(())
        }
        FieldType::Sequence { base_type, .. } => {
            let len = reader.read_u32()? as usize;
            writer.sequence_length(len)?;
            for _ in 0..len {
                transcode_field_ros1_to_cdr(base_type, schema, reader, writer)?;
            }
            Ok(())
        }
        FieldType::Nested(type_name) => {
            let nested = resolve(schema, type_name)?;
            // CDR1 alignment is always relative to the stream origin, never to
            // nested struct boundaries, so align to the nested type's own max
            // alignment here instead of pushing a new origin.
            writer.align_to(nested.max_alignment as usize);
            if is_header_type(nested) {
                reader.read_u32()?; // drop ROS1's leading seq
            }
            transcode_fields_ros1_to_cdr(nested, schema, reader, writer)?;
            Ok(())
        }
    }
}

fn transcode_primitive_ros1_to_cdr(
    prim: IdlPrimitiveType,
    reader: &mut Ros1Reader,
    writer: &mut CdrEncoder,
) -> Result<()> {
    match prim {
        IdlPrimitiveType::Bool => {
            writer.uint8(reader.read_u8()?)?;
        }
        IdlPrimitiveType::Int8 | IdlPrimitiveType::Char => {
            writer.int8(reader.read_i8()?)?;
        }
        IdlPrimitiveType::UInt8 | IdlPrimitiveType::Byte => {
            writer.uint8(reader.read_u8()?)?;
        }
        IdlPrimitiveType::Int16 => {
            writer.int16(reader.read_i16()?)?;
        }
        IdlPrimitiveType::UInt16 => {
            writer.uint16(reader.read_u16()?)?;
        }
        IdlPrimitiveType::Int32 => {
            writer.int32(reader.read_i32()?)?;
        }
        IdlPrimitiveType::UInt32 => {
            writer.uint32(reader.read_u32()?)?;
        }
        IdlPrimitiveType::Int64 => {
            writer.int64(reader.read_i64()?)?;
        }
        IdlPrimitiveType::UInt64 => {
            writer.uint64(reader.read_u64()?)?;
        }
        IdlPrimitiveType::Float32 => {
            writer.float32(reader.read_f32()?)?;
        }
        IdlPrimitiveType::Float64 => {
            writer.float64(reader.read_f64()?)?;
        }
        IdlPrimitiveType::String | IdlPrimitiveType::WString => {
            writer.string(&reader.read_string()?)?;
        }
        IdlPrimitiveType::Time | IdlPrimitiveType::Duration => {
            writer.int32(reader.read_i32()?)?;
            writer.uint32(reader.read_u32()?)?;
        }
    }
    Ok(())
}

fn transcode_fields_cdr_to_ros1(
    msg_type: &MessageType,
    schema: &MessageSchema,
    reader: &mut CdrCursor,
    writer: &mut Ros1Writer,
) -> Result<()> {
    for field in &msg_type.fields {
        transcode_field_cdr_to_ros1(&field.type_name, schema, reader, writer)?;
    }
    Ok(())
}

fn transcode_field_cdr_to_ros1(
    field_type: &FieldType,
    schema: &MessageSchema,
    reader: &mut CdrCursor,
    writer: &mut Ros1Writer,
) -> Result<()> {
    match field_type {
        FieldType::Primitive(prim) => transcode_primitive_cdr_to_ros1(*prim, reader, writer),
        FieldType::Array { base_type, size } => {
            for _ in 0..*size {
                transcode_field_cdr_to_ros1(base_type, schema, reader, writer)?;
            }
            Ok(())
        }
        FieldType::Sequence { base_type, .. } => {
            let len = reader.read_u32()? as usize;
            writer.write_u32(len as u32);
            for _ in 0..len {
                transcode_field_cdr_to_ros1(base_type, schema, reader, writer)?;
            }
            Ok(())
        }
        FieldType::Nested(type_name) => {
            let nested = resolve(schema, type_name)?;
            // CDR1 alignment is always relative to the stream origin, never to
            // nested struct boundaries, so align to the nested type's own max
            // alignment here instead of pushing a new origin.
            reader.align(nested.max_alignment as usize)?;
            if is_header_type(nested) {
                writer.write_u32(0); // inject zero seq for ROS1
            }
            transcode_fields_cdr_to_ros1(nested, schema, reader, writer)?;
            Ok(())
        }
    }
}

fn transcode_primitive_cdr_to_ros1(
    prim: IdlPrimitiveType,
    reader: &mut CdrCursor,
    writer: &mut Ros1Writer,
) -> Result<()> {
    match prim {
        IdlPrimitiveType::Bool => writer.write_u8(reader.read_u8()?),
        IdlPrimitiveType::Int8 | IdlPrimitiveType::Char => writer.write_i8(reader.read_i8()?),
        IdlPrimitiveType::UInt8 | IdlPrimitiveType::Byte => writer.write_u8(reader.read_u8()?),
        IdlPrimitiveType::Int16 => writer.write_i16(reader.read_i16()?),
        IdlPrimitiveType::UInt16 => writer.write_u16(reader.read_u16()?),
        IdlPrimitiveType::Int32 => writer.write_i32(reader.read_i32()?),
        IdlPrimitiveType::UInt32 => writer.write_u32(reader.read_u32()?),
        IdlPrimitiveType::Int64 => writer.write_i64(reader.read_i64()?),
        IdlPrimitiveType::UInt64 => writer.write_u64(reader.read_u64()?),
        IdlPrimitiveType::Float32 => writer.write_f32(reader.read_f32()?),
        IdlPrimitiveType::Float64 => writer.write_f64(reader.read_f64()?),
        IdlPrimitiveType::String | IdlPrimitiveType::WString => {
            writer.write_string(&read_cdr_string(reader)?)
        }
        IdlPrimitiveType::Time | IdlPrimitiveType::Duration => {
            writer.write_i32(reader.read_i32()?);
            writer.write_u32(reader.read_u32()?);
        }
    }
    Ok(())
}

/// Read a NUL-terminated CDR string and strip the terminator.
fn read_cdr_string(reader: &mut CdrCursor) -> Result<String> {
    let len = reader.read_u32()? as usize;
    if len == 0 {
        return Ok(String::new());
    }
    let bytes = reader.read_bytes(len)?;
    let without_nul = &bytes[..bytes.len().saturating_sub(1)];
    std::str::from_utf8(without_nul)
        .map(str::to_string)
        .map_err(|e| CodecError::parse("cdr string", e.to_string()))
}
