// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! The ROS1 wire format: little-endian, unaligned, no encapsulation header.
//!
//! Strings are a `uint32` length prefix followed by the raw bytes, with no
//! trailing NUL (unlike CDR's NUL-terminated strings). Sequences are a
//! `uint32` count followed by elements; fixed arrays are elements only.
//! Because there is no alignment, decoding is a direct recursive walk of
//! the field list rather than the align-aware plan [`crate::codec::cdr`]
//! needs.

use crate::core::{CodecError, CodecValue, DecodedMessage, PrimitiveType, Result};
use crate::schema::{FieldType, MessageSchema, MessageType, PrimitiveType as IdlPrimitiveType};

const MAX_SEQUENCE_LENGTH: usize = 10_000_000;
const NANOS_PER_SEC: i64 = 1_000_000_000;

/// A cursor over ROS1 wire bytes: little-endian, unaligned.
pub struct Ros1Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Ros1Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.offset + len > self.data.len() {
            return Err(CodecError::short_read(len, self.remaining(), self.offset as u64));
        }
        let slice = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.take(1)?[0] as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.take(2)?.try_into().unwrap()))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.take(2)?.try_into().unwrap()))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.take(len)
    }

    /// `uint32` length, raw UTF-8 bytes, no trailing NUL.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u32()? as usize;
        if len > MAX_SEQUENCE_LENGTH {
            return Err(CodecError::bad_length(len, self.offset, self.data.len()));
        }
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|e| CodecError::parse("ros1 string", e.to_string()))
    }
}

/// Accumulates a ROS1-encoded message, little-endian, unaligned.
#[derive(Default)]
pub struct Ros1Writer {
    buf: Vec<u8>,
}

impl Ros1Writer {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_i8(&mut self, v: i8) {
        self.buf.push(v as u8);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i16(&mut self, v: i16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_bytes(&mut self, v: &[u8]) {
        self.buf.extend_from_slice(v);
    }

    /// `uint32` length, raw UTF-8 bytes, no trailing NUL.
    pub fn write_string(&mut self, s: &str) {
        self.write_u32(s.len() as u32);
        self.buf.extend_from_slice(s.as_bytes());
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// Decodes ROS1 wire-format messages against a schema.
#[derive(Default)]
pub struct Ros1Decoder;

impl Ros1Decoder {
    pub fn new() -> Self {
        Self
    }

    pub fn decode(
        &self,
        schema: &MessageSchema,
        data: &[u8],
        type_name: Option<&str>,
    ) -> Result<DecodedMessage> {
        let type_name = type_name.unwrap_or(&schema.name);
        let msg_type = schema
            .get_type_variants(type_name)
            .ok_or_else(|| CodecError::unknown_type(type_name))?;

        let mut reader = Ros1Reader::new(data);
        let result = self.decode_fields(msg_type, schema, &mut reader)?;

        if reader.remaining() > 0 {
            return Err(CodecError::excess_bytes(reader.remaining(), data.len()));
        }

        Ok(result)
    }

    fn decode_fields(
        &self,
        msg_type: &MessageType,
        schema: &MessageSchema,
        reader: &mut Ros1Reader,
    ) -> Result<DecodedMessage> {
        let mut result = DecodedMessage::new();
        for field in &msg_type.fields {
            let value = self.decode_field(&field.type_name, schema, reader)?;
            result.insert(field.name.clone(), value);
        }
        Ok(result)
    }

    fn decode_field(
        &self,
        field_type: &FieldType,
        schema: &MessageSchema,
        reader: &mut Ros1Reader,
    ) -> Result<CodecValue> {
        match field_type {
            FieldType::Primitive(prim) => self.decode_primitive(*prim, reader),
            FieldType::Array { base_type, size } => {
                self.decode_sequence(base_type, Some(*size), schema, reader)
            }
            FieldType::Sequence { base_type, .. } => {
                self.decode_sequence(base_type, None, schema, reader)
            }
            FieldType::Nested(type_name) => {
                let nested = schema
                    .get_type_variants(type_name)
                    .ok_or_else(|| CodecError::unknown_type(type_name))?;
                Ok(CodecValue::Struct(
                    self.decode_fields(nested, schema, reader)?,
                ))
            }
        }
    }

    fn decode_sequence(
        &self,
        base_type: &FieldType,
        fixed_len: Option<usize>,
        schema: &MessageSchema,
        reader: &mut Ros1Reader,
    ) -> Result<CodecValue> {
        let len = match fixed_len {
            Some(n) => n,
            None => {
                let raw = reader.read_u32()? as usize;
                if raw > MAX_SEQUENCE_LENGTH {
                    return Err(CodecError::bad_length(raw, reader.position(), reader.position() + reader.remaining()));
                }
                raw
            }
        };

        let mut values = Vec::with_capacity(len.min(1024));
        for _ in 0..len {
            values.push(self.decode_field(base_type, schema, reader)?);
        }
        Ok(CodecValue::Array(values))
    }

    fn decode_primitive(&self, prim: IdlPrimitiveType, reader: &mut Ros1Reader) -> Result<CodecValue> {
        match prim {
            IdlPrimitiveType::Bool => Ok(CodecValue::Bool(reader.read_u8()? != 0)),
            IdlPrimitiveType::Int8 => Ok(CodecValue::Int8(reader.read_i8()?)),
            IdlPrimitiveType::Int16 => Ok(CodecValue::Int16(reader.read_i16()?)),
            IdlPrimitiveType::Int32 => Ok(CodecValue::Int32(reader.read_i32()?)),
            IdlPrimitiveType::Int64 => Ok(CodecValue::Int64(reader.read_i64()?)),
            IdlPrimitiveType::UInt8 | IdlPrimitiveType::Byte => {
                Ok(CodecValue::UInt8(reader.read_u8()?))
            }
            IdlPrimitiveType::UInt16 => Ok(CodecValue::UInt16(reader.read_u16()?)),
            IdlPrimitiveType::UInt32 => Ok(CodecValue::UInt32(reader.read_u32()?)),
            IdlPrimitiveType::UInt64 => Ok(CodecValue::UInt64(reader.read_u64()?)),
            IdlPrimitiveType::Float32 => Ok(CodecValue::Float32(reader.read_f32()?)),
            IdlPrimitiveType::Float64 => Ok(CodecValue::Float64(reader.read_f64()?)),
            IdlPrimitiveType::String | IdlPrimitiveType::WString => {
                Ok(CodecValue::String(reader.read_string()?))
            }
            IdlPrimitiveType::Char => Ok(CodecValue::Int8(reader.read_i8()?)),
            IdlPrimitiveType::Time => {
                let sec = reader.read_i32()? as i64;
                let nsec = reader.read_u32()? as i64;
                Ok(CodecValue::Timestamp(sec.saturating_mul(NANOS_PER_SEC).saturating_add(nsec)))
            }
            IdlPrimitiveType::Duration => {
                let sec = reader.read_i32()? as i64;
                let nsec = reader.read_u32()? as i64;
                let nanos = if sec < 0 {
                    sec.saturating_mul(NANOS_PER_SEC).saturating_sub(nsec)
                } else {
                    sec.saturating_mul(NANOS_PER_SEC).saturating_add(nsec)
                };
                Ok(CodecValue::Duration(nanos))
            }
        }
    }
}

/// Encodes messages into the ROS1 wire format against a schema.
#[derive(Default)]
pub struct Ros1Encoder;

impl Ros1Encoder {
    pub fn new() -> Self {
        Self
    }

    pub fn encode(
        &self,
        schema: &MessageSchema,
        message: &DecodedMessage,
        type_name: Option<&str>,
    ) -> Result<Vec<u8>> {
        let type_name = type_name.unwrap_or(&schema.name);
        let msg_type = schema
            .get_type_variants(type_name)
            .ok_or_else(|| CodecError::unknown_type(type_name))?;

        let mut writer = Ros1Writer::new();
        self.encode_fields(msg_type, schema, message, &mut writer)?;
        Ok(writer.into_bytes())
    }

    fn encode_fields(
        &self,
        msg_type: &MessageType,
        schema: &MessageSchema,
        message: &DecodedMessage,
        writer: &mut Ros1Writer,
    ) -> Result<()> {
        for field in &msg_type.fields {
            let value = message
                .get(&field.name)
                .ok_or_else(|| CodecError::encode("ros1", format!("missing field '{}'", field.name)))?;
            self.encode_field(&field.type_name, schema, value, writer)?;
        }
        Ok(())
    }

    fn encode_field(
        &self,
        field_type: &FieldType,
        schema: &MessageSchema,
        value: &CodecValue,
        writer: &mut Ros1Writer,
    ) -> Result<()> {
        match field_type {
            FieldType::Primitive(prim) => self.encode_primitive(*prim, value, writer),
            FieldType::Array { base_type, size } => {
                self.encode_sequence(base_type, Some(*size), schema, value, writer)
            }
            FieldType::Sequence { base_type, .. } => {
                self.encode_sequence(base_type, None, schema, value, writer)
            }
            FieldType::Nested(type_name) => {
                let nested = schema
                    .get_type_variants(type_name)
                    .ok_or_else(|| CodecError::unknown_type(type_name))?;
                match value {
                    CodecValue::Struct(fields) => {
                        let as_map: DecodedMessage = fields.clone();
                        self.encode_fields(nested, schema, &as_map, writer)
                    }
                    other => Err(CodecError::encode("ros1", format!("expected struct, got {other:?}"))),
                }
            }
        }
    }

    fn encode_sequence(
        &self,
        base_type: &FieldType,
        fixed_len: Option<usize>,
        schema: &MessageSchema,
        value: &CodecValue,
        writer: &mut Ros1Writer,
    ) -> Result<()> {
        let elements = match value {
            CodecValue::Array(v) => v,
            other => return Err(CodecError::encode("ros1", format!("expected array, got {other:?}"))),
        };

        if let Some(n) = fixed_len {
            if elements.len() != n {
                return Err(CodecError::encode(
                    "ros1",
                    format!("fixed array length mismatch: expected {n}, got {}", elements.len()),
                ));
            }
        } else {
            writer.write_u32(elements.len() as u32);
        }

        for element in elements {
            self.encode_field(base_type, schema, element, writer)?;
        }
        Ok(())
    }

    fn encode_primitive(
        &self,
        prim: IdlPrimitiveType,
        value: &CodecValue,
        writer: &mut Ros1Writer,
    ) -> Result<()> {
        match (prim, value) {
            (IdlPrimitiveType::Bool, CodecValue::Bool(v)) => writer.write_u8(*v as u8),
            (IdlPrimitiveType::Int8, CodecValue::Int8(v)) => writer.write_i8(*v),
            (IdlPrimitiveType::Int16, CodecValue::Int16(v)) => writer.write_i16(*v),
            (IdlPrimitiveType::Int32, CodecValue::Int32(v)) => writer.write_i32(*v),
            (IdlPrimitiveType::Int64, CodecValue::Int64(v)) => writer.write_i64(*v),
            (IdlPrimitiveType::UInt8 | IdlPrimitiveType::Byte, CodecValue::UInt8(v)) => {
                writer.write_u8(*v)
            }
            (IdlPrimitiveType::UInt16, CodecValue::UInt16(v)) => writer.write_u16(*v),
            (IdlPrimitiveType::UInt32, CodecValue::UInt32(v)) => writer.write_u32(*v),
            (IdlPrimitiveType::UInt64, CodecValue::UInt64(v)) => writer.write_u64(*v),
            (IdlPrimitiveType::Float32, CodecValue::Float32(v)) => writer.write_f32(*v),
            (IdlPrimitiveType::Float64, CodecValue::Float64(v)) => writer.write_f64(*v),
            (IdlPrimitiveType::String | IdlPrimitiveType::WString, CodecValue::String(v)) => {
                writer.write_string(v)
            }
            (IdlPrimitiveType::Char, CodecValue::Int8(v)) => writer.write_i8(*v),
            (IdlPrimitiveType::Time, CodecValue::Timestamp(nanos)) => {
                let sec = (*nanos).div_euclid(NANOS_PER_SEC);
                let nsec = (*nanos).rem_euclid(NANOS_PER_SEC);
                writer.write_i32(sec as i32);
                writer.write_u32(nsec as u32);
            }
            (IdlPrimitiveType::Duration, CodecValue::Duration(nanos)) => {
                let sec = (*nanos).div_euclid(NANOS_PER_SEC);
                let nsec = (*nanos).rem_euclid(NANOS_PER_SEC);
                writer.write_i32(sec as i32);
                writer.write_u32(nsec as u32);
            }
            (prim, other) => {
                return Err(CodecError::encode(
                    "ros1",
                    format!("cannot encode {other:?} as {}", prim.ros1_name()),
                ))
            }
        }
        Ok(())
    }
}

/// Convert a `core::PrimitiveType` sizing helper used by transcoding to
/// decide a field's fixed wire width, when one exists.
pub fn primitive_fixed_size(prim: PrimitiveType) -> Option<usize> {
    prim.size()
}
