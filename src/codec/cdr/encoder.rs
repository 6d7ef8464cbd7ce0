// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CDR encoder for writing CDR-encoded data.
//!
//! Based on the TypeScript implementation at:
//! https://github.com/emulated-devices/rtps-cdr/blob/main/src/CdrWriter.ts

use super::{calculator::CdrCalculator, CDR_HEADER_SIZE};
use crate::core::Result as CoreResult;
use crate::core::{CodecValue, DecodedMessage};
use crate::schema::{FieldType, MessageSchema, PrimitiveType as IdlPrimitiveType};

/// Default initial capacity for the encoder buffer.
const DEFAULT_CAPACITY: usize = 16;

/// Nanoseconds per second for time/duration conversion.
const NANOS_PER_SEC: i64 = 1_000_000_000;

/// CDR encapsulation kind.
///
/// Defines the encoding format and endianness of the CDR data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum EncapsulationKind {
    /// CDR, Little Endian
    #[default]
    CdrLe = 0x01,
    /// CDR, Big Endian
    CdrBe = 0x00,
    /// CDR2, Little Endian
    Cdr2Le = 0x02,
    /// CDR2, Big Endian
    Cdr2Be = 0x03,
    /// PL CDR, Little Endian
    PlCdrLe = 0x04,
    /// PL CDR, Big Endian
    PlCdrBe = 0x05,
    /// PL CDR2, Little Endian
    PlCdr2Le = 0x06,
    /// PL CDR2, Big Endian
    PlCdr2Be = 0x07,
    /// Delimited CDR2, Little Endian
    DelimitedCdr2Le = 0x08,
    /// Delimited CDR2, Big Endian
    DelimitedCdr2Be = 0x09,
}

impl EncapsulationKind {
    /// Check if this encapsulation uses CDR2 encoding rules.
    #[must_use]
    pub const fn is_cdr2(self) -> bool {
        matches!(
            self,
            Self::Cdr2Le
                | Self::Cdr2Be
                | Self::PlCdr2Le
                | Self::PlCdr2Be
                | Self::DelimitedCdr2Le
                | Self::DelimitedCdr2Be
        )
    }

    /// Check if this encapsulation uses little endian byte order.
    #[must_use]
    pub const fn is_little_endian(self) -> bool {
        matches!(
            self,
            Self::CdrLe | Self::Cdr2Le | Self::PlCdrLe | Self::PlCdr2Le | Self::DelimitedCdr2Le
        )
    }

    /// Get the 8-byte alignment for this encapsulation.
    /// CDR1 uses 8-byte alignment for 64-bit values, CDR2 uses 4-byte alignment.
    #[must_use]
    pub const fn eight_byte_alignment(self) -> usize {
        if self.is_cdr2() {
            4
        } else {
            8
        }
    }
}

/// CDR encoder for writing CDR-encoded data.
///
/// This encoder handles all the complexity of CDR encoding including:
/// - Proper alignment (relative to origin for nested structs)
/// - Endianness handling
/// - CDR1 vs CDR2 encoding differences
///
/// # Example
///
/// ```no_run
/// # fn main() {
/// use robocodec::codec::cdr::encoder::CdrEncoder;
///
/// let mut encoder = CdrEncoder::new();
/// encoder.int32(42);
/// encoder.string("hello");
/// let data = encoder.finish();
/// # }
/// ```
pub struct CdrEncoder {
    /// Output buffer
    buffer: Vec<u8>,
    /// Current write position
    offset: usize,
    /// Origin offset for alignment calculation
    origin: usize,
    /// Encapsulation kind
    kind: EncapsulationKind,
    /// Whether to use little endian encoding
    little_endian: bool,
    /// 8-byte alignment (4 for CDR2, 8 for CDR1)
    eight_byte_alignment: usize,
}

impl Default for CdrEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl CdrEncoder {
    /// Create a new encoder with default settings (CDR, little-endian).
    #[must_use]
    pub fn new() -> Self {
        Self::with_kind(EncapsulationKind::default())
    }

    /// Create a new encoder with the specified encapsulation kind.
    #[must_use]
    pub fn with_kind(kind: EncapsulationKind) -> Self {
        let little_endian = kind.is_little_endian();
        let eight_byte_alignment = kind.eight_byte_alignment();

        let mut buffer = Vec::with_capacity(DEFAULT_CAPACITY);
        // Write CDR header
        buffer.push(0); // Unused
        buffer.push(kind as u8); // Encapsulation kind
        buffer.push(0); // Options (unused)
        buffer.push(0); // Options (unused)

        Self {
            buffer,
            offset: CDR_HEADER_SIZE,
            origin: CDR_HEADER_SIZE, // Align relative to position after CDR header (matches cursor behavior)
            kind,
            little_endian,
            eight_byte_alignment,
        }
    }

    /// Create a new encoder with the specified initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut encoder = Self::new();
        encoder
            .buffer
            .reserve(capacity.saturating_sub(DEFAULT_CAPACITY));
        encoder
    }

    /// Get the encapsulation kind.
    #[must_use]
    pub const fn kind(&self) -> EncapsulationKind {
        self.kind
    }

    /// Get the current size of the encoded data.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.offset
    }

    /// Get a reference to the encoded data.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.buffer[..self.offset]
    }

    /// Consume the encoder and return the encoded data.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.buffer
    }

    /// Reset the encoder to write a new message.
    ///
    /// Keeps the allocated buffer but resets the position.
    pub fn reset(&mut self) {
        self.offset = CDR_HEADER_SIZE;
        self.origin = CDR_HEADER_SIZE; // Align relative to position after CDR header (matches cursor behavior)
    }

    /// Reset the origin to the current offset (for nested structs).
    ///
    /// This matches the TypeScript `resetOrigin()` function.
    pub fn reset_origin(&mut self) {
        self.origin = self.offset;
    }

    /// Align to `size` bytes relative to the stream origin, writing no payload.
    ///
    /// In CDR1, alignment is always calculated from the stream origin (byte 4),
    /// not from nested struct boundaries, so entering a nested type requires
    /// aligning to its `max_alignment` here rather than resetting the origin
    /// (see `CdrDecoder::execute_plan`'s matching `DecodeOp::DecodeNested` handling).
    pub fn align_to(&mut self, size: usize) {
        self.align(size, 0);
    }

    /// Ensure there's enough capacity for additional bytes.
    fn reserve(&mut self, additional: usize) {
        let needed = self.offset + additional;
        if needed > self.buffer.len() {
            self.buffer.resize(needed.max(self.buffer.len() * 2), 0);
        }
    }

    /// Align to the specified boundary, writing padding bytes.
    ///
    /// # Arguments
    ///
    /// * `size` - The alignment boundary (e.g., 4 for 4-byte alignment)
    /// * `bytes_to_write` - Optional hint for how many bytes will be written after alignment
    fn align(&mut self, size: usize, bytes_to_write: usize) {
        let alignment = (self.offset - self.origin) % size;
        if alignment > 0 {
            let padding = size - alignment;
            self.reserve(padding + bytes_to_write);
            // Write zero padding bytes
            for _ in 0..padding {
                self.buffer[self.offset] = 0;
                self.offset += 1;
            }
        } else {
            self.reserve(bytes_to_write);
        }
    }

    /// Write an 8-bit signed integer.
    pub fn int8(&mut self, value: i8) -> CoreResult<&mut Self> {
        self.reserve(1);
        self.buffer[self.offset] = value as u8;
        self.offset += 1;
        Ok(self)
    }

    /// Write an 8-bit unsigned integer.
    pub fn uint8(&mut self, value: u8) -> CoreResult<&mut Self> {
        self.reserve(1);
        self.buffer[self.offset] = value;
        self.offset += 1;
        Ok(self)
    }

    /// Write a 16-bit signed integer.
    pub fn int16(&mut self, value: i16) -> CoreResult<&mut Self> {
        self.align(2, 2);
        let bytes = if self.little_endian {
            value.to_le_bytes()
        } else {
            value.to_be_bytes()
        };
        self.write_bytes(&bytes, 2);
        Ok(self)
    }

    /// Write a 16-bit unsigned integer.
    pub fn uint16(&mut self, value: u16) -> CoreResult<&mut Self> {
        self.align(2, 2);
        let bytes = if self.little_endian {
            value.to_le_bytes()
        } else {
            value.to_be_bytes()
        };
        self.write_bytes(&bytes, 2);
        Ok(self)
    }

    /// Write a 32-bit signed integer.
    pub fn int32(&mut self, value: i32) -> CoreResult<&mut Self> {
        self.align(4, 4);
        let bytes = if self.little_endian {
            value.to_le_bytes()
        } else {
            value.to_be_bytes()
        };
        self.write_bytes(&bytes, 4);
        Ok(self)
    }

    /// Write a 32-bit unsigned integer.
    pub fn uint32(&mut self, value: u32) -> CoreResult<&mut Self> {
        self.align(4, 4);
        let bytes = if self.little_endian {
            value.to_le_bytes()
        } else {
            value.to_be_bytes()
        };
        self.write_bytes(&bytes, 4);
        Ok(self)
    }

    /// Write a 64-bit signed integer.
    pub fn int64(&mut self, value: i64) -> CoreResult<&mut Self> {
        self.align(self.eight_byte_alignment, 8);
        let bytes = if self.little_endian {
            value.to_le_bytes()
        } else {
            value.to_be_bytes()
        };
        self.write_bytes(&bytes, 8);
        Ok(self)
    }

    /// Write a 64-bit unsigned integer.
    pub fn uint64(&mut self, value: u64) -> CoreResult<&mut Self> {
        self.align(self.eight_byte_alignment, 8);
        let bytes = if self.little_endian {
            value.to_le_bytes()
        } else {
            value.to_be_bytes()
        };
        self.write_bytes(&bytes, 8);
        Ok(self)
    }

    /// Write a 16-bit unsigned integer in big-endian byte order.
    pub fn uint16_be(&mut self, value: u16) -> CoreResult<&mut Self> {
        self.align(2, 2);
        let bytes = value.to_be_bytes();
        self.write_bytes(&bytes, 2);
        Ok(self)
    }

    /// Write a 32-bit unsigned integer in big-endian byte order.
    pub fn uint32_be(&mut self, value: u32) -> CoreResult<&mut Self> {
        self.align(4, 4);
        let bytes = value.to_be_bytes();
        self.write_bytes(&bytes, 4);
        Ok(self)
    }

    /// Write a 64-bit unsigned integer in big-endian byte order.
    pub fn uint64_be(&mut self, value: u64) -> CoreResult<&mut Self> {
        self.align(8, 8);
        let bytes = value.to_be_bytes();
        self.write_bytes(&bytes, 8);
        Ok(self)
    }

    /// Write a 32-bit float.
    pub fn float32(&mut self, value: f32) -> CoreResult<&mut Self> {
        self.align(4, 4);
        let bytes = if self.little_endian {
            value.to_le_bytes()
        } else {
            value.to_be_bytes()
        };
        self.write_bytes(&bytes, 4);
        Ok(self)
    }

    /// Write a 64-bit double.
    pub fn float64(&mut self, value: f64) -> CoreResult<&mut Self> {
        self.align(self.eight_byte_alignment, 8);
        let bytes = if self.little_endian {
            value.to_le_bytes()
        } else {
            value.to_be_bytes()
        };
        self.write_bytes(&bytes, 8);
        Ok(self)
    }

    /// Write a string.
    ///
    /// # Arguments
    ///
    /// * `value` - The string to write
    /// * `write_length` - Whether to write the length prefix (default: true)
    pub fn string(&mut self, value: &str) -> CoreResult<&mut Self> {
        let strlen = value.len();
        self.uint32((strlen + 1) as u32)?; // Add one for null terminator
        self.reserve(strlen + 1);
        // Write string bytes
        let bytes = value.as_bytes();
        self.buffer[self.offset..self.offset + strlen].copy_from_slice(bytes);
        // Write null terminator
        self.buffer[self.offset + strlen] = 0;
        self.offset += strlen + 1;
        Ok(self)
    }

    /// Write a sequence length (for dynamic arrays).
    pub fn sequence_length(&mut self, value: usize) -> CoreResult<&mut Self> {
        self.uint32(value as u32)?;
        Ok(self)
    }

    /// Write raw bytes.
    pub fn bytes(&mut self, data: &[u8]) -> CoreResult<&mut Self> {
        self.reserve(data.len());
        self.buffer[self.offset..self.offset + data.len()].copy_from_slice(data);
        self.offset += data.len();
        Ok(self)
    }

    /// Write an array of 8-bit signed integers.
    pub fn int8_array(&mut self, values: &[i8], write_length: bool) -> CoreResult<&mut Self> {
        if write_length {
            self.sequence_length(values.len())?;
        }
        self.reserve(values.len());
        for &v in values {
            self.buffer[self.offset] = v as u8;
            self.offset += 1;
        }
        Ok(self)
    }

    /// Write an array of 8-bit unsigned integers.
    pub fn uint8_array(&mut self, values: &[u8], write_length: bool) -> CoreResult<&mut Self> {
        if write_length {
            self.sequence_length(values.len())?;
        }
        self.bytes(values)?;
        Ok(self)
    }

    /// Write an array of 32-bit unsigned integers.
    pub fn uint32_array(&mut self, values: &[u32], write_length: bool) -> CoreResult<&mut Self> {
        if write_length {
            self.sequence_length(values.len())?;
        }
        for &v in values {
            self.uint32(v)?;
        }
        Ok(self)
    }

    /// Write an array of 64-bit doubles.
    pub fn float64_array(&mut self, values: &[f64], write_length: bool) -> CoreResult<&mut Self> {
        if write_length {
            self.sequence_length(values.len())?;
        }
        for &v in values {
            self.float64(v)?;
        }
        Ok(self)
    }

    /// Encode a `DecodedMessage` using a schema.
    ///
    /// This is the primary method for re-encoding decoded messages back to CDR.
    /// It handles:
    /// - Primitive types (int, float, string, bool)
    /// - Arrays (fixed and dynamic)
    /// - Nested structs
    ///
    /// # Arguments
    ///
    /// * `message` - The decoded message to encode
    /// * `schema` - The parsed schema defining the message structure
    /// * `type_name` - The name of the type to encode (must exist in schema)
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use robocodec::codec::cdr::encoder::CdrEncoder;
    /// use robocodec::schema::parse_schema;
    /// use robocodec::DecodedMessage;
    /// use robocodec::codec::cdr::decoder::CdrDecoder;
    ///
    /// let schema = parse_schema("TestMsg", "int32 value\nfloat64 data")?;
    /// # let raw_data = vec![0u8; 100];
    /// let decoded = CdrDecoder::new().decode(&schema, &raw_data, Some("TestMsg"))?;
    ///
    /// let mut encoder = CdrEncoder::new();
    /// encoder.encode_message(&decoded, &schema, "TestMsg")?;
    /// let normalized_data = encoder.finish();
    /// # Ok(())
    /// # }
    /// ```
    pub fn encode_message(
        &mut self,
        message: &DecodedMessage,
        schema: &MessageSchema,
        type_name: &str,
    ) -> CoreResult<()> {
        self.encode_message_internal(message, schema, type_name, 0)?;
        Ok(())
    }

    /// Internal recursive encoding with depth tracking.
    fn encode_message_internal(
        &mut self,
        message: &DecodedMessage,
        schema: &MessageSchema,
        type_name: &str,
        depth: usize,
    ) -> CoreResult<()> {
        const MAX_DEPTH: usize = 32;

        if depth > MAX_DEPTH {
            return Err(crate::core::CodecError::encode(
                "CDR",
                format!(
                    "Maximum encoding depth exceeded ({MAX_DEPTH}), possible circular reference"
                ),
            ));
        }

        // Get the type definition from schema
        let msg_type = schema.types.get(type_name).ok_or_else(|| {
            crate::core::CodecError::encode(
                "CDR",
                format!("Type '{type_name}' not found in schema"),
            )
        })?;

        let saved_origin = self.origin;
        self.origin = self.offset;

        // Encode each field in order
        for field in &msg_type.fields {
            if let Some(value) = message.get(&field.name) {
                self.encode_value(value, &field.type_name, schema, depth + 1)?;
            }
            // Skip missing fields (optional fields not set)
        }

        self.origin = saved_origin;
        Ok(())
    }

    /// Encode a single `CodecValue` based on its type.
    fn encode_value(
        &mut self,
        value: &CodecValue,
        field_type: &FieldType,
        schema: &MessageSchema,
        depth: usize,
    ) -> CoreResult<()> {
        match field_type {
            FieldType::Primitive(prim) => {
                self.encode_primitive(value, *prim)?;
            }
            FieldType::Array { base_type, size } => {
                self.encode_array(value, base_type, Some(*size), schema, depth)?;
            }
            FieldType::Sequence { base_type, .. } => {
                self.encode_array(value, base_type, None, schema, depth)?;
            }
            FieldType::Nested(type_name) => {
                self.encode_nested(value, type_name, schema, depth)?;
            }
        }
        Ok(())
    }

    /// Encode a primitive value with automatic type coercion.
    ///
    /// This method handles automatic type coercion from Python's native types:
    /// - Python int (Int64) -> int8/int16/int32/uint8/uint16/uint32 with bounds checking
    /// - Python float (Float64) -> float32 with precision loss
    fn encode_primitive(&mut self, value: &CodecValue, prim: IdlPrimitiveType) -> CoreResult<()> {
        match prim {
            IdlPrimitiveType::Bool => {
                if let CodecValue::Bool(b) = value {
                    self.uint8(if *b { 1 } else { 0 })?;
                } else {
                    return self.type_mismatch("bool", value);
                }
            }
            IdlPrimitiveType::Int8 => {
                let i = self.coerce_to_i8(value)?;
                self.int8(i)?;
            }
            IdlPrimitiveType::Int16 => {
                let i = self.coerce_to_i16(value)?;
                self.int16(i)?;
            }
            IdlPrimitiveType::Int32 => {
                let i = self.coerce_to_i32(value)?;
                self.int32(i)?;
            }
            IdlPrimitiveType::Int64 => {
                let i = self.coerce_to_i64(value)?;
                self.int64(i)?;
            }
            IdlPrimitiveType::UInt8 | IdlPrimitiveType::Byte => {
                let u = self.coerce_to_u8(value)?;
                self.uint8(u)?;
            }
            IdlPrimitiveType::UInt16 => {
                let u = self.coerce_to_u16(value)?;
                self.uint16(u)?;
            }
            IdlPrimitiveType::UInt32 => {
                let u = self.coerce_to_u32(value)?;
                self.uint32(u)?;
            }
            IdlPrimitiveType::UInt64 => {
                let u = self.coerce_to_u64(value)?;
                self.uint64(u)?;
            }
            IdlPrimitiveType::Float32 => {
                let f = self.coerce_to_f32(value)?;
                self.float32(f)?;
            }
            IdlPrimitiveType::Float64 => {
                let f = self.coerce_to_f64(value)?;
                self.float64(f)?;
            }
            IdlPrimitiveType::String | IdlPrimitiveType::WString => {
                if let CodecValue::String(s) = value {
                    self.string(s)?;
                } else {
                    return self.type_mismatch("string", value);
                }
            }
            IdlPrimitiveType::Char => {
                let i = self.coerce_to_i8(value)?;
                self.int8(i)?;
            }
            IdlPrimitiveType::Time => {
                if let CodecValue::Timestamp(nanos) = value {
                    // Convert nanoseconds to sec/nsec
                    let sec = nanos / NANOS_PER_SEC;
                    let nsec = (nanos % NANOS_PER_SEC).abs();
                    self.int32(sec as i32)?;
                    self.uint32(nsec as u32)?;
                } else {
                    return self.type_mismatch("time", value);
                }
            }
            IdlPrimitiveType::Duration => {
                if let CodecValue::Duration(nanos) = value {
                    // Convert nanoseconds to sec/nsec
                    let sec = nanos / NANOS_PER_SEC;
                    let nsec = if *nanos < 0 {
                        // For negative durations, nsec is stored as positive
                        (nanos % NANOS_PER_SEC).abs()
                    } else {
                        nanos % NANOS_PER_SEC
                    };
                    self.int32(sec as i32)?;
                    self.uint32(nsec as u32)?;
                } else {
                    return self.type_mismatch("duration", value);
                }
            }
        }
        Ok(())
    }

    /// Coerce a CodecValue to i8 with bounds checking.
    fn coerce_to_i8(&self, value: &CodecValue) -> CoreResult<i8> {
        match value {
            CodecValue::Int8(i) => Ok(*i),
            CodecValue::Int16(i) => {
                i8::try_from(*i).map_err(|_| self.overflow_error("int8", value))
            }
            CodecValue::Int32(i) => {
                i8::try_from(*i).map_err(|_| self.overflow_error("int8", value))
            }
            CodecValue::Int64(i) => {
                i8::try_from(*i).map_err(|_| self.overflow_error("int8", value))
            }
            CodecValue::UInt8(u) => {
                i8::try_from(*u).map_err(|_| self.overflow_error("int8", value))
            }
            CodecValue::UInt16(u) => {
                i8::try_from(*u).map_err(|_| self.overflow_error("int8", value))
            }
            CodecValue::UInt32(u) => {
                i8::try_from(*u).map_err(|_| self.overflow_error("int8", value))
            }
            CodecValue::UInt64(u) => {
                i8::try_from(*u).map_err(|_| self.overflow_error("int8", value))
            }
            _ => Err(self.coerce_error("int8", value)),
        }
    }

    /// Coerce a CodecValue to i16 with bounds checking.
    fn coerce_to_i16(&self, value: &CodecValue) -> CoreResult<i16> {
        match value {
            CodecValue::Int8(i) => Ok(i16::from(*i)),
            CodecValue::Int16(i) => Ok(*i),
            CodecValue::Int32(i) => {
                i16::try_from(*i).map_err(|_| self.overflow_error("int16", value))
            }
            CodecValue::Int64(i) => {
                i16::try_from(*i).map_err(|_| self.overflow_error("int16", value))
            }
            CodecValue::UInt8(u) => Ok(i16::from(*u)),
            CodecValue::UInt16(u) => {
                i16::try_from(*u).map_err(|_| self.overflow_error("int16", value))
            }
            CodecValue::UInt32(u) => {
                i16::try_from(*u).map_err(|_| self.overflow_error("int16", value))
            }
            CodecValue::UInt64(u) => {
                i16::try_from(*u).map_err(|_| self.overflow_error("int16", value))
            }
            _ => Err(self.coerce_error("int16", value)),
        }
    }

    /// Coerce a CodecValue to i32 with bounds checking.
    fn coerce_to_i32(&self, value: &CodecValue) -> CoreResult<i32> {
        match value {
            CodecValue::Int8(i) => Ok(i32::from(*i)),
            CodecValue::Int16(i) => Ok(i32::from(*i)),
            CodecValue::Int32(i) => Ok(*i),
            CodecValue::Int64(i) => {
                i32::try_from(*i).map_err(|_| self.overflow_error("int32", value))
            }
            CodecValue::UInt8(u) => Ok(i32::from(*u)),
            CodecValue::UInt16(u) => Ok(i32::from(*u)),
            CodecValue::UInt32(u) => {
                i32::try_from(*u).map_err(|_| self.overflow_error("int32", value))
            }
            CodecValue::UInt64(u) => {
                i32::try_from(*u).map_err(|_| self.overflow_error("int32", value))
            }
            _ => Err(self.coerce_error("int32", value)),
        }
    }

    /// Coerce a CodecValue to i64.
    fn coerce_to_i64(&self, value: &CodecValue) -> CoreResult<i64> {
        match value {
            CodecValue::Int8(i) => Ok(i64::from(*i)),
            CodecValue::Int16(i) => Ok(i64::from(*i)),
            CodecValue::Int32(i) => Ok(i64::from(*i)),
            CodecValue::Int64(i) => Ok(*i),
            CodecValue::UInt8(u) => Ok(i64::from(*u)),
            CodecValue::UInt16(u) => Ok(i64::from(*u)),
            CodecValue::UInt32(u) => Ok(i64::from(*u)),
            CodecValue::UInt64(u) => {
                i64::try_from(*u).map_err(|_| self.overflow_error("int64", value))
            }
            _ => Err(self.coerce_error("int64", value)),
        }
    }

    /// Coerce a CodecValue to u8 with bounds checking.
    fn coerce_to_u8(&self, value: &CodecValue) -> CoreResult<u8> {
        match value {
            CodecValue::UInt8(u) => Ok(*u),
            CodecValue::UInt16(u) => {
                u8::try_from(*u).map_err(|_| self.overflow_error("uint8", value))
            }
            CodecValue::UInt32(u) => {
                u8::try_from(*u).map_err(|_| self.overflow_error("uint8", value))
            }
            CodecValue::UInt64(u) => {
                u8::try_from(*u).map_err(|_| self.overflow_error("uint8", value))
            }
            CodecValue::Int8(i) => {
                u8::try_from(*i).map_err(|_| self.overflow_error("uint8", value))
            }
            CodecValue::Int16(i) => {
                u8::try_from(*i).map_err(|_| self.overflow_error("uint8", value))
            }
            CodecValue::Int32(i) => {
                u8::try_from(*i).map_err(|_| self.overflow_error("uint8", value))
            }
            CodecValue::Int64(i) => {
                u8::try_from(*i).map_err(|_| self.overflow_error("uint8", value))
            }
            _ => Err(self.coerce_error("uint8", value)),
        }
    }

    /// Coerce a CodecValue to u16 with bounds checking.
    fn coerce_to_u16(&self, value: &CodecValue) -> CoreResult<u16> {
        match value {
            CodecValue::UInt8(u) => Ok(u16::from(*u)),
            CodecValue::UInt16(u) => Ok(*u),
            CodecValue::UInt32(u) => {
                u16::try_from(*u).map_err(|_| self.overflow_error("uint16", value))
            }
            CodecValue::UInt64(u) => {
                u16::try_from(*u).map_err(|_| self.overflow_error("uint16", value))
            }
            CodecValue::Int8(i) => {
                u16::try_from(*i).map_err(|_| self.overflow_error("uint16", value))
            }
            CodecValue::Int16(i) => {
                u16::try_from(*i).map_err(|_| self.overflow_error("uint16", value))
            }
            CodecValue::Int32(i) => {
                u16::try_from(*i).map_err(|_| self.overflow_error("uint16", value))
            }
            CodecValue::Int64(i) => {
                u16::try_from(*i).map_err(|_| self.overflow_error("uint16", value))
            }
            _ => Err(self.coerce_error("uint16", value)),
        }
    }

    /// Coerce a CodecValue to u32 with bounds checking.
    fn coerce_to_u32(&self, value: &CodecValue) -> CoreResult<u32> {
        match value {
            CodecValue::UInt8(u) => Ok(u32::from(*u)),
            CodecValue::UInt16(u) => Ok(u32::from(*u)),
            CodecValue::UInt32(u) => Ok(*u),
            CodecValue::UInt64(u) => {
                u32::try_from(*u).map_err(|_| self.overflow_error("uint32", value))
            }
            CodecValue::Int8(i) => {
                u32::try_from(*i).map_err(|_| self.overflow_error("uint32", value))
            }
            CodecValue::Int16(i) => {
                u32::try_from(*i).map_err(|_| self.overflow_error("uint32", value))
            }
            CodecValue::Int32(i) => {
                u32::try_from(*i).map_err(|_| self.overflow_error("uint32", value))
            }
            CodecValue::Int64(i) => {
                u32::try_from(*i).map_err(|_| self.overflow_error("uint32", value))
            }
            _ => Err(self.coerce_error("uint32", value)),
        }
    }

    /// Coerce a CodecValue to u64 with bounds checking.
    fn coerce_to_u64(&self, value: &CodecValue) -> CoreResult<u64> {
        match value {
            CodecValue::UInt8(u) => Ok(u64::from(*u)),
            CodecValue::UInt16(u) => Ok(u64::from(*u)),
            CodecValue::UInt32(u) => Ok(u64::from(*u)),
            CodecValue::UInt64(u) => Ok(*u),
            CodecValue::Int8(i) => {
                u64::try_from(*i).map_err(|_| self.overflow_error("uint64", value))
            }
            CodecValue::Int16(i) => {
                u64::try_from(*i).map_err(|_| self.overflow_error("uint64", value))
            }
            CodecValue::Int32(i) => {
                u64::try_from(*i).map_err(|_| self.overflow_error("uint64", value))
            }
            CodecValue::Int64(i) => {
                u64::try_from(*i).map_err(|_| self.overflow_error("uint64", value))
            }
            _ => Err(self.coerce_error("uint64", value)),
        }
    }

    /// Coerce a CodecValue to f32.
    fn coerce_to_f32(&self, value: &CodecValue) -> CoreResult<f32> {
        match value {
            CodecValue::Float32(f) => Ok(*f),
            CodecValue::Float64(f) => Ok(*f as f32), // Allow precision loss
            CodecValue::Int8(i) => Ok(*i as f32),
            CodecValue::Int16(i) => Ok(*i as f32),
            CodecValue::Int32(i) => Ok(*i as f32),
            CodecValue::Int64(i) => Ok(*i as f32),
            CodecValue::UInt8(u) => Ok(*u as f32),
            CodecValue::UInt16(u) => Ok(*u as f32),
            CodecValue::UInt32(u) => Ok(*u as f32),
            CodecValue::UInt64(u) => Ok(*u as f32),
            _ => Err(self.coerce_error("float32", value)),
        }
    }

    /// Coerce a CodecValue to f64.
    fn coerce_to_f64(&self, value: &CodecValue) -> CoreResult<f64> {
        match value {
            CodecValue::Float32(f) => Ok(f64::from(*f)),
            CodecValue::Float64(f) => Ok(*f),
            CodecValue::Int8(i) => Ok(f64::from(*i)),
            CodecValue::Int16(i) => Ok(f64::from(*i)),
            CodecValue::Int32(i) => Ok(f64::from(*i)),
            CodecValue::Int64(i) => Ok(*i as f64),
            CodecValue::UInt8(u) => Ok(f64::from(*u)),
            CodecValue::UInt16(u) => Ok(f64::from(*u)),
            CodecValue::UInt32(u) => Ok(f64::from(*u)),
            CodecValue::UInt64(u) => Ok(*u as f64),
            _ => Err(self.coerce_error("float64", value)),
        }
    }

    /// Create an overflow error for type coercion.
    fn overflow_error(&self, expected: &str, actual: &CodecValue) -> crate::core::CodecError {
        crate::core::CodecError::encode(
            "CDR",
            format!("Value {actual:?} overflows target type {expected}"),
        )
    }

    /// Create a coercion error for incompatible types.
    fn coerce_error(&self, expected: &str, actual: &CodecValue) -> crate::core::CodecError {
        crate::core::CodecError::encode("CDR", format!("Cannot coerce {actual:?} to {expected}"))
    }

    /// Encode an array value.
    fn encode_array(
        &mut self,
        value: &CodecValue,
        base_type: &FieldType,
        fixed_size: Option<usize>,
        schema: &MessageSchema,
        depth: usize,
    ) -> CoreResult<()> {
        let elements = if let CodecValue::Array(arr) = value {
            arr
        } else {
            return Err(crate::core::CodecError::encode(
                "CDR",
                format!("Expected array, got {value:?}"),
            ));
        };

        // Write sequence length for dynamic arrays
        if fixed_size.is_none() {
            self.sequence_length(elements.len())?;
        }

        // Encode each element
        for elem in elements {
            self.encode_value(elem, base_type, schema, depth)?;
        }

        Ok(())
    }

    /// Encode a nested message value.
    fn encode_nested(
        &mut self,
        value: &CodecValue,
        type_name: &str,
        schema: &MessageSchema,
        depth: usize,
    ) -> CoreResult<()> {
        let nested_msg = if let CodecValue::Struct(msg) = value {
            msg
        } else {
            return Err(crate::core::CodecError::encode(
                "CDR",
                format!("Expected struct for type '{type_name}', got {value:?}"),
            ));
        };

        // Get the nested type definition with variant resolution (handles / vs ::)
        let msg_type = schema.get_type_variants(type_name).ok_or_else(|| {
            crate::core::CodecError::encode(
                "CDR",
                format!("Nested type '{type_name}' not found in schema"),
            )
        })?;

        // In CDR1, alignment is always calculated from the stream origin (byte 4),
        // not from nested struct boundaries, so we align to the nested type's max
        // alignment here and never touch `self.origin` (see `CdrDecoder::execute_plan`'s
        // matching `DecodeOp::DecodeNested` handling).
        self.align(msg_type.max_alignment as usize, 0);

        // Encode each field
        for field in &msg_type.fields {
            if let Some(field_value) = nested_msg.get(&field.name) {
                self.encode_value(field_value, &field.type_name, schema, depth)?;
            }
        }

        Ok(())
    }

    /// Create a type mismatch error.
    fn type_mismatch(&self, expected: &str, actual: &CodecValue) -> CoreResult<()> {
        Err(crate::core::CodecError::encode(
            "CDR",
            format!("Type mismatch: expected {expected}, got {actual:?}"),
        ))
    }

    /// Write bytes to the buffer.
    fn write_bytes(&mut self, bytes: &[u8], count: usize) {
        debug_assert_eq!(bytes.len(), count);
        self.buffer[self.offset..self.offset + count].copy_from_slice(bytes);
        self.offset += count;
    }

    /// Create a calculator to pre-calculate the size of a message.
    #[must_use]
    pub fn calculator() -> CdrCalculator {
        CdrCalculator::new()
    }
}
