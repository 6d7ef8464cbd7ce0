// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema parser implementations.
//!
//! Two definition dialects are supported: the ROS1 `.msg` line format
//! ([`msg`]) and the OMG IDL subset used by ROS2 `.idl` files ([`idl`]).

pub mod idl;
pub mod msg;

use crate::core::Result;
use crate::schema::{MessageSchema, SchemaFormat};

/// Parse a schema from a string, assuming the `.msg` dialect.
///
/// # Arguments
///
/// * `name` - Message name
/// * `definition` - Schema definition string
///
/// # Returns
///
/// Parsed `MessageSchema`
pub fn parse_schema(name: &str, definition: &str) -> Result<MessageSchema> {
    parse_schema_with_encoding(name, definition, SchemaFormat::Msg)
}

/// Parse a schema with explicit format specification.
///
/// # Arguments
///
/// * `name` - Message name
/// * `definition` - Schema definition string
/// * `format` - Schema format (Msg or Idl)
///
/// # Returns
///
/// Parsed `MessageSchema`
pub fn parse_schema_with_encoding(
    name: &str,
    definition: &str,
    format: SchemaFormat,
) -> Result<MessageSchema> {
    match format {
        SchemaFormat::Msg => {
            msg::parse(name, definition).map_err(|e| crate::core::CodecError::parse("schema", e.to_string()))
        }
        SchemaFormat::Idl => {
            idl::parse(name, definition).map_err(|e| crate::core::CodecError::parse("schema", e.to_string()))
        }
    }
}

/// Parse a schema with a string-based format hint.
///
/// # Arguments
///
/// * `name` - Message name
/// * `definition` - Schema definition string
/// * `format_hint` - Format name string (e.g. "msg", "idl")
///
/// # Returns
///
/// Parsed `MessageSchema`
pub fn parse_schema_with_encoding_str(
    name: &str,
    definition: &str,
    format_hint: &str,
) -> Result<MessageSchema> {
    let format = SchemaFormat::parse(format_hint)
        .ok_or_else(|| crate::core::CodecError::parse("schema", format!("unknown schema format '{format_hint}'")))?;
    parse_schema_with_encoding(name, definition, format)
}
