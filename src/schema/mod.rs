// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema parsing and type registration for ROS message definitions.
//!
//! This module provides parsing for:
//! - ROS1 `.msg` files
//! - ROS2 `.idl` files (OMG IDL subset)
//!
//! and a [`registry::TypeRegistry`] that tracks the definitions referenced
//! by a bag so that nested and array field types can be resolved.

pub mod ast;
pub mod builtin_types;
pub mod md5sum;
pub mod msgtext;
pub mod parser;
pub mod registry;

pub use ast::{Field, FieldType, MessageSchema, MessageType, PrimitiveType};
pub use md5sum::compute_md5sum;
pub use msgtext::generate_definition;
pub use parser::{parse_schema, parse_schema_with_encoding, parse_schema_with_encoding_str};

/// Schema definition dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    /// ROS1 `.msg` format
    Msg,
    /// OMG IDL format (ROS2 `.idl`)
    Idl,
}

impl SchemaFormat {
    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "msg" => Some(SchemaFormat::Msg),
            "idl" => Some(SchemaFormat::Idl),
            _ => None,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaFormat::Msg => "msg",
            SchemaFormat::Idl => "idl",
        }
    }
}
