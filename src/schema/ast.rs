// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! AST types for parsed `.msg`/`.idl` message schemas.

use std::collections::HashMap;

/// A parsed message schema: one primary definition plus any definitions
/// embedded alongside it (`.msg` `===`/`MSG:` blocks, or sibling `.idl`
/// structs in the same module).
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSchema {
    /// Schema name (e.g., "std_msgs/msg/Header" or just "Header")
    pub name: String,
    /// Package name (e.g., "std_msgs")
    pub package: Option<String>,
    /// All types defined in this schema (main type + nested types)
    pub types: HashMap<String, MessageType>,
}

/// A message type definition with its fields and constants.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageType {
    /// Type name including package if available
    pub name: String,
    /// Ordered list of fields
    pub fields: Vec<Field>,
    /// Ordered list of constants (informational, never on the wire)
    pub constants: Vec<Constant>,
    /// Maximum alignment required for this type
    pub max_alignment: u64,
}

/// A field in a message type.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name
    pub name: String,
    /// Field type
    pub type_name: FieldType,
}

/// A constant attached to a message definition.
///
/// Constants never appear on the wire; they are retained for round-tripping
/// definition text and for the ROS1 md5sum algorithm, which folds constants
/// into the hashed text.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    /// Declared primitive type
    pub type_name: PrimitiveType,
    /// Constant name
    pub name: String,
    /// Literal value, as written in the source text
    pub value: String,
}

/// Field type: primitive, fixed array, bounded/unbounded sequence, or nested message.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// Primitive type
    Primitive(PrimitiveType),
    /// Fixed-length array `T[N]`: no count prefix on the wire, exactly `size` elements.
    Array {
        /// Base type (element type)
        base_type: Box<FieldType>,
        /// Fixed array length
        size: usize,
    },
    /// Dynamic sequence `T[]` or bounded `T[<=N]`: always `uint32` count-prefixed
    /// on the wire. `max` is retained but never enforced.
    Sequence {
        /// Base type (element type)
        base_type: Box<FieldType>,
        /// Declared upper bound, if any (unenforced)
        max: Option<usize>,
    },
    /// Nested message type, referenced by fully-qualified name
    Nested(String),
}

/// Primitive ROS types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Boolean
    Bool,
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 8-bit unsigned integer
    UInt8,
    /// 16-bit unsigned integer
    UInt16,
    /// 32-bit unsigned integer
    UInt32,
    /// 64-bit unsigned integer
    UInt64,
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
    /// String
    String,
    /// Wide string (UTF-16) — parsed, never produced on the wire (see Non-goals)
    WString,
    /// Byte (alias for UInt8)
    Byte,
    /// Char (alias for Int8)
    Char,
    /// Time (ROS timestamp: sec:int32, nsec:uint32)
    Time,
    /// Duration (ROS duration: sec:int32, nsec:uint32)
    Duration,
}

impl PrimitiveType {
    /// Get the alignment requirement for this primitive type.
    pub fn alignment(self) -> u64 {
        match self {
            PrimitiveType::Bool
            | PrimitiveType::Int8
            | PrimitiveType::UInt8
            | PrimitiveType::Byte
            | PrimitiveType::Char => 1,
            PrimitiveType::Int16 | PrimitiveType::UInt16 => 2,
            PrimitiveType::Int32 | PrimitiveType::UInt32 | PrimitiveType::Float32 => 4,
            PrimitiveType::Int64 | PrimitiveType::UInt64 | PrimitiveType::Float64 => 8,
            PrimitiveType::String | PrimitiveType::WString => 4, // Length prefix is 4-byte aligned
            PrimitiveType::Time | PrimitiveType::Duration => 4,  // two uint32 fields, 4-byte aligned
        }
    }

    /// Get the size in bytes for this primitive type, if fixed.
    pub fn size(self) -> Option<usize> {
        match self {
            PrimitiveType::Bool
            | PrimitiveType::Int8
            | PrimitiveType::UInt8
            | PrimitiveType::Byte
            | PrimitiveType::Char => Some(1),
            PrimitiveType::Int16 | PrimitiveType::UInt16 => Some(2),
            PrimitiveType::Int32 | PrimitiveType::UInt32 | PrimitiveType::Float32 => Some(4),
            PrimitiveType::Int64 | PrimitiveType::UInt64 | PrimitiveType::Float64 => Some(8),
            PrimitiveType::String | PrimitiveType::WString => None, // Variable length
            PrimitiveType::Time | PrimitiveType::Duration => Some(8), // sec:int32 + nsec:uint32
        }
    }

    /// Parse a primitive type from a `.msg`/`.idl` type keyword.
    pub fn try_from_str(s: &str) -> Option<Self> {
        match s {
            "bool" | "boolean" => Some(PrimitiveType::Bool),
            "int8" => Some(PrimitiveType::Int8),
            "int16" | "short" => Some(PrimitiveType::Int16),
            "int32" | "long" => Some(PrimitiveType::Int32),
            "int64" | "long long" | "int64_t" => Some(PrimitiveType::Int64),
            "uint8" | "octet" => Some(PrimitiveType::UInt8),
            "uint16" | "unsigned short" => Some(PrimitiveType::UInt16),
            "uint32" | "unsigned long" => Some(PrimitiveType::UInt32),
            "uint64" | "unsigned long long" => Some(PrimitiveType::UInt64),
            "float32" | "float" => Some(PrimitiveType::Float32),
            "float64" | "double" => Some(PrimitiveType::Float64),
            "string" => Some(PrimitiveType::String),
            "wstring" => Some(PrimitiveType::WString),
            "byte" => Some(PrimitiveType::Byte),
            "char" => Some(PrimitiveType::Char),
            "time" => Some(PrimitiveType::Time),
            "duration" => Some(PrimitiveType::Duration),
            _ => None,
        }
    }

    /// Name as it appears in ROS1 canonical md5sum text.
    pub fn ros1_name(self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::Int8 => "int8",
            PrimitiveType::Int16 => "int16",
            PrimitiveType::Int32 => "int32",
            PrimitiveType::Int64 => "int64",
            PrimitiveType::UInt8 | PrimitiveType::Byte => "uint8",
            PrimitiveType::UInt16 => "uint16",
            PrimitiveType::UInt32 => "uint32",
            PrimitiveType::UInt64 => "uint64",
            PrimitiveType::Float32 => "float32",
            PrimitiveType::Float64 => "float64",
            PrimitiveType::String | PrimitiveType::WString => "string",
            PrimitiveType::Char => "char",
            PrimitiveType::Time => "time",
            PrimitiveType::Duration => "duration",
        }
    }

    /// Convert to the core value-system `PrimitiveType`.
    pub fn to_core(self) -> crate::PrimitiveType {
        match self {
            PrimitiveType::Bool => crate::PrimitiveType::Bool,
            PrimitiveType::Int8 => crate::PrimitiveType::Int8,
            PrimitiveType::Int16 => crate::PrimitiveType::Int16,
            PrimitiveType::Int32 => crate::PrimitiveType::Int32,
            PrimitiveType::Int64 => crate::PrimitiveType::Int64,
            PrimitiveType::UInt8 => crate::PrimitiveType::UInt8,
            PrimitiveType::UInt16 => crate::PrimitiveType::UInt16,
            PrimitiveType::UInt32 => crate::PrimitiveType::UInt32,
            PrimitiveType::UInt64 => crate::PrimitiveType::UInt64,
            PrimitiveType::Float32 => crate::PrimitiveType::Float32,
            PrimitiveType::Float64 => crate::PrimitiveType::Float64,
            PrimitiveType::String | PrimitiveType::WString => crate::PrimitiveType::String,
            PrimitiveType::Byte | PrimitiveType::Char => crate::PrimitiveType::Byte,
            PrimitiveType::Time | PrimitiveType::Duration => crate::PrimitiveType::Int64,
        }
    }
}

impl FieldType {
    /// Get the alignment requirement for this field type.
    ///
    /// For sequences, alignment after the field depends only on the element
    /// type's max alignment, never on the runtime element count (open
    /// question resolved in DESIGN.md): a zero-length sequence still
    /// contributes its element alignment to this computation.
    pub fn alignment(&self) -> u64 {
        match self {
            FieldType::Primitive(p) => p.alignment(),
            FieldType::Array { base_type, .. } => base_type.alignment(),
            FieldType::Sequence { base_type, .. } => base_type.alignment(),
            FieldType::Nested(_) => 4, // Nested structs align to at least 4 in CDR
        }
    }

    /// Check if this is a complex type (requires per-element alignment in arrays).
    pub fn is_complex(&self) -> bool {
        !matches!(
            self,
            FieldType::Primitive(
                PrimitiveType::Bool
                    | PrimitiveType::Int8
                    | PrimitiveType::UInt8
                    | PrimitiveType::Byte
                    | PrimitiveType::Char
                    | PrimitiveType::Int16
                    | PrimitiveType::UInt16
                    | PrimitiveType::Int32
                    | PrimitiveType::UInt32
                    | PrimitiveType::Float32
                    | PrimitiveType::Int64
                    | PrimitiveType::UInt64
                    | PrimitiveType::Float64
            )
        )
    }
}

impl MessageSchema {
    /// Create an empty schema.
    pub fn new(name: String) -> Self {
        Self {
            package: extract_package(&name),
            name,
            types: HashMap::new(),
        }
    }

    /// Register a type in this schema.
    pub fn add_type(&mut self, msg_type: MessageType) {
        self.types.insert(msg_type.name.clone(), msg_type);
    }

    /// Look up a type by name.
    pub fn get_type(&self, name: &str) -> Option<&MessageType> {
        self.types.get(name)
    }

    /// Look up a type by name with variant resolution (`::` vs `/`, with/without `/msg/`, short name).
    pub fn get_type_variants(&self, name: &str) -> Option<&MessageType> {
        if let Some(t) = self.types.get(name) {
            return Some(t);
        }

        let normalized_name = name.replace("::", "/");

        if let Some(t) = self.types.get(&normalized_name) {
            return Some(t);
        }

        if !normalized_name.contains("/msg/") {
            let with_msg = normalized_name.replace('/', "/msg/");
            if let Some(t) = self.types.get(&with_msg) {
                return Some(t);
            }
        }

        if normalized_name.contains("/msg/") {
            let without_msg = normalized_name.replace("/msg/", "/");
            if let Some(t) = self.types.get(&without_msg) {
                return Some(t);
            }
        }

        if !normalized_name.contains('/') {
            for (full_name, msg_type) in &self.types {
                if full_name.ends_with(&format!("/{normalized_name}"))
                    || full_name.ends_with(&format!("/msg/{normalized_name}"))
                    || full_name.as_str() == normalized_name
                {
                    return Some(msg_type);
                }
            }
        }

        None
    }
}

impl MessageType {
    /// Create a new, empty message type.
    pub fn new(name: String) -> Self {
        Self {
            name,
            fields: Vec::new(),
            constants: Vec::new(),
            max_alignment: 1,
        }
    }

    /// Add a field to this message type.
    pub fn add_field(&mut self, field: Field) {
        let field_alignment = field.type_name.alignment();
        self.max_alignment = self.max_alignment.max(field_alignment);
        self.fields.push(field);
    }

    /// Add a constant to this message type.
    pub fn add_constant(&mut self, constant: Constant) {
        self.constants.push(constant);
    }
}

/// Extract package name from a fully-qualified type name.
fn extract_package(name: &str) -> Option<String> {
    if name.contains('/') {
        let parts: Vec<&str> = name.split('/').collect();
        if parts.len() >= 2 {
            Some(parts[0].to_string())
        } else {
            None
        }
    } else {
        None
    }
}
