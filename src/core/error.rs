// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Error taxonomy shared by every layer of the crate: definition parsing,
//! the type registry, the CDR and ROS1 codecs, the transcoder, and both
//! bag readers/writers.

use thiserror::Error;

/// Errors that can occur anywhere in the crate.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A `.msg` or `.idl` definition failed to parse.
    #[error("parse error in {context}: {message}")]
    ParseError { context: String, message: String },

    /// Re-registering a type whose definition differs from what is already
    /// in the registry.
    #[error("type conflict for '{type_name}': {reason}")]
    TypeConflict { type_name: String, reason: String },

    /// A type or connection was not found.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// The buffer ended before a field's wire representation was complete.
    #[error("short read: needed {requested} bytes at position {cursor_pos}, only {available} available")]
    ShortRead {
        requested: usize,
        available: usize,
        cursor_pos: u64,
    },

    /// Extra bytes remained after decoding a message that should have
    /// consumed the whole buffer.
    #[error("excess bytes: {remaining} bytes left over after decoding (buffer length {buffer_len})")]
    ExcessBytes { remaining: usize, buffer_len: usize },

    /// A length prefix (string, sequence, record) was invalid for the
    /// remaining buffer.
    #[error("bad length {length} at position {position} (buffer length {buffer_len})")]
    BadLength {
        length: usize,
        position: usize,
        buffer_len: usize,
    },

    /// A rosbag1 file has no index (`op == 0x07` connection/chunk-info
    /// records at EOF) and cannot be read.
    #[error("bag is not indexed: {path}")]
    Unindexed { path: String },

    /// A rosbag1 file spans multiple volumes; unsupported.
    #[error("split bags are not supported: {path}")]
    SplitNotSupported { path: String },

    /// A rosbag1 record's header or length fields are internally
    /// inconsistent.
    #[error("corrupt record at offset {offset}: {reason}")]
    CorruptRecord { offset: u64, reason: String },

    /// `metadata.yaml` failed schema validation.
    #[error("invalid metadata: {reason}")]
    MetadataInvalid { reason: String },

    /// `metadata.yaml` declares a `version` this crate does not implement.
    #[error("unsupported rosbag2 metadata version: {version}")]
    VersionUnsupported { version: i64 },

    /// The sqlite storage backend returned an error.
    #[error("storage error: {0}")]
    StorageError(String),

    /// A message references a type the registry has no definition for.
    #[error("unknown type: {type_name}")]
    UnknownType { type_name: String },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A requested feature or combination is out of scope.
    #[error("unsupported: {feature}")]
    Unsupported { feature: String },
}

impl CodecError {
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::ParseError {
            context: context.into(),
            message: message.into(),
        }
    }

    /// A value could not be encoded into its wire representation (type
    /// mismatch, unsupported shape). Reuses the `ParseError` shape since
    /// both describe a text/value not matching the schema's expectations.
    pub fn encode(context: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::ParseError {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn type_conflict(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::TypeConflict {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        CodecError::NotFound { what: what.into() }
    }

    pub fn short_read(requested: usize, available: usize, cursor_pos: u64) -> Self {
        CodecError::ShortRead {
            requested,
            available,
            cursor_pos,
        }
    }

    /// Alias for [`CodecError::short_read`], matching cursor-level call sites
    /// that talk about "buffer" rather than "read" length.
    pub fn buffer_too_short(requested: usize, available: usize, cursor_pos: u64) -> Self {
        Self::short_read(requested, available, cursor_pos)
    }

    pub fn excess_bytes(remaining: usize, buffer_len: usize) -> Self {
        CodecError::ExcessBytes {
            remaining,
            buffer_len,
        }
    }

    pub fn bad_length(length: usize, position: usize, buffer_len: usize) -> Self {
        CodecError::BadLength {
            length,
            position,
            buffer_len,
        }
    }

    pub fn unindexed(path: impl Into<String>) -> Self {
        CodecError::Unindexed { path: path.into() }
    }

    pub fn split_not_supported(path: impl Into<String>) -> Self {
        CodecError::SplitNotSupported { path: path.into() }
    }

    pub fn corrupt_record(offset: u64, reason: impl Into<String>) -> Self {
        CodecError::CorruptRecord {
            offset,
            reason: reason.into(),
        }
    }

    pub fn metadata_invalid(reason: impl Into<String>) -> Self {
        CodecError::MetadataInvalid {
            reason: reason.into(),
        }
    }

    pub fn version_unsupported(version: i64) -> Self {
        CodecError::VersionUnsupported { version }
    }

    pub fn storage_error(message: impl Into<String>) -> Self {
        CodecError::StorageError(message.into())
    }

    pub fn unknown_type(type_name: impl Into<String>) -> Self {
        CodecError::UnknownType {
            type_name: type_name.into(),
        }
    }

    pub fn unsupported(feature: impl Into<String>) -> Self {
        CodecError::Unsupported {
            feature: feature.into(),
        }
    }

    /// Structured key/value pairs suitable for a `tracing` event.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            CodecError::ParseError { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
            CodecError::TypeConflict { type_name, reason } => {
                vec![("type", type_name.clone()), ("reason", reason.clone())]
            }
            CodecError::NotFound { what } => vec![("what", what.clone())],
            CodecError::ShortRead {
                requested,
                available,
                cursor_pos,
            } => vec![
                ("requested", requested.to_string()),
                ("available", available.to_string()),
                ("cursor", cursor_pos.to_string()),
            ],
            CodecError::ExcessBytes {
                remaining,
                buffer_len,
            } => vec![
                ("remaining", remaining.to_string()),
                ("buffer_len", buffer_len.to_string()),
            ],
            CodecError::BadLength {
                length,
                position,
                buffer_len,
            } => vec![
                ("length", length.to_string()),
                ("position", position.to_string()),
                ("buffer_len", buffer_len.to_string()),
            ],
            CodecError::Unindexed { path } => vec![("path", path.clone())],
            CodecError::SplitNotSupported { path } => vec![("path", path.clone())],
            CodecError::CorruptRecord { offset, reason } => vec![
                ("offset", offset.to_string()),
                ("reason", reason.clone()),
            ],
            CodecError::MetadataInvalid { reason } => vec![("reason", reason.clone())],
            CodecError::VersionUnsupported { version } => {
                vec![("version", version.to_string())]
            }
            CodecError::StorageError(msg) => vec![("message", msg.clone())],
            CodecError::UnknownType { type_name } => vec![("type", type_name.clone())],
            CodecError::IoError(msg) => vec![("message", msg.clone())],
            CodecError::Unsupported { feature } => vec![("feature", feature.clone())],
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::IoError(err.to_string())
    }
}

impl From<rusqlite::Error> for CodecError {
    fn from(err: rusqlite::Error) -> Self {
        CodecError::StorageError(err.to_string())
    }
}

impl From<serde_yml::Error> for CodecError {
    fn from(err: serde_yml::Error) -> Self {
        CodecError::MetadataInvalid {
            reason: err.to_string(),
        }
    }
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, CodecError>;
