// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout robocodec.
//!
//! This module provides the foundational types for the library:
//! - [`Error`] - Comprehensive error handling
//! - [`CodecValue`] - Unified value representation
//! - [`Encoding`] - Message encoding format identifier

pub mod error;
pub mod value;

pub use error::{CodecError, Result};
pub use value::{CodecValue, DecodedMessage, PrimitiveType};

/// Wire encoding identifier: the two serializations this crate reads and
/// writes, used to route messages through the transcoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// CDR (Common Data Representation), used by rosbag2 / ROS 2.
    Cdr,
    /// The ROS1 wire format, used by rosbag1 / ROS 1.
    Ros1,
}

/// Error returned when parsing an `Encoding` from string fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseEncodingError {
    _private: (),
}

impl std::fmt::Display for ParseEncodingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid encoding name, expected 'cdr' or 'ros1'")
    }
}

impl std::error::Error for ParseEncodingError {}

impl std::str::FromStr for Encoding {
    type Err = ParseEncodingError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cdr" => Ok(Encoding::Cdr),
            "ros1" | "ros1msg" => Ok(Encoding::Ros1),
            _ => Err(ParseEncodingError { _private: () }),
        }
    }
}

impl Encoding {
    /// Check if this encoding is CDR.
    pub fn is_cdr(&self) -> bool {
        matches!(self, Encoding::Cdr)
    }

    /// Check if this encoding is the ROS1 wire format.
    pub fn is_ros1(&self) -> bool {
        matches!(self, Encoding::Ros1)
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Cdr => "cdr",
            Encoding::Ros1 => "ros1",
        }
    }
}
