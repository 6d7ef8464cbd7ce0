// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # robocodec
//!
//! A library for reading, writing, and transcoding ROS robotics log files:
//! rosbag1 (the legacy ROS 1 `.bag` container) and rosbag2 (the ROS 2
//! sqlite-backed directory container), bridged by a byte-level CDR/ROS1
//! transcoder.
//!
//! ## Example: converting a rosbag1 file to rosbag2
//!
//! ```rust,no_run
//! # fn main() -> robocodec::Result<()> {
//! use robocodec::convert::{convert, ConvertOptions};
//!
//! convert("input.bag", "output_bag", &ConvertOptions::default())?;
//! # Ok(())
//! # }
//! ```

pub mod bag1;
pub mod bag2;
pub mod codec;
pub mod convert;
pub mod core;
pub mod schema;

pub use core::{CodecError, CodecValue, DecodedMessage, Encoding, PrimitiveType, Result};
pub use schema::{registry::TypeRegistry, Field, FieldType, MessageSchema, MessageType};
