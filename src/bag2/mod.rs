// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! rosbag2: the directory-based sqlite container (`metadata.yaml` plus one
//! or more `*.db3` files).
//!
//! Supports `metadata.yaml` schema versions 1 through 5 and the `none`,
//! `file`, and `message` zstd compression modes. See `metadata`, `storage`,
//! `reader`, and `writer` for the pieces.

pub mod metadata;
pub mod reader;
pub mod storage;
pub mod writer;

pub use metadata::{BagMetadata, QosDurability, QosProfile, QosProfilesField};
pub use reader::{BagConnection, BagMessage, BagReader};
pub use writer::{BagWriter, CompressionMode, WriterConfig};
