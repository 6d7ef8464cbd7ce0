// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! rosbag1: the legacy ROS1 monolithic record-stream container
//! (`#ROSBAG V2.0`).
//!
//! A bag is a sequence of length-prefixed records (bag header, connections,
//! chunks, index data, chunk info) described in `reader`/`writer`. This
//! crate only reads bags with a valid index region; see
//! [`crate::CodecError::Unindexed`].

pub mod reader;
pub mod writer;

pub use reader::{BagConnection, BagMessage, BagReader};
pub use writer::{BagWriter, WriterConfig};
