// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Wire codecs: CDR (rosbag2/ROS2), the ROS1 wire format, and the
//! byte-level transcoder that moves messages between them.

pub mod cdr;
pub mod ros1;
pub mod transcode;

pub use ros1::{Ros1Decoder, Ros1Encoder, Ros1Reader, Ros1Writer};
pub use transcode::{cdr_to_ros1, ros1_to_cdr};
