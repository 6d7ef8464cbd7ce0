// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `metadata.yaml` parsing and validation for rosbag2 directories.
//!
//! This crate supports metadata versions 1 through 5 (the `files` field,
//! introduced in version 5, is the newest shape it understands; the
//! `custom_data`/`ros_distro` fields some rosbag2 implementations add in
//! later versions are out of scope).

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{CodecError, Result};

const MAX_SUPPORTED_VERSION: i64 = 5;

/// Top-level `metadata.yaml` document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BagMetadata {
    pub rosbag2_bagfile_information: BagFileInformation,
}

/// The `rosbag2_bagfile_information` document body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BagFileInformation {
    pub version: i64,
    pub storage_identifier: String,
    pub relative_file_paths: Vec<String>,
    pub duration: Duration,
    pub starting_time: StartingTime,
    pub message_count: u64,
    #[serde(default)]
    pub compression_format: String,
    #[serde(default)]
    pub compression_mode: String,
    pub topics_with_message_count: Vec<TopicWithMessageCount>,
    #[serde(default)]
    pub files: Vec<FileInformation>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Duration {
    pub nanoseconds: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StartingTime {
    pub nanoseconds_since_epoch: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicWithMessageCount {
    pub message_count: u64,
    pub topic_metadata: TopicMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub message_type: String,
    pub serialization_format: String,
    #[serde(default)]
    pub offered_qos_profiles: QosProfilesField,
}

/// `offered_qos_profiles` is a YAML-encoded string in real rosbag2 files
/// (one more layer of YAML nested inside the outer document) but some
/// writers emit a plain list directly; accept either.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QosProfilesField {
    String(String),
    List(Vec<QosProfile>),
}

impl Default for QosProfilesField {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl QosProfilesField {
    /// Whether any profile in this field requests transient-local
    /// durability (ROS1 "latched" semantics).
    pub fn has_transient_local_durability(&self) -> bool {
        match self {
            QosProfilesField::List(profiles) => profiles
                .iter()
                .any(|p| p.durability == QosDurability::TransientLocal),
            QosProfilesField::String(text) => text.contains("transient_local"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QosProfile {
    #[serde(default)]
    pub history: QosHistory,
    #[serde(default)]
    pub depth: u32,
    #[serde(default)]
    pub reliability: QosReliability,
    pub durability: QosDurability,
    #[serde(default)]
    pub deadline: QosTime,
    #[serde(default)]
    pub lifespan: QosTime,
    #[serde(default)]
    pub liveliness: QosLiveliness,
    #[serde(default)]
    pub liveliness_lease_duration: QosTime,
    #[serde(default)]
    pub avoid_ros_namespace_conventions: bool,
}

impl QosProfile {
    /// A sensible default "reliable, volatile" profile for a fresh topic.
    pub fn volatile_default() -> Self {
        Self {
            history: QosHistory::KeepLast,
            depth: 10,
            reliability: QosReliability::Reliable,
            durability: QosDurability::Volatile,
            deadline: QosTime::default(),
            lifespan: QosTime::default(),
            liveliness: QosLiveliness::Automatic,
            liveliness_lease_duration: QosTime::default(),
            avoid_ros_namespace_conventions: false,
        }
    }

    /// The same default profile with transient-local durability, used when
    /// converting a latched rosbag1 connection.
    pub fn transient_local_default() -> Self {
        Self {
            durability: QosDurability::TransientLocal,
            ..Self::volatile_default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QosHistory {
    SystemDefault,
    #[default]
    KeepLast,
    KeepAll,
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QosReliability {
    SystemDefault,
    #[default]
    Reliable,
    BestEffort,
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QosDurability {
    SystemDefault,
    TransientLocal,
    #[default]
    Volatile,
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QosLiveliness {
    SystemDefault,
    #[default]
    Automatic,
    ManualByTopic,
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QosTime {
    pub sec: i32,
    pub nsec: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInformation {
    pub path: String,
    pub starting_time: StartingTime,
    pub duration: Duration,
    pub message_count: u64,
}

impl BagMetadata {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CodecError::metadata_invalid(format!("reading {}: {e}", path.display()))
        })?;
        let metadata: BagMetadata = serde_yml::from_str(&content)?;
        metadata.validate()?;
        Ok(metadata)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yml::to_string(self)
            .map_err(|e| CodecError::metadata_invalid(format!("serializing metadata: {e}")))
    }

    pub fn validate(&self) -> Result<()> {
        let info = &self.rosbag2_bagfile_information;

        if info.version < 1 || info.version > MAX_SUPPORTED_VERSION {
            return Err(CodecError::version_unsupported(info.version));
        }

        match info.storage_identifier.as_str() {
            "sqlite3" | "" => {}
            other => {
                return Err(CodecError::metadata_invalid(format!(
                    "unsupported storage_identifier '{other}'"
                )))
            }
        }

        if !info.compression_format.is_empty() && info.compression_format != "zstd" {
            return Err(CodecError::metadata_invalid(format!(
                "unsupported compression_format '{}'",
                info.compression_format
            )));
        }

        for topic in &info.topics_with_message_count {
            if topic.topic_metadata.serialization_format != "cdr" {
                return Err(CodecError::metadata_invalid(format!(
                    "topic '{}' has unsupported serialization_format '{}'",
                    topic.topic_metadata.name, topic.topic_metadata.serialization_format
                )));
            }
        }

        Ok(())
    }

    pub fn info(&self) -> &BagFileInformation {
        &self.rosbag2_bagfile_information
    }

    pub fn duration_ns(&self) -> u64 {
        self.info().duration.nanoseconds
    }

    pub fn start_time_ns(&self) -> i64 {
        self.info().starting_time.nanoseconds_since_epoch
    }

    /// End of the recorded time range; zero for an empty bag, matching
    /// rosbag2's own convention rather than `start + duration`.
    pub fn end_time_ns(&self) -> i64 {
        if self.info().message_count == 0 {
            0
        } else {
            self.start_time_ns() + self.duration_ns() as i64
        }
    }

    pub fn message_count(&self) -> u64 {
        self.info().message_count
    }

    pub fn is_compressed(&self) -> bool {
        !self.info().compression_format.is_empty()
    }

    pub fn compression_mode(&self) -> Option<&str> {
        if self.info().compression_mode.is_empty() {
            None
        } else {
            Some(&self.info().compression_mode)
        }
    }
}

/// Custom metadata attached by readers that want to stash extra fields;
/// unused by this crate but kept so round-tripping a metadata document
/// written by another rosbag2 implementation does not lose data it cannot
/// interpret. Not serialized unless populated.
#[allow(dead_code)]
type CustomData = HashMap<String, String>;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
rosbag2_bagfile_information:
  version: 5
  storage_identifier: sqlite3
  relative_file_paths:
    - test.db3
  duration:
    nanoseconds: 1000000000
  starting_time:
    nanoseconds_since_epoch: 1000000000
  message_count: 1
  compression_format: ""
  compression_mode: ""
  topics_with_message_count:
    - message_count: 1
      topic_metadata:
        name: /chatter
        type: std_msgs/msg/String
        serialization_format: cdr
        offered_qos_profiles: []
"#
    }

    #[test]
    fn test_parse_and_validate() {
        let metadata: BagMetadata = serde_yml::from_str(sample_yaml()).unwrap();
        metadata.validate().unwrap();
        assert_eq!(metadata.message_count(), 1);
        assert_eq!(metadata.duration_ns(), 1_000_000_000);
    }

    #[test]
    fn test_empty_bag_end_time_is_zero() {
        let mut metadata: BagMetadata = serde_yml::from_str(sample_yaml()).unwrap();
        metadata.rosbag2_bagfile_information.message_count = 0;
        assert_eq!(metadata.end_time_ns(), 0);
    }

    #[test]
    fn test_rejects_version_above_max() {
        let mut metadata: BagMetadata = serde_yml::from_str(sample_yaml()).unwrap();
        metadata.rosbag2_bagfile_information.version = 9;
        let result = metadata.validate();
        assert!(matches!(result, Err(CodecError::VersionUnsupported { version: 9 })));
    }

    #[test]
    fn test_rejects_non_cdr_serialization() {
        let mut metadata: BagMetadata = serde_yml::from_str(sample_yaml()).unwrap();
        metadata.rosbag2_bagfile_information.topics_with_message_count[0]
            .topic_metadata
            .serialization_format = "ros1".to_string();
        assert!(metadata.validate().is_err());
    }

    #[test]
    fn test_transient_local_detection() {
        let profiles = QosProfilesField::List(vec![QosProfile::transient_local_default()]);
        assert!(profiles.has_transient_local_durability());
        let profiles = QosProfilesField::List(vec![QosProfile::volatile_default()]);
        assert!(!profiles.has_transient_local_durability());
    }
}
