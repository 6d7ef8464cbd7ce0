// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! rosbag2 writer.
//!
//! Messages are buffered in memory and committed to the `*.db3` file in one
//! transaction on [`BagWriter::finish`], along with `metadata.yaml`
//! (written atomically: a temp file, then renamed into place).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::bag2::metadata::{
    BagFileInformation, BagMetadata, Duration, FileInformation, QosProfilesField, StartingTime,
    TopicMetadata, TopicWithMessageCount,
};
use crate::bag2::storage::SqliteWriter;
use crate::core::{CodecError, Result};

const METADATA_VERSION: i64 = 5;

/// How `*.db3` content is compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionMode {
    #[default]
    None,
    /// The whole `*.db3` file is zstd-compressed after [`BagWriter::finish`].
    File,
    /// Each message blob is zstd-compressed individually before insertion.
    Message,
}

impl CompressionMode {
    fn as_metadata_str(self) -> &'static str {
        match self {
            CompressionMode::None => "",
            CompressionMode::File => "FILE",
            CompressionMode::Message => "MESSAGE",
        }
    }

    fn compression_format_str(self) -> &'static str {
        match self {
            CompressionMode::None => "",
            CompressionMode::File | CompressionMode::Message => "zstd",
        }
    }
}

/// Writer configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriterConfig {
    pub compression: CompressionMode,
}

struct ConnRecord {
    topic: String,
    msgtype: String,
    serialization_format: String,
    offered_qos_profiles: QosProfilesField,
}

struct PendingMessage {
    topic_id: i64,
    timestamp_ns: i64,
    data: Vec<u8>,
}

/// Writer for rosbag2 directories.
pub struct BagWriter {
    dir: PathBuf,
    db_file_name: String,
    config: WriterConfig,
    storage: SqliteWriter,
    connections: Vec<ConnRecord>,
    topic_ids: HashMap<String, i64>,
    pending: Vec<PendingMessage>,
    topic_message_counts: HashMap<String, u64>,
    min_time: Option<i64>,
    max_time: Option<i64>,
    finished: bool,
}

impl BagWriter {
    /// Create `dir` and its `*.db3` file.
    pub fn create<P: AsRef<Path>>(dir: P, config: WriterConfig) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let stem = dir
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "rosbag2".to_string());
        let db_file_name = format!("{stem}.db3");
        let storage = SqliteWriter::create(dir.join(&db_file_name))?;

        debug!(dir = %dir.display(), "opened rosbag2 writer");

        Ok(Self {
            dir,
            db_file_name,
            config,
            storage,
            connections: Vec::new(),
            topic_ids: HashMap::new(),
            pending: Vec::new(),
            topic_message_counts: HashMap::new(),
            min_time: None,
            max_time: None,
            finished: false,
        })
    }

    /// Register a topic. Duplicate topic names are rejected.
    pub fn add_connection(
        &mut self,
        topic: impl Into<String>,
        msgtype: impl Into<String>,
        serialization_format: impl Into<String>,
        offered_qos_profiles: QosProfilesField,
    ) -> Result<()> {
        let topic = topic.into();
        if self.topic_ids.contains_key(&topic) {
            return Err(CodecError::type_conflict(
                topic,
                "connection already registered for this topic",
            ));
        }

        let serialization_format = serialization_format.into();
        let msgtype = msgtype.into();
        let qos_text = serde_yml::to_string(&offered_qos_profiles)
            .map_err(|e| CodecError::metadata_invalid(format!("serializing qos profile: {e}")))?;

        let topic_id =
            self.storage
                .add_topic(&topic, &msgtype, &serialization_format, qos_text.trim())?;
        self.topic_ids.insert(topic.clone(), topic_id);
        self.connections.push(ConnRecord {
            topic,
            msgtype,
            serialization_format,
            offered_qos_profiles,
        });
        Ok(())
    }

    /// Buffer a message for `topic`, applying message-level compression if
    /// configured.
    pub fn write_message(&mut self, topic: &str, timestamp_ns: i64, data: &[u8]) -> Result<()> {
        let topic_id = *self
            .topic_ids
            .get(topic)
            .ok_or_else(|| CodecError::not_found(format!("connection for topic '{topic}'")))?;

        let stored = match self.config.compression {
            CompressionMode::Message => {
                zstd::encode_all(data, 0).map_err(|e| {
                    CodecError::storage_error(format!("zstd compression failed: {e}"))
                })?
            }
            CompressionMode::None | CompressionMode::File => data.to_vec(),
        };

        self.min_time = Some(self.min_time.map_or(timestamp_ns, |t| t.min(timestamp_ns)));
        self.max_time = Some(self.max_time.map_or(timestamp_ns, |t| t.max(timestamp_ns)));
        *self
            .topic_message_counts
            .entry(topic.to_string())
            .or_insert(0) += 1;

        self.pending.push(PendingMessage {
            topic_id,
            timestamp_ns,
            data: stored,
        });
        Ok(())
    }

    /// Commit every buffered message in one transaction, write
    /// `metadata.yaml`, and (for [`CompressionMode::File`]) compress the
    /// finished `*.db3`. Consumes the writer.
    pub fn finish(mut self) -> Result<()> {
        let batch: Vec<(i64, i64, Vec<u8>)> = self
            .pending
            .iter()
            .map(|m| (m.topic_id, m.timestamp_ns, m.data.clone()))
            .collect();
        self.storage.write_batch(&batch)?;

        let metadata = self.build_metadata();
        let metadata_yaml = metadata.to_yaml()?;

        self.storage.close(METADATA_VERSION, &metadata_yaml)?;

        if self.config.compression == CompressionMode::File {
            self.compress_db_file()?;
        }

        let metadata_path = self.dir.join("metadata.yaml");
        let temp_path = self.dir.join("metadata.yaml.tmp");
        fs::write(&temp_path, metadata.to_yaml()?)?;
        fs::rename(&temp_path, &metadata_path)?;

        self.finished = true;
        debug!(
            dir = %self.dir.display(),
            messages = batch.len(),
            "finished rosbag2 writer"
        );
        Ok(())
    }

    fn compress_db_file(&self) -> Result<()> {
        let db_path = self.dir.join(&self.db_file_name);
        let raw = fs::read(&db_path)?;
        let compressed = zstd::encode_all(raw.as_slice(), 0)
            .map_err(|e| CodecError::storage_error(format!("zstd compression failed: {e}")))?;
        let compressed_path = self.dir.join(format!("{}.zstd", self.db_file_name));
        fs::write(&compressed_path, compressed)?;
        fs::remove_file(&db_path)?;
        Ok(())
    }

    fn build_metadata(&self) -> BagMetadata {
        let message_count = self.pending.len() as u64;
        let start = self.min_time.unwrap_or(0);
        let duration = if message_count == 0 {
            0
        } else {
            (self.max_time.unwrap_or(start) - start) as u64
        };

        let relative_file_path = if self.config.compression == CompressionMode::File {
            format!("{}.zstd", self.db_file_name)
        } else {
            self.db_file_name.clone()
        };

        let topics_with_message_count = self
            .connections
            .iter()
            .map(|c| TopicWithMessageCount {
                message_count: *self.topic_message_counts.get(&c.topic).unwrap_or(&0),
                topic_metadata: TopicMetadata {
                    name: c.topic.clone(),
                    message_type: c.msgtype.clone(),
                    serialization_format: c.serialization_format.clone(),
                    offered_qos_profiles: c.offered_qos_profiles.clone(),
                },
            })
            .collect();

        BagMetadata {
            rosbag2_bagfile_information: BagFileInformation {
                version: METADATA_VERSION,
                storage_identifier: "sqlite3".to_string(),
                relative_file_paths: vec![relative_file_path.clone()],
                duration: Duration { nanoseconds: duration },
                starting_time: StartingTime {
                    nanoseconds_since_epoch: start,
                },
                message_count,
                compression_format: self.config.compression.compression_format_str().to_string(),
                compression_mode: self.config.compression.as_metadata_str().to_string(),
                topics_with_message_count,
                files: vec![FileInformation {
                    path: relative_file_path,
                    starting_time: StartingTime {
                        nanoseconds_since_epoch: start,
                    },
                    duration: Duration { nanoseconds: duration },
                    message_count,
                }],
            },
        }
    }
}

impl Drop for BagWriter {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!(
                dir = %self.dir.display(),
                "rosbag2 BagWriter dropped without calling finish(); metadata.yaml was never written"
            );
        }
    }
}
