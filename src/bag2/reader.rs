// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! rosbag2 reader: a directory containing `metadata.yaml` and one or more
//! `*.db3` sqlite files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::bag2::metadata::{BagMetadata, QosProfilesField};
use crate::bag2::storage::SqliteReader;
use crate::core::{CodecError, Result};

/// A rosbag2 topic, as described by `metadata.yaml`.
#[derive(Debug, Clone)]
pub struct BagConnection {
    pub topic: String,
    pub msgtype: String,
    pub serialization_format: String,
    pub offered_qos_profiles: QosProfilesField,
}

/// A single decoded message.
#[derive(Debug, Clone)]
pub struct BagMessage {
    pub topic: String,
    pub msgtype: String,
    pub timestamp_ns: i64,
    pub data: Vec<u8>,
}

/// Reader over a rosbag2 directory.
pub struct BagReader {
    dir: PathBuf,
    metadata: BagMetadata,
    connections: HashMap<String, BagConnection>,
}

impl BagReader {
    /// Open `dir`, parsing and validating `metadata.yaml`.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let metadata_path = dir.join("metadata.yaml");
        let metadata = BagMetadata::from_file(&metadata_path)?;

        let mut connections = HashMap::new();
        for entry in &metadata.info().topics_with_message_count {
            let meta = &entry.topic_metadata;
            connections.insert(
                meta.name.clone(),
                BagConnection {
                    topic: meta.name.clone(),
                    msgtype: meta.message_type.clone(),
                    serialization_format: meta.serialization_format.clone(),
                    offered_qos_profiles: meta.offered_qos_profiles.clone(),
                },
            );
        }

        debug!(
            dir = %dir.display(),
            topics = connections.len(),
            messages = metadata.message_count(),
            "opened rosbag2 directory"
        );

        Ok(Self {
            dir,
            metadata,
            connections,
        })
    }

    pub fn connections(&self) -> &HashMap<String, BagConnection> {
        &self.connections
    }

    pub fn start_time_ns(&self) -> i64 {
        self.metadata.start_time_ns()
    }

    pub fn end_time_ns(&self) -> i64 {
        self.metadata.end_time_ns()
    }

    pub fn message_count(&self) -> u64 {
        self.metadata.message_count()
    }

    /// Decode every message, in non-decreasing timestamp order, undoing
    /// whatever compression `metadata.yaml` declares.
    pub fn messages(&self) -> Result<Vec<BagMessage>> {
        let mode = self.metadata.compression_mode().unwrap_or("");
        let format = self.metadata.info().compression_format.as_str();

        let db_paths: Vec<PathBuf> = self
            .metadata
            .info()
            .relative_file_paths
            .iter()
            .map(|p| self.dir.join(p))
            .collect();

        let _decompressed_guard;
        let resolved_paths = if mode.eq_ignore_ascii_case("file") {
            let mut temps = Vec::with_capacity(db_paths.len());
            let mut paths = Vec::with_capacity(db_paths.len());
            for path in &db_paths {
                let compressed = std::fs::read(path)?;
                let raw = decompress_bytes(&compressed, format)?;
                let temp = tempfile::NamedTempFile::new()?;
                std::fs::write(temp.path(), &raw)?;
                paths.push(temp.path().to_path_buf());
                temps.push(temp);
            }
            _decompressed_guard = temps;
            paths
        } else {
            _decompressed_guard = Vec::new();
            db_paths
        };

        let storage = SqliteReader::open(&resolved_paths)?;
        let topics = storage.topics()?;
        let mut topic_by_id = HashMap::new();
        for topic in topics {
            topic_by_id.insert(topic.id, topic.name);
        }

        let mut out = Vec::new();
        for stored in storage.messages()? {
            let Some(topic_name) = topic_by_id.get(&stored.topic_id) else {
                continue;
            };
            let Some(conn) = self.connections.get(topic_name) else {
                continue;
            };

            let data = if mode.eq_ignore_ascii_case("message") {
                decompress_bytes(&stored.data, format)?
            } else {
                stored.data
            };

            out.push(BagMessage {
                topic: conn.topic.clone(),
                msgtype: conn.msgtype.clone(),
                timestamp_ns: stored.timestamp_ns,
                data,
            });
        }
        out.sort_by_key(|m| m.timestamp_ns);
        Ok(out)
    }

    /// Like [`messages`](Self::messages), restricted to the half-open range
    /// `[start, end)`: a record with timestamp `== end` is never yielded.
    pub fn messages_in_range(&self, start: i64, end: i64) -> Result<Vec<BagMessage>> {
        let mut all = self.messages()?;
        all.retain(|m| m.timestamp_ns >= start && m.timestamp_ns < end);
        Ok(all)
    }
}

fn decompress_bytes(data: &[u8], format: &str) -> Result<Vec<u8>> {
    match format {
        "zstd" => zstd::decode_all(data)
            .map_err(|e| CodecError::storage_error(format!("zstd decompression failed: {e}"))),
        "" => Ok(data.to_vec()),
        other => Err(CodecError::unsupported(format!(
            "rosbag2 compression format '{other}'"
        ))),
    }
}
