// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! rosbag1 writer.
//!
//! Messages are buffered into chunks up to [`WriterConfig::chunk_threshold`]
//! bytes of uncompressed payload; each chunk is flushed uncompressed (no
//! compression option is exposed for writing, matching the reader's
//! `none`/`bz2`/`lz4` support being read-only for the latter two). The file
//! header, connection records, index region, and chunk-info records are all
//! finalized on [`BagWriter::finish`]; dropping a writer without calling
//! `finish` leaves an unindexed, unreadable file and is logged as a warning.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::Result;
use crate::schema::ast::MessageType;
use crate::schema::registry::TypeRegistry;
use crate::schema::{compute_md5sum, generate_definition};

const MAGIC: &[u8] = b"#ROSBAG V2.0\n";
const FILE_HEADER_LENGTH: u64 = 4096;

const OP_MSG_DATA: u8 = 0x02;
const OP_BAG_HEADER: u8 = 0x03;
const OP_INDEX_DATA: u8 = 0x04;
const OP_CHUNK: u8 = 0x05;
const OP_CHUNK_INFO: u8 = 0x06;
const OP_CONNECTION: u8 = 0x07;

/// Default chunk budget: 768 KiB of uncompressed message payload per chunk.
pub const DEFAULT_CHUNK_THRESHOLD: usize = 768 * 1024;

/// Writer configuration.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Uncompressed bytes buffered per chunk before it is flushed.
    pub chunk_threshold: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            chunk_threshold: DEFAULT_CHUNK_THRESHOLD,
        }
    }
}

struct ConnectionRecord {
    id: u32,
    topic: String,
    msgtype: String,
    md5sum: String,
    message_definition: String,
    callerid: String,
    latching: bool,
}

struct IndexEntry {
    time: u64,
    offset: u32,
}

struct ChunkRecord {
    pos: u64,
    start_time: u64,
    end_time: u64,
    /// Number of messages per connection id, in this chunk.
    connection_counts: HashMap<u32, u32>,
}

/// Writer for rosbag1 files.
pub struct BagWriter {
    path: PathBuf,
    file: BufWriter<File>,
    config: WriterConfig,

    connections: Vec<ConnectionRecord>,
    next_connection_id: u32,

    chunk_buf: Vec<u8>,
    chunk_start_time: Option<u64>,
    chunk_end_time: u64,
    chunk_connection_counts: HashMap<u32, u32>,
    /// Index entries per connection, across the whole file.
    connection_index: HashMap<u32, Vec<IndexEntry>>,
    chunks: Vec<ChunkRecord>,

    finished: bool,
}

impl BagWriter {
    /// Create a new bag at `path`, writing the magic and a placeholder file
    /// header that is patched in on [`finish`](Self::finish).
    pub fn create<P: AsRef<Path>>(path: P, config: WriterConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        let mut writer = Self {
            path,
            file: BufWriter::new(file),
            config,
            connections: Vec::new(),
            next_connection_id: 0,
            chunk_buf: Vec::new(),
            chunk_start_time: None,
            chunk_end_time: 0,
            chunk_connection_counts: HashMap::new(),
            connection_index: HashMap::new(),
            chunks: Vec::new(),
            finished: false,
        };
        writer.file.write_all(MAGIC)?;
        writer.write_placeholder_file_header()?;
        debug!(path = %writer.path.display(), "opened rosbag1 writer");
        Ok(writer)
    }

    fn write_placeholder_file_header(&mut self) -> Result<()> {
        let start = MAGIC.len() as u64;
        self.write_header_record(OP_BAG_HEADER, &[("index_pos", b"\0\0\0\0\0\0\0\0".to_vec())])?;
        let written = self.file.stream_position()? - start;
        let padding = FILE_HEADER_LENGTH.saturating_sub(written);
        self.file.write_all(&vec![b' '; padding as usize])?;
        Ok(())
    }

    /// Register a connection for `topic`, synthesizing `md5sum` and
    /// `message_definition` from `msg_type` via `registry`.
    pub fn add_connection(
        &mut self,
        topic: impl Into<String>,
        msg_type: &MessageType,
        registry: &TypeRegistry,
        callerid: impl Into<String>,
        latching: bool,
    ) -> Result<u32> {
        let id = self.next_connection_id;
        self.next_connection_id += 1;

        let md5sum = compute_md5sum(msg_type, registry)?;
        let message_definition = generate_definition(msg_type, registry)?;

        self.connections.push(ConnectionRecord {
            id,
            topic: topic.into(),
            msgtype: msg_type.name.clone(),
            md5sum,
            message_definition,
            callerid: callerid.into(),
            latching,
        });
        Ok(id)
    }

    /// Buffer a message for `connection_id`, flushing the current chunk if
    /// it has grown past [`WriterConfig::chunk_threshold`].
    pub fn write_message(&mut self, connection_id: u32, timestamp_ns: u64, data: &[u8]) -> Result<()> {
        let offset_in_chunk = self.chunk_buf.len() as u32;
        encode_record(
            &mut self.chunk_buf,
            OP_MSG_DATA,
            &[
                ("conn", connection_id.to_le_bytes().to_vec()),
                ("time", ros_time_bytes(timestamp_ns)),
            ],
            data,
        );

        self.chunk_start_time = Some(self.chunk_start_time.unwrap_or(timestamp_ns).min(timestamp_ns));
        self.chunk_end_time = self.chunk_end_time.max(timestamp_ns);
        *self.chunk_connection_counts.entry(connection_id).or_insert(0) += 1;
        self.connection_index
            .entry(connection_id)
            .or_default()
            .push(IndexEntry {
                time: timestamp_ns,
                offset: offset_in_chunk,
            });

        if self.chunk_buf.len() >= self.config.chunk_threshold {
            self.flush_chunk()?;
        }
        Ok(())
    }

    fn flush_chunk(&mut self) -> Result<()> {
        if self.chunk_buf.is_empty() {
            return Ok(());
        }

        let pos = self.file.stream_position()?;
        self.write_header_record(
            OP_CHUNK,
            &[
                ("compression", b"none".to_vec()),
                ("size", (self.chunk_buf.len() as u32).to_le_bytes().to_vec()),
            ],
        )?;
        self.file
            .write_all(&(self.chunk_buf.len() as u32).to_le_bytes())?;
        self.file.write_all(&self.chunk_buf)?;

        self.chunks.push(ChunkRecord {
            pos,
            start_time: self.chunk_start_time.unwrap_or(0),
            end_time: self.chunk_end_time,
            connection_counts: std::mem::take(&mut self.chunk_connection_counts),
        });

        self.chunk_buf.clear();
        self.chunk_start_time = None;
        self.chunk_end_time = 0;
        Ok(())
    }

    /// Flush the final chunk, write connection/index/chunk-info records,
    /// and patch the file header's `index_pos`. Consumes the writer.
    pub fn finish(mut self) -> Result<()> {
        self.finish_internal()?;
        self.finished = true;
        Ok(())
    }

    fn finish_internal(&mut self) -> Result<()> {
        self.flush_chunk()?;

        let index_pos = self.file.stream_position()?;

        for conn in &self.connections {
            self.write_connection_record(conn)?;
        }
        for (conn_id, entries) in &self.connection_index {
            self.write_index_record(*conn_id, entries)?;
        }
        for chunk in &self.chunks {
            self.write_chunk_info_record(chunk)?;
        }

        self.file.flush()?;
        self.patch_index_pos(index_pos)?;
        self.file.flush()?;

        debug!(
            path = %self.path.display(),
            connections = self.connections.len(),
            chunks = self.chunks.len(),
            "finished rosbag1 writer"
        );
        Ok(())
    }

    fn write_connection_record(&mut self, conn: &ConnectionRecord) -> Result<()> {
        let mut data_fields = Vec::new();
        encode_header_fields(
            &mut data_fields,
            &[
                ("topic", conn.topic.as_bytes().to_vec()),
                ("type", conn.msgtype.as_bytes().to_vec()),
                ("md5sum", conn.md5sum.as_bytes().to_vec()),
                (
                    "message_definition",
                    conn.message_definition.as_bytes().to_vec(),
                ),
                ("callerid", conn.callerid.as_bytes().to_vec()),
                (
                    "latching",
                    if conn.latching { b"1".to_vec() } else { b"0".to_vec() },
                ),
            ],
        );

        self.write_header_record(
            OP_CONNECTION,
            &[
                ("conn", conn.id.to_le_bytes().to_vec()),
                ("topic", conn.topic.as_bytes().to_vec()),
            ],
        )?;
        self.file.write_all(&(data_fields.len() as u32).to_le_bytes())?;
        self.file.write_all(&data_fields)?;
        Ok(())
    }

    fn write_index_record(&mut self, conn_id: u32, entries: &[IndexEntry]) -> Result<()> {
        self.write_header_record(
            OP_INDEX_DATA,
            &[
                ("conn", conn_id.to_le_bytes().to_vec()),
                ("count", (entries.len() as u32).to_le_bytes().to_vec()),
            ],
        )?;
        let mut data = Vec::with_capacity(entries.len() * 12);
        for entry in entries {
            data.extend_from_slice(&ros_time_bytes(entry.time));
            data.extend_from_slice(&entry.offset.to_le_bytes());
        }
        self.file.write_all(&(data.len() as u32).to_le_bytes())?;
        self.file.write_all(&data)?;
        Ok(())
    }

    fn write_chunk_info_record(&mut self, chunk: &ChunkRecord) -> Result<()> {
        self.write_header_record(
            OP_CHUNK_INFO,
            &[
                ("chunk_pos", chunk.pos.to_le_bytes().to_vec()),
                ("start_time", ros_time_bytes(chunk.start_time)),
                ("end_time", ros_time_bytes(chunk.end_time)),
                (
                    "count",
                    (chunk.connection_counts.len() as u32).to_le_bytes().to_vec(),
                ),
            ],
        )?;
        let mut data = Vec::new();
        for (conn_id, count) in &chunk.connection_counts {
            data.extend_from_slice(&conn_id.to_le_bytes());
            data.extend_from_slice(&count.to_le_bytes());
        }
        self.file.write_all(&(data.len() as u32).to_le_bytes())?;
        self.file.write_all(&data)?;
        Ok(())
    }

    fn write_header_record(&mut self, op: u8, fields: &[(&str, Vec<u8>)]) -> Result<()> {
        let mut header = Vec::new();
        encode_header_fields(&mut header, &[("op", vec![op])]);
        encode_header_fields(&mut header, fields);
        self.file.write_all(&(header.len() as u32).to_le_bytes())?;
        self.file.write_all(&header)?;
        Ok(())
    }

    fn patch_index_pos(&mut self, index_pos: u64) -> Result<()> {
        self.file.flush()?;
        let mut file = self.file.get_mut();
        file.seek(SeekFrom::Start(MAGIC.len() as u64))?;

        let mut header = Vec::new();
        encode_header_fields(&mut header, &[("op", vec![OP_BAG_HEADER])]);
        encode_header_fields(&mut header, &[("index_pos", index_pos.to_le_bytes().to_vec())]);
        file.write_all(&(header.len() as u32).to_le_bytes())?;
        file.write_all(&header)?;
        Ok(())
    }
}

impl Drop for BagWriter {
    fn drop(&mut self) {
        if !self.finished {
            warn!(
                path = %self.path.display(),
                "BagWriter dropped without calling finish(); file has no index and cannot be read back"
            );
        }
    }
}

fn encode_header_fields(out: &mut Vec<u8>, fields: &[(&str, Vec<u8>)]) {
    for (name, value) in fields {
        let mut field = Vec::with_capacity(name.len() + 1 + value.len());
        field.extend_from_slice(name.as_bytes());
        field.push(b'=');
        field.extend_from_slice(value);
        out.extend_from_slice(&(field.len() as u32).to_le_bytes());
        out.extend_from_slice(&field);
    }
}

fn encode_record(out: &mut Vec<u8>, op: u8, fields: &[(&str, Vec<u8>)], data: &[u8]) {
    let mut header = Vec::new();
    encode_header_fields(&mut header, &[("op", vec![op])]);
    encode_header_fields(&mut header, fields);
    out.extend_from_slice(&(header.len() as u32).to_le_bytes());
    out.extend_from_slice(&header);
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);
}

fn ros_time_bytes(timestamp_ns: u64) -> Vec<u8> {
    let sec = (timestamp_ns / 1_000_000_000) as u32;
    let nsec = (timestamp_ns % 1_000_000_000) as u32;
    let mut bytes = Vec::with_capacity(8);
    bytes.extend_from_slice(&sec.to_le_bytes());
    bytes.extend_from_slice(&nsec.to_le_bytes());
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bag1::reader::BagReader;
    use crate::schema::ast::{Field, FieldType, PrimitiveType};

    fn int32_msg(name: &str) -> MessageType {
        let mut t = MessageType::new(name.to_string());
        t.add_field(Field {
            name: "data".to_string(),
            type_name: FieldType::Primitive(PrimitiveType::Int32),
        });
        t
    }

    #[test]
    fn test_write_and_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.bag");

        let registry = TypeRegistry::new();
        let msg_type = int32_msg("test/Int32Msg");

        let mut writer = BagWriter::create(&path, WriterConfig::default()).unwrap();
        let conn_id = writer
            .add_connection("/chatter", &msg_type, &registry, "/node", false)
            .unwrap();

        let mut payload = Vec::new();
        payload.extend_from_slice(&42i32.to_le_bytes());
        writer.write_message(conn_id, 1_000_000_000, &payload).unwrap();
        writer.write_message(conn_id, 2_000_000_000, &payload).unwrap();
        writer.finish().unwrap();

        let reader = BagReader::open(&path).unwrap();
        assert_eq!(reader.connections().len(), 1);
        let messages = reader.messages().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].timestamp_ns, 1_000_000_000);
        assert_eq!(messages[1].timestamp_ns, 2_000_000_000);
        assert_eq!(messages[0].data, payload);
    }

    #[test]
    fn test_connection_carries_real_md5sum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.bag");

        let registry = TypeRegistry::new();
        let msg_type = int32_msg("test/Int32Msg");
        let expected_md5 = compute_md5sum(&msg_type, &registry).unwrap();

        let mut writer = BagWriter::create(&path, WriterConfig::default()).unwrap();
        let conn_id = writer
            .add_connection("/chatter", &msg_type, &registry, "/node", false)
            .unwrap();
        writer
            .write_message(conn_id, 0, &0i32.to_le_bytes())
            .unwrap();
        writer.finish().unwrap();

        let reader = BagReader::open(&path).unwrap();
        let conn = reader.connections().get(&conn_id).unwrap();
        assert_eq!(conn.md5sum, expected_md5);
        assert_ne!(conn.md5sum, "00000000000000000000000000000000");
    }

    #[test]
    fn test_messages_in_range_is_half_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.bag");

        let registry = TypeRegistry::new();
        let msg_type = int32_msg("test/Int32Msg");

        let mut writer = BagWriter::create(&path, WriterConfig::default()).unwrap();
        let conn_id = writer
            .add_connection("/chatter", &msg_type, &registry, "/node", false)
            .unwrap();
        for t in [0u64, 10, 20, 30] {
            writer
                .write_message(conn_id, t, &t.to_le_bytes()[..4])
                .unwrap();
        }
        writer.finish().unwrap();

        let reader = BagReader::open(&path).unwrap();
        let messages = reader.messages_in_range(10, 30).unwrap();
        let timestamps: Vec<u64> = messages.iter().map(|m| m.timestamp_ns).collect();
        assert_eq!(timestamps, vec![10, 20]);
    }
}
