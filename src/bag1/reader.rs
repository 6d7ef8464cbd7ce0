// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! rosbag1 reader.
//!
//! # BAG Format Structure (Version 2.0)
//!
//! ## File Header
//! - Magic: "#ROSBAG V2.0\n" (13 bytes)
//! - Followed by the bag header record in standard record format
//!
//! ## Record Format
//! All records follow: `<header_len: u32><header><data_len: u32><data>`
//! where `header` is a sequence of `<field_len: u32><field_name>=<field_value>`
//! pairs (first `=` splits name and value; values are not escaped).
//!
//! ## Op Codes
//! - 0x02: Message data
//! - 0x03: Bag header
//! - 0x04: Index data
//! - 0x05: Chunk
//! - 0x06: Chunk info
//! - 0x07: Connection

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::debug;

use crate::core::{CodecError, Result};

const OP_MSG_DATA: u8 = 0x02;
const OP_BAG_HEADER: u8 = 0x03;
const OP_CHUNK: u8 = 0x05;
const OP_CHUNK_INFO: u8 = 0x06;
const OP_CONNECTION: u8 = 0x07;

/// A connection (one per topic) as recorded in a rosbag1 file.
#[derive(Debug, Clone)]
pub struct BagConnection {
    pub id: u32,
    pub topic: String,
    pub msgtype: String,
    pub md5sum: String,
    pub message_definition: String,
    pub callerid: String,
    pub latching: bool,
}

/// A single decoded message record.
#[derive(Debug, Clone)]
pub struct BagMessage {
    pub connection_id: u32,
    pub topic: String,
    pub msgtype: String,
    pub timestamp_ns: u64,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
struct ChunkInfo {
    chunk_pos: u64,
    start_time: u64,
    end_time: u64,
}

/// Fields parsed out of a single record header dictionary. Not every record
/// type uses every field; absent fields stay `None`.
#[derive(Debug, Default)]
struct RecordHeader {
    op: Option<u8>,
    conn: Option<u32>,
    time: Option<u64>,
    topic: Option<String>,
    md5sum: Option<String>,
    message_type: Option<String>,
    message_definition: Option<String>,
    callerid: Option<String>,
    latching: Option<String>,
    index_pos: Option<u64>,
    chunk_pos: Option<u64>,
    start_time: Option<u64>,
    end_time: Option<u64>,
    compression: Option<String>,
    size: Option<u32>,
    ver: Option<String>,
}

/// Reader over a rosbag1 file, opened eagerly: the index region (connections
/// and chunk-infos) is parsed at `open` time so later calls never touch the
/// disk again.
pub struct BagReader {
    path: String,
    chunks: Vec<ChunkInfo>,
    connections: HashMap<u32, BagConnection>,
    mmap: memmap2::Mmap,
}

impl BagReader {
    const MAGIC: &'static [u8] = b"#ROSBAG V2.0\n";

    /// Open a rosbag1 file, parsing its bag header and index region.
    ///
    /// Fails with [`CodecError::Unindexed`] if `index_pos == 0` (the bag was
    /// never closed cleanly) and with [`CodecError::SplitNotSupported`] if
    /// the file shows signs of being part of a multi-volume split set.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let path_str = path_ref.to_string_lossy().to_string();

        let file = File::open(path_ref)?;
        let file_size = file.metadata()?.len();
        let mmap = unsafe { memmap2::Mmap::map(&file) }
            .map_err(|e| CodecError::corrupt_record(0, format!("failed to mmap file: {e}")))?;

        let mut cursor = Cursor::new(&mmap[..]);
        Self::parse_magic(&mut cursor, &path_str)?;

        let (header_fields, _data) = read_record(&mut cursor)?;
        if header_fields.op != Some(OP_BAG_HEADER) {
            return Err(CodecError::corrupt_record(
                13,
                format!("expected bag header record, got op={:?}", header_fields.op),
            ));
        }
        if let Some(ver) = &header_fields.ver {
            if ver != "2.0" {
                return Err(CodecError::split_not_supported(path_str));
            }
        }

        let index_pos = header_fields.index_pos.unwrap_or(0);
        if index_pos == 0 {
            return Err(CodecError::unindexed(path_str));
        }
        if index_pos >= file_size {
            return Err(CodecError::split_not_supported(path_str));
        }

        let (mut chunks, connections) = Self::parse_index_section(&mmap, index_pos)?;
        for chunk in &chunks {
            if chunk.chunk_pos >= file_size {
                return Err(CodecError::split_not_supported(path_str));
            }
        }
        chunks.sort_by_key(|c| c.start_time);

        debug!(
            path = %path_str,
            connections = connections.len(),
            chunks = chunks.len(),
            "opened rosbag1 file"
        );

        Ok(Self {
            path: path_str,
            chunks,
            connections,
            mmap,
        })
    }

    fn parse_magic(cursor: &mut Cursor<&[u8]>, path: &str) -> Result<()> {
        let mut magic = [0u8; 13];
        cursor
            .read_exact(&mut magic)
            .map_err(|_| CodecError::corrupt_record(0, format!("{path}: truncated magic")))?;
        if magic != *Self::MAGIC {
            return Err(CodecError::corrupt_record(
                0,
                format!("{path}: not a rosbag1 v2.0 file"),
            ));
        }
        Ok(())
    }

    fn parse_index_section(
        mmap: &[u8],
        index_pos: u64,
    ) -> Result<(Vec<ChunkInfo>, HashMap<u32, BagConnection>)> {
        let mut cursor = Cursor::new(mmap);
        cursor.set_position(index_pos);

        let mut chunks = Vec::new();
        let mut connections = HashMap::new();

        while (cursor.position() as usize) < mmap.len() {
            let (fields, data) = read_record(&mut cursor)?;
            match fields.op {
                Some(OP_CONNECTION) => {
                    let data_fields = parse_record_header(&data)?;
                    if let Some(conn) = connection_from_fields(&fields, &data_fields) {
                        connections.insert(conn.id, conn);
                    }
                }
                Some(OP_CHUNK_INFO) => {
                    chunks.push(ChunkInfo {
                        chunk_pos: fields.chunk_pos.ok_or_else(|| {
                            CodecError::corrupt_record(
                                cursor.position(),
                                "chunk info missing chunk_pos",
                            )
                        })?,
                        start_time: fields.start_time.unwrap_or(0),
                        end_time: fields.end_time.unwrap_or(0),
                    });
                }
                _ => {}
            }
        }

        Ok((chunks, connections))
    }

    /// All connections (topics), keyed by connection id.
    pub fn connections(&self) -> &HashMap<u32, BagConnection> {
        &self.connections
    }

    /// Half-open start of the recorded time range, or 0 for an empty bag.
    pub fn start_time(&self) -> u64 {
        self.chunks.iter().map(|c| c.start_time).min().unwrap_or(0)
    }

    /// Half-open end of the recorded time range, or 0 for an empty bag.
    pub fn end_time(&self) -> u64 {
        self.chunks.iter().map(|c| c.end_time).max().unwrap_or(0)
    }

    /// Decode every message in the bag, in non-decreasing timestamp order
    /// (ties broken by source order). Chunks are decompressed and parsed in
    /// full; the result is not a streaming iterator.
    pub fn messages(&self) -> Result<Vec<BagMessage>> {
        let mut all = Vec::new();
        for chunk in &self.chunks {
            let decompressed = self.read_chunk(chunk)?;
            self.parse_chunk_messages(&decompressed, &mut all)?;
        }
        all.sort_by_key(|m| m.timestamp_ns);
        Ok(all)
    }

    /// Like [`messages`](Self::messages), restricted to the half-open range
    /// `[start, end)`: a record with timestamp `== end` is never yielded.
    pub fn messages_in_range(&self, start: u64, end: u64) -> Result<Vec<BagMessage>> {
        let mut all = self.messages()?;
        all.retain(|m| m.timestamp_ns >= start && m.timestamp_ns < end);
        Ok(all)
    }

    fn read_chunk(&self, chunk: &ChunkInfo) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(&self.mmap[..]);
        cursor.set_position(chunk.chunk_pos);

        let (fields, data) = read_record(&mut cursor)?;
        if fields.op != Some(OP_CHUNK) {
            return Err(CodecError::corrupt_record(
                chunk.chunk_pos,
                format!("expected chunk record, got op={:?}", fields.op),
            ));
        }

        match fields.compression.as_deref().unwrap_or("none") {
            "none" => Ok(data),
            "bz2" => {
                use bzip2::read::BzDecoder;
                let mut decoder = BzDecoder::new(&data[..]);
                let mut out = Vec::with_capacity(fields.size.unwrap_or(0) as usize);
                decoder
                    .read_to_end(&mut out)
                    .map_err(|e| CodecError::corrupt_record(chunk.chunk_pos, e.to_string()))?;
                Ok(out)
            }
            "lz4" => {
                use lz4_flex::decompress_size_prepended;
                decompress_size_prepended(&data)
                    .map_err(|e| CodecError::corrupt_record(chunk.chunk_pos, e.to_string()))
            }
            other => Err(CodecError::unsupported(format!(
                "rosbag1 chunk compression '{other}'"
            ))),
        }
    }

    fn parse_chunk_messages(&self, data: &[u8], out: &mut Vec<BagMessage>) -> Result<()> {
        let mut cursor = Cursor::new(data);
        while (cursor.position() as usize) < data.len() {
            let (fields, payload) = read_record(&mut cursor)?;
            if fields.op != Some(OP_MSG_DATA) {
                continue;
            }
            let Some(conn_id) = fields.conn else { continue };
            let Some(conn) = self.connections.get(&conn_id) else {
                continue;
            };
            out.push(BagMessage {
                connection_id: conn_id,
                topic: conn.topic.clone(),
                msgtype: conn.msgtype.clone(),
                timestamp_ns: fields.time.unwrap_or(0),
                data: payload,
            });
        }
        Ok(())
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

fn connection_from_fields(
    header_fields: &RecordHeader,
    data_fields: &RecordHeader,
) -> Option<BagConnection> {
    Some(BagConnection {
        id: header_fields.conn?,
        topic: header_fields.topic.clone()?,
        msgtype: data_fields.message_type.clone()?,
        md5sum: data_fields.md5sum.clone().unwrap_or_default(),
        message_definition: data_fields.message_definition.clone().unwrap_or_default(),
        callerid: data_fields.callerid.clone().unwrap_or_default(),
        latching: data_fields.latching.as_deref() == Some("1"),
    })
}

/// Read a single record: `<header_len><header><data_len><data>`.
fn read_record<R: Read>(reader: &mut R) -> Result<(RecordHeader, Vec<u8>)> {
    let header_len = reader.read_u32::<LittleEndian>()?;
    let mut header_bytes = vec![0u8; header_len as usize];
    reader.read_exact(&mut header_bytes)?;
    let header_fields = parse_record_header(&header_bytes)?;

    let data_len = reader.read_u32::<LittleEndian>()?;
    let mut data = vec![0u8; data_len as usize];
    reader.read_exact(&mut data)?;

    Ok((header_fields, data))
}

fn parse_record_header(header_bytes: &[u8]) -> Result<RecordHeader> {
    let mut cursor = Cursor::new(header_bytes);
    let mut fields = RecordHeader::default();

    while (cursor.position() as usize) < header_bytes.len() {
        let field_len = match cursor.read_u32::<LittleEndian>() {
            Ok(len) => len as usize,
            Err(_) => break,
        };
        if field_len == 0 {
            continue;
        }
        let mut field_bytes = vec![0u8; field_len];
        if cursor.read_exact(&mut field_bytes).is_err() {
            break;
        }
        if let Some(eq_pos) = field_bytes.iter().position(|&b| b == b'=') {
            let name = &field_bytes[..eq_pos];
            let value = &field_bytes[eq_pos + 1..];
            set_field(&mut fields, name, value);
        }
    }

    Ok(fields)
}

fn set_field(fields: &mut RecordHeader, name: &[u8], value: &[u8]) {
    match name {
        b"op" if value.len() == 1 => fields.op = Some(value[0]),
        b"conn" if value.len() >= 4 => fields.conn = Some(le_u32(value)),
        b"time" if value.len() >= 8 => fields.time = Some(le_ros_time(value)),
        b"topic" => fields.topic = Some(String::from_utf8_lossy(value).to_string()),
        b"md5sum" => fields.md5sum = Some(String::from_utf8_lossy(value).to_string()),
        b"type" => fields.message_type = Some(String::from_utf8_lossy(value).to_string()),
        b"message_definition" => {
            fields.message_definition = Some(String::from_utf8_lossy(value).to_string())
        }
        b"callerid" => fields.callerid = Some(String::from_utf8_lossy(value).to_string()),
        b"latching" => fields.latching = Some(String::from_utf8_lossy(value).to_string()),
        b"index_pos" if value.len() >= 8 => fields.index_pos = Some(le_u64(value)),
        b"chunk_pos" if value.len() >= 8 => fields.chunk_pos = Some(le_u64(value)),
        b"start_time" if value.len() >= 8 => fields.start_time = Some(le_ros_time(value)),
        b"end_time" if value.len() >= 8 => fields.end_time = Some(le_ros_time(value)),
        b"compression" => fields.compression = Some(String::from_utf8_lossy(value).to_string()),
        b"size" if value.len() >= 4 => fields.size = Some(le_u32(value)),
        b"ver" => fields.ver = Some(String::from_utf8_lossy(value).trim().to_string()),
        _ => {}
    }
}

fn le_u32(value: &[u8]) -> u32 {
    u32::from_le_bytes([value[0], value[1], value[2], value[3]])
}

fn le_u64(value: &[u8]) -> u64 {
    u64::from_le_bytes([
        value[0], value[1], value[2], value[3], value[4], value[5], value[6], value[7],
    ])
}

fn le_ros_time(value: &[u8]) -> u64 {
    let sec = le_u32(&value[0..4]) as u64;
    let nsec = le_u32(&value[4..8]) as u64;
    sec * 1_000_000_000 + nsec
}
