// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! The `*.db3` sqlite storage layer underneath a rosbag2 directory.
//!
//! Schema (ROS2 sqlite schema version 4, the version this crate writes and
//! the minimum it expects to read):
//!
//! ```text
//! topics(id, name, type, serialization_format, offered_qos_profiles)
//! messages(id, topic_id, timestamp, data)
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::debug;

use crate::core::Result;

/// One row of the `topics` table.
#[derive(Debug, Clone)]
pub struct TopicRow {
    pub id: i64,
    pub name: String,
    pub message_type: String,
    pub serialization_format: String,
    pub offered_qos_profiles: String,
}

/// A decoded `messages` row, joined against its topic name.
#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub topic_id: i64,
    pub timestamp_ns: i64,
    pub data: Vec<u8>,
}

/// Read-only access to one or more `*.db3` files making up a bag.
pub struct SqliteReader {
    connections: Vec<Connection>,
}

impl SqliteReader {
    /// Open every database file in `paths` read-only.
    pub fn open(paths: &[PathBuf]) -> Result<Self> {
        let mut connections = Vec::with_capacity(paths.len());
        for path in paths {
            let conn =
                Connection::open_with_flags(path, rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY)?;
            connections.push(conn);
        }
        Ok(Self { connections })
    }

    /// All topics across every file, in `id` order per file.
    pub fn topics(&self) -> Result<Vec<TopicRow>> {
        let mut out = Vec::new();
        for conn in &self.connections {
            let mut stmt = conn.prepare(
                "SELECT id, name, type, serialization_format, offered_qos_profiles
                 FROM topics ORDER BY id",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(TopicRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    message_type: row.get(2)?,
                    serialization_format: row.get(3)?,
                    offered_qos_profiles: row.get(4)?,
                })
            })?;
            for row in rows {
                out.push(row?);
            }
        }
        Ok(out)
    }

    /// Every message across every file, in non-decreasing timestamp order.
    pub fn messages(&self) -> Result<Vec<StoredMessage>> {
        let mut all = Vec::new();
        for conn in &self.connections {
            let mut stmt =
                conn.prepare("SELECT topic_id, timestamp, data FROM messages ORDER BY timestamp")?;
            let rows = stmt.query_map([], |row| {
                Ok(StoredMessage {
                    topic_id: row.get(0)?,
                    timestamp_ns: row.get(1)?,
                    data: row.get(2)?,
                })
            })?;
            for row in rows {
                all.push(row?);
            }
        }
        all.sort_by_key(|m| m.timestamp_ns);
        Ok(all)
    }
}

/// Writes a single `*.db3` file.
pub struct SqliteWriter {
    conn: Connection,
    topic_ids: HashMap<String, i64>,
}

impl SqliteWriter {
    /// Create `path`, initializing the sqlite schema.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        let mut writer = Self {
            conn,
            topic_ids: HashMap::new(),
        };
        writer.create_schema()?;
        debug!(path = %path.as_ref().display(), "created rosbag2 storage file");
        Ok(writer)
    }

    fn create_schema(&mut self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE schema(
                schema_version INTEGER PRIMARY KEY,
                ros_distro TEXT NOT NULL
            );
            CREATE TABLE metadata(
                id INTEGER PRIMARY KEY,
                metadata_version INTEGER NOT NULL,
                metadata TEXT NOT NULL
            );
            CREATE TABLE topics(
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                type TEXT NOT NULL,
                serialization_format TEXT NOT NULL,
                offered_qos_profiles TEXT NOT NULL
            );
            CREATE TABLE messages(
                id INTEGER PRIMARY KEY,
                topic_id INTEGER NOT NULL,
                timestamp INTEGER NOT NULL,
                data BLOB NOT NULL
            );
            CREATE INDEX timestamp_idx ON messages (timestamp ASC);
            INSERT INTO schema(schema_version, ros_distro) VALUES (4, 'robocodec');
            "#,
        )?;
        Ok(())
    }

    /// Register a topic, returning its sqlite row id.
    pub fn add_topic(
        &mut self,
        name: &str,
        message_type: &str,
        serialization_format: &str,
        offered_qos_profiles: &str,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO topics(name, type, serialization_format, offered_qos_profiles)
             VALUES (?1, ?2, ?3, ?4)",
            (name, message_type, serialization_format, offered_qos_profiles),
        )?;
        let id = self.conn.last_insert_rowid();
        self.topic_ids.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn topic_id(&self, name: &str) -> Option<i64> {
        self.topic_ids.get(name).copied()
    }

    /// Insert one message. Callers buffer batches and call this inside a
    /// single transaction for bulk writes; see [`SqliteWriter::write_batch`].
    pub fn write_message(&mut self, topic_id: i64, timestamp_ns: i64, data: &[u8]) -> Result<()> {
        self.conn.execute(
            "INSERT INTO messages(topic_id, timestamp, data) VALUES (?1, ?2, ?3)",
            (topic_id, timestamp_ns, data),
        )?;
        Ok(())
    }

    /// Insert a batch of messages inside a single transaction.
    pub fn write_batch(&mut self, messages: &[(i64, i64, Vec<u8>)]) -> Result<()> {
        if messages.is_empty() {
            return Ok(());
        }
        let tx = self.conn.transaction()?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO messages(topic_id, timestamp, data) VALUES (?1, ?2, ?3)")?;
            for (topic_id, timestamp_ns, data) in messages {
                stmt.execute((topic_id, timestamp_ns, data))?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Record the serialized `metadata.yaml` document alongside the data,
    /// as rosbag2 sqlite files do, and release the connection.
    pub fn close(self, metadata_version: i64, metadata_yaml: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO metadata(metadata_version, metadata) VALUES (?1, ?2)",
            (metadata_version, metadata_yaml),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db3");

        let mut writer = SqliteWriter::create(&path).unwrap();
        let topic_id = writer
            .add_topic("/chatter", "std_msgs/msg/String", "cdr", "[]")
            .unwrap();
        writer.write_message(topic_id, 100, b"hello").unwrap();
        writer.write_message(topic_id, 200, b"world").unwrap();
        writer.close(5, "dummy: metadata").unwrap();

        let reader = SqliteReader::open(&[path]).unwrap();
        let topics = reader.topics().unwrap();
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].name, "/chatter");

        let messages = reader.messages().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].timestamp_ns, 100);
        assert_eq!(messages[0].data, b"hello");
    }

    #[test]
    fn test_write_batch_is_transactional() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db3");

        let mut writer = SqliteWriter::create(&path).unwrap();
        let topic_id = writer
            .add_topic("/chatter", "std_msgs/msg/String", "cdr", "[]")
            .unwrap();
        let batch = vec![
            (topic_id, 1i64, b"a".to_vec()),
            (topic_id, 2i64, b"b".to_vec()),
            (topic_id, 3i64, b"c".to_vec()),
        ];
        writer.write_batch(&batch).unwrap();
        writer.close(5, "dummy").unwrap();

        let reader = SqliteReader::open(&[path]).unwrap();
        assert_eq!(reader.messages().unwrap().len(), 3);
    }
}
