//! SQLite persistence for generated lectures.

use crate::error::LectureError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::Serialize;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// One persisted lecture record.
#[derive(Debug, Clone, Serialize)]
pub struct Lecture {
    pub id: String,
    pub title: String,
    pub professor: String,
    pub description: Option<String>,
    /// Public playback URL in object storage.
    pub video_url: String,
    /// Object key the URL points at, kept for future deletion support.
    pub storage_key: String,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Lecture {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let created_at: String = row.get(7)?;
        Ok(Lecture {
            id: row.get(0)?,
            title: row.get(1)?,
            professor: row.get(2)?,
            description: row.get(3)?,
            video_url: row.get(4)?,
            storage_key: row.get(5)?,
            view_count: row.get(6)?,
            // A timestamp that no longer parses is row corruption, not a
            // default-able value.
            created_at: created_at.parse().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    7,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
        })
    }
}

const COLUMNS: &str =
    "id, title, professor, description, video_url, storage_key, view_count, created_at";

/// Database manager for the lecture store.
pub struct Db {
    conn: Mutex<Connection>,
}

impl Db {
    /// Open or create the database at the given path.
    pub fn open(path: &Path) -> Result<Self, LectureError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| LectureError::io(parent, e))?;
            }
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory database. Used in tests.
    pub fn in_memory() -> Result<Self, LectureError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, LectureError> {
        // WAL mode for better concurrency under the server.
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             CREATE TABLE IF NOT EXISTS lectures (
                 id          TEXT PRIMARY KEY,
                 title       TEXT NOT NULL,
                 professor   TEXT NOT NULL,
                 description TEXT,
                 video_url   TEXT NOT NULL,
                 storage_key TEXT NOT NULL,
                 view_count  INTEGER NOT NULL DEFAULT 0,
                 created_at  TEXT NOT NULL
             );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Insert a new lecture and return the stored record.
    pub fn insert_lecture(
        &self,
        title: &str,
        professor: &str,
        description: Option<&str>,
        video_url: &str,
        storage_key: &str,
    ) -> Result<Lecture, LectureError> {
        let lecture = Lecture {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            professor: professor.to_string(),
            description: description.map(str::to_string),
            video_url: video_url.to_string(),
            storage_key: storage_key.to_string(),
            view_count: 0,
            created_at: Utc::now(),
        };

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO lectures (id, title, professor, description, video_url, storage_key, view_count, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                lecture.id,
                lecture.title,
                lecture.professor,
                lecture.description,
                lecture.video_url,
                lecture.storage_key,
                lecture.view_count,
                lecture.created_at.to_rfc3339(),
            ],
        )?;

        info!("db: stored lecture {} ('{}')", lecture.id, lecture.title);
        Ok(lecture)
    }

    /// List all lectures, newest first.
    pub fn list_lectures(&self) -> Result<Vec<Lecture>, LectureError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM lectures ORDER BY created_at DESC"
        ))?;
        let rows = stmt.query_map([], Lecture::from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Fetch one lecture by id, incrementing its view count.
    ///
    /// The increment and the read happen under one connection lock, so
    /// concurrent viewers each see a distinct count.
    pub fn get_lecture(&self, id: &str) -> Result<Option<Lecture>, LectureError> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE lectures SET view_count = view_count + 1 WHERE id = ?1",
            params![id],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM lectures WHERE id = ?1"))?;
        let mut rows = stmt.query_map(params![id], Lecture::from_row)?;
        Ok(rows.next().transpose()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_list() {
        let db = Db::in_memory().unwrap();
        db.insert_lecture("Queues", "Prof. Kim", None, "http://s/1.mp4", "class/1.mp4")
            .unwrap();
        db.insert_lecture(
            "Stacks",
            "Prof. Kim",
            Some("week 2"),
            "http://s/2.mp4",
            "class/2.mp4",
        )
        .unwrap();

        let all = db.list_lectures().unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|l| l.title == "Queues"));
        assert_eq!(all[0].view_count, 0);
    }

    #[test]
    fn get_increments_view_count() {
        let db = Db::in_memory().unwrap();
        let stored = db
            .insert_lecture("Queues", "Prof. Kim", None, "http://s/1.mp4", "class/1.mp4")
            .unwrap();

        let first = db.get_lecture(&stored.id).unwrap().unwrap();
        assert_eq!(first.view_count, 1);
        let second = db.get_lecture(&stored.id).unwrap().unwrap();
        assert_eq!(second.view_count, 2);
    }

    #[test]
    fn unknown_id_is_none() {
        let db = Db::in_memory().unwrap();
        assert!(db.get_lecture("nope").unwrap().is_none());
    }

    #[test]
    fn corrupt_timestamp_surfaces_as_database_error() {
        let db = Db::in_memory().unwrap();
        db.conn
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO lectures (id, title, professor, description, video_url, storage_key, view_count, created_at)
                 VALUES ('x', 'T', 'P', NULL, 'http://s/x.mp4', 'class/x.mp4', 0, 'not-a-timestamp')",
                [],
            )
            .unwrap();

        assert!(matches!(
            db.list_lectures(),
            Err(LectureError::Database(_))
        ));
    }
}
