//! SQLite journal store

use chrono::{NaiveDate, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::config::Settings;
use crate::storage::models::JournalEntry;
use crate::storage::repository::EntryStore;
use crate::{JournalError, Result};

/// Database wrapper for moodjournal
pub struct Database {
    conn: Connection,
}

const CURRENT_SCHEMA_VERSION: i64 = 1;

const ENTRY_COLUMNS: &str = "date, mood_score, note, emotion_analysis, media_url, timestamp";

impl Database {
    /// Open or create the database
    pub fn open(settings: &Settings) -> Result<Self> {
        let db_path = settings.database_path();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Self::open_path(&db_path)
    }

    /// Open database at a specific path (useful for testing)
    pub fn open_path(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        tracing::debug!("Opened journal database at {}", path.display());

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize database schema
    fn initialize(&self) -> Result<()> {
        let current_version = self.schema_version()?;
        if current_version > CURRENT_SCHEMA_VERSION {
            return Err(JournalError::Config(format!(
                "Database schema version {} is newer than supported version {}",
                current_version, CURRENT_SCHEMA_VERSION
            )));
        }

        if current_version < 1 {
            self.migrate_to_v1()?;
            self.set_schema_version(1)?;
        }

        Ok(())
    }

    /// Current schema version tracked in PRAGMA user_version.
    pub fn schema_version(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))?)
    }

    fn set_schema_version(&self, version: i64) -> Result<()> {
        self.conn
            .execute(&format!("PRAGMA user_version = {}", version), [])?;
        Ok(())
    }

    fn migrate_to_v1(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS journal_entries (
                user_id TEXT NOT NULL,
                date TEXT NOT NULL,
                mood_score INTEGER NOT NULL,
                note TEXT NOT NULL DEFAULT '',
                emotion_analysis TEXT,
                media_url TEXT,
                timestamp INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (user_id, date)
            );

            CREATE INDEX IF NOT EXISTS idx_entries_user_date
                ON journal_entries(user_id, date DESC);
            "#,
        )?;

        Ok(())
    }

    /// Insert or overwrite the entry for its date
    pub fn put_entry(&self, user_id: &str, entry: &JournalEntry) -> Result<()> {
        let analysis_json = entry
            .emotion_analysis
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO journal_entries
                (user_id, date, mood_score, note, emotion_analysis, media_url, timestamp, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                user_id,
                entry.date.to_string(),
                entry.mood_score,
                entry.note,
                analysis_json,
                entry.media_url,
                entry.timestamp.timestamp(),
                Utc::now().timestamp(),
            ],
        )?;

        Ok(())
    }

    /// Get the entry for a day
    pub fn get_entry(&self, user_id: &str, date: NaiveDate) -> Result<Option<JournalEntry>> {
        let result = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM journal_entries WHERE user_id = ?1 AND date = ?2",
                    ENTRY_COLUMNS
                ),
                params![user_id, date.to_string()],
                |row| Ok(Self::row_to_entry(row)),
            )
            .optional()?;

        result.transpose()
    }

    /// All entries of a user, newest day first
    pub fn list_entries(&self, user_id: &str) -> Result<Vec<JournalEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM journal_entries WHERE user_id = ?1 ORDER BY date DESC",
            ENTRY_COLUMNS
        ))?;

        let entries = stmt
            .query_map(params![user_id], |row| Ok(Self::row_to_entry(row)))?
            .collect::<rusqlite::Result<Vec<_>>>()?
            .into_iter()
            .collect::<Result<Vec<_>>>()?;

        Ok(entries)
    }

    /// Delete the entry for a day, returning whether one existed
    pub fn delete_entry(&self, user_id: &str, date: NaiveDate) -> Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM journal_entries WHERE user_id = ?1 AND date = ?2",
            params![user_id, date.to_string()],
        )?;
        Ok(deleted > 0)
    }

    /// Days that have an entry, for calendar markers
    pub fn marked_dates(&self, user_id: &str) -> Result<Vec<NaiveDate>> {
        let mut stmt = self
            .conn
            .prepare("SELECT date FROM journal_entries WHERE user_id = ?1 ORDER BY date ASC")?;

        let dates = stmt
            .query_map(params![user_id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?
            .into_iter()
            .map(|d| parse_date(&d))
            .collect::<Result<Vec<_>>>()?;

        Ok(dates)
    }

    fn row_to_entry(row: &rusqlite::Row) -> Result<JournalEntry> {
        let date: String = row.get(0)?;
        let analysis_json: Option<String> = row.get(3)?;
        let timestamp: i64 = row.get(5)?;

        // A cache that no longer deserializes is recomputed by the analyzer
        let emotion_analysis = analysis_json.and_then(|json| match serde_json::from_str(&json) {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                tracing::warn!("Discarding unreadable cached analysis for {}: {}", date, e);
                None
            }
        });

        Ok(JournalEntry {
            date: parse_date(&date)?,
            mood_score: row.get(1)?,
            note: row.get(2)?,
            emotion_analysis,
            media_url: row.get(4)?,
            timestamp: Utc
                .timestamp_opt(timestamp, 0)
                .single()
                .unwrap_or_else(Utc::now),
        })
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    value
        .parse()
        .map_err(|e| JournalError::InvalidEntry(format!("stored date '{}': {}", value, e)))
}

impl EntryStore for Database {
    fn put(&self, user_id: &str, entry: &JournalEntry) -> Result<()> {
        self.put_entry(user_id, entry)
    }

    fn get(&self, user_id: &str, date: NaiveDate) -> Result<Option<JournalEntry>> {
        self.get_entry(user_id, date)
    }

    fn list_all(&self, user_id: &str) -> Result<Vec<JournalEntry>> {
        self.list_entries(user_id)
    }

    fn delete(&self, user_id: &str, date: NaiveDate) -> Result<bool> {
        self.delete_entry(user_id, date)
    }
}
