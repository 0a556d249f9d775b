//! Storage module for moodjournal
//!
//! Journal entries keyed by user and calendar day, kept in SQLite.

mod database;
mod models;
mod repository;

pub use database::Database;
pub use models::{JournalEntry, MOOD_MAX, MOOD_MIN};
pub use repository::{period_statistics, EntryStore};
