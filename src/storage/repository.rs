//! Store abstraction over journal persistence
//!
//! The statistics side only needs entries back; anything keyed by
//! `user_id + date` can stand in for the local database.

use chrono::NaiveDate;

use crate::analysis::{filter_by_period, EmotionAnalyzer, PeriodStatistics, StatsPeriod};
use crate::storage::JournalEntry;
use crate::Result;

pub trait EntryStore {
    /// Save an entry, replacing any entry for the same day
    fn put(&self, user_id: &str, entry: &JournalEntry) -> Result<()>;

    fn get(&self, user_id: &str, date: NaiveDate) -> Result<Option<JournalEntry>>;

    /// Every entry of the user, newest day first
    fn list_all(&self, user_id: &str) -> Result<Vec<JournalEntry>>;

    /// Returns whether an entry was removed
    fn delete(&self, user_id: &str, date: NaiveDate) -> Result<bool>;
}

/// Statistics for a user's entries within `period` of `today`
pub fn period_statistics(
    store: &dyn EntryStore,
    analyzer: &EmotionAnalyzer<'_>,
    user_id: &str,
    period: StatsPeriod,
    today: NaiveDate,
) -> Result<PeriodStatistics> {
    let entries = store.list_all(user_id)?;
    let in_period = filter_by_period(&entries, period, today);
    tracing::debug!(
        "Computing {} statistics over {} of {} entries",
        period,
        in_period.len(),
        entries.len()
    );
    Ok(analyzer.calculate_period_stats(&in_period))
}
