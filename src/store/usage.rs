//! SQLite-backed eye usage statistics.
//!
//! Usage is tallied in memory as seconds per local calendar day and written
//! to the database on `persist`. Each persist adds the pending seconds to the
//! stored totals, so a crash loses at most one tally period.

use crate::capabilities::StatisticsCollector;
use crate::error::StatsError;
use chrono::{Local, NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Daily usage totals with an unsaved in-memory tail.
pub struct UsageStatistics {
    conn: Arc<Mutex<Connection>>,
    last_tally: NaiveDateTime,
    pending: BTreeMap<NaiveDate, i64>,
}

impl UsageStatistics {
    /// Opens or creates the database at the default location.
    ///
    /// Creates `<data_dir>/eyeguard/usage.db` if it doesn't exist.
    pub fn open_default() -> Result<Self, StatsError> {
        Self::open(&Self::default_path())
    }

    pub fn open(path: &Path) -> Result<Self, StatsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }

        tracing::info!(path = ?path, "Opening usage database");

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::with_connection(conn)
    }

    /// Opens an in-memory database (for testing).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StatsError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StatsError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS eye_usage (
                date TEXT PRIMARY KEY,
                seconds INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            last_tally: Local::now().naive_local(),
            pending: BTreeMap::new(),
        })
    }

    fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("eyeguard")
            .join("usage.db")
    }

    /// Adds time elapsed since the previous tally, split at midnight.
    pub fn tally_at(&mut self, now: NaiveDateTime) {
        let mut from = self.last_tally;
        if now <= from {
            return;
        }

        while from.date() < now.date() {
            let Some(midnight) = from.date().succ_opt().and_then(|d| d.and_hms_opt(0, 0, 0)) else {
                break;
            };
            *self.pending.entry(from.date()).or_insert(0) += (midnight - from).num_seconds();
            from = midnight;
        }
        *self.pending.entry(now.date()).or_insert(0) += (now - from).num_seconds();

        self.last_tally = now;
    }

    /// Seconds tallied but not yet persisted, per day.
    pub fn pending(&self) -> &BTreeMap<NaiveDate, i64> {
        &self.pending
    }

    /// Writes pending totals and clears them.
    pub fn flush(&mut self) -> Result<(), StatsError> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn.lock().map_err(|_| StatsError::Poisoned)?;
        let now = Utc::now().to_rfc3339();
        let tx = conn.transaction()?;
        for (date, seconds) in &self.pending {
            tx.execute(
                "INSERT INTO eye_usage (date, seconds, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(date) DO UPDATE SET
                     seconds = seconds + excluded.seconds,
                     updated_at = excluded.updated_at",
                params![date.to_string(), seconds, &now],
            )?;
        }
        tx.commit()?;

        tracing::debug!(days = self.pending.len(), "Usage statistics saved");
        self.pending.clear();
        Ok(())
    }

    /// Persisted seconds of usage for a day.
    pub fn usage_for(&self, date: NaiveDate) -> Result<i64, StatsError> {
        let conn = self.conn.lock().map_err(|_| StatsError::Poisoned)?;
        match conn.query_row(
            "SELECT seconds FROM eye_usage WHERE date = ?1",
            params![date.to_string()],
            |row| row.get(0),
        ) {
            Ok(seconds) => Ok(seconds),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

impl StatisticsCollector for UsageStatistics {
    fn tally_usage(&mut self) -> Result<(), StatsError> {
        self.tally_at(Local::now().naive_local());
        Ok(())
    }

    fn persist(&mut self) -> Result<(), StatsError> {
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn day(date: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_tally_and_persist() {
        let mut stats = UsageStatistics::open_in_memory().unwrap();
        stats.last_tally = at("2026-03-02", "09:00:00");

        stats.tally_at(at("2026-03-02", "09:30:00"));
        assert_eq!(stats.pending()[&day("2026-03-02")], 1800);
        assert_eq!(stats.usage_for(day("2026-03-02")).unwrap(), 0);

        stats.flush().unwrap();
        assert!(stats.pending().is_empty());
        assert_eq!(stats.usage_for(day("2026-03-02")).unwrap(), 1800);

        stats.tally_at(at("2026-03-02", "10:00:00"));
        stats.flush().unwrap();
        assert_eq!(stats.usage_for(day("2026-03-02")).unwrap(), 3600);
    }

    #[test]
    fn test_tally_splits_at_midnight() {
        let mut stats = UsageStatistics::open_in_memory().unwrap();
        stats.last_tally = at("2026-03-02", "23:50:00");

        stats.tally_at(at("2026-03-03", "00:20:00"));
        assert_eq!(stats.pending()[&day("2026-03-02")], 600);
        assert_eq!(stats.pending()[&day("2026-03-03")], 1200);
    }

    #[test]
    fn test_tally_ignores_clock_going_back() {
        let mut stats = UsageStatistics::open_in_memory().unwrap();
        stats.last_tally = at("2026-03-02", "12:00:00");

        stats.tally_at(at("2026-03-02", "11:00:00"));
        assert!(stats.pending().is_empty());
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("usage.db");

        let mut stats = UsageStatistics::open(&path).unwrap();
        stats.last_tally = at("2026-03-02", "08:00:00");
        stats.tally_at(at("2026-03-02", "08:01:00"));
        stats.persist().unwrap();
        drop(stats);

        let reopened = UsageStatistics::open(&path).unwrap();
        assert_eq!(reopened.usage_for(day("2026-03-02")).unwrap(), 60);
    }
}
