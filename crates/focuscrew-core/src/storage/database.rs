//! SQLite-based session storage and statistics.
//!
//! Provides persistent storage for:
//! - Completed focus sessions (append-only)
//! - Per-period and per-day focus totals
//!
//! Profiles, friendships and streak days live in the same database; their
//! queries are in `storage::social`.

use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::{data_dir, migrations};
use crate::error::{DatabaseError, Result, ValidationError};
use crate::social::UserId;
use crate::stats::{fill_days, midnight, DailyTotal, Stats, StatsPeriod, WeekStart};
use crate::streak::DAY_FORMAT;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub user_id: UserId,
    pub label: String,
    pub duration_secs: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// SQLite database for sessions, profiles and friendships.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/focuscrew.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("focuscrew.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // ── Sessions ─────────────────────────────────────────────────────

    /// Record a completed focus session.
    ///
    /// In one transaction this appends the session, adds its duration to
    /// the profile's cumulative work time, and marks the completion day
    /// as active.
    ///
    /// # Errors
    /// Returns an error if the profile does not exist, the time range is
    /// inverted, or the insert fails.
    pub fn record_session(
        &self,
        user: &UserId,
        label: &str,
        duration_secs: u64,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<SessionRecord> {
        if completed_at < started_at {
            return Err(ValidationError::InvalidTimeRange {
                start: started_at,
                end: completed_at,
            }
            .into());
        }

        let tx = self.conn.unchecked_transaction()?;
        let updated = tx.execute(
            "UPDATE profiles
             SET total_work_secs = COALESCE(total_work_secs, 0) + ?2
             WHERE id = ?1",
            params![user.as_str(), duration_secs],
        )?;
        if updated == 0 {
            return Err(DatabaseError::NotFound {
                entity: "profile",
                id: user.to_string(),
            }
            .into());
        }
        tx.execute(
            "INSERT INTO sessions (user_id, label, duration_secs, started_at, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.as_str(),
                label,
                duration_secs,
                fmt_ts(started_at),
                fmt_ts(completed_at),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "INSERT OR IGNORE INTO streak_days (user_id, day) VALUES (?1, ?2)",
            params![
                user.as_str(),
                completed_at.date_naive().format(DAY_FORMAT).to_string()
            ],
        )?;
        tx.commit()?;

        tracing::debug!(user = %user, duration_secs, "session recorded");
        Ok(SessionRecord {
            id,
            user_id: user.clone(),
            label: label.to_string(),
            duration_secs,
            started_at,
            completed_at,
        })
    }

    /// Most recent sessions first.
    pub fn sessions(&self, user: &UserId, limit: usize) -> Result<Vec<SessionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, label, duration_secs, started_at, completed_at
             FROM sessions
             WHERE user_id = ?1
             ORDER BY completed_at DESC, id DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![user.as_str(), limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u64>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut sessions = Vec::new();
        for row in rows {
            let (id, user_id, label, duration_secs, started_at, completed_at) = row?;
            sessions.push(SessionRecord {
                id,
                user_id: UserId::new(user_id),
                label,
                duration_secs,
                started_at: parse_ts(&started_at)?,
                completed_at: parse_ts(&completed_at)?,
            });
        }
        Ok(sessions)
    }

    // ── Totals ───────────────────────────────────────────────────────

    /// Focus seconds completed in `[start, end)`, or `None` if there were
    /// no sessions in the window.
    pub fn total_between(
        &self,
        user: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<u64>> {
        let (count, total) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(duration_secs), 0)
             FROM sessions
             WHERE user_id = ?1 AND completed_at >= ?2 AND completed_at < ?3",
            params![user.as_str(), fmt_ts(start), fmt_ts(end)],
            |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?)),
        )?;
        Ok((count > 0).then_some(total))
    }

    /// Focus seconds for the period containing `now`.
    pub fn period_total(
        &self,
        user: &UserId,
        period: StatsPeriod,
        now: DateTime<Utc>,
        week_start: WeekStart,
    ) -> Result<Option<u64>> {
        match period.bounds(now, week_start) {
            Some((start, end)) => self.total_between(user, start, end),
            None => {
                let (count, total) = self.conn.query_row(
                    "SELECT COUNT(*), COALESCE(SUM(duration_secs), 0)
                     FROM sessions WHERE user_id = ?1",
                    params![user.as_str()],
                    |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?)),
                )?;
                Ok((count > 0).then_some(total))
            }
        }
    }

    /// Focus seconds for the current week, `None` if the user has not
    /// focused this week.
    pub fn weekly_total(
        &self,
        user: &UserId,
        now: DateTime<Utc>,
        week_start: WeekStart,
    ) -> Result<Option<u64>> {
        self.period_total(user, StatsPeriod::Week, now, week_start)
    }

    /// One entry per day in `from..=to`, zero-filled.
    pub fn daily_totals(
        &self,
        user: &UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyTotal>> {
        if to < from {
            return Ok(Vec::new());
        }
        let end = to.succ_opt().unwrap_or(to);
        let mut stmt = self.conn.prepare(
            "SELECT substr(completed_at, 1, 10) AS day, COUNT(*), SUM(duration_secs)
             FROM sessions
             WHERE user_id = ?1 AND completed_at >= ?2 AND completed_at < ?3
             GROUP BY day
             ORDER BY day",
        )?;
        let rows = stmt.query_map(
            params![user.as_str(), fmt_ts(midnight(from)), fmt_ts(midnight(end))],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, u64>(1)?,
                    row.get::<_, u64>(2)?,
                ))
            },
        )?;

        let mut totals = Vec::new();
        for row in rows {
            let (day, sessions, total_secs) = row?;
            let day = NaiveDate::parse_from_str(&day, DAY_FORMAT)
                .map_err(|e| DatabaseError::QueryFailed(format!("bad day '{day}': {e}")))?;
            totals.push(DailyTotal {
                day,
                sessions,
                total_secs,
            });
        }
        Ok(fill_days(from, to, &totals))
    }

    /// Summary for a user's statistics view.
    pub fn stats(&self, user: &UserId, now: DateTime<Utc>, week_start: WeekStart) -> Result<Stats> {
        let (total_sessions, total_work_secs) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(duration_secs), 0)
             FROM sessions WHERE user_id = ?1",
            params![user.as_str()],
            |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?)),
        )?;
        let period = |p| -> Result<u64> {
            Ok(self.period_total(user, p, now, week_start)?.unwrap_or(0))
        };
        let calendar = self.streak_calendar(user)?;

        Ok(Stats {
            total_sessions,
            total_work_secs,
            today_secs: period(StatsPeriod::Day)?,
            week_secs: period(StatsPeriod::Week)?,
            month_secs: period(StatsPeriod::Month)?,
            current_streak: calendar.current_streak_count(now.date_naive()),
            longest_streak: calendar.longest_streak(),
        })
    }
}

/// Timestamps are stored as second-precision RFC 3339 in UTC so that
/// string comparison in SQL orders them correctly.
pub(crate) fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn parse_ts(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::QueryFailed(format!("bad timestamp '{s}': {e}")).into())
}
