use std::future::Future;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::error::{CoreError, SourceError};
use crate::social::{Profile, UserId};
use crate::stats::WeekStart;
use crate::storage::Database;

/// Where the leaderboard reads profiles, friend lists and weekly totals.
pub trait LeaderboardSource: Send + Sync + 'static {
    fn profile(&self, id: &UserId) -> impl Future<Output = Result<Profile, SourceError>> + Send;

    fn friends(&self, id: &UserId)
        -> impl Future<Output = Result<Vec<Profile>, SourceError>> + Send;

    /// Focus seconds this week, `None` if the user has none recorded.
    fn weekly_total(
        &self,
        id: &UserId,
    ) -> impl Future<Output = Result<Option<u64>, SourceError>> + Send;
}

/// [`LeaderboardSource`] backed by the local SQLite store.
///
/// SQLite calls are synchronous, so every fetch completes on first poll;
/// the connection sits behind a mutex to make the source shareable across
/// the aggregator's tasks. Weekly totals are all taken for the week
/// containing `as_of`, fixed when the source is built.
pub struct DatabaseSource {
    db: Mutex<Database>,
    week_start: WeekStart,
    as_of: DateTime<Utc>,
}

impl DatabaseSource {
    pub fn new(db: Database, week_start: WeekStart) -> Self {
        Self {
            db: Mutex::new(db),
            week_start,
            as_of: Utc::now(),
        }
    }

    /// Rank the week containing `as_of` instead of the current one.
    pub fn as_of(mut self, as_of: DateTime<Utc>) -> Self {
        self.as_of = as_of;
        self
    }

    fn with_db<T>(
        &self,
        f: impl FnOnce(&Database) -> crate::error::Result<T>,
    ) -> Result<T, SourceError> {
        let db = self
            .db
            .lock()
            .map_err(|_| SourceError::Fetch("database lock poisoned".into()))?;
        f(&db).map_err(SourceError::from)
    }
}

impl LeaderboardSource for DatabaseSource {
    async fn profile(&self, id: &UserId) -> Result<Profile, SourceError> {
        self.with_db(|db| db.profile(id))
    }

    async fn friends(&self, id: &UserId) -> Result<Vec<Profile>, SourceError> {
        self.with_db(|db| db.friends(id))
    }

    async fn weekly_total(&self, id: &UserId) -> Result<Option<u64>, SourceError> {
        self.with_db(|db| db.weekly_total(id, self.as_of, self.week_start))
    }
}

impl From<CoreError> for SourceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Database(e) => e.into(),
            CoreError::Source(e) => e,
            other => SourceError::Fetch(other.to_string()),
        }
    }
}
