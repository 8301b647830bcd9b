//! # focuscrew Core Library
//!
//! Business logic for a social focus timer: a countdown clock, daily
//! streaks, friends, and a weekly leaderboard. The `focuscrew` CLI is a thin
//! layer over the same library.
//!
//! ## Architecture
//!
//! - **Timer**: a tick-driven countdown state machine plus a tokio driver
//!   that ticks it on a repeating interval
//! - **Streaks**: pure set arithmetic over active calendar days
//! - **Social**: profiles and the friend-request lifecycle
//! - **Leaderboard**: concurrent fan-out over a pluggable data source
//! - **Storage**: SQLite for sessions/profiles/friendships, TOML for config
//!
//! ## Key Components
//!
//! - [`TimerEngine`] / [`TimerDriver`]: countdown timer
//! - [`StreakCalendar`]: streak membership and current streak length
//! - [`LeaderboardAggregator`]: top-N weekly ranking
//! - [`Database`]: persistence
//! - [`Config`]: application configuration

pub mod error;
pub mod events;
pub mod leaderboard;
pub mod social;
pub mod stats;
pub mod storage;
pub mod streak;
pub mod timer;

pub use error::{
    ConfigError, CoreError, DatabaseError, FriendshipError, SourceError, TimerError,
    ValidationError,
};
pub use events::Event;
pub use leaderboard::{DatabaseSource, LeaderboardAggregator, LeaderboardEntry, LeaderboardSource};
pub use social::{Friendship, FriendshipStatus, Profile, UserId};
pub use stats::{DailyTotal, Stats, StatsPeriod, WeekStart};
pub use storage::{Config, Database, SessionRecord};
pub use streak::{DayMarker, StreakCalendar, StreakRun};
pub use timer::{Countdown, TimerDriver, TimerEngine, TimerHandle, TimerState};
