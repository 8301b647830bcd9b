//! Weekly leaderboard of a user and their friends.
//!
//! ## Flow
//!
//! ```text
//! viewer profile ─┐
//!                 ├─> candidates (by id) ─> fan-out weekly_total ─> join
//! friends ────────┘                                                  │
//!                        top N <─ sort desc <─ drop missing/failed <─┘
//! ```
//!
//! A friend whose total cannot be fetched is left off the board; the
//! failure is logged, not returned.

mod aggregator;
mod source;

pub use aggregator::{LeaderboardAggregator, LeaderboardEntry, DEFAULT_LEADERBOARD_SIZE};
pub use source::{DatabaseSource, LeaderboardSource};
