use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::social::UserId;
use crate::timer::TimerState;

/// Every state change in the system produces an Event.
/// Views render from them; the CLI prints them as JSON lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// Periodic progress while running, for animating a view.
    TimerProgress {
        remaining: String,
        remaining_ms: u64,
        progress: f64,
    },
    TimerCompleted {
        duration_secs: u64,
        started_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        remaining: String,
        remaining_ms: u64,
        total_ms: u64,
        progress: f64,
        at: DateTime<Utc>,
    },
    SessionRecorded {
        session_id: i64,
        user: UserId,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    FriendRequestSent {
        from: UserId,
        to: UserId,
        at: DateTime<Utc>,
    },
    FriendRequestAccepted {
        from: UserId,
        to: UserId,
        at: DateTime<Utc>,
    },
    FriendRequestRejected {
        from: UserId,
        to: UserId,
        at: DateTime<Utc>,
    },
    FriendRequestCancelled {
        from: UserId,
        to: UserId,
        at: DateTime<Utc>,
    },
    FriendRemoved {
        by: UserId,
        friend: UserId,
        at: DateTime<Utc>,
    },
}
