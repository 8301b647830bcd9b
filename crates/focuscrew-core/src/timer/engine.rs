//! Countdown timer engine.
//!
//! The engine is a tick-driven state machine with no thread of its own.
//! Whoever owns it (normally [`super::TimerDriver`]) calls `tick()` once per
//! [`super::TICK_INTERVAL`] while it is running.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |
//!            v
//!        Completed -> (start) Running
//! ```
//!
//! `reset()` returns to `Idle` from any state.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::countdown::Countdown;
use super::time_base::TimeBase;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Completed,
}

#[derive(Debug, Clone)]
pub struct TimerEngine {
    duration: Countdown,
    remaining: Countdown,
    state: TimerState,
    time_base: TimeBase,
    started_at: Option<DateTime<Utc>>,
}

impl TimerEngine {
    /// Create an idle engine that will count down from `duration`.
    pub fn new(duration: Countdown) -> Self {
        Self {
            duration,
            remaining: duration,
            state: TimerState::Idle,
            time_base: TimeBase::default(),
            started_at: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn duration(&self) -> Countdown {
        self.duration
    }

    pub fn remaining(&self) -> Countdown {
        self.remaining
    }

    pub fn is_paused(&self) -> bool {
        self.state == TimerState::Paused
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn elapsed_ticks(&self) -> u64 {
        self.duration
            .total_ticks()
            .saturating_sub(self.remaining.total_ticks())
    }

    /// 0.0 .. 1.0 progress, by ticks counted.
    pub fn progress(&self) -> f64 {
        let total = self.duration.total_ticks();
        if total == 0 {
            return 0.0;
        }
        self.elapsed_ticks() as f64 / total as f64
    }

    /// Elapsed time on the animation clock. Frozen while paused.
    pub fn animation_offset(&self) -> Duration {
        self.time_base.offset(Instant::now())
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            remaining: self.remaining.to_string(),
            remaining_ms: self.remaining.as_millis(),
            total_ms: self.duration.as_millis(),
            progress: self.progress(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start counting from the full duration. Ignored unless idle or
    /// completed.
    pub fn start(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Idle | TimerState::Completed => {
                self.remaining = self.duration;
                self.state = TimerState::Running;
                self.time_base.start(Instant::now());
                let at = Utc::now();
                self.started_at = Some(at);
                Some(Event::TimerStarted {
                    duration_secs: self.duration.whole_seconds(),
                    at,
                })
            }
            TimerState::Running | TimerState::Paused => None,
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.state = TimerState::Paused;
        self.time_base.freeze(Instant::now());
        Some(Event::TimerPaused {
            remaining_ms: self.remaining.as_millis(),
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.state != TimerState::Paused {
            return None;
        }
        self.state = TimerState::Running;
        self.time_base.resume(Instant::now());
        Some(Event::TimerResumed {
            remaining_ms: self.remaining.as_millis(),
            at: Utc::now(),
        })
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.state = TimerState::Idle;
        self.remaining = self.duration;
        self.time_base.clear();
        self.started_at = None;
        Some(Event::TimerReset { at: Utc::now() })
    }

    /// Count one tick. Returns `Some(Event::TimerCompleted)` on the tick
    /// that reaches zero; the engine stops itself there.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        if !self.remaining.tick() {
            return None;
        }
        self.state = TimerState::Completed;
        self.time_base.freeze(Instant::now());
        let at = Utc::now();
        Some(Event::TimerCompleted {
            duration_secs: self.duration.whole_seconds(),
            started_at: self.started_at.unwrap_or(at),
            at,
        })
    }
}
