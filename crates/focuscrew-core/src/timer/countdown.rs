use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TimerError;

/// Sub-second ticks per second.
pub const TICKS_PER_SECOND: u32 = 100;

/// Real time between two ticks.
pub const TICK_INTERVAL: Duration = Duration::from_millis(1000 / TICKS_PER_SECOND as u64);

/// Minutes / seconds / centiseconds remaining on a countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    minutes: u32,
    seconds: u32,
    centis: u32,
}

impl Countdown {
    /// A countdown of `minutes:seconds`.
    ///
    /// # Errors
    /// Returns [`TimerError::InvalidDuration`] if `seconds >= 60` or the
    /// total is zero.
    pub fn new(minutes: u32, seconds: u32) -> Result<Self, TimerError> {
        if seconds >= 60 || (minutes == 0 && seconds == 0) {
            return Err(TimerError::InvalidDuration { minutes, seconds });
        }
        Ok(Self {
            minutes,
            seconds,
            centis: 0,
        })
    }

    pub fn from_minutes(minutes: u32) -> Result<Self, TimerError> {
        Self::new(minutes, 0)
    }

    pub fn zero() -> Self {
        Self {
            minutes: 0,
            seconds: 0,
            centis: 0,
        }
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn centis(&self) -> u32 {
        self.centis
    }

    pub fn is_zero(&self) -> bool {
        self.minutes == 0 && self.seconds == 0 && self.centis == 0
    }

    pub fn total_ticks(&self) -> u64 {
        (self.minutes as u64 * 60 + self.seconds as u64) * TICKS_PER_SECOND as u64
            + self.centis as u64
    }

    pub fn as_millis(&self) -> u64 {
        self.total_ticks() * TICK_INTERVAL.as_millis() as u64
    }

    pub fn whole_seconds(&self) -> u64 {
        self.minutes as u64 * 60 + self.seconds as u64
    }

    /// Count down one tick, borrowing from seconds then minutes.
    ///
    /// Returns `true` once the countdown is at zero. A zero countdown stays
    /// at zero.
    pub fn tick(&mut self) -> bool {
        if self.is_zero() {
            return true;
        }
        if self.centis > 0 {
            self.centis -= 1;
        } else if self.seconds > 0 {
            self.seconds -= 1;
            self.centis = TICKS_PER_SECOND - 1;
        } else {
            self.minutes -= 1;
            self.seconds = 59;
            self.centis = TICKS_PER_SECOND - 1;
        }
        self.is_zero()
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}.{:02}", self.minutes, self.seconds, self.centis)
    }
}
