use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FriendshipStatus;
use crate::error::ValidationError;
use crate::streak::StreakCalendar;

/// Maximum nickname length in characters.
pub const MAX_NICKNAME_LEN: usize = 32;

/// Opaque user identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id for a new account.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A user's public profile.
///
/// `friendship` is not stored with the profile; it is filled in relative to
/// whoever is viewing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub nickname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Cumulative focus time in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_work_secs: Option<u64>,
    /// Active days as `YYYY-MM-DD` strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streak_days: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendship: Option<FriendshipStatus>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Build a new profile at sign-up completion.
    ///
    /// # Errors
    /// Returns an error if the nickname is empty or too long.
    pub fn new(id: UserId, nickname: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            nickname: validate_nickname(nickname)?,
            image_url: None,
            total_work_secs: None,
            streak_days: None,
            friendship: None,
            created_at: Utc::now(),
        })
    }

    /// Streak calendar built from the stored day strings.
    pub fn streak_calendar(&self) -> StreakCalendar {
        match &self.streak_days {
            Some(days) => StreakCalendar::from_strings(days),
            None => StreakCalendar::new(),
        }
    }

    /// Add `secs` to the cumulative work time.
    pub fn add_work_time(&mut self, secs: u64) {
        let total = self.total_work_secs.unwrap_or(0).saturating_add(secs);
        self.total_work_secs = Some(total);
    }
}

/// Trim and check a nickname.
///
/// # Errors
/// Returns an error if the trimmed nickname is empty or longer than
/// [`MAX_NICKNAME_LEN`] characters.
pub fn validate_nickname(nickname: &str) -> Result<String, ValidationError> {
    let trimmed = nickname.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "nickname".into(),
            message: "must not be empty".into(),
        });
    }
    if trimmed.chars().count() > MAX_NICKNAME_LEN {
        return Err(ValidationError::InvalidValue {
            field: "nickname".into(),
            message: format!("must be at most {MAX_NICKNAME_LEN} characters"),
        });
    }
    Ok(trimmed.to_string())
}
