//! Daily activity streaks.
//!
//! A [`StreakCalendar`] is the set of calendar days on which a user recorded
//! focus activity. Days are stored time-stripped, so a timestamp and a bare
//! date for the same day are the same entry.

use std::collections::BTreeSet;

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Storage form of a streak day.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Parse a stored day string, dropping any time-of-day component.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps, `YYYY-MM-DD HH:MM:SS` and
/// `YYYY-MM-DD HH:MM:SS +ZZZZ`. Timestamps keep the date as written, not the
/// date in UTC.
///
/// # Errors
/// Returns [`ValidationError::InvalidDate`] for anything else.
pub fn parse_day(s: &str) -> Result<NaiveDate, ValidationError> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, DAY_FORMAT) {
        return Ok(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S %z") {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.date());
    }
    Err(ValidationError::InvalidDate(s.to_string()))
}

/// How a single day renders in a streak calendar cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DayMarker {
    pub in_streak: bool,
    pub connected_left: bool,
    pub connected_right: bool,
}

/// A maximal run of consecutive active days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakRun {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub len: u32,
}

/// Set of active days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakCalendar {
    days: BTreeSet<NaiveDate>,
}

impl StreakCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored strings, skipping entries that do not parse.
    pub fn from_strings<S: AsRef<str>>(days: &[S]) -> Self {
        let mut cal = Self::new();
        for raw in days {
            match parse_day(raw.as_ref()) {
                Ok(d) => {
                    cal.days.insert(d);
                }
                Err(e) => tracing::warn!("skipping streak day: {e}"),
            }
        }
        cal
    }

    /// Build from stored strings, failing on the first bad entry.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidDate`] naming the offending string.
    pub fn try_from_strings<S: AsRef<str>>(days: &[S]) -> Result<Self, ValidationError> {
        let days = days
            .iter()
            .map(|s| parse_day(s.as_ref()))
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self { days })
    }

    /// Mark a day active. Returns `false` if it already was.
    pub fn insert(&mut self, day: NaiveDate) -> bool {
        self.days.insert(day)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.iter().copied()
    }

    /// Days in storage form, ascending.
    pub fn to_strings(&self) -> Vec<String> {
        self.days
            .iter()
            .map(|d| d.format(DAY_FORMAT).to_string())
            .collect()
    }

    pub fn is_part_of_streak(&self, day: NaiveDate) -> bool {
        self.days.contains(&day)
    }

    /// `day` is active and so is the day before it.
    pub fn is_connected_left(&self, day: NaiveDate) -> bool {
        self.is_part_of_streak(day) && prev_day(day).is_some_and(|p| self.days.contains(&p))
    }

    /// `day` is active and so is the day after it.
    pub fn is_connected_right(&self, day: NaiveDate) -> bool {
        self.is_part_of_streak(day) && next_day(day).is_some_and(|n| self.days.contains(&n))
    }

    pub fn day_marker(&self, day: NaiveDate) -> DayMarker {
        DayMarker {
            in_streak: self.is_part_of_streak(day),
            connected_left: self.is_connected_left(day),
            connected_right: self.is_connected_right(day),
        }
    }

    /// Consecutive active days ending at `today`; 0 if `today` is inactive.
    pub fn current_streak_count(&self, today: NaiveDate) -> u32 {
        let mut count = 0;
        let mut cursor = Some(today);
        while let Some(day) = cursor {
            if !self.days.contains(&day) {
                break;
            }
            count += 1;
            cursor = prev_day(day);
        }
        count
    }

    /// Every active day with at least one active neighbour.
    ///
    /// Separate runs are all included; use [`StreakCalendar::runs`] to tell
    /// them apart. Isolated single days are left out.
    pub fn streak_days(&self) -> BTreeSet<NaiveDate> {
        self.days
            .iter()
            .copied()
            .filter(|&d| self.is_connected_left(d) || self.is_connected_right(d))
            .collect()
    }

    /// Maximal runs of consecutive days, oldest first. Single days count as
    /// runs of length 1.
    pub fn runs(&self) -> Vec<StreakRun> {
        let mut runs: Vec<StreakRun> = Vec::new();
        for day in self.days.iter().copied() {
            match runs.last_mut() {
                Some(run) if next_day(run.end) == Some(day) => {
                    run.end = day;
                    run.len += 1;
                }
                _ => runs.push(StreakRun {
                    start: day,
                    end: day,
                    len: 1,
                }),
            }
        }
        runs
    }

    pub fn longest_streak(&self) -> u32 {
        self.runs().iter().map(|r| r.len).max().unwrap_or(0)
    }
}

impl FromIterator<NaiveDate> for StreakCalendar {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self {
            days: iter.into_iter().collect(),
        }
    }
}

fn prev_day(day: NaiveDate) -> Option<NaiveDate> {
    day.checked_sub_days(Days::new(1))
}

fn next_day(day: NaiveDate) -> Option<NaiveDate> {
    day.checked_add_days(Days::new(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DAY_FORMAT).unwrap()
    }

    fn sample() -> StreakCalendar {
        StreakCalendar::from_strings(&[
            "2025-05-01",
            "2025-05-02",
            "2025-05-04",
            "2025-05-05",
            "2025-05-06",
        ])
    }

    #[test]
    fn parse_strips_time() {
        assert_eq!(parse_day("2025-05-01T23:59:00+09:00").unwrap(), d("2025-05-01"));
        assert_eq!(parse_day("2025-05-01 08:30:00 +0000").unwrap(), d("2025-05-01"));
        assert_eq!(parse_day("2025-05-01 08:30:00").unwrap(), d("2025-05-01"));
        assert_eq!(parse_day(" 2025-05-01 ").unwrap(), d("2025-05-01"));
        assert!(parse_day("05/01/2025").is_err());
    }

    #[test]
    fn duplicate_days_collapse() {
        let cal = StreakCalendar::from_strings(&["2025-05-01", "2025-05-01T10:00:00Z"]);
        assert_eq!(cal.len(), 1);
    }

    #[test]
    fn bad_strings_are_skipped_or_rejected() {
        let cal = StreakCalendar::from_strings(&["2025-05-01", "garbage"]);
        assert_eq!(cal.len(), 1);
        assert!(StreakCalendar::try_from_strings(&["2025-05-01", "garbage"]).is_err());
    }

    #[test]
    fn adjacency() {
        let cal = sample();
        assert!(!cal.is_connected_left(d("2025-05-01")));
        assert!(cal.is_connected_right(d("2025-05-01")));
        assert!(cal.is_connected_left(d("2025-05-02")));
        assert!(!cal.is_connected_right(d("2025-05-02")));
        assert!(!cal.is_connected_left(d("2025-05-03")));
        assert!(!cal.is_connected_right(d("2025-05-03")));
        assert_eq!(
            cal.day_marker(d("2025-05-05")),
            DayMarker {
                in_streak: true,
                connected_left: true,
                connected_right: true,
            }
        );
    }

    #[test]
    fn streak_days_flags_both_runs() {
        let cal = sample();
        let days = cal.streak_days();
        assert_eq!(days.len(), 5);
        assert!(days.contains(&d("2025-05-01")));
        assert!(days.contains(&d("2025-05-06")));
    }

    #[test]
    fn streak_days_excludes_isolated_day() {
        let mut cal = sample();
        cal.insert(d("2025-05-10"));
        assert!(!cal.streak_days().contains(&d("2025-05-10")));
    }

    #[test]
    fn runs_are_separated() {
        let runs = sample().runs();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].len, 2);
        assert_eq!(runs[1].start, d("2025-05-04"));
        assert_eq!(runs[1].end, d("2025-05-06"));
        assert_eq!(runs[1].len, 3);
        assert_eq!(sample().longest_streak(), 3);
    }

    #[test]
    fn current_streak_counts_back_from_today() {
        let cal = sample();
        assert_eq!(cal.current_streak_count(d("2025-05-06")), 3);
        assert_eq!(cal.current_streak_count(d("2025-05-02")), 2);
        assert_eq!(cal.current_streak_count(d("2025-05-07")), 0);
        assert_eq!(cal.current_streak_count(d("2025-05-03")), 0);
    }

    #[test]
    fn current_streak_crosses_month_boundary() {
        let cal = StreakCalendar::from_strings(&["2025-02-27", "2025-02-28", "2025-03-01"]);
        assert_eq!(cal.current_streak_count(d("2025-03-01")), 3);
    }

    #[test]
    fn empty_calendar() {
        let cal = StreakCalendar::new();
        assert!(cal.is_empty());
        assert_eq!(cal.current_streak_count(d("2025-05-01")), 0);
        assert_eq!(cal.longest_streak(), 0);
        assert!(cal.runs().is_empty());
    }

    #[test]
    fn to_strings_is_sorted_storage_form() {
        let cal = StreakCalendar::from_strings(&["2025-05-04", "2025-05-01T12:00:00Z"]);
        assert_eq!(cal.to_strings(), vec!["2025-05-01", "2025-05-04"]);
    }
}
