//! Focus-time statistics.
//!
//! Sessions are append-only; everything here is derived from them by
//! summing over a time window. Windows are computed in UTC.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// First day of the week for weekly totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    Day,
    Week,
    Month,
    Year,
    All,
}

impl fmt::Display for StatsPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatsPeriod::Day => "day",
            StatsPeriod::Week => "week",
            StatsPeriod::Month => "month",
            StatsPeriod::Year => "year",
            StatsPeriod::All => "all",
        };
        f.write_str(s)
    }
}

impl FromStr for StatsPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" | "today" => Ok(StatsPeriod::Day),
            "week" => Ok(StatsPeriod::Week),
            "month" => Ok(StatsPeriod::Month),
            "year" => Ok(StatsPeriod::Year),
            "all" => Ok(StatsPeriod::All),
            other => Err(format!("unknown period: {other}")),
        }
    }
}

impl StatsPeriod {
    /// Half-open `[start, end)` window containing `now`, or `None` for
    /// [`StatsPeriod::All`].
    pub fn bounds(
        &self,
        now: DateTime<Utc>,
        week_start: WeekStart,
    ) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let today = now.date_naive();
        let (start, end) = match self {
            StatsPeriod::Day => (today, today.checked_add_days(Days::new(1))?),
            StatsPeriod::Week => {
                let offset = match week_start {
                    WeekStart::Monday => today.weekday().num_days_from_monday(),
                    WeekStart::Sunday => today.weekday().num_days_from_sunday(),
                };
                let start = today.checked_sub_days(Days::new(offset as u64))?;
                (start, start.checked_add_days(Days::new(7))?)
            }
            StatsPeriod::Month => {
                let start = today.with_day(1)?;
                (start, start.checked_add_months(Months::new(1))?)
            }
            StatsPeriod::Year => {
                let start = NaiveDate::from_ymd_opt(today.year(), 1, 1)?;
                (start, start.checked_add_months(Months::new(12))?)
            }
            StatsPeriod::All => return None,
        };
        Some((midnight(start), midnight(end)))
    }
}

/// Midnight UTC at the start of `day`.
pub fn midnight(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN))
}

/// Summary shown on a user's statistics screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_sessions: u64,
    pub total_work_secs: u64,
    pub today_secs: u64,
    pub week_secs: u64,
    pub month_secs: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Focus time for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub day: NaiveDate,
    pub sessions: u64,
    pub total_secs: u64,
}

/// Fill gaps so there is exactly one entry per day in `from..=to`.
pub fn fill_days(from: NaiveDate, to: NaiveDate, totals: &[DailyTotal]) -> Vec<DailyTotal> {
    from.iter_days()
        .take_while(|d| *d <= to)
        .map(|day| {
            totals
                .iter()
                .find(|t| t.day == day)
                .cloned()
                .unwrap_or(DailyTotal {
                    day,
                    sessions: 0,
                    total_secs: 0,
                })
        })
        .collect()
}
