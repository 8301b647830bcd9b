//! Property tests for streak calendar arithmetic.

use chrono::{Days, NaiveDate};
use focuscrew_core::StreakCalendar;
use proptest::prelude::*;

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn day(offset: u64) -> NaiveDate {
    base().checked_add_days(Days::new(offset)).unwrap()
}

fn calendar_strategy() -> impl Strategy<Value = Vec<u64>> {
    proptest::collection::vec(0u64..60, 0..40)
}

proptest! {
    #[test]
    fn membership_matches_input(offsets in calendar_strategy(), probe in 0u64..60) {
        let cal: StreakCalendar = offsets.iter().map(|&o| day(o)).collect();
        prop_assert_eq!(cal.is_part_of_streak(day(probe)), offsets.contains(&probe));
    }

    #[test]
    fn connections_follow_neighbours(offsets in calendar_strategy(), probe in 1u64..59) {
        let cal: StreakCalendar = offsets.iter().map(|&o| day(o)).collect();
        let has = |o: u64| offsets.contains(&o);

        prop_assert_eq!(cal.is_connected_left(day(probe)), has(probe) && has(probe - 1));
        prop_assert_eq!(cal.is_connected_right(day(probe)), has(probe) && has(probe + 1));
    }

    #[test]
    fn current_streak_stops_at_first_gap(offsets in calendar_strategy(), today in 0u64..60) {
        let cal: StreakCalendar = offsets.iter().map(|&o| day(o)).collect();
        let count = cal.current_streak_count(day(today)) as u64;

        if !offsets.contains(&today) {
            prop_assert_eq!(count, 0);
        } else {
            for back in 0..count {
                prop_assert!(offsets.contains(&(today - back)));
            }
            if today >= count {
                prop_assert!(!offsets.contains(&(today - count)));
            }
        }
    }

    #[test]
    fn streak_days_are_exactly_the_connected_days(offsets in calendar_strategy()) {
        let cal: StreakCalendar = offsets.iter().map(|&o| day(o)).collect();
        let streak = cal.streak_days();
        for d in &streak {
            prop_assert!(cal.is_connected_left(*d) || cal.is_connected_right(*d));
        }
        for &o in &offsets {
            let connected = (o > 0 && offsets.contains(&(o - 1))) || offsets.contains(&(o + 1));
            prop_assert_eq!(streak.contains(&day(o)), connected, "day {}", day(o));
        }
    }

    #[test]
    fn runs_cover_every_day_once(offsets in calendar_strategy()) {
        let cal: StreakCalendar = offsets.iter().map(|&o| day(o)).collect();
        let runs = cal.runs();

        let covered: u32 = runs.iter().map(|r| r.len).sum();
        prop_assert_eq!(covered as usize, cal.len());
        for pair in runs.windows(2) {
            // Adjacent runs are separated by at least one inactive day.
            prop_assert!(pair[1].start > pair[0].end.succ_opt().unwrap());
        }
        prop_assert_eq!(
            cal.longest_streak(),
            runs.iter().map(|r| r.len).max().unwrap_or(0)
        );
    }
}

#[test]
fn duplicate_timestamps_collapse_to_one_day() {
    let cal = StreakCalendar::from_strings(&[
        "2024-05-01",
        "2024-05-01T08:30:00Z",
        "2024-05-01 22:15:00",
    ]);
    assert_eq!(cal.len(), 1);
}
