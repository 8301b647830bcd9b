use chrono::{Days, Utc};
use clap::Subcommand;
use focuscrew_core::streak::{parse_day, DAY_FORMAT};
use serde_json::json;

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum StreakAction {
    /// Calendar of the last N days with streak connections
    Show {
        #[arg(long, default_value = "28")]
        days: u64,
    },
    /// Length of the streak ending today
    Current,
    /// Mark a day as active (YYYY-MM-DD or a timestamp)
    Add { day: String },
}

pub fn run(action: StreakAction, ctx: &Context) -> CmdResult {
    let db = ctx.open_db()?;
    let me = ctx.user()?;
    let today = Utc::now().date_naive();

    match action {
        StreakAction::Show { days } => {
            let calendar = db.streak_calendar(&me)?;
            let from = today
                .checked_sub_days(Days::new(days.saturating_sub(1)))
                .unwrap_or(today);
            let cells: Vec<_> = from
                .iter_days()
                .take_while(|d| *d <= today)
                .map(|d| {
                    let marker = calendar.day_marker(d);
                    json!({
                        "day": d.format(DAY_FORMAT).to_string(),
                        "in_streak": marker.in_streak,
                        "connected_left": marker.connected_left,
                        "connected_right": marker.connected_right,
                    })
                })
                .collect();
            print_json(&json!({
                "days": cells,
                "streak_days": calendar
                    .streak_days()
                    .iter()
                    .map(|d| d.format(DAY_FORMAT).to_string())
                    .collect::<Vec<_>>(),
                "runs": calendar.runs(),
                "current": calendar.current_streak_count(today),
                "longest": calendar.longest_streak(),
            }))?;
        }
        StreakAction::Current => {
            let calendar = db.streak_calendar(&me)?;
            print_json(&json!({ "current": calendar.current_streak_count(today) }))?;
        }
        StreakAction::Add { day } => {
            let day = parse_day(&day)?;
            db.add_streak_day(&me, day)?;
            let calendar = db.streak_calendar(&me)?;
            print_json(&json!({
                "added": day.format(DAY_FORMAT).to_string(),
                "current": calendar.current_streak_count(today),
            }))?;
        }
    }
    Ok(())
}
