use chrono::{Days, Utc};
use clap::Subcommand;
use focuscrew_core::StatsPeriod;
use serde_json::json;

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Focus time today
    Today,
    /// Focus time this week
    Week,
    /// Focus time this month
    Month,
    /// All-time summary with streaks
    All,
    /// Per-day totals for the last N days
    Daily {
        #[arg(long, default_value = "7")]
        days: u64,
    },
}

pub fn run(action: StatsAction, ctx: &Context) -> CmdResult {
    let db = ctx.open_db()?;
    let me = ctx.user()?;
    let now = Utc::now();
    let week_start = ctx.config.stats.week_start;

    let period = match action {
        StatsAction::Today => StatsPeriod::Day,
        StatsAction::Week => StatsPeriod::Week,
        StatsAction::Month => StatsPeriod::Month,
        StatsAction::All => return print_json(&db.stats(&me, now, week_start)?),
        StatsAction::Daily { days } => {
            let to = now.date_naive();
            let from = to
                .checked_sub_days(Days::new(days.saturating_sub(1)))
                .unwrap_or(to);
            return print_json(&db.daily_totals(&me, from, to)?);
        }
    };

    let total = db.period_total(&me, period, now, week_start)?;
    let (start, end) = period.bounds(now, week_start).unzip();
    print_json(&json!({
        "period": period.to_string(),
        "start": start,
        "end": end,
        "total_secs": total.unwrap_or(0),
    }))
}
