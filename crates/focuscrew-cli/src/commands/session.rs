use chrono::{Duration, Utc};
use clap::Subcommand;
use focuscrew_core::Event;

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Record a focus session that ended just now
    Record {
        /// Length in minutes
        #[arg(long)]
        minutes: u32,
        /// Extra seconds on top of the minutes
        #[arg(long, default_value = "0")]
        seconds: u32,
        #[arg(long, default_value = "focus")]
        label: String,
    },
    /// Most recent sessions first
    List {
        #[arg(long, default_value = "20")]
        limit: usize,
    },
}

pub fn run(action: SessionAction, ctx: &Context) -> CmdResult {
    let db = ctx.open_db()?;
    let me = ctx.user()?;

    match action {
        SessionAction::Record {
            minutes,
            seconds,
            label,
        } => {
            let duration_secs = u64::from(minutes) * 60 + u64::from(seconds);
            if duration_secs == 0 {
                return Err("session length must be positive".into());
            }
            let completed_at = Utc::now();
            let started_at = completed_at - Duration::seconds(duration_secs as i64);
            let record = db.record_session(&me, &label, duration_secs, started_at, completed_at)?;
            print_json(&Event::SessionRecorded {
                session_id: record.id,
                user: record.user_id,
                duration_secs,
                at: completed_at,
            })?;
        }
        SessionAction::List { limit } => {
            print_json(&db.sessions(&me, limit)?)?;
        }
    }
    Ok(())
}
