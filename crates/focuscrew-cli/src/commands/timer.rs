use clap::Subcommand;
use focuscrew_core::{Countdown, Event, TimerDriver, TimerEngine};

use super::{runtime, CmdResult, Context};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run a countdown in the foreground, printing events as JSON lines.
    /// The finished session is recorded for the current user.
    Run {
        /// Minutes (defaults to `timer.focus_minutes`, or 0 when
        /// `--seconds` is given)
        #[arg(long)]
        minutes: Option<u32>,
        #[arg(long, default_value = "0")]
        seconds: u32,
        #[arg(long, default_value = "focus")]
        label: String,
        /// Do not record a session on completion
        #[arg(long)]
        no_record: bool,
    },
}

pub fn run(action: TimerAction, ctx: &Context) -> CmdResult {
    match action {
        TimerAction::Run {
            minutes,
            seconds,
            label,
            no_record,
        } => {
            let countdown = match (minutes, seconds) {
                (None, 0) => ctx.config.focus_countdown()?,
                (m, s) => Countdown::new(m.unwrap_or(0), s)?,
            };
            // Fail before counting down rather than after.
            let user = if no_record { None } else { Some(ctx.user()?) };
            let db = if no_record { None } else { Some(ctx.open_db()?) };

            let completed = runtime()?.block_on(run_countdown(
                countdown,
                ctx.config.progress_every_ticks(),
            ))?;

            let Some(Event::TimerCompleted {
                duration_secs,
                started_at,
                at,
            }) = completed
            else {
                return Ok(());
            };
            if let (Some(user), Some(db)) = (user, db) {
                let record = db.record_session(&user, &label, duration_secs, started_at, at)?;
                print_line(&Event::SessionRecorded {
                    session_id: record.id,
                    user: record.user_id,
                    duration_secs,
                    at,
                })?;
            }
        }
    }
    Ok(())
}

/// Drive a countdown to zero, returning the completion event.
async fn run_countdown(
    countdown: Countdown,
    progress_every: u64,
) -> Result<Option<Event>, Box<dyn std::error::Error>> {
    let (handle, mut events, join) = TimerDriver::spawn(TimerEngine::new(countdown), progress_every);
    handle.start().await?;

    let mut completed = None;
    while let Some(event) = events.recv().await {
        print_line(&event)?;
        if matches!(event, Event::TimerCompleted { .. }) {
            completed = Some(event);
            break;
        }
    }

    handle.shutdown().await?;
    join.await?;
    Ok(completed)
}

fn print_line(event: &Event) -> CmdResult {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}
