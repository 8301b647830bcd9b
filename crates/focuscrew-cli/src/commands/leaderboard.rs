use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use focuscrew_core::{DatabaseSource, LeaderboardAggregator};

use super::{print_json, runtime, CmdResult, Context};

#[derive(Args)]
pub struct LeaderboardArgs {
    /// Number of entries (defaults to `leaderboard.size`)
    #[arg(long)]
    size: Option<usize>,
    /// Per-friend fetch timeout in seconds (defaults to
    /// `leaderboard.fetch_timeout_secs`)
    #[arg(long)]
    timeout: Option<u64>,
}

pub fn run(args: LeaderboardArgs, ctx: &Context) -> CmdResult {
    let me = ctx.user()?;
    let db = ctx.open_db()?;
    let size = args.size.unwrap_or(ctx.config.leaderboard.size);
    if size == 0 {
        return Err("size must be at least 1".into());
    }
    let timeout = args
        .timeout
        .or(ctx.config.leaderboard.fetch_timeout_secs)
        .map(Duration::from_secs);

    tracing::debug!(user = %me, size, ?timeout, "building leaderboard");
    let source = Arc::new(DatabaseSource::new(db, ctx.config.stats.week_start));
    let aggregator = LeaderboardAggregator::new(source)
        .with_size(size)
        .with_fetch_timeout(timeout);

    let board = runtime()?.block_on(aggregator.build(&me))?;
    print_json(&board)
}
