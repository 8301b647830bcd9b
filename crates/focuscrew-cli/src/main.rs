use clap::{Parser, Subcommand};
use focuscrew_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Context;

#[derive(Parser)]
#[command(name = "focuscrew", version, about = "Focus timer with friends and streaks")]
struct Cli {
    /// Act as this user instead of `account.user_id`
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Profile management
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// Friend requests and friend list
    Friend {
        #[command(subcommand)]
        action: commands::friend::FriendAction,
    },
    /// Completed focus sessions
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Focus statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Daily streaks
    Streak {
        #[command(subcommand)]
        action: commands::streak::StreakAction,
    },
    /// Weekly leaderboard of you and your friends
    Leaderboard(commands::leaderboard::LeaderboardArgs),
    /// Countdown timer
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    init_tracing(&config);

    let ctx = Context::new(config, cli.user);
    let result = match cli.command {
        Commands::Profile { action } => commands::profile::run(action, &ctx),
        Commands::Friend { action } => commands::friend::run(action, &ctx),
        Commands::Session { action } => commands::session::run(action, &ctx),
        Commands::Stats { action } => commands::stats::run(action, &ctx),
        Commands::Streak { action } => commands::streak::run(action, &ctx),
        Commands::Leaderboard(args) => commands::leaderboard::run(args, &ctx),
        Commands::Timer { action } => commands::timer::run(action, &ctx),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
