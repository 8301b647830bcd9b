pub mod config;
pub mod friend;
pub mod leaderboard;
pub mod profile;
pub mod session;
pub mod stats;
pub mod streak;
pub mod timer;

use focuscrew_core::{Config, ConfigError, Database, UserId};
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Settings shared by every command.
pub struct Context {
    pub config: Config,
    user: Option<String>,
}

impl Context {
    pub fn new(config: Config, user: Option<String>) -> Self {
        Self { config, user }
    }

    /// The acting user: `--user` if given, else `account.user_id`.
    pub fn user(&self) -> Result<UserId, ConfigError> {
        self.user
            .as_deref()
            .map(UserId::from)
            .or_else(|| self.config.current_user())
            .ok_or(ConfigError::NoCurrentUser)
    }

    pub fn open_db(&self) -> focuscrew_core::error::Result<Database> {
        Database::open()
    }
}

pub fn print_json<T: Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Runtime for the commands that drive async core code.
pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}
