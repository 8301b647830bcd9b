//! Database schema migrations for focuscrew.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 3;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }
    if current_version < 3 {
        migrate_v3(conn)?;
    }
    if current_version < SCHEMA_VERSION {
        tracing::info!(from = current_version, to = SCHEMA_VERSION, "database migrated");
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!("failed to read schema_version: {e}");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: focus sessions.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS sessions (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id       TEXT NOT NULL,
            label         TEXT NOT NULL DEFAULT '',
            duration_secs INTEGER NOT NULL,
            started_at    TEXT NOT NULL,
            completed_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_user_completed_at
            ON sessions(user_id, completed_at);",
    )?;
    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: profiles and friendships.
///
/// A friendship row is keyed by (requester, addressee); lookups check both
/// directions, so the pair is unordered from the caller's side.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS profiles (
            id              TEXT PRIMARY KEY,
            nickname        TEXT NOT NULL,
            image_url       TEXT,
            total_work_secs INTEGER,
            created_at      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS friendships (
            user1      TEXT NOT NULL,
            user2      TEXT NOT NULL,
            status     TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL,
            PRIMARY KEY (user1, user2),
            CHECK (user1 <> user2)
        );

        CREATE INDEX IF NOT EXISTS idx_friendships_user2 ON friendships(user2);",
    )?;
    set_schema_version(&tx, 2)?;
    tx.commit()
}

/// Migration v3: per-user active days.
fn migrate_v3(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS streak_days (
            user_id TEXT NOT NULL,
            day     TEXT NOT NULL,
            PRIMARY KEY (user_id, day)
        );",
    )?;
    set_schema_version(&tx, 3)?;
    tx.commit()
}
