//! Connection bootstrap utilities for SQLite.
//!
//! # Invariants
//! - Returned connections have the configured busy timeout.
//! - Returned connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use crate::config::{DatabaseConfig, DatabaseLocation};
use log::{error, info};
use rusqlite::Connection;
use std::time::Instant;

/// Opens the configured contact store and applies pending migrations.
///
/// # Side effects
/// - Creates the database file when it does not exist.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(config: &DatabaseConfig) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mode = match config.location {
        DatabaseLocation::File(_) => "file",
        DatabaseLocation::Memory => "memory",
    };
    info!("event=db_open module=db status=start mode={mode}");

    let opened = match &config.location {
        DatabaseLocation::File(path) => Connection::open(path),
        DatabaseLocation::Memory => Connection::open_in_memory(),
    };
    let result = opened
        .map_err(DbError::from)
        .and_then(|mut conn| bootstrap_connection(&mut conn, config).map(|()| conn));

    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

/// Opens an in-memory contact store with default settings.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_db(&DatabaseConfig::in_memory())
}

fn bootstrap_connection(conn: &mut Connection, config: &DatabaseConfig) -> DbResult<()> {
    conn.busy_timeout(config.busy_timeout())?;
    apply_migrations(conn)?;
    Ok(())
}
