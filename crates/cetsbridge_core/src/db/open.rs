//! Connection bootstrap for read-only source stores.
//!
//! # Responsibility
//! - Open source SQLite files strictly read-only.
//! - Configure the busy timeout shared by all reads.
//!
//! # Invariants
//! - Returned connections cannot mutate the store (SQLITE_OPEN_READ_ONLY).
//! - The caller owns the connection; dropping it releases the store on
//!   every exit path.

use super::DbResult;
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens a source store read-only.
///
/// # Side effects
/// - Emits `store_open` logging events with duration and status.
pub fn open_store(path: impl AsRef<Path>) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=store_open module=db status=start");

    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = match Connection::open_with_flags(path, flags) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=store_open module=db status=error duration_ms={} error_code=store_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    conn.busy_timeout(Duration::from_secs(5))?;

    info!(
        "event=store_open module=db status=ok duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}
