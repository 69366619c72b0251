use std::fs;
use std::path::Path;

use anyhow::Context;
use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;

/// Open (creating if needed) the SQLite file at `path` and make sure every
/// table exists. Parent directories are created on demand so a fresh install
/// can start from an empty home directory.
pub fn open_database(path: &Path) -> anyhow::Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }
    }

    let conn = Connection::open(path).context("failed to open SQLite database")?;
    ensure_schema(&conn).context("failed to create tables")?;
    debug!(path = %path.display(), "database ready");
    Ok(conn)
}

/// Scratch database used by tests and throwaway sessions.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Create the four tables if they are missing. Running it against an existing
/// database is a no-op. Registrations reference students and courses by value
/// only; there are no foreign keys, so deletes never cascade.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS students (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            age INTEGER,
            email TEXT UNIQUE,
            studentID INTEGER UNIQUE
        );
        CREATE TABLE IF NOT EXISTS instructors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            age INTEGER,
            email TEXT UNIQUE,
            instructorID INTEGER UNIQUE
        );
        CREATE TABLE IF NOT EXISTS courses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            courseID INTEGER UNIQUE,
            courseName TEXT NOT NULL,
            instructor TEXT
        );
        CREATE TABLE IF NOT EXISTS registrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            studentEmail TEXT,
            courseID INTEGER
        );",
    )?;
    Ok(())
}
