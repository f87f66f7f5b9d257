//! SQLite persistence for users and their progress records.
//!
//! A [`Database`] wraps a single connection. Query groups live in submodules
//! as `impl Database` blocks: [`user_queries`] for user rows and
//! [`task_queries`] for progress records and the per-user atomic update.

use std::{path::Path, time::Duration};

use rusqlite::{types::Type, Connection, Row};
use serde::de::DeserializeOwned;

use crate::error::{DatabaseResultExt, Result};

pub mod migrations;
pub mod task_queries;
pub mod user_queries;

/// How long a writer waits for a competing transaction before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Opens a connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .db_context("Failed to set busy timeout")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn invalid_data(idx: usize, message: String) -> rusqlite::Error {
    conversion_error(
        idx,
        std::io::Error::new(std::io::ErrorKind::InvalidData, message),
    )
}

/// Reads a TEXT column holding JSON.
fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(idx, e))
}

/// Reads a nullable TEXT column holding JSON.
fn optional_json_column<T: DeserializeOwned>(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<T>> {
    row.get::<_, Option<String>>(idx)?
        .map(|raw| serde_json::from_str(&raw).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

/// Reads a nullable TEXT column parsed with `FromStr`.
fn parsed_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    row.get::<_, Option<String>>(idx)?
        .map(|raw| raw.parse::<T>().map_err(|e| conversion_error(idx, e)))
        .transpose()
}

/// Reads a NOT NULL TEXT column parsed with `FromStr`.
fn required_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parsed_column(row, idx)?
        .ok_or_else(|| rusqlite::Error::InvalidColumnType(idx, format!("column {idx}"), Type::Null))
}
