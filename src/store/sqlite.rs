//! SQLite session store via [sqlx](https://docs.rs/crate/sqlx)

use bon::bon;
use rocket::{async_trait, time::OffsetDateTime};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::{
    clock::{system_clock, Clock},
    error::{SessionError, SessionResult},
};

use super::interface::{SessionRecord, SessionStore};

const ID_COLUMN: &str = "id";
const DATA_COLUMN: &str = "data";
const EXPIRY_COLUMN: &str = "expiry";

/** Session store using SQLite via [sqlx](https://docs.rs/crate/sqlx).

# Requirements
- You must pass in an initialized sqlx SQLite connection pool.
- Call [`migrate`](SqliteStore::migrate) once at startup (it is idempotent),
  or create the table yourself with the following columns:

| Name   | Type |
|--------|------|
| id     | TEXT PRIMARY KEY |
| data   | BLOB NOT NULL |
| expiry | INTEGER NOT NULL |

`expiry` holds unix seconds. `migrate` also creates an index on `expiry` so
that [`cleanup`](SqliteStore::cleanup) stays cheap as the table grows.

# Expired rows
Reads report expired rows as absent but leave them in the table. Schedule
[`cleanup`](SqliteStore::cleanup) yourself (e.g. from an interval task or a
cron job) to prune them; the manager never deletes rows on its own.
*/
pub struct SqliteStore {
    pool: SqlitePool,
    table_name: String,
    clock: Clock,
}

#[bon]
impl SqliteStore {
    #[builder]
    pub fn new(
        /// An initialized SQLite connection pool.
        pool: SqlitePool,
        /// The name of the table to use for storing sessions (default: `"sessions"`).
        #[builder(into, default = "sessions")]
        table_name: String,
        /// Clock used for expiry checks and cleanup. Override in tests.
        #[builder(default = system_clock())]
        clock: Clock,
    ) -> Self {
        Self {
            pool,
            table_name,
            clock,
        }
    }

    /// Create the session table and its expiry index if they don't exist
    /// yet. Safe to call on every startup.
    pub async fn migrate(&self) -> SessionResult<()> {
        sqlx::query(&create_table_sql(&self.table_name))
            .execute(&self.pool)
            .await?;
        sqlx::query(&create_index_sql(&self.table_name))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove expired sessions: rows whose expiry is strictly before the
    /// current time. A row expiring exactly now is left for the next run.
    pub async fn cleanup(&self) -> SessionResult<()> {
        sqlx::query(&cleanup_sql(&self.table_name))
            .bind((self.clock)().unix_timestamp())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove all sessions from the table.
    pub async fn reset(&self) -> SessionResult<()> {
        sqlx::query(&reset_sql(&self.table_name))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for SqliteStore {
    async fn find(&self, id: &str) -> SessionResult<Option<SessionRecord>> {
        let row: Option<SqliteRow> = sqlx::query(&find_sql(&self.table_name))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let data: Vec<u8> = row.try_get(DATA_COLUMN)?;
        let unix_secs: i64 = row.try_get(EXPIRY_COLUMN)?;
        let expiry = OffsetDateTime::from_unix_timestamp(unix_secs)
            .map_err(|e| SessionError::Backend(Box::new(e)))?;

        // Expired rows are left in place for `cleanup`
        if expiry <= (self.clock)() {
            return Ok(None);
        }
        Ok(Some(SessionRecord { data, expiry }))
    }

    async fn upsert(&self, id: &str, data: &[u8], expiry: OffsetDateTime) -> SessionResult<()> {
        sqlx::query(&upsert_sql(&self.table_name))
            .bind(id)
            .bind(data)
            .bind(expiry.unix_timestamp())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> SessionResult<()> {
        sqlx::query(&delete_sql(&self.table_name))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn create_table_sql(table_name: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS \"{table_name}\" (\
            {ID_COLUMN} TEXT PRIMARY KEY, \
            {DATA_COLUMN} BLOB NOT NULL, \
            {EXPIRY_COLUMN} INTEGER NOT NULL\
        )"
    )
}

fn create_index_sql(table_name: &str) -> String {
    format!(
        "CREATE INDEX IF NOT EXISTS \"{table_name}_expiry_idx\" \
        ON \"{table_name}\"({EXPIRY_COLUMN})"
    )
}

/// Look up a session row. Bind the session id
fn find_sql(table_name: &str) -> String {
    format!("SELECT {DATA_COLUMN}, {EXPIRY_COLUMN} FROM \"{table_name}\" WHERE {ID_COLUMN} = ?")
}

/// Insert or overwrite a session row. Bind the session id, data, and expiry
fn upsert_sql(table_name: &str) -> String {
    format!(
        "INSERT INTO \"{table_name}\" ({ID_COLUMN}, {DATA_COLUMN}, {EXPIRY_COLUMN}) \
        VALUES (?, ?, ?) \
        ON CONFLICT ({ID_COLUMN}) DO UPDATE SET \
            {DATA_COLUMN} = excluded.{DATA_COLUMN}, \
            {EXPIRY_COLUMN} = excluded.{EXPIRY_COLUMN}"
    )
}

/// Delete a session row. Bind the session id
fn delete_sql(table_name: &str) -> String {
    format!("DELETE FROM \"{table_name}\" WHERE {ID_COLUMN} = ?")
}

/// Delete expired session rows. Bind the current time as unix seconds
fn cleanup_sql(table_name: &str) -> String {
    format!("DELETE FROM \"{table_name}\" WHERE {EXPIRY_COLUMN} < ?")
}

fn reset_sql(table_name: &str) -> String {
    format!("DELETE FROM \"{table_name}\"")
}
