//! Inbox storage repository.

use chrono::{Duration, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};

use super::model::{StoredEmail, StoredEmailSummary, normalize_address};
use crate::Result;

/// Repository for delivered messages.
///
/// Timestamps are stored as Unix milliseconds so ordering and expiry are
/// plain integer comparisons.
pub struct InboxRepository {
    pool: SqlitePool,
    retention: Duration,
}

impl InboxRepository {
    /// Create a new repository with the given database path.
    ///
    /// Creates the database and tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str, retention: Duration) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let repo = Self { pool, retention };
        repo.initialize().await?;
        Ok(repo)
    }

    /// Create an in-memory repository for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory(retention: Duration) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let repo = Self { pool, retention };
        repo.initialize().await?;
        Ok(repo)
    }

    /// Initialize database schema.
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS emails (
                key TEXT PRIMARY KEY,
                recipient TEXT NOT NULL,
                received_at INTEGER NOT NULL,
                expires_at INTEGER NOT NULL,
                payload TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_emails_recipient
            ON emails(recipient, received_at)
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_emails_expires ON emails(expires_at)
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Retention applied to newly stored messages.
    #[must_use]
    pub const fn retention(&self) -> Duration {
        self.retention
    }

    /// Store a message and return its key.
    ///
    /// Messages never replace each other: when the base key is already
    /// taken, `-1`, `-2`, ... is appended until a free key is found.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database query fails.
    pub async fn store(&self, email: &StoredEmail) -> Result<String> {
        let base_key = email.base_key();
        let recipient = normalize_address(&email.to);
        let received_at = email.timestamp.timestamp_millis();
        let expires_at = (email.timestamp + self.retention).timestamp_millis();
        let payload = serde_json::to_string(email)?;

        let mut attempt: u32 = 0;
        loop {
            let key = if attempt == 0 {
                base_key.clone()
            } else {
                format!("{base_key}-{attempt}")
            };

            let result = sqlx::query(
                r"
                INSERT INTO emails (key, recipient, received_at, expires_at, payload)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(key) DO NOTHING
                ",
            )
            .bind(&key)
            .bind(&recipient)
            .bind(received_at)
            .bind(expires_at)
            .bind(&payload)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() > 0 {
                if attempt > 0 {
                    tracing::debug!(key = %key, attempt, "Storage key taken, stored under suffix");
                }
                return Ok(key);
            }
            attempt += 1;
        }
    }

    /// List live messages for a recipient, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or a row cannot be decoded.
    pub async fn list(&self, recipient: &str) -> Result<Vec<StoredEmail>> {
        let rows = self.live_rows(recipient).await?;
        rows.iter().map(email_from_row).collect()
    }

    /// List live messages for a recipient in listing form, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or a row cannot be decoded.
    pub async fn list_summaries(&self, recipient: &str) -> Result<Vec<StoredEmailSummary>> {
        let rows = self.live_rows(recipient).await?;
        rows.iter()
            .map(|row| -> Result<StoredEmailSummary> {
                let key: String = row.get("key");
                Ok(email_from_row(row)?.summary(key))
            })
            .collect()
    }

    async fn live_rows(&self, recipient: &str) -> Result<Vec<SqliteRow>> {
        let rows = sqlx::query(
            r"
            SELECT key, payload
            FROM emails
            WHERE recipient = ? AND expires_at > ?
            ORDER BY received_at DESC, rowid DESC
            ",
        )
        .bind(normalize_address(recipient))
        .bind(now_millis())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Get a live message by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the row cannot be decoded.
    pub async fn get(&self, key: &str) -> Result<Option<StoredEmail>> {
        let row = sqlx::query(
            r"
            SELECT payload
            FROM emails
            WHERE key = ? AND expires_at > ?
            ",
        )
        .bind(key)
        .bind(now_millis())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(email_from_row).transpose()
    }

    /// Count live messages for a recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&self, recipient: &str) -> Result<usize> {
        let row = sqlx::query(
            r"
            SELECT COUNT(*) as count
            FROM emails
            WHERE recipient = ? AND expires_at > ?
            ",
        )
        .bind(normalize_address(recipient))
        .bind(now_millis())
        .fetch_one(&self.pool)
        .await?;

        let count: i64 = row.get("count");
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Delete expired messages and return how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query(
            r"
            DELETE FROM emails WHERE expires_at <= ?
            ",
        )
        .bind(now_millis())
        .execute(&self.pool)
        .await?;

        let removed = result.rows_affected();
        if removed > 0 {
            tracing::debug!(removed, "Purged expired emails");
        }
        Ok(removed)
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn email_from_row(row: &SqliteRow) -> Result<StoredEmail> {
    let payload: String = row.get("payload");
    Ok(serde_json::from_str(&payload)?)
}
