//! PostgreSQL-backed user record lookup.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::records::{RecordStore, RecordStoreError, UserRecord};

/// Reads user records from the `users` table.
///
/// Expected columns: `email`, `email_verified`, `verification_id`, `name`.
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RecordStoreError> {
        let row: Option<(String, bool, Option<String>, Option<String>)> = sqlx::query_as(
            r#"
            SELECT email, email_verified, verification_id, name
            FROM users
            WHERE lower(email) = lower($1)
            LIMIT 1
            "#,
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(
            |(email, email_verified, verification_id, display_name)| UserRecord {
                email,
                email_verified,
                verification_id,
                display_name,
            },
        ))
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
