//! PostgreSQL implementation of WebhookEventRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{corrupt_row, db_error};
use crate::domain::foundation::DomainError;
use crate::ports::{SaveResult, WebhookEventRecord, WebhookEventRepository, WebhookOutcome};

pub struct PostgresWebhookEventRepository {
    pool: PgPool,
}

impl PostgresWebhookEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WebhookEventRow {
    event_id: String,
    event_type: String,
    result: String,
    error_message: Option<String>,
    processed_at: DateTime<Utc>,
}

impl TryFrom<WebhookEventRow> for WebhookEventRecord {
    type Error = DomainError;

    fn try_from(row: WebhookEventRow) -> Result<Self, Self::Error> {
        let result: WebhookOutcome = row
            .result
            .parse()
            .map_err(|e| corrupt_row("webhook_events", e))?;
        Ok(WebhookEventRecord {
            event_id: row.event_id,
            event_type: row.event_type,
            processed_at: row.processed_at,
            result,
            error_message: row.error_message,
        })
    }
}

#[async_trait]
impl WebhookEventRepository for PostgresWebhookEventRepository {
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError> {
        let row: Option<WebhookEventRow> = sqlx::query_as(
            r#"
            SELECT event_id, event_type, result, error_message, processed_at
            FROM webhook_events WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch webhook event", e))?;

        row.map(WebhookEventRecord::try_from).transpose()
    }

    async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO webhook_events (event_id, event_type, result, error_message, processed_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (event_id) DO UPDATE SET
                event_type = EXCLUDED.event_type,
                result = EXCLUDED.result,
                error_message = EXCLUDED.error_message,
                processed_at = EXCLUDED.processed_at
            WHERE webhook_events.result = 'failed'
            "#,
        )
        .bind(&record.event_id)
        .bind(&record.event_type)
        .bind(record.result.as_str())
        .bind(&record.error_message)
        .bind(record.processed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to save webhook event", e))?;

        if result.rows_affected() == 0 {
            Ok(SaveResult::AlreadyExists)
        } else {
            Ok(SaveResult::Inserted)
        }
    }
}
