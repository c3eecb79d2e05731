//! PostgreSQL implementation of SubscriptionRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{corrupt_row, db_error, violates};
use crate::domain::billing::{Subscription, SubscriptionError, SubscriptionStatus};
use crate::domain::foundation::{DomainError, ErrorCode, ProfileId, SubscriptionId, Timestamp};
use crate::ports::SubscriptionRepository;

const SUBSCRIPTION_COLUMNS: &str = "id, profile_id, plan_id, stripe_subscription_id, \
     stripe_item_id, status, cancel_at_period_end, current_period_end, created_at, updated_at";

pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    profile_id: Uuid,
    plan_id: String,
    stripe_subscription_id: String,
    stripe_item_id: Option<String>,
    status: String,
    cancel_at_period_end: bool,
    current_period_end: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let status: SubscriptionStatus = row
            .status
            .parse()
            .map_err(|e| corrupt_row("subscriptions", e))?;
        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            profile_id: ProfileId::from_uuid(row.profile_id),
            plan_id: row.plan_id,
            stripe_subscription_id: row.stripe_subscription_id,
            stripe_item_id: row.stripe_item_id,
            status,
            cancel_at_period_end: row.cancel_at_period_end,
            current_period_end: row.current_period_end.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, profile_id, plan_id, stripe_subscription_id, stripe_item_id, status,
                cancel_at_period_end, current_period_end, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.profile_id.as_uuid())
        .bind(&subscription.plan_id)
        .bind(&subscription.stripe_subscription_id)
        .bind(&subscription.stripe_item_id)
        .bind(subscription.status.as_str())
        .bind(subscription.cancel_at_period_end)
        .bind(subscription.current_period_end.as_ref().map(|t| *t.as_datetime()))
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "subscriptions_one_current_per_profile") {
                return DomainError::from(SubscriptionError::AlreadySubscribed(
                    subscription.profile_id,
                ));
            }
            db_error("Failed to save subscription", e)
        })?;

        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                plan_id = $2,
                stripe_item_id = $3,
                status = $4,
                cancel_at_period_end = $5,
                current_period_end = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(&subscription.plan_id)
        .bind(&subscription.stripe_item_id)
        .bind(subscription.status.as_str())
        .bind(subscription.cancel_at_period_end)
        .bind(subscription.current_period_end.as_ref().map(|t| *t.as_datetime()))
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update subscription", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SubscriptionNotFound,
                format!("Subscription not found: {}", subscription.id),
            ));
        }
        Ok(())
    }

    async fn find_current_for_profile(
        &self,
        profile_id: &ProfileId,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM subscriptions
            WHERE profile_id = $1 AND status <> 'canceled'
            ORDER BY created_at DESC
            LIMIT 1
            "#,
            SUBSCRIPTION_COLUMNS
        ))
        .bind(profile_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_by_stripe_id(
        &self,
        stripe_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM subscriptions WHERE stripe_subscription_id = $1",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(stripe_subscription_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }
}
