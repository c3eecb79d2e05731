//! PostgreSQL implementation of ProfileRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::credit_ledger::insert_transaction;
use super::{begin, commit, corrupt_row, db_error, lock_profile_credits};
use crate::domain::credits::CreditTransaction;
use crate::domain::foundation::{DomainError, ProfileId, Timestamp};
use crate::domain::profile::{profile_not_found, Profile, Role};
use crate::ports::ProfileRepository;

const PROFILE_COLUMNS: &str =
    "id, email, full_name, role, credits, stripe_customer_id, created_at, updated_at";

pub struct PostgresProfileRepository {
    pool: PgPool,
}

impl PostgresProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    email: String,
    full_name: Option<String>,
    role: String,
    credits: i64,
    stripe_customer_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = DomainError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse().map_err(|e| corrupt_row("profiles", e))?;
        Ok(Profile {
            id: ProfileId::from_uuid(row.id),
            email: row.email,
            full_name: row.full_name,
            role,
            credits: row.credits,
            stripe_customer_id: row.stripe_customer_id,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn find(&self, id: &ProfileId) -> Result<Option<Profile>, DomainError> {
        let row: Option<ProfileRow> = sqlx::query_as(&format!(
            "SELECT {} FROM profiles WHERE id = $1",
            PROFILE_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch profile", e))?;

        row.map(Profile::try_from).transpose()
    }

    async fn ensure(&self, profile: &Profile) -> Result<Profile, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, email, full_name, role, credits, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(profile.id.as_uuid())
        .bind(&profile.email)
        .bind(&profile.full_name)
        .bind(profile.role.as_str())
        .bind(profile.credits)
        .bind(profile.created_at.as_datetime())
        .bind(profile.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert profile", e))?;

        self.find(&profile.id)
            .await?
            .ok_or_else(|| profile_not_found(&profile.id))
    }

    async fn set_stripe_customer_id(
        &self,
        id: &ProfileId,
        customer_id: &str,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE profiles SET stripe_customer_id = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(customer_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to store customer id", e))?;

        if result.rows_affected() == 0 {
            return Err(profile_not_found(id));
        }
        Ok(())
    }

    async fn promote_to_admin(
        &self,
        id: &ProfileId,
        credits: i64,
    ) -> Result<Profile, DomainError> {
        let mut tx = begin(&self.pool).await?;
        let previous = lock_profile_credits(&mut tx, id).await?;

        let row: ProfileRow = sqlx::query_as(&format!(
            r#"
            UPDATE profiles SET role = 'admin', credits = $2, updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(id.as_uuid())
        .bind(credits)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to promote profile", e))?;

        let delta = credits - previous;
        if delta != 0 {
            let entry =
                CreditTransaction::adjustment(*id, delta, "Admin promotion testing credits");
            insert_transaction(&mut tx, &entry).await?;
        }

        commit(tx).await?;
        tracing::info!(profile_id = %id, credits, delta, "profile promoted to admin");
        Profile::try_from(row)
    }
}
