use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::database::models::{Maintenance, MaintenanceStatus};

const COLUMNS: &str = "\
    id, asset_id, description, status, started_at, completed_at, \
    created_at, updated_at";

pub struct MaintenanceRepo;

impl MaintenanceRepo {
    pub async fn create<'e>(
        exec: impl PgExecutor<'e>,
        asset_id: Uuid,
        description: &str,
        status: MaintenanceStatus,
        started_at: DateTime<Utc>,
    ) -> Result<Maintenance, sqlx::Error> {
        let completed_at = (status == MaintenanceStatus::Completed).then(Utc::now);
        let query = format!(
            "INSERT INTO asset_maintenance (asset_id, description, status, started_at, completed_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Maintenance>(&query)
            .bind(asset_id)
            .bind(description)
            .bind(status)
            .bind(started_at)
            .bind(completed_at)
            .fetch_one(exec)
            .await
    }

    pub async fn find_by_id<'e>(exec: impl PgExecutor<'e>, id: Uuid) -> Result<Option<Maintenance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM asset_maintenance WHERE id = $1");
        sqlx::query_as::<_, Maintenance>(&query).bind(id).fetch_optional(exec).await
    }

    pub async fn find_for_update<'e>(exec: impl PgExecutor<'e>, id: Uuid) -> Result<Option<Maintenance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM asset_maintenance WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Maintenance>(&query).bind(id).fetch_optional(exec).await
    }

    /// Records on `asset_id` other than `excluding` that are not completed.
    pub async fn count_open_for_asset<'e>(
        exec: impl PgExecutor<'e>,
        asset_id: Uuid,
        excluding: Uuid,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM asset_maintenance \
             WHERE asset_id = $1 AND id <> $2 AND status <> 'completed'",
        )
        .bind(asset_id)
        .bind(excluding)
        .fetch_one(exec)
        .await
    }

    /// `completed_at` is stamped the first time the record reaches `completed`
    /// and cleared if it is reopened.
    pub async fn update<'e>(
        exec: impl PgExecutor<'e>,
        id: Uuid,
        description: Option<&str>,
        status: MaintenanceStatus,
    ) -> Result<Maintenance, sqlx::Error> {
        let query = format!(
            "UPDATE asset_maintenance SET \
                description = COALESCE($2, description), \
                status = $3, \
                completed_at = CASE WHEN $3 = 'completed' THEN COALESCE(completed_at, now()) ELSE NULL END, \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Maintenance>(&query)
            .bind(id)
            .bind(description)
            .bind(status)
            .fetch_one(exec)
            .await
    }

    pub async fn list_for_asset(pool: &PgPool, asset_id: Uuid) -> Result<Vec<Maintenance>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM asset_maintenance \
             WHERE asset_id = $1 \
             ORDER BY started_at DESC"
        );
        sqlx::query_as::<_, Maintenance>(&query).bind(asset_id).fetch_all(pool).await
    }
}
