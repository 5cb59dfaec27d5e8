//! Repository for the `asset_assignments` table.

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::database::models::{Assignment, AssignmentStatus};

/// Column list for `asset_assignments` queries.
const COLUMNS: &str = "\
    id, asset_id, user_id, quantity, returned_quantity, status, \
    assigned_at, returned_at, created_at, updated_at, deleted_at";

pub struct AssignmentRepo;

impl AssignmentRepo {
    pub async fn create<'e>(
        exec: impl PgExecutor<'e>,
        asset_id: Uuid,
        user_id: Uuid,
        quantity: i32,
        assigned_at: DateTime<Utc>,
    ) -> Result<Assignment, sqlx::Error> {
        let query = format!(
            "INSERT INTO asset_assignments (asset_id, user_id, quantity, status, assigned_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(asset_id)
            .bind(user_id)
            .bind(quantity)
            .bind(AssignmentStatus::Assigned)
            .bind(assigned_at)
            .fetch_one(exec)
            .await
    }

    pub async fn find_by_id<'e>(exec: impl PgExecutor<'e>, id: Uuid) -> Result<Option<Assignment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM asset_assignments WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Assignment>(&query).bind(id).fetch_optional(exec).await
    }

    pub async fn find_for_update<'e>(exec: impl PgExecutor<'e>, id: Uuid) -> Result<Option<Assignment>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM asset_assignments WHERE id = $1 AND deleted_at IS NULL FOR UPDATE");
        sqlx::query_as::<_, Assignment>(&query).bind(id).fetch_optional(exec).await
    }

    /// The live assignment for an (asset, user) pair, if any.
    pub async fn find_live_pair<'e>(
        exec: impl PgExecutor<'e>,
        asset_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Assignment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM asset_assignments \
             WHERE asset_id = $1 AND user_id = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(asset_id)
            .bind(user_id)
            .fetch_optional(exec)
            .await
    }

    pub async fn list_for_asset(pool: &PgPool, asset_id: Uuid) -> Result<Vec<Assignment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM asset_assignments \
             WHERE asset_id = $1 AND deleted_at IS NULL \
             ORDER BY assigned_at DESC"
        );
        sqlx::query_as::<_, Assignment>(&query).bind(asset_id).fetch_all(pool).await
    }

    pub async fn set_quantity<'e>(exec: impl PgExecutor<'e>, id: Uuid, quantity: i32) -> Result<Assignment, sqlx::Error> {
        let query = format!(
            "UPDATE asset_assignments SET quantity = $2, updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Assignment>(&query).bind(id).bind(quantity).fetch_one(exec).await
    }

    pub async fn apply_return<'e>(
        exec: impl PgExecutor<'e>,
        id: Uuid,
        returned_quantity: i32,
        status: AssignmentStatus,
        returned_at: DateTime<Utc>,
    ) -> Result<Assignment, sqlx::Error> {
        let query = format!(
            "UPDATE asset_assignments \
             SET returned_quantity = $2, status = $3, returned_at = $4, updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(id)
            .bind(returned_quantity)
            .bind(status)
            .bind(returned_at)
            .fetch_one(exec)
            .await
    }

    /// Soft delete frees the (asset, user) pair for a fresh assignment.
    pub async fn soft_delete<'e>(exec: impl PgExecutor<'e>, id: Uuid) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE asset_assignments SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .execute(exec)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Units still out with users across all live assignments of an asset.
    pub async fn outstanding_for_asset<'e>(exec: impl PgExecutor<'e>, asset_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity - returned_quantity), 0)::bigint \
             FROM asset_assignments WHERE asset_id = $1 AND deleted_at IS NULL",
        )
        .bind(asset_id)
        .fetch_one(exec)
        .await
    }
}
