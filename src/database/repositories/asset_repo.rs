//! Repository for the `assets` table.

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::database::models::{Asset, AssetFilter, AssetStatus, CreateAsset, UpdateAsset};

/// Column list for `assets` queries.
const COLUMNS: &str = "\
    id, asset_code, name, asset_type, quantity, available_quantity, status, \
    scope_id, notes, created_at, updated_at, deleted_at";

pub struct AssetRepo;

impl AssetRepo {
    /// New assets start with every unit available.
    pub async fn create(pool: &PgPool, input: &CreateAsset) -> Result<Asset, sqlx::Error> {
        let query = format!(
            "INSERT INTO assets (asset_code, name, asset_type, quantity, available_quantity, status, scope_id, notes) \
             VALUES ($1, $2, $3, $4, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(&input.asset_code)
            .bind(&input.name)
            .bind(input.asset_type)
            .bind(input.quantity)
            .bind(AssetStatus::Available)
            .bind(input.scope_id)
            .bind(input.notes.as_deref())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id<'e>(exec: impl PgExecutor<'e>, id: Uuid) -> Result<Option<Asset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assets WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Asset>(&query).bind(id).fetch_optional(exec).await
    }

    /// Load and row-lock an asset for the rest of the transaction.
    pub async fn find_for_update<'e>(exec: impl PgExecutor<'e>, id: Uuid) -> Result<Option<Asset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assets WHERE id = $1 AND deleted_at IS NULL FOR UPDATE");
        sqlx::query_as::<_, Asset>(&query).bind(id).fetch_optional(exec).await
    }

    /// List live assets. `scope_ids = None` means no scope restriction;
    /// unscoped assets are visible to everyone.
    pub async fn list(
        pool: &PgPool,
        filter: &AssetFilter,
        scope_ids: Option<&[Uuid]>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Asset>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM assets \
             WHERE deleted_at IS NULL \
               AND ($1::text IS NULL OR status = $1) \
               AND ($2::text IS NULL OR asset_type = $2) \
               AND ($3::text IS NULL OR name ILIKE '%' || $3 || '%' OR asset_code ILIKE '%' || $3 || '%') \
               AND ($4::uuid[] IS NULL OR scope_id IS NULL OR scope_id = ANY($4)) \
             ORDER BY asset_code \
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(filter.status)
            .bind(filter.asset_type)
            .bind(filter.q.as_deref())
            .bind(scope_ids)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Assets that can take a new assignment right now.
    pub async fn list_assignable(pool: &PgPool, scope_ids: Option<&[Uuid]>) -> Result<Vec<Asset>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM assets \
             WHERE deleted_at IS NULL \
               AND available_quantity > 0 \
               AND status IN ('available', 'partially_assigned', 'partially_returned') \
               AND ($1::uuid[] IS NULL OR scope_id IS NULL OR scope_id = ANY($1)) \
             ORDER BY name"
        );
        sqlx::query_as::<_, Asset>(&query).bind(scope_ids).fetch_all(pool).await
    }

    /// Update catalogue fields. Absent fields keep their value.
    pub async fn update_details<'e>(
        exec: impl PgExecutor<'e>,
        id: Uuid,
        input: &UpdateAsset,
    ) -> Result<Asset, sqlx::Error> {
        let query = format!(
            "UPDATE assets SET \
                name = COALESCE($2, name), \
                scope_id = COALESCE($3, scope_id), \
                notes = COALESCE($4, notes), \
                updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .bind(input.name.as_deref())
            .bind(input.scope_id)
            .bind(input.notes.as_deref())
            .fetch_one(exec)
            .await
    }

    /// Write the outcome of an accounting plan.
    pub async fn apply_quantities<'e>(
        exec: impl PgExecutor<'e>,
        id: Uuid,
        available_quantity: i32,
        status: AssetStatus,
    ) -> Result<Asset, sqlx::Error> {
        let query = format!(
            "UPDATE assets SET available_quantity = $2, status = $3, updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .bind(available_quantity)
            .bind(status)
            .fetch_one(exec)
            .await
    }

    pub async fn set_status<'e>(exec: impl PgExecutor<'e>, id: Uuid, status: AssetStatus) -> Result<Asset, sqlx::Error> {
        let query = format!(
            "UPDATE assets SET status = $2, updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Asset>(&query).bind(id).bind(status).fetch_one(exec).await
    }

    /// Returns true when a live row was soft-deleted.
    pub async fn soft_delete<'e>(exec: impl PgExecutor<'e>, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE assets SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(exec)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
