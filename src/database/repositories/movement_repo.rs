//! Repository for the append-only `asset_movements` table.
//!
//! Insert and read only. The table trigger rejects UPDATE and DELETE.

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::database::models::{Movement, NewMovement};

const COLUMNS: &str = "\
    id, asset_id, assignment_id, movement_type, quantity, available_after, \
    actor_id, idempotency_key, created_at";

pub struct MovementRepo;

impl MovementRepo {
    pub async fn insert<'e>(exec: impl PgExecutor<'e>, movement: &NewMovement<'_>) -> Result<Movement, sqlx::Error> {
        let query = format!(
            "INSERT INTO asset_movements \
                (asset_id, assignment_id, movement_type, quantity, available_after, actor_id, idempotency_key) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Movement>(&query)
            .bind(movement.asset_id)
            .bind(movement.assignment_id)
            .bind(movement.movement_type)
            .bind(movement.quantity)
            .bind(movement.available_after)
            .bind(movement.actor_id)
            .bind(movement.idempotency_key)
            .fetch_one(exec)
            .await
    }

    pub async fn find_by_key<'e>(exec: impl PgExecutor<'e>, key: &str) -> Result<Option<Movement>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM asset_movements WHERE idempotency_key = $1");
        sqlx::query_as::<_, Movement>(&query).bind(key).fetch_optional(exec).await
    }

    /// Oldest first, the order the events happened.
    pub async fn list_for_asset(pool: &PgPool, asset_id: Uuid) -> Result<Vec<Movement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM asset_movements \
             WHERE asset_id = $1 \
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, Movement>(&query).bind(asset_id).fetch_all(pool).await
    }
}
