use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::database::models::{UpdateUser, User};
use crate::types::Access;

const COLUMNS: &str = "\
    id, name, auth, password_hash, access, role_id, scope_id, \
    created_at, updated_at, deleted_at";

pub struct UserRepo;

impl UserRepo {
    pub async fn create<'e>(
        exec: impl PgExecutor<'e>,
        name: &str,
        auth: &str,
        password_hash: &str,
        access: Access,
        role_id: Option<Uuid>,
        scope_id: Option<Uuid>,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, auth, password_hash, access, role_id, scope_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(name)
            .bind(auth)
            .bind(password_hash)
            .bind(access)
            .bind(role_id)
            .bind(scope_id)
            .fetch_one(exec)
            .await
    }

    pub async fn find_by_id<'e>(exec: impl PgExecutor<'e>, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, User>(&query).bind(id).fetch_optional(exec).await
    }

    /// Lookup by login name.
    pub async fn find_by_auth(pool: &PgPool, auth: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE auth = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, User>(&query).bind(auth).fetch_optional(pool).await
    }

    pub async fn list(
        pool: &PgPool,
        scope_ids: Option<&[Uuid]>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users \
             WHERE deleted_at IS NULL \
               AND ($1::uuid[] IS NULL OR scope_id IS NULL OR scope_id = ANY($1)) \
             ORDER BY name \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(scope_ids)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        input: &UpdateUser,
        password_hash: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET \
                name = COALESCE($2, name), \
                password_hash = COALESCE($3, password_hash), \
                access = COALESCE($4, access), \
                role_id = COALESCE($5, role_id), \
                scope_id = COALESCE($6, scope_id), \
                updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(input.name.as_deref())
            .bind(password_hash)
            .bind(input.access)
            .bind(input.role_id)
            .bind(input.scope_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
