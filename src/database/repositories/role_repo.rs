use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::database::models::{CreateRole, Role, UpdateRole};

const COLUMNS: &str = "id, name, permissions, created_at, updated_at";

pub struct RoleRepo;

impl RoleRepo {
    pub async fn create(pool: &PgPool, input: &CreateRole) -> Result<Role, sqlx::Error> {
        let query = format!("INSERT INTO roles (name, permissions) VALUES ($1, $2) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Role>(&query)
            .bind(&input.name)
            .bind(&input.permissions)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id<'e>(exec: impl PgExecutor<'e>, id: Uuid) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE id = $1");
        sqlx::query_as::<_, Role>(&query).bind(id).fetch_optional(exec).await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles ORDER BY name");
        sqlx::query_as::<_, Role>(&query).fetch_all(pool).await
    }

    pub async fn update(pool: &PgPool, id: Uuid, input: &UpdateRole) -> Result<Option<Role>, sqlx::Error> {
        let query = format!(
            "UPDATE roles SET \
                name = COALESCE($2, name), \
                permissions = COALESCE($3, permissions), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Role>(&query)
            .bind(id)
            .bind(input.name.as_deref())
            .bind(input.permissions.as_deref())
            .fetch_optional(pool)
            .await
    }

    /// Users holding the role keep their row; their `role_id` is cleared first.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("UPDATE users SET role_id = NULL, updated_at = now() WHERE role_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM roles WHERE id = $1").bind(id).execute(&mut *tx).await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
