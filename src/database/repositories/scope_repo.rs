use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{CreateScope, Scope};

const COLUMNS: &str = "id, parent_id, name, kind, created_at";

pub struct ScopeRepo;

impl ScopeRepo {
    pub async fn create(pool: &PgPool, input: &CreateScope) -> Result<Scope, sqlx::Error> {
        let query = format!("INSERT INTO scopes (parent_id, name, kind) VALUES ($1, $2, $3) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Scope>(&query)
            .bind(input.parent_id)
            .bind(&input.name)
            .bind(input.kind)
            .fetch_one(pool)
            .await
    }

    /// The whole tree. Scope tables are small, so visibility is computed in memory.
    pub async fn list(pool: &PgPool) -> Result<Vec<Scope>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scopes ORDER BY name");
        sqlx::query_as::<_, Scope>(&query).fetch_all(pool).await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM scopes WHERE id = $1").bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
