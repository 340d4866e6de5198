//! User repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::UserEntity;
use crate::metrics::QueryTimer;

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active internal users among the given ids. Used to verify that a
    /// requested assignee set is real before writing assignee rows.
    pub async fn find_assignable(&self, ids: &[Uuid]) -> Result<Vec<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_assignable_users");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, full_name, role, customer_company_id, is_active, created_at
            FROM users
            WHERE id = ANY($1)
              AND is_active = TRUE
              AND role IN ('MASTER', 'ADMIN', 'STAFF')
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
