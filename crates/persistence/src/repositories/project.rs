//! Project repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ProjectEntity, UserEntity};
use crate::metrics::QueryTimer;

/// Repository for project-related database operations.
#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    /// Creates a new ProjectRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a project by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ProjectEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_project_by_id");
        let result = sqlx::query_as::<_, ProjectEntity>(
            r#"
            SELECT id, customer_company_id, name, is_active, created_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Internal users registered on a project, for assignment pickers.
    pub async fn staff_members(&self, project_id: Uuid) -> Result<Vec<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("project_staff_members");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT u.id, u.full_name, u.role, u.customer_company_id, u.is_active, u.created_at
            FROM project_members pm
            JOIN users u ON pm.user_id = u.id
            WHERE pm.project_id = $1
              AND u.is_active = TRUE
              AND u.role IN ('MASTER', 'ADMIN', 'STAFF')
            ORDER BY u.full_name ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
