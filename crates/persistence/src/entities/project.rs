//! Project entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::project::ProjectSummary;

/// Database row mapping for the projects table.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectEntity {
    pub id: Uuid,
    pub name: String,
    pub customer_company_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ProjectEntity> for ProjectSummary {
    fn from(e: ProjectEntity) -> Self {
        ProjectSummary {
            id: e.id,
            name: e.name,
            customer_company_id: e.customer_company_id,
            is_active: e.is_active,
        }
    }
}
