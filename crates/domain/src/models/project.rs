//! Project collaborator types.
//!
//! Project and membership CRUD is out of scope; the lifecycle engine only
//! needs to know whether a project is active, which customer company it
//! belongs to, and which internal users are candidate assignees.

use serde::Serialize;
use uuid::Uuid;

use crate::models::user::UserBrief;

/// Summary of a project as the lifecycle engine sees it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ProjectSummary {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_company_id: Option<Uuid>,
    pub is_active: bool,
}

/// Internal members of a project eligible for assignment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ProjectStaffResponse {
    pub project_id: Uuid,
    pub staff: Vec<UserBrief>,
}
