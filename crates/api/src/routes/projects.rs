//! Project route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use domain::models::project::ProjectStaffResponse;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::TicketService;

/// GET /api/v1/projects/:project_id/staff
///
/// Internal staff on a project, for picking ticket assignees.
#[axum::debug_handler]
pub async fn get_project_staff(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(project_id): Path<Uuid>,
) -> Result<(StatusCode, Json<ProjectStaffResponse>), ApiError> {
    let service = TicketService::new(state.pool.clone(), state.calendar.clone());
    let response = service.project_staff(&auth.actor(), project_id).await?;
    Ok((StatusCode::OK, Json(response)))
}
