//! Ticket lifecycle route handlers.
//!
//! Handlers stay thin: they resolve the acting user, delegate to
//! [`TicketService`], and shape the HTTP response.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use domain::models::ticket::{
    AcceptTicketRequest, AddCommentRequest, CreateTicketRequest, ListTicketsQuery,
    ListTicketsResponse, RejectRequest, RequestDelayRequest, StartWorkRequest,
    TicketDetailResponse,
};
use domain::models::timeline::TimelineResponse;
use domain::models::ChatMessage;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::TicketService;

fn service(state: &AppState) -> TicketService {
    TicketService::new(state.pool.clone(), state.calendar.clone())
}

/// POST /api/v1/tickets
#[axum::debug_handler]
pub async fn create_ticket(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<TicketDetailResponse>), ApiError> {
    let response = service(&state)
        .create_ticket(&auth.actor(), request)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/tickets
#[axum::debug_handler]
pub async fn list_tickets(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(query): Query<ListTicketsQuery>,
) -> Result<(StatusCode, Json<ListTicketsResponse>), ApiError> {
    let response = service(&state).list_tickets(&auth.actor(), query).await?;
    Ok((StatusCode::OK, Json(response)))
}

/// GET /api/v1/tickets/:ticket_id
#[axum::debug_handler]
pub async fn get_ticket(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(ticket_id): Path<Uuid>,
) -> Result<(StatusCode, Json<TicketDetailResponse>), ApiError> {
    let response = service(&state).get_ticket(&auth.actor(), ticket_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

/// POST /api/v1/tickets/:ticket_id/ensure-accepted
#[axum::debug_handler]
pub async fn ensure_accepted(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(ticket_id): Path<Uuid>,
) -> Result<(StatusCode, Json<TicketDetailResponse>), ApiError> {
    let response = service(&state)
        .ensure_accepted(&auth.actor(), ticket_id)
        .await?;
    Ok((StatusCode::OK, Json(response)))
}

/// POST /api/v1/tickets/:ticket_id/accept
#[axum::debug_handler]
pub async fn accept_ticket(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(ticket_id): Path<Uuid>,
    Json(request): Json<AcceptTicketRequest>,
) -> Result<(StatusCode, Json<TicketDetailResponse>), ApiError> {
    let response = service(&state)
        .accept_ticket(&auth.actor(), ticket_id, request)
        .await?;
    Ok((StatusCode::OK, Json(response)))
}

/// POST /api/v1/tickets/:ticket_id/start-work
#[axum::debug_handler]
pub async fn start_work(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(ticket_id): Path<Uuid>,
    Json(request): Json<StartWorkRequest>,
) -> Result<(StatusCode, Json<TicketDetailResponse>), ApiError> {
    let response = service(&state)
        .start_work(&auth.actor(), ticket_id, request)
        .await?;
    Ok((StatusCode::OK, Json(response)))
}

/// POST /api/v1/tickets/:ticket_id/comments
#[axum::debug_handler]
pub async fn add_comment(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(ticket_id): Path<Uuid>,
    Json(request): Json<AddCommentRequest>,
) -> Result<(StatusCode, Json<ChatMessage>), ApiError> {
    let response = service(&state)
        .add_comment(&auth.actor(), ticket_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/tickets/:ticket_id/delay-request
#[axum::debug_handler]
pub async fn request_delay(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(ticket_id): Path<Uuid>,
    Json(request): Json<RequestDelayRequest>,
) -> Result<(StatusCode, Json<TicketDetailResponse>), ApiError> {
    let response = service(&state)
        .request_delay(&auth.actor(), ticket_id, request)
        .await?;
    Ok((StatusCode::OK, Json(response)))
}

/// POST /api/v1/tickets/:ticket_id/delay-request/approve
#[axum::debug_handler]
pub async fn approve_delay(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(ticket_id): Path<Uuid>,
) -> Result<(StatusCode, Json<TicketDetailResponse>), ApiError> {
    let response = service(&state)
        .approve_delay(&auth.actor(), ticket_id)
        .await?;
    Ok((StatusCode::OK, Json(response)))
}

/// POST /api/v1/tickets/:ticket_id/delay-request/reject
#[axum::debug_handler]
pub async fn reject_delay(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(ticket_id): Path<Uuid>,
    Json(request): Json<RejectRequest>,
) -> Result<(StatusCode, Json<TicketDetailResponse>), ApiError> {
    let response = service(&state)
        .reject_delay(&auth.actor(), ticket_id, request)
        .await?;
    Ok((StatusCode::OK, Json(response)))
}

/// POST /api/v1/tickets/:ticket_id/completion-request
#[axum::debug_handler]
pub async fn request_completion(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(ticket_id): Path<Uuid>,
) -> Result<(StatusCode, Json<TicketDetailResponse>), ApiError> {
    let response = service(&state)
        .request_completion(&auth.actor(), ticket_id)
        .await?;
    Ok((StatusCode::OK, Json(response)))
}

/// POST /api/v1/tickets/:ticket_id/completion-request/approve
#[axum::debug_handler]
pub async fn approve_completion(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(ticket_id): Path<Uuid>,
) -> Result<(StatusCode, Json<TicketDetailResponse>), ApiError> {
    let response = service(&state)
        .approve_completion(&auth.actor(), ticket_id)
        .await?;
    Ok((StatusCode::OK, Json(response)))
}

/// POST /api/v1/tickets/:ticket_id/completion-request/reject
#[axum::debug_handler]
pub async fn reject_completion(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(ticket_id): Path<Uuid>,
    Json(request): Json<RejectRequest>,
) -> Result<(StatusCode, Json<TicketDetailResponse>), ApiError> {
    let response = service(&state)
        .reject_completion(&auth.actor(), ticket_id, request)
        .await?;
    Ok((StatusCode::OK, Json(response)))
}

/// GET /api/v1/tickets/:ticket_id/timeline
#[axum::debug_handler]
pub async fn get_timeline(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(ticket_id): Path<Uuid>,
) -> Result<(StatusCode, Json<TimelineResponse>), ApiError> {
    let response = service(&state).timeline(&auth.actor(), ticket_id).await?;
    Ok((StatusCode::OK, Json(response)))
}
