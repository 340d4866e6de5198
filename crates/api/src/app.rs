use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use domain::services::BusinessCalendar;

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, security_headers_middleware, trace_id,
};
use crate::routes::{health, projects, tickets};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub calendar: Arc<BusinessCalendar>,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);

    let calendar = Arc::new(BusinessCalendar::from_iso_dates(
        config.calendar.holidays.iter().map(|s| s.as_str()),
    ));

    let state = AppState {
        pool,
        config: config.clone(),
        calendar,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Ticket lifecycle routes. Authentication happens in the UserAuth
    // extractor, so every handler here carries the session claims.
    let ticket_routes = Router::new()
        .route(
            "/api/v1/tickets",
            post(tickets::create_ticket).get(tickets::list_tickets),
        )
        .route("/api/v1/tickets/:ticket_id", get(tickets::get_ticket))
        .route(
            "/api/v1/tickets/:ticket_id/ensure-accepted",
            post(tickets::ensure_accepted),
        )
        .route("/api/v1/tickets/:ticket_id/accept", post(tickets::accept_ticket))
        .route(
            "/api/v1/tickets/:ticket_id/start-work",
            post(tickets::start_work),
        )
        .route(
            "/api/v1/tickets/:ticket_id/comments",
            post(tickets::add_comment),
        )
        .route(
            "/api/v1/tickets/:ticket_id/delay-request",
            post(tickets::request_delay),
        )
        .route(
            "/api/v1/tickets/:ticket_id/delay-request/approve",
            post(tickets::approve_delay),
        )
        .route(
            "/api/v1/tickets/:ticket_id/delay-request/reject",
            post(tickets::reject_delay),
        )
        .route(
            "/api/v1/tickets/:ticket_id/completion-request",
            post(tickets::request_completion),
        )
        .route(
            "/api/v1/tickets/:ticket_id/completion-request/approve",
            post(tickets::approve_completion),
        )
        .route(
            "/api/v1/tickets/:ticket_id/completion-request/reject",
            post(tickets::reject_completion),
        )
        .route(
            "/api/v1/tickets/:ticket_id/timeline",
            get(tickets::get_timeline),
        );

    let project_routes = Router::new().route(
        "/api/v1/projects/:project_id/staff",
        get(projects::get_project_staff),
    );

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(ticket_routes)
        .merge(project_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
