//! Integration tests for request validation, authorization gating,
//! tenant scoping, and conflict handling on the ticket endpoints.
//!
//! These tests require a running PostgreSQL instance.
//! Set TEST_DATABASE_URL or use the default local test database.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::Utc;
use common::{
    add_project_member, create_test_app, create_test_pool, empty_request, json_request,
    later_business_date, parse_response_body, run_migrations, seed_company, seed_project,
    seed_user, standard_end_date, test_config, token_for,
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

#[tokio::test]
async fn test_create_rejects_end_date_inside_lead_time() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let company = seed_company(&pool, "Wayne Enterprises").await;
    let customer = seed_user(&pool, "CUSTOMER", Some(company)).await;
    let project = seed_project(&pool, company, "Wayne Helpdesk").await;
    let token = token_for(customer, "CUSTOMER", Some(company));

    // Today can never satisfy the three-business-day lead time.
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/tickets",
            json!({
                "project_id": project,
                "title": "Monitor flickering",
                "end_date": Utc::now().date_naive(),
            }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_emergency_requires_reason() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let company = seed_company(&pool, "Cyberdyne").await;
    let customer = seed_user(&pool, "CUSTOMER", Some(company)).await;
    let project = seed_project(&pool, company, "Cyberdyne Desk").await;
    let token = token_for(customer, "CUSTOMER", Some(company));

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/tickets",
            json!({
                "project_id": project,
                "title": "Production line halted",
                "end_date": standard_end_date(),
                "is_emergency": true,
            }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("emergency_reason"));
}

#[tokio::test]
async fn test_staff_intake_without_assignees_is_rejected() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let company = seed_company(&pool, "Tyrell Corp").await;
    let staff = seed_user(&pool, "STAFF", None).await;
    let project = seed_project(&pool, company, "Tyrell Desk").await;
    let token = token_for(staff, "STAFF", None);

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/tickets",
            json!({
                "project_id": project,
                "title": "Replicant registry sync failing",
                "end_date": standard_end_date(),
            }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert!(body["message"].as_str().unwrap().contains("assignee_ids"));
}

#[tokio::test]
async fn test_customer_cannot_run_staff_transitions() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let company = seed_company(&pool, "Oscorp").await;
    let customer = seed_user(&pool, "CUSTOMER", Some(company)).await;
    let project = seed_project(&pool, company, "Oscorp Desk").await;
    let token = token_for(customer, "CUSTOMER", Some(company));

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/tickets",
            json!({
                "project_id": project,
                "title": "Lab access card expired",
                "end_date": standard_end_date(),
            }),
            &token,
        ))
        .await
        .unwrap();
    let ticket_id = parse_response_body(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .oneshot(empty_request(
            Method::POST,
            &format!("/api/v1/tickets/{}/ensure-accepted", ticket_id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_accept_on_waiting_ticket_conflicts() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let company = seed_company(&pool, "Hooli").await;
    let customer = seed_user(&pool, "CUSTOMER", Some(company)).await;
    let staff = seed_user(&pool, "STAFF", None).await;
    let project = seed_project(&pool, company, "Hooli Desk").await;

    let customer_token = token_for(customer, "CUSTOMER", Some(company));
    let staff_token = token_for(staff, "STAFF", None);

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/tickets",
            json!({
                "project_id": project,
                "title": "Mail quota exceeded",
                "end_date": standard_end_date(),
            }),
            &customer_token,
        ))
        .await
        .unwrap();
    let ticket_id = parse_response_body(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Accept requires ACCEPTED status; the ticket is still WAITING.
    let response = app
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/tickets/{}/accept", ticket_id),
            json!({ "staff_ids": [staff], "end_date": standard_end_date() }),
            &staff_token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_second_delay_request_while_pending_conflicts() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let company = seed_company(&pool, "Aperture").await;
    let staff = seed_user(&pool, "STAFF", None).await;
    let project = seed_project(&pool, company, "Aperture Desk").await;
    let staff_token = token_for(staff, "STAFF", None);

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/tickets",
            json!({
                "project_id": project,
                "title": "Test chamber lighting",
                "end_date": standard_end_date(),
                "assignee_ids": [staff],
            }),
            &staff_token,
        ))
        .await
        .unwrap();
    let ticket_id = parse_response_body(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    app.clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/tickets/{}/start-work", ticket_id),
            json!({ "message": "Swapping ballast units" }),
            &staff_token,
        ))
        .await
        .unwrap();

    let delay_body = json!({
        "requested_date": later_business_date(),
        "reason": "Parts on backorder",
    });
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/tickets/{}/delay-request", ticket_id),
            delay_body.clone(),
            &staff_token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/tickets/{}/delay-request", ticket_id),
            delay_body,
            &staff_token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_cross_company_customer_sees_not_found() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let company_a = seed_company(&pool, "Massive Dynamic").await;
    let company_b = seed_company(&pool, "Veridian").await;
    let customer_a = seed_user(&pool, "CUSTOMER", Some(company_a)).await;
    let customer_b = seed_user(&pool, "CUSTOMER", Some(company_b)).await;
    let project_a = seed_project(&pool, company_a, "Massive Desk").await;

    let token_a = token_for(customer_a, "CUSTOMER", Some(company_a));
    let token_b = token_for(customer_b, "CUSTOMER", Some(company_b));

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/tickets",
            json!({
                "project_id": project_a,
                "title": "Conference phone static",
                "end_date": standard_end_date(),
            }),
            &token_a,
        ))
        .await
        .unwrap();
    let ticket_id = parse_response_body(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    // The other tenant cannot learn the ticket exists.
    let response = app
        .clone()
        .oneshot(empty_request(
            Method::GET,
            &format!("/api/v1/tickets/{}", ticket_id),
            &token_b,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Nor can they file tickets against the other tenant's project.
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/tickets",
            json!({
                "project_id": project_a,
                "title": "Probing someone else's project",
                "end_date": standard_end_date(),
            }),
            &token_b,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_listing_filters_and_paginates() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let company = seed_company(&pool, "Pied Piper").await;
    let other_company = seed_company(&pool, "Endframe").await;
    let customer = seed_user(&pool, "CUSTOMER", Some(company)).await;
    let outsider = seed_user(&pool, "CUSTOMER", Some(other_company)).await;
    let project = seed_project(&pool, company, "Pied Piper Desk").await;
    let token = token_for(customer, "CUSTOMER", Some(company));

    for title in ["Compression node down", "Dashboard 502s", "SSO loop"] {
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/v1/tickets",
                json!({
                    "project_id": project,
                    "title": title,
                    "end_date": standard_end_date(),
                }),
                &token,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(empty_request(
            Method::GET,
            &format!("/api/v1/tickets?project_id={}&per_page=2", project),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["tickets"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["total_pages"], 2);

    let response = app
        .clone()
        .oneshot(empty_request(
            Method::GET,
            &format!("/api/v1/tickets?project_id={}&per_page=2&page=2", project),
            &token,
        ))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["tickets"].as_array().unwrap().len(), 1);

    // Status filter narrows within the tenant.
    let response = app
        .clone()
        .oneshot(empty_request(
            Method::GET,
            &format!("/api/v1/tickets?project_id={}&status=COMPLETED", project),
            &token,
        ))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["pagination"]["total"], 0);

    // Another tenant sees nothing even with the explicit project filter.
    let outsider_token = token_for(outsider, "CUSTOMER", Some(other_company));
    let response = app
        .oneshot(empty_request(
            Method::GET,
            &format!("/api/v1/tickets?project_id={}", project),
            &outsider_token,
        ))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_timeline_of_waiting_ticket_shows_pending_stages() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let company = seed_company(&pool, "Gekko & Co").await;
    let customer = seed_user(&pool, "CUSTOMER", Some(company)).await;
    let project = seed_project(&pool, company, "Gekko Desk").await;
    let token = token_for(customer, "CUSTOMER", Some(company));

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/tickets",
            json!({
                "project_id": project,
                "title": "Ticker feed lag",
                "end_date": standard_end_date(),
            }),
            &token,
        ))
        .await
        .unwrap();
    let ticket_id = parse_response_body(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .oneshot(empty_request(
            Method::GET,
            &format!("/api/v1/tickets/{}/timeline", ticket_id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    let markers = body["markers"].as_array().unwrap();
    assert_eq!(markers.len(), 4);
    assert_eq!(markers[0]["stage"], "WAITING");
    assert_eq!(markers[0]["state"], "done");
    assert_eq!(markers[1]["stage"], "ACCEPTED");
    assert_eq!(markers[1]["state"], "pending");
    assert_eq!(markers[2]["stage"], "IN_PROGRESS");
    assert_eq!(markers[2]["state"], "pending");
    assert_eq!(markers[3]["stage"], "COMPLETED");
    assert_eq!(markers[3]["state"], "pending");
}

#[tokio::test]
async fn test_project_staff_listing_is_tenant_scoped() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let company = seed_company(&pool, "Soylent").await;
    let other_company = seed_company(&pool, "Omni Consumer").await;
    let customer = seed_user(&pool, "CUSTOMER", Some(company)).await;
    let outsider = seed_user(&pool, "CUSTOMER", Some(other_company)).await;
    let staff = seed_user(&pool, "STAFF", None).await;
    let project = seed_project(&pool, company, "Soylent Desk").await;
    add_project_member(&pool, project, staff).await;

    let token = token_for(customer, "CUSTOMER", Some(company));
    let response = app
        .clone()
        .oneshot(empty_request(
            Method::GET,
            &format!("/api/v1/projects/{}/staff", project),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    let members = body["staff"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["id"], staff.to_string());

    let outsider_token = token_for(outsider, "CUSTOMER", Some(other_company));
    let response = app
        .oneshot(empty_request(
            Method::GET,
            &format!("/api/v1/projects/{}/staff", project),
            &outsider_token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_and_malformed_tokens_are_unauthorized() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/api/v1/tickets")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/api/v1/tickets")
                .header(header::AUTHORIZATION, "Bearer not-a-real-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Unknown ticket ids still require a valid token before 404 applies.
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri(&format!("/api/v1/tickets/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_start_work_requires_an_action_plan() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let company = seed_company(&pool, "Vandelay").await;
    let staff = seed_user(&pool, "STAFF", None).await;
    let project = seed_project(&pool, company, "Vandelay Desk").await;
    let staff_token = token_for(staff, "STAFF", None);

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/tickets",
            json!({
                "project_id": project,
                "title": "Import/export ledger mismatch",
                "end_date": standard_end_date(),
                "assignee_ids": [staff],
            }),
            &staff_token,
        ))
        .await
        .unwrap();
    let ticket_id = parse_response_body(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/tickets/{}/start-work", ticket_id),
            json!({ "message": "   " }),
            &staff_token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
}
