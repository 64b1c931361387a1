/// HTTP route tests
/// Drives the full router in-process with an in-memory store and no external services
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use std::sync::Arc;
use tower::ServiceExt;

use solar_leads::config::Config;
use solar_leads::documents::DisabledRenderer;
use solar_leads::handlers::{router, AppState, MAX_BODY_BYTES};
use solar_leads::lead_store::{LeadStore, MemoryLeadStore};
use solar_leads::notifier::LogNotifier;
use solar_leads::pipeline::LeadPipeline;

const ADMIN_TOKEN: &str = "test-admin-token";

/// Helper function to create test config
fn create_test_config() -> Config {
    Config {
        database_url: "postgresql://test".to_string(),
        port: 8080,
        admin_token: ADMIN_TOKEN.to_string(),
        notify_email: "owner@example.com".to_string(),
        smtp: None,
        pdf_service_url: None,
        image_upload: None,
    }
}

fn test_app() -> (Router, Arc<MemoryLeadStore>) {
    let store = Arc::new(MemoryLeadStore::new());
    let state = Arc::new(AppState {
        config: create_test_config(),
        leads: store.clone(),
        pipeline: LeadPipeline::new(
            store.clone(),
            Arc::new(LogNotifier),
            Arc::new(DisabledRenderer),
        ),
        images: None,
    });
    (router(state), store)
}

fn form_post(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn admin_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", ADMIN_TOKEN))
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_healthy() {
    let (app, _) = test_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");
}

#[tokio::test]
async fn sizing_endpoint_returns_reference_figures() {
    let (app, store) = test_app();

    let response = app
        .oneshot(form_post(
            "/api/v1/sizing",
            "monthly_bill=5000&appliances=AC&appliances=Fridge",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["recommended_kw"], 1.5);
    assert_eq!(body["cost_min"], 195_000);
    assert_eq!(body["cost_max"], 240_000);
    assert_eq!(body["monthly_savings"], 4_500);
    assert_eq!(body["yearly_savings"], 54_000);
    assert_eq!(body["payback_years"], 4.0);
    assert_eq!(body["appliances"], serde_json::json!(["AC", "Fridge"]));

    // Calculator-only requests do not capture a lead.
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn sizing_endpoint_coerces_bad_bill() {
    let (app, _) = test_app();

    let response = app
        .oneshot(form_post("/api/v1/sizing", "monthly_bill=abc"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["recommended_kw"], 1.0);
    assert_eq!(body["payback_years"], 0.0);
}

#[tokio::test]
async fn quote_missing_name_is_bad_request() {
    let (app, store) = test_app();

    let response = app
        .oneshot(form_post(
            "/api/v1/quotes",
            "phone=98000&email=a%40b.in&project_type=Residential",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn quote_is_captured_even_when_document_fails() {
    let (app, store) = test_app();

    let response = app
        .oneshot(form_post(
            "/api/v1/quotes",
            "full_name=Priya+Shah&phone=98000&email=priya%40example.com\
             &project_type=Commercial&location=Surat&message=Factory+roof",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["notification"], "sent");
    assert_eq!(body["document"], "failed");

    let id = body["lead_id"].as_i64().unwrap();
    let lead = store.get(id).await.unwrap().unwrap();
    assert_eq!(lead.full_name, "Priya Shah");
    assert_eq!(lead.location.as_deref(), Some("Surat"));
    assert_eq!(lead.message.as_deref(), Some("Factory roof"));
}

#[tokio::test]
async fn solar_report_stores_summary_in_submitted_order() {
    let (app, store) = test_app();

    let response = app
        .oneshot(form_post(
            "/api/v1/solar-reports",
            "full_name=Dev&phone=98000&email=dev%40example.com&monthly_bill=5000\
             &appliances%5B%5D=TV&appliances%5B%5D=AC&appliances%5B%5D=TV",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let id = json_body(response).await["lead_id"].as_i64().unwrap();

    let lead = store.get(id).await.unwrap().unwrap();
    assert_eq!(lead.project_type, "Solar Report Request");
    let message = lead.message.unwrap();
    assert!(message.contains("Recommended system: 1.5 kW"));
    assert!(message.ends_with("Appliances: TV, AC, TV"));
}

#[tokio::test]
async fn admin_requires_token() {
    let (app, _) = test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/admin/leads")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/admin/leads")
                .header(header::AUTHORIZATION, "Bearer wrong-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_lists_and_deletes_leads() {
    let (app, _) = test_app();

    for body in [
        "full_name=First&phone=1&email=f%40x.in&project_type=Residential",
        "full_name=Second&phone=2&email=s%40x.in&project_type=Residential",
    ] {
        let response = app
            .clone()
            .oneshot(form_post("/api/v1/quotes", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(admin_request("GET", "/api/v1/admin/leads"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["leads"][0]["full_name"], "Second");
    assert_eq!(body["leads"][1]["full_name"], "First");

    let first_id = body["leads"][1]["id"].as_i64().unwrap();
    let response = app
        .clone()
        .oneshot(admin_request("DELETE", &format!("/api/v1/admin/leads/{}", first_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(admin_request("GET", &format!("/api/v1/admin/leads/{}", first_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(admin_request("GET", "/api/v1/admin/leads"))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["total"], 1);
}

#[tokio::test]
async fn deleting_unknown_lead_is_not_found() {
    let (app, _) = test_app();

    let response = app
        .oneshot(admin_request("DELETE", "/api/v1/admin/leads/999"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Lead with id 999 not found");
}

#[tokio::test]
async fn image_upload_without_image_host_is_server_error() {
    let (app, _) = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/admin/images?filename=roof.jpg")
        .header(header::AUTHORIZATION, format!("Bearer {}", ADMIN_TOKEN))
        .header(header::CONTENT_TYPE, "image/jpeg")
        .body(Body::from(vec![0xFF, 0xD8, 0xFF]))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn quote_larger_than_axum_default_limit_is_captured() {
    let (app, store) = test_app();

    let message = "a".repeat(3 * 1024 * 1024);
    let body = format!(
        "full_name=Big+Roof&phone=98000&email=big%40example.com&project_type=Industrial&message={}",
        message
    );
    assert!(body.len() < MAX_BODY_BYTES);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/quotes")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let id = json_body(response).await["lead_id"].as_i64().unwrap();
    let lead = store.get(id).await.unwrap().unwrap();
    assert_eq!(lead.message.map(|m| m.len()), Some(message.len()));
}

#[tokio::test]
async fn body_over_limit_is_rejected() {
    let (app, store) = test_app();

    let body = format!(
        "full_name=Too+Big&phone=1&email=t%40x.in&project_type=Residential&message={}",
        "a".repeat(MAX_BODY_BYTES)
    );

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/quotes")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(store.count().await.unwrap(), 0);
}
