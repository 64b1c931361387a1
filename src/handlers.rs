use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::admin_handler;
use crate::config::Config;
use crate::documents::ArtifactRequest;
use crate::errors::AppError;
use crate::forms::{self, FormFields};
use crate::image_store::ImageStore;
use crate::lead_store::LeadStore;
use crate::pipeline::{ArtifactResult, CaptureOutcome, LeadPipeline};
use crate::sizing::{self, SizingResult};

/// Maximum accepted request body (form posts and admin image uploads).
pub const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Lead storage, used directly by the admin endpoints.
    pub leads: Arc<dyn LeadStore>,
    /// Persist-then-notify-then-render capture flow.
    pub pipeline: LeadPipeline,
    /// Image host for admin uploads (optional).
    pub images: Option<Arc<dyn ImageStore>>,
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "solar-leads",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /api/v1/sizing
///
/// Runs the sizing calculator on a form submission without capturing a lead.
/// Malformed bills are treated as zero, so this never fails.
pub async fn calculate_sizing(body: Bytes) -> Json<SizingResult> {
    let fields = FormFields::parse(&body);
    let result = sizing::calculate(&forms::sizing_input(&fields));

    tracing::debug!(
        "Sizing: bill={} -> {} kW",
        result.monthly_bill,
        result.recommended_kw
    );

    Json(result)
}

/// POST /api/v1/quotes
///
/// Captures a quote request and returns the quote PDF, or a JSON receipt
/// when the document could not be produced.
pub async fn submit_quote(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, AppError> {
    let fields = FormFields::parse(&body);
    let lead = forms::quote_lead(&fields)?;

    tracing::info!("📨 Quote request from {} ({})", lead.full_name, lead.project_type);

    let outcome = state
        .pipeline
        .capture(lead, Some(ArtifactRequest::quote()))
        .await?;

    Ok(capture_response(outcome))
}

/// POST /api/v1/solar-reports
///
/// Sizes the system from the submitted bill and appliances, captures a
/// "Solar Report Request" lead carrying the summary, and returns the report.
pub async fn submit_solar_report(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, AppError> {
    let fields = FormFields::parse(&body);
    let sizing = sizing::calculate(&forms::sizing_input(&fields));
    let lead = forms::solar_report_lead(&fields, &sizing)?;

    tracing::info!(
        "📨 Solar report request from {}: bill={} -> {} kW",
        lead.full_name,
        sizing.monthly_bill,
        sizing.recommended_kw
    );

    let outcome = state
        .pipeline
        .capture(lead, Some(ArtifactRequest::solar_report(sizing)))
        .await?;

    Ok(capture_response(outcome))
}

/// 201 with the PDF attached when it rendered, otherwise 201 with a JSON receipt.
fn capture_response(outcome: CaptureOutcome) -> Response {
    let notification = outcome.notification.as_str();

    match outcome.artifact {
        ArtifactResult::Rendered(artifact) => (
            StatusCode::CREATED,
            [
                (header::CONTENT_TYPE, artifact.content_type),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", artifact.filename),
                ),
                (
                    HeaderName::from_static("x-lead-id"),
                    outcome.lead.id.to_string(),
                ),
                (
                    HeaderName::from_static("x-notification"),
                    notification.to_string(),
                ),
            ],
            artifact.bytes,
        )
            .into_response(),
        _ => (StatusCode::CREATED, Json(outcome.receipt())).into_response(),
    }
}

/// Public form-submission routes. `main` puts the rate limiter on these.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/sizing", post(calculate_sizing))
        .route("/api/v1/quotes", post(submit_quote))
        .route("/api/v1/solar-reports", post(submit_solar_report))
}

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/admin/leads", get(admin_handler::list_leads))
        .route(
            "/api/v1/admin/leads/:id",
            get(admin_handler::get_lead).delete(admin_handler::delete_lead),
        )
        .route("/api/v1/admin/images", post(admin_handler::upload_image))
}

/// Complete application router without rate limiting.
pub fn router(state: Arc<AppState>) -> Router {
    build_router(state, public_routes())
}

/// Assembles the application around an already-layered set of public routes.
///
/// Both body limits are needed: `Bytes` extractors enforce axum's own 2 MB
/// default unless `DefaultBodyLimit` raises it.
pub fn build_router(state: Arc<AppState>, public: Router<Arc<AppState>>) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(public)
        .merge(admin_routes())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
