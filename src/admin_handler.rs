use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::errors::{AppError, ResultExt};
use crate::handlers::AppState;
use crate::models::{ImageUploadResponse, Lead, LeadListResponse};

/// Administrator endpoints.
///
/// Authentication: `Authorization: Bearer <token>` must match ADMIN_TOKEN.
/// Tokens are compared as SHA-256 digests in constant time.
pub fn validate_admin_token(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    if !constant_time_compare(&digest(provided), &digest(&state.config.admin_token)) {
        tracing::warn!("Invalid admin token received");
        return Err(AppError::Unauthorized("Invalid admin token".to_string()));
    }

    Ok(())
}

fn digest(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-time string comparison. Both sides are fixed-length digests.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.as_bytes()
        .iter()
        .zip(b.as_bytes().iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// GET /api/v1/admin/leads
///
/// All captured leads, most recent first.
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<LeadListResponse>, AppError> {
    validate_admin_token(&state, &headers)?;

    let leads = state.leads.list().await.context("Listing leads")?;
    let total = state.leads.count().await.context("Counting leads")?;

    tracing::info!("Admin listed {} lead(s)", leads.len());

    Ok(Json(LeadListResponse { total, leads }))
}

/// GET /api/v1/admin/leads/:id
pub async fn get_lead(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Lead>, AppError> {
    validate_admin_token(&state, &headers)?;

    let lead = state
        .leads
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lead with id {} not found", id)))?;

    Ok(Json(lead))
}

/// DELETE /api/v1/admin/leads/:id
///
/// 204 on success, 404 when the id does not exist.
pub async fn delete_lead(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    validate_admin_token(&state, &headers)?;

    state.leads.delete(id).await?;
    tracing::info!("🗑️  Lead {} deleted by administrator", id);

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ImageUploadQuery {
    filename: Option<String>,
}

/// POST /api/v1/admin/images?filename=...
///
/// Forwards a raw image body to the image host and returns its public URL.
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ImageUploadQuery>,
    body: Bytes,
) -> Result<(StatusCode, Json<ImageUploadResponse>), AppError> {
    validate_admin_token(&state, &headers)?;

    let images = state
        .images
        .as_ref()
        .ok_or_else(|| AppError::InternalError("Image storage is not configured".to_string()))?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|ct| ct.starts_with("image/"))
        .ok_or_else(|| AppError::BadRequest("Content-Type must be an image type".to_string()))?;

    if body.is_empty() {
        return Err(AppError::BadRequest("Empty image upload".to_string()));
    }

    let filename = query.filename.unwrap_or_else(|| "upload".to_string());
    let url = images
        .upload(&filename, content_type, body.to_vec())
        .await
        .with_context(|| format!("Uploading image {}", filename))?;

    Ok((StatusCode::CREATED, Json(ImageUploadResponse { url })))
}
