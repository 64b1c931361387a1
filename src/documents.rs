use askama::Template;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use std::time::Duration;

use crate::errors::AppError;
use crate::models::Lead;
use crate::sizing::SizingResult;

/// Named document templates, each backed by a file under `templates/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentTemplate {
    Quote,
    SolarReport,
}

impl DocumentTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            DocumentTemplate::Quote => "quote",
            DocumentTemplate::SolarReport => "solar_report",
        }
    }

    pub fn filename(&self, lead_id: i64) -> String {
        match self {
            DocumentTemplate::Quote => format!("quote-{}.pdf", lead_id),
            DocumentTemplate::SolarReport => format!("solar-report-{}.pdf", lead_id),
        }
    }
}

/// What to render for a captured lead.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactRequest {
    pub template: DocumentTemplate,
    /// Required for `DocumentTemplate::SolarReport`.
    pub sizing: Option<SizingResult>,
}

impl ArtifactRequest {
    pub fn quote() -> Self {
        Self {
            template: DocumentTemplate::Quote,
            sizing: None,
        }
    }

    pub fn solar_report(sizing: SizingResult) -> Self {
        Self {
            template: DocumentTemplate::SolarReport,
            sizing: Some(sizing),
        }
    }
}

/// A generated document returned to the submitter.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Template)]
#[template(path = "quote.html")]
struct QuoteDocument<'a> {
    lead_id: i64,
    submitted_at: String,
    full_name: &'a str,
    phone: &'a str,
    email: &'a str,
    project_type: &'a str,
    location: &'a str,
    message: &'a str,
}

#[derive(Template)]
#[template(path = "solar_report.html")]
struct SolarReportDocument<'a> {
    lead_id: i64,
    submitted_at: String,
    full_name: &'a str,
    phone: &'a str,
    email: &'a str,
    location: &'a str,
    monthly_bill: f64,
    recommended_kw: String,
    cost_min: i64,
    cost_max: i64,
    monthly_savings: i64,
    yearly_savings: i64,
    payback_years: String,
    appliances: &'a [String],
}

/// Renders the HTML for a lead's document.
pub fn render_html(request: &ArtifactRequest, lead: &Lead) -> Result<String, AppError> {
    let submitted_at = lead.created_at.format("%d %b %Y %H:%M UTC").to_string();
    let location = lead.location.as_deref().unwrap_or("-");

    let rendered = match request.template {
        DocumentTemplate::Quote => QuoteDocument {
            lead_id: lead.id,
            submitted_at,
            full_name: &lead.full_name,
            phone: &lead.phone,
            email: &lead.email,
            project_type: &lead.project_type,
            location,
            message: lead.message.as_deref().unwrap_or(""),
        }
        .render(),
        DocumentTemplate::SolarReport => {
            let sizing = request.sizing.as_ref().ok_or_else(|| {
                AppError::InternalError("Solar report requested without a sizing result".to_string())
            })?;

            SolarReportDocument {
                lead_id: lead.id,
                submitted_at,
                full_name: &lead.full_name,
                phone: &lead.phone,
                email: &lead.email,
                location,
                monthly_bill: sizing.monthly_bill,
                recommended_kw: format!("{:.1}", sizing.recommended_kw),
                cost_min: sizing.cost_min,
                cost_max: sizing.cost_max,
                monthly_savings: sizing.monthly_savings,
                yearly_savings: sizing.yearly_savings,
                payback_years: format!("{:.1}", sizing.payback_years),
                appliances: &sizing.appliances,
            }
            .render()
        }
    };

    rendered.map_err(|e| {
        AppError::InternalError(format!(
            "Failed to render {} template: {}",
            request.template.name(),
            e
        ))
    })
}

/// Produces a binary document for a captured lead.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, request: &ArtifactRequest, lead: &Lead) -> Result<Artifact, AppError>;
}

/// Converts rendered HTML to PDF through an HTML-to-PDF conversion service
/// (Gotenberg-compatible `forms/chromium/convert/html` endpoint).
#[derive(Clone)]
pub struct HttpPdfRenderer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPdfRenderer {
    /// Creates a new `HttpPdfRenderer`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the conversion service.
    pub fn new(base_url: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create PDF client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl DocumentRenderer for HttpPdfRenderer {
    async fn render(&self, request: &ArtifactRequest, lead: &Lead) -> Result<Artifact, AppError> {
        let html = render_html(request, lead)?;

        let part = Part::bytes(html.into_bytes())
            .file_name("index.html")
            .mime_str("text/html")?;
        let form = Form::new().part("files", part);

        let url = format!("{}/forms/chromium/convert/html", self.base_url);
        tracing::debug!("Rendering {} document for lead {}", request.template.name(), lead.id);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("PDF request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "PDF service returned {}: {}",
                status, error_text
            )));
        }

        let bytes = response.bytes().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to read PDF response: {}", e))
        })?;

        Ok(Artifact {
            filename: request.template.filename(lead.id),
            content_type: "application/pdf".to_string(),
            bytes: bytes.to_vec(),
        })
    }
}

/// Renderer used when no conversion service is configured. Always fails,
/// which the capture pipeline reports as a degraded document step.
#[derive(Debug, Default)]
pub struct DisabledRenderer;

#[async_trait]
impl DocumentRenderer for DisabledRenderer {
    async fn render(&self, request: &ArtifactRequest, _lead: &Lead) -> Result<Artifact, AppError> {
        Err(AppError::InternalError(format!(
            "PDF rendering is not configured; {} document skipped",
            request.template.name()
        )))
    }
}
