//! Lead capture: persist first, then best-effort notification and document.
//!
//! Flow:
//! 1. Persist the lead (required; an error aborts everything after it).
//! 2. Notify the operator (best effort).
//! 3. Render the submitter's document (best effort).
//!
//! Steps 2 and 3 never undo step 1. Their failures are logged and carried
//! in the `CaptureOutcome` so the caller can report them.

use std::sync::Arc;

use crate::documents::{Artifact, ArtifactRequest, DocumentRenderer};
use crate::errors::AppError;
use crate::lead_store::LeadStore;
use crate::models::{CaptureReceipt, Lead, NewLead};
use crate::notifier::Notifier;

/// Result of the required persistence step.
pub type PersistResult = Result<Lead, AppError>;

/// Result of the operator notification step.
#[derive(Debug, Clone, PartialEq)]
pub enum NotifyResult {
    Sent,
    Failed(String),
}

impl NotifyResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotifyResult::Sent => "sent",
            NotifyResult::Failed(_) => "failed",
        }
    }
}

/// Result of the document step.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactResult {
    Rendered(Artifact),
    Failed(String),
    /// No document was requested.
    Skipped,
}

impl ArtifactResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactResult::Rendered(_) => "rendered",
            ArtifactResult::Failed(_) => "failed",
            ArtifactResult::Skipped => "skipped",
        }
    }
}

/// Everything that happened for one captured lead.
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub lead: Lead,
    pub notification: NotifyResult,
    pub artifact: ArtifactResult,
}

impl CaptureOutcome {
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if let NotifyResult::Failed(reason) = &self.notification {
            warnings.push(format!("Notification failed: {}", reason));
        }
        if let ArtifactResult::Failed(reason) = &self.artifact {
            warnings.push(format!("Document generation failed: {}", reason));
        }
        warnings
    }

    pub fn receipt(&self) -> CaptureReceipt {
        CaptureReceipt {
            success: true,
            lead_id: self.lead.id,
            notification: self.notification.as_str().to_string(),
            document: self.artifact.as_str().to_string(),
            warnings: self.warnings(),
        }
    }
}

/// Subject line of the operator notification.
pub fn notification_subject(lead: &Lead) -> String {
    format!("New lead: {} from {}", lead.project_type, lead.full_name)
}

/// Plain-text body of the operator notification.
pub fn notification_body(lead: &Lead) -> String {
    format!(
        "Lead #{}\n\
         Name: {}\n\
         Phone: {}\n\
         Email: {}\n\
         Project type: {}\n\
         Location: {}\n\
         Submitted: {}\n\n\
         {}",
        lead.id,
        lead.full_name,
        lead.phone,
        lead.email,
        lead.project_type,
        lead.location.as_deref().unwrap_or("-"),
        lead.created_at.to_rfc3339(),
        lead.message.as_deref().unwrap_or("(no message)")
    )
}

/// Sequences the capture steps over injected collaborators.
#[derive(Clone)]
pub struct LeadPipeline {
    store: Arc<dyn LeadStore>,
    notifier: Arc<dyn Notifier>,
    renderer: Arc<dyn DocumentRenderer>,
}

impl LeadPipeline {
    pub fn new(
        store: Arc<dyn LeadStore>,
        notifier: Arc<dyn Notifier>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Self {
        Self {
            store,
            notifier,
            renderer,
        }
    }

    pub async fn persist(&self, lead: NewLead) -> PersistResult {
        let stored = self.store.create(lead).await?;
        tracing::info!(
            "✅ Lead {} captured ({})",
            stored.id,
            stored.project_type
        );
        Ok(stored)
    }

    pub async fn notify(&self, lead: &Lead) -> NotifyResult {
        match self
            .notifier
            .send(&notification_subject(lead), &notification_body(lead))
            .await
        {
            Ok(()) => NotifyResult::Sent,
            Err(e) => {
                tracing::warn!("⚠️  Notification for lead {} failed: {}", lead.id, e);
                NotifyResult::Failed(e.to_string())
            }
        }
    }

    pub async fn render(&self, lead: &Lead, request: Option<&ArtifactRequest>) -> ArtifactResult {
        let Some(request) = request else {
            return ArtifactResult::Skipped;
        };

        match self.renderer.render(request, lead).await {
            Ok(artifact) => {
                tracing::info!(
                    "✓ Rendered {} ({} bytes) for lead {}",
                    artifact.filename,
                    artifact.bytes.len(),
                    lead.id
                );
                ArtifactResult::Rendered(artifact)
            }
            Err(e) => {
                tracing::warn!(
                    "⚠️  {} document for lead {} failed: {}",
                    request.template.name(),
                    lead.id,
                    e
                );
                ArtifactResult::Failed(e.to_string())
            }
        }
    }

    /// Runs the full capture. Only a persistence failure is returned as `Err`.
    pub async fn capture(
        &self,
        lead: NewLead,
        artifact: Option<ArtifactRequest>,
    ) -> Result<CaptureOutcome, AppError> {
        let lead = self.persist(lead).await?;
        let notification = self.notify(&lead).await;
        let artifact = self.render(&lead, artifact.as_ref()).await;

        Ok(CaptureOutcome {
            lead,
            notification,
            artifact,
        })
    }
}
