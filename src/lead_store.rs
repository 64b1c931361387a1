use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::errors::{AppError, ResultExt};
use crate::models::{Lead, NewLead};

/// Persistence contract for captured leads.
///
/// Leads are insert-only. Each `create` and `delete` touches exactly one row
/// inside its own transaction, so concurrent submissions never interleave.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Inserts a new lead and returns it with its assigned id and timestamp.
    async fn create(&self, lead: NewLead) -> Result<Lead, AppError>;

    /// Deletes a lead. Returns `AppError::NotFound` when the id does not exist.
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    async fn get(&self, id: i64) -> Result<Option<Lead>, AppError>;

    /// All leads, most recent first.
    async fn list(&self) -> Result<Vec<Lead>, AppError>;

    async fn count(&self) -> Result<i64, AppError>;
}

/// Postgres-backed lead storage.
pub struct PgLeadStore {
    pool: PgPool,
}

impl PgLeadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadStore for PgLeadStore {
    async fn create(&self, lead: NewLead) -> Result<Lead, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start lead insert transaction")?;

        let stored = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (full_name, phone, email, project_type, location, message)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, full_name, phone, email, project_type, location, message, created_at
            "#,
        )
        .bind(&lead.full_name)
        .bind(&lead.phone)
        .bind(&lead.email)
        .bind(&lead.project_type)
        .bind(&lead.location)
        .bind(&lead.message)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to insert lead")?;

        tx.commit().await.context("Failed to commit lead insert")?;

        tracing::debug!("Lead {} stored", stored.id);
        Ok(stored)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start lead delete transaction")?;

        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to delete lead {}", id))?;

        if result.rows_affected() == 0 {
            // Nothing to undo; dropping the transaction rolls it back.
            return Err(AppError::NotFound(format!("Lead with id {} not found", id)));
        }

        tx.commit().await.context("Failed to commit lead delete")?;

        tracing::debug!("Lead {} deleted", id);
        Ok(())
    }

    async fn get(&self, id: i64) -> Result<Option<Lead>, AppError> {
        let lead = sqlx::query_as::<_, Lead>(
            "SELECT id, full_name, phone, email, project_type, location, message, created_at \
             FROM leads WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(lead)
    }

    async fn list(&self) -> Result<Vec<Lead>, AppError> {
        let leads = sqlx::query_as::<_, Lead>(
            "SELECT id, full_name, phone, email, project_type, location, message, created_at \
             FROM leads ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(leads)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leads")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i64,
    leads: Vec<Lead>,
}

/// In-process lead storage with the same semantics as `PgLeadStore`.
///
/// Used by tests and by anything that needs a store without a database.
#[derive(Debug, Default)]
pub struct MemoryLeadStore {
    state: RwLock<MemoryState>,
}

impl MemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeadStore for MemoryLeadStore {
    async fn create(&self, lead: NewLead) -> Result<Lead, AppError> {
        let mut state = self.state.write().await;
        state.next_id += 1;

        let stored = Lead {
            id: state.next_id,
            full_name: lead.full_name,
            phone: lead.phone,
            email: lead.email,
            project_type: lead.project_type,
            location: lead.location,
            message: lead.message,
            created_at: Utc::now(),
        };
        state.leads.push(stored.clone());

        Ok(stored)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        let position = state
            .leads
            .iter()
            .position(|lead| lead.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Lead with id {} not found", id)))?;

        state.leads.remove(position);
        Ok(())
    }

    async fn get(&self, id: i64) -> Result<Option<Lead>, AppError> {
        let state = self.state.read().await;
        Ok(state.leads.iter().find(|lead| lead.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Lead>, AppError> {
        let state = self.state.read().await;
        let mut leads = state.leads.clone();
        leads.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(leads)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.state.read().await.leads.len() as i64)
    }
}
