//! External collaborators the engine consults but does not own: the template
//! catalog, the asset/location directory and the work-order service.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use upkeep_core::{TemplateId, TenantId, TicketId};

use crate::error::StoreError;
use crate::model::{ScheduleTemplate, Target};

#[async_trait]
pub trait TemplateCatalog: Send + Sync {
    async fn template(
        &self,
        tenant: TenantId,
        id: TemplateId,
    ) -> Result<Option<ScheduleTemplate>, StoreError>;
}

#[async_trait]
pub trait TargetDirectory: Send + Sync {
    async fn exists(&self, tenant: TenantId, target: Target) -> Result<bool, StoreError>;

    /// Human-readable name for calendars and dashboards.
    async fn display_name(&self, tenant: TenantId, target: Target) -> Result<Option<String>, StoreError>;
}

#[async_trait]
pub trait WorkOrderService: Send + Sync {
    async fn work_order_exists(&self, tenant: TenantId, ticket_id: TicketId) -> Result<bool, StoreError>;
}

// ── In-memory directory ─────────────────────────────────────────────

#[derive(Default)]
struct DirectoryState {
    templates: HashMap<(TenantId, TemplateId), ScheduleTemplate>,
    targets: HashMap<(TenantId, Target), String>,
    work_orders: HashSet<(TenantId, TicketId)>,
}

/// Registry implementing all three collaborator traits in memory.
#[derive(Default)]
pub struct InMemoryDirectory {
    state: RwLock<DirectoryState>,
    /// Accept targets and work orders that were never registered.
    open: bool,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A directory that treats every asset, location and work order as
    /// existing. Templates must still be registered.
    pub fn open() -> Self {
        Self {
            state: RwLock::default(),
            open: true,
        }
    }

    pub async fn add_template(&self, template: ScheduleTemplate) {
        let mut state = self.state.write().await;
        state
            .templates
            .insert((template.tenant_id, template.id), template);
    }

    pub async fn add_target(&self, tenant: TenantId, target: Target, name: impl Into<String>) {
        let mut state = self.state.write().await;
        state.targets.insert((tenant, target), name.into());
    }

    pub async fn add_work_order(&self, tenant: TenantId, ticket_id: TicketId) {
        let mut state = self.state.write().await;
        state.work_orders.insert((tenant, ticket_id));
    }
}

#[async_trait]
impl TemplateCatalog for InMemoryDirectory {
    async fn template(
        &self,
        tenant: TenantId,
        id: TemplateId,
    ) -> Result<Option<ScheduleTemplate>, StoreError> {
        Ok(self.state.read().await.templates.get(&(tenant, id)).cloned())
    }
}

#[async_trait]
impl TargetDirectory for InMemoryDirectory {
    async fn exists(&self, tenant: TenantId, target: Target) -> Result<bool, StoreError> {
        Ok(self.open || self.state.read().await.targets.contains_key(&(tenant, target)))
    }

    async fn display_name(&self, tenant: TenantId, target: Target) -> Result<Option<String>, StoreError> {
        Ok(self.state.read().await.targets.get(&(tenant, target)).cloned())
    }
}

#[async_trait]
impl WorkOrderService for InMemoryDirectory {
    async fn work_order_exists(&self, tenant: TenantId, ticket_id: TicketId) -> Result<bool, StoreError> {
        Ok(self.open || self.state.read().await.work_orders.contains(&(tenant, ticket_id)))
    }
}
