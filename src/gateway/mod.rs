use chrono::{DateTime, Utc};

use crate::domain::{
    ActivityStatus, ActivityType, Deal, DealId, Lead, LeadId, Property, TenantId,
};

pub mod memory;

pub use memory::InMemoryGateway;

/// Read-only view over the CRM entity store. The engine never mutates
/// records, so the contract is fetch-by-id and filtered listing only; any
/// persistence technology can sit behind it, and tests use the in-memory
/// implementation.
pub trait EntityGateway: Send + Sync {
    fn lead(&self, id: &LeadId, tenant: &TenantId) -> Result<Lead, GatewayError>;
    fn deal(&self, id: &DealId, tenant: &TenantId) -> Result<Deal, GatewayError>;
    fn available_properties(&self, tenant: &TenantId) -> Result<Vec<Property>, GatewayError>;
    fn count_activities(
        &self,
        tenant: &TenantId,
        filter: &ActivityFilter,
    ) -> Result<u32, GatewayError>;
    fn leads(&self, tenant: &TenantId) -> Result<Vec<Lead>, GatewayError>;
    fn deals(&self, tenant: &TenantId) -> Result<Vec<Deal>, GatewayError>;
}

/// Conjunctive activity filter; `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityFilter {
    pub lead_id: Option<LeadId>,
    pub deal_id: Option<DealId>,
    pub activity_type: Option<ActivityType>,
    pub status: Option<ActivityStatus>,
    pub created_after: Option<DateTime<Utc>>,
}

impl ActivityFilter {
    pub fn for_lead(lead_id: LeadId) -> Self {
        Self {
            lead_id: Some(lead_id),
            ..Self::default()
        }
    }

    pub fn for_deal(deal_id: DealId) -> Self {
        Self {
            deal_id: Some(deal_id),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, activity_type: ActivityType) -> Self {
        self.activity_type = Some(activity_type);
        self
    }

    pub fn with_status(mut self, status: ActivityStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn created_after(mut self, cutoff: DateTime<Utc>) -> Self {
        self.created_after = Some(cutoff);
        self
    }
}

/// Error enumeration for gateway reads.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{kind} '{id}' not found for tenant")]
    NotFound { kind: &'static str, id: String },
    #[error("entity store unavailable: {0}")]
    Unavailable(String),
}

impl GatewayError {
    pub fn lead_not_found(id: &LeadId) -> Self {
        Self::NotFound {
            kind: "lead",
            id: id.0.clone(),
        }
    }

    pub fn deal_not_found(id: &DealId) -> Self {
        Self::NotFound {
            kind: "deal",
            id: id.0.clone(),
        }
    }
}
