use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::{
    Activity, Deal, DealId, Lead, LeadId, Property, PropertyStatus, TenantId,
};

use super::{ActivityFilter, EntityGateway, GatewayError};

/// In-memory, tenant-partitioned entity store. Backs the demo CLI and the
/// default server state, and doubles as the test fake for every engine
/// component.
#[derive(Default)]
pub struct InMemoryGateway {
    tenants: Mutex<HashMap<TenantId, TenantStore>>,
}

#[derive(Default)]
struct TenantStore {
    leads: Vec<Lead>,
    deals: Vec<Deal>,
    properties: Vec<Property>,
    activities: Vec<Activity>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_lead(&self, tenant: &TenantId, lead: Lead) {
        self.with_store(tenant, |store| store.leads.push(lead));
    }

    pub fn insert_deal(&self, tenant: &TenantId, deal: Deal) {
        self.with_store(tenant, |store| store.deals.push(deal));
    }

    pub fn insert_property(&self, tenant: &TenantId, property: Property) {
        self.with_store(tenant, |store| store.properties.push(property));
    }

    pub fn insert_activity(&self, tenant: &TenantId, activity: Activity) {
        self.with_store(tenant, |store| store.activities.push(activity));
    }

    fn with_store(&self, tenant: &TenantId, write: impl FnOnce(&mut TenantStore)) {
        let mut guard = self.tenants.lock().expect("gateway mutex poisoned");
        write(guard.entry(tenant.clone()).or_default());
    }

    fn with_tenant<T>(&self, tenant: &TenantId, read: impl FnOnce(&TenantStore) -> T) -> T {
        let guard = self.tenants.lock().expect("gateway mutex poisoned");
        match guard.get(tenant) {
            Some(store) => read(store),
            None => read(&TenantStore::default()),
        }
    }
}

impl EntityGateway for InMemoryGateway {
    fn lead(&self, id: &LeadId, tenant: &TenantId) -> Result<Lead, GatewayError> {
        self.with_tenant(tenant, |store| {
            store.leads.iter().find(|lead| &lead.id == id).cloned()
        })
        .ok_or_else(|| GatewayError::lead_not_found(id))
    }

    fn deal(&self, id: &DealId, tenant: &TenantId) -> Result<Deal, GatewayError> {
        self.with_tenant(tenant, |store| {
            store.deals.iter().find(|deal| &deal.id == id).cloned()
        })
        .ok_or_else(|| GatewayError::deal_not_found(id))
    }

    fn available_properties(&self, tenant: &TenantId) -> Result<Vec<Property>, GatewayError> {
        Ok(self.with_tenant(tenant, |store| {
            store
                .properties
                .iter()
                .filter(|property| property.status == PropertyStatus::Available)
                .cloned()
                .collect()
        }))
    }

    fn count_activities(
        &self,
        tenant: &TenantId,
        filter: &ActivityFilter,
    ) -> Result<u32, GatewayError> {
        Ok(self.with_tenant(tenant, |store| {
            store
                .activities
                .iter()
                .filter(|activity| matches_filter(activity, filter))
                .count() as u32
        }))
    }

    fn leads(&self, tenant: &TenantId) -> Result<Vec<Lead>, GatewayError> {
        Ok(self.with_tenant(tenant, |store| store.leads.clone()))
    }

    fn deals(&self, tenant: &TenantId) -> Result<Vec<Deal>, GatewayError> {
        Ok(self.with_tenant(tenant, |store| store.deals.clone()))
    }
}

fn matches_filter(activity: &Activity, filter: &ActivityFilter) -> bool {
    if let Some(lead_id) = &filter.lead_id {
        if activity.lead_id.as_ref() != Some(lead_id) {
            return false;
        }
    }
    if let Some(deal_id) = &filter.deal_id {
        if activity.deal_id.as_ref() != Some(deal_id) {
            return false;
        }
    }
    if let Some(activity_type) = filter.activity_type {
        if activity.activity_type != activity_type {
            return false;
        }
    }
    if let Some(status) = filter.status {
        if activity.status != status {
            return false;
        }
    }
    if let Some(cutoff) = filter.created_after {
        if activity.created_at <= cutoff {
            return false;
        }
    }
    true
}
