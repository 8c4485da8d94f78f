use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::domain::{
    Activity, ActivityId, ActivityStatus, ActivityType, Deal, DealId, DealStage, Lead, LeadId,
    Property, PropertyId, PropertyKind, PropertyStatus, TenantId,
};
use crate::engine::ScoringEngine;
use crate::gateway::{
    ActivityFilter, EntityGateway, GatewayError, InMemoryGateway,
};

pub(super) fn tenant() -> TenantId {
    TenantId("acme-estates".to_string())
}

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 15, 12, 0, 0).unwrap()
}

pub(super) fn today() -> NaiveDate {
    now().date_naive()
}

pub(super) fn engine(gateway: InMemoryGateway) -> ScoringEngine<InMemoryGateway> {
    ScoringEngine::new(Arc::new(gateway))
}

pub(super) fn lead(id: &str) -> Lead {
    Lead {
        id: LeadId(id.to_string()),
        name: "Test Lead".to_string(),
        notes: String::new(),
        source: "unknown".to_string(),
        budget: None,
        location_preference: String::new(),
        kind_preference: None,
        deal_ids: Vec::new(),
    }
}

pub(super) fn deal(id: &str, stage: DealStage) -> Deal {
    Deal {
        id: DealId(id.to_string()),
        lead_id: None,
        stage,
        probability: None,
        amount: 500_000.0,
        expected_close: None,
        actual_close: None,
        activity_count: 6,
        created_at: today() - Duration::days(20),
    }
}

pub(super) fn property(id: &str, price: Option<f64>, city: &str, kind: PropertyKind) -> Property {
    Property {
        id: PropertyId(id.to_string()),
        title: format!("Listing {id}"),
        price,
        city: city.to_string(),
        kind,
        status: PropertyStatus::Available,
        featured: false,
    }
}

/// Insert `count` completed activities for a lead, all inside the recency
/// window ending at [`now`].
pub(super) fn add_completed_activities(
    gateway: &InMemoryGateway,
    lead_id: &str,
    count: usize,
    activity_type: ActivityType,
) {
    for index in 0..count {
        gateway.insert_activity(
            &tenant(),
            Activity {
                id: ActivityId(format!("{lead_id}-{activity_type:?}-{index}")),
                activity_type,
                status: ActivityStatus::Completed,
                created_at: now() - Duration::days(1) - Duration::hours(index as i64),
                lead_id: Some(LeadId(lead_id.to_string())),
                deal_id: None,
            },
        );
    }
}

pub(super) fn add_deal_activities(
    gateway: &InMemoryGateway,
    deal_id: &str,
    count: usize,
    age_days: i64,
) {
    for index in 0..count {
        gateway.insert_activity(
            &tenant(),
            Activity {
                id: ActivityId(format!("{deal_id}-act-{index}")),
                activity_type: ActivityType::Call,
                status: ActivityStatus::Completed,
                created_at: now() - Duration::days(age_days) - Duration::hours(index as i64),
                lead_id: None,
                deal_id: Some(DealId(deal_id.to_string())),
            },
        );
    }
}

pub(super) fn closed_won(id: &str, amount: f64, closed_on: NaiveDate) -> Deal {
    Deal {
        id: DealId(id.to_string()),
        lead_id: None,
        stage: DealStage::ClosedWon,
        probability: Some(100.0),
        amount,
        expected_close: Some(closed_on),
        actual_close: Some(closed_on),
        activity_count: 5,
        created_at: closed_on - Duration::days(30),
    }
}

/// Gateway whose every read fails, for error-propagation tests.
pub(super) struct UnavailableGateway;

impl EntityGateway for UnavailableGateway {
    fn lead(&self, _id: &LeadId, _tenant: &TenantId) -> Result<Lead, GatewayError> {
        Err(GatewayError::Unavailable("store offline".to_string()))
    }

    fn deal(&self, _id: &DealId, _tenant: &TenantId) -> Result<Deal, GatewayError> {
        Err(GatewayError::Unavailable("store offline".to_string()))
    }

    fn available_properties(&self, _tenant: &TenantId) -> Result<Vec<Property>, GatewayError> {
        Err(GatewayError::Unavailable("store offline".to_string()))
    }

    fn count_activities(
        &self,
        _tenant: &TenantId,
        _filter: &ActivityFilter,
    ) -> Result<u32, GatewayError> {
        Err(GatewayError::Unavailable("store offline".to_string()))
    }

    fn leads(&self, _tenant: &TenantId) -> Result<Vec<Lead>, GatewayError> {
        Err(GatewayError::Unavailable("store offline".to_string()))
    }

    fn deals(&self, _tenant: &TenantId) -> Result<Vec<Deal>, GatewayError> {
        Err(GatewayError::Unavailable("store offline".to_string()))
    }
}
