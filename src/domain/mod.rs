use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper scoping every gateway read to one CRM tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TenantId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeadId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DealId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityId(pub String);

/// Pipeline stages in their fixed order from intake to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStage {
    Prospect,
    Qualified,
    Proposal,
    Negotiation,
    Contract,
    ClosedWon,
    ClosedLost,
}

impl DealStage {
    pub const fn label(self) -> &'static str {
        match self {
            DealStage::Prospect => "prospect",
            DealStage::Qualified => "qualified",
            DealStage::Proposal => "proposal",
            DealStage::Negotiation => "negotiation",
            DealStage::Contract => "contract",
            DealStage::ClosedWon => "closed_won",
            DealStage::ClosedLost => "closed_lost",
        }
    }

    pub const fn is_closed(self) -> bool {
        matches!(self, DealStage::ClosedWon | DealStage::ClosedLost)
    }
}

/// Interaction types the CRM records against leads and deals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Call,
    Email,
    Meeting,
    WhatsApp,
    SiteVisit,
    Note,
    Task,
    FollowUp,
    Presentation,
    Contract,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Scheduled,
    Completed,
    Cancelled,
    Postponed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    Available,
    Reserved,
    Sold,
    Withdrawn,
}

/// Closed set of property categories matched against lead preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Apartment,
    Villa,
    Townhouse,
    Plot,
    Office,
    Retail,
    Other,
}

impl PropertyKind {
    pub const fn label(self) -> &'static str {
        match self {
            PropertyKind::Apartment => "apartment",
            PropertyKind::Villa => "villa",
            PropertyKind::Townhouse => "townhouse",
            PropertyKind::Plot => "plot",
            PropertyKind::Office => "office",
            PropertyKind::Retail => "retail",
            PropertyKind::Other => "other",
        }
    }
}

/// Prospective customer record as fetched from the CRM store. The engine
/// only reads the fields that feed scoring; everything else stays with the
/// CRUD layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    /// Free-text agent notes scanned for budget and urgency keywords.
    pub notes: String,
    /// Free-text acquisition source label, e.g. "Website", "Cold Call".
    pub source: String,
    pub budget: Option<f64>,
    /// Free-text location preference, matched against property cities.
    pub location_preference: String,
    pub kind_preference: Option<PropertyKind>,
    pub deal_ids: Vec<DealId>,
}

/// Sales opportunity tied to a pipeline stage and amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: DealId,
    pub lead_id: Option<LeadId>,
    pub stage: DealStage,
    /// Stored close probability [0,100] maintained by agents; absent on
    /// freshly imported deals.
    pub probability: Option<f64>,
    pub amount: f64,
    pub expected_close: Option<NaiveDate>,
    /// Set once the deal reaches a closed stage.
    pub actual_close: Option<NaiveDate>,
    pub activity_count: u32,
    pub created_at: NaiveDate,
}

impl Deal {
    /// Age of the deal in days, frozen at the actual close date once closed.
    pub fn days_in_pipeline(&self, today: NaiveDate) -> i64 {
        let end = self.actual_close.unwrap_or(today);
        (end - self.created_at).num_days()
    }

    /// Close month revenue attribution: only closed-won deals with a close
    /// date count as realized revenue.
    pub fn realized_on(&self) -> Option<NaiveDate> {
        if self.stage == DealStage::ClosedWon {
            self.actual_close
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub title: String,
    pub price: Option<f64>,
    pub city: String,
    pub kind: PropertyKind,
    pub status: PropertyStatus,
    pub featured: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub activity_type: ActivityType,
    pub status: ActivityStatus,
    pub created_at: DateTime<Utc>,
    pub lead_id: Option<LeadId>,
    pub deal_id: Option<DealId>,
}
