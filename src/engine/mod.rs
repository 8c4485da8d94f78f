//! Scoring, prediction, recommendation, and forecasting over CRM records.
//!
//! Every component is a pure function of the records it pulls through the
//! [`EntityGateway`]: no state is held across calls and no record is ever
//! mutated. Heuristic constants live in [`EngineConfig`] as data.

pub mod config;
mod deal;
mod forecast;
mod insights;
mod lead;
mod recommend;
pub mod router;

#[cfg(test)]
mod tests;

pub use config::{EngineConfig, SourceTier};
pub use deal::DealPrediction;
pub use forecast::{project, RevenueForecast};
pub use insights::{LeadInsights, SourceConversion};
pub use lead::{LeadScore, LeadScoreFactors};
pub use recommend::PropertyMatch;
pub use router::engine_router;

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{DealId, LeadId, TenantId};
use crate::gateway::{EntityGateway, GatewayError};

/// Stateless facade composing the five scoring components over one gateway.
pub struct ScoringEngine<G> {
    gateway: Arc<G>,
    config: EngineConfig,
}

impl<G> ScoringEngine<G>
where
    G: EntityGateway,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self::with_config(gateway, EngineConfig::default())
    }

    pub fn with_config(gateway: Arc<G>, config: EngineConfig) -> Self {
        Self { gateway, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute the 0-100 quality score for one lead.
    pub fn score_lead(
        &self,
        lead_id: &LeadId,
        tenant: &TenantId,
        now: DateTime<Utc>,
    ) -> Result<LeadScore, EngineError> {
        lead::score(self.gateway.as_ref(), &self.config, lead_id, tenant, now)
    }

    /// Predict close probability and date for one deal.
    pub fn predict_deal(
        &self,
        deal_id: &DealId,
        tenant: &TenantId,
        now: DateTime<Utc>,
    ) -> Result<DealPrediction, EngineError> {
        deal::predict(self.gateway.as_ref(), &self.config, deal_id, tenant, now)
    }

    /// Rank available properties against one lead's preferences.
    pub fn recommend_properties(
        &self,
        lead_id: &LeadId,
        tenant: &TenantId,
        limit: Option<usize>,
    ) -> Result<Vec<PropertyMatch>, EngineError> {
        recommend::recommend(self.gateway.as_ref(), lead_id, tenant, limit)
    }

    /// Bucket the last 12 months of realized revenue and project forward.
    pub fn forecast_revenue(
        &self,
        tenant: &TenantId,
        today: NaiveDate,
        horizon_months: usize,
    ) -> Result<RevenueForecast, EngineError> {
        forecast::forecast_revenue(
            self.gateway.as_ref(),
            &self.config,
            tenant,
            today,
            horizon_months,
        )
    }

    /// Summarize lead-source conversion performance for one tenant.
    pub fn insights(&self, tenant: &TenantId) -> Result<LeadInsights, EngineError> {
        insights::insights(self.gateway.as_ref(), tenant)
    }
}

/// Error raised by the scoring engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl EngineError {
    /// Whether the failure is a missing entity rather than an infrastructure
    /// fault. Drives the 404 mapping in the router and the best-effort lead
    /// blend in the deal predictor.
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::Gateway(GatewayError::NotFound { .. }))
    }
}
