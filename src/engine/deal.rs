use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::{Deal, DealId, DealStage, TenantId};
use crate::gateway::{ActivityFilter, EntityGateway};

use super::{lead, EngineConfig, EngineError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealPrediction {
    pub deal_id: DealId,
    /// Blended close probability [0,100], rounded at the output boundary.
    pub probability: u8,
    /// Flat per-stage offset from today, not a distribution.
    pub predicted_close: NaiveDate,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
}

const DEFAULT_STORED_PROBABILITY: f64 = 50.0;

pub(crate) fn predict<G>(
    gateway: &G,
    config: &EngineConfig,
    deal_id: &DealId,
    tenant: &TenantId,
    now: DateTime<Utc>,
) -> Result<DealPrediction, EngineError>
where
    G: EntityGateway,
{
    let deal = gateway.deal(deal_id, tenant)?;
    let today = now.date_naive();

    let recent_count = gateway.count_activities(
        tenant,
        &ActivityFilter::for_deal(deal_id.clone()).created_after(now - Duration::days(30)),
    )?;

    let mut probability = deal.probability.unwrap_or(DEFAULT_STORED_PROBABILITY);
    probability += (recent_count as f64 * 5.0).min(20.0);
    probability = probability * 0.7 + config.stage_weight(deal.stage) * 0.3;

    // Best-effort lead blend: a deal may reference a lead that no longer
    // exists, in which case the prediction stands on its own. Any other
    // gateway failure still propagates.
    if let Some(lead_total) = lead_score_if_present(gateway, config, &deal, tenant, now)? {
        probability = probability * 0.8 + lead_total * 0.2;
    }

    let probability_clamped = probability.clamp(0.0, 100.0);

    let predicted_close = today + Duration::days(config.stage_duration_days(deal.stage));

    Ok(DealPrediction {
        deal_id: deal.id.clone(),
        probability: probability_clamped.round() as u8,
        risk_factors: risk_factors(&deal, probability_clamped, today),
        recommendations: recommendations(&deal, probability_clamped, today),
        predicted_close,
    })
}

/// Threads the lead score through as an `Option`: `None` when the deal has no
/// lead or the lead id dangles, the lead's total otherwise.
fn lead_score_if_present<G>(
    gateway: &G,
    config: &EngineConfig,
    deal: &Deal,
    tenant: &TenantId,
    now: DateTime<Utc>,
) -> Result<Option<f64>, EngineError>
where
    G: EntityGateway,
{
    let Some(lead_id) = &deal.lead_id else {
        return Ok(None);
    };

    match lead::score(gateway, config, lead_id, tenant, now) {
        Ok(score) => Ok(Some(score.total as f64)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

fn is_overdue(deal: &Deal, today: NaiveDate) -> bool {
    deal.expected_close
        .map(|expected| expected < today && !deal.stage.is_closed())
        .unwrap_or(false)
}

fn risk_factors(deal: &Deal, probability: f64, today: NaiveDate) -> Vec<String> {
    let mut risks = Vec::new();

    if is_overdue(deal, today) {
        risks.push("Deal is overdue: the expected close date has passed".to_string());
    }
    if deal.activity_count < 3 {
        risks.push("Low engagement: fewer than 3 activities logged".to_string());
    }
    if probability < 30.0 {
        risks.push("Low probability of closing".to_string());
    }
    if deal.stage == DealStage::Prospect && deal.days_in_pipeline(today) > 60 {
        risks.push("Stuck in prospect stage for over 60 days".to_string());
    }

    risks
}

// Deliberately a separate rule set from `risk_factors`: same signals,
// different thresholds and phrasing.
fn recommendations(deal: &Deal, probability: f64, today: NaiveDate) -> Vec<String> {
    let mut actions = Vec::new();

    if deal.activity_count < 5 {
        actions.push("Schedule additional touchpoints with the client this week".to_string());
    }
    if probability < 50.0 {
        actions.push("Revisit qualification and budget fit before investing more time".to_string());
    }
    if is_overdue(deal, today) {
        actions.push("Agree on a revised expected close date with the client".to_string());
    }
    if matches!(deal.stage, DealStage::Proposal | DealStage::Negotiation)
        && deal.days_in_pipeline(today) > 30
    {
        actions.push("Escalate to a senior agent to unblock the negotiation".to_string());
    }

    if actions.is_empty() {
        actions.push("Maintain the current cadence; the deal is progressing".to_string());
    }

    actions
}
