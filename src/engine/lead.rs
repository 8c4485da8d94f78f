use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domain::{ActivityStatus, ActivityType, LeadId, TenantId};
use crate::gateway::{ActivityFilter, EntityGateway};

use super::{EngineConfig, EngineError};

/// Per-factor breakdown of a lead score. Each factor is already clamped to
/// its documented maximum and rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LeadScoreFactors {
    /// Activity volume and recency, max 25.
    pub engagement: u8,
    /// Budget signals in the notes, max 25.
    pub budget: u8,
    /// Urgency signals in the notes, max 20.
    pub timeline: u8,
    /// Acquisition source tier, max 15.
    pub source: u8,
    /// Site visits and open deals, max 15.
    pub property_interest: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadScore {
    pub lead_id: LeadId,
    pub total: u8,
    pub factors: LeadScoreFactors,
    pub recommendation: &'static str,
}

/// Follow-up ladder evaluated from the highest threshold down.
const RECOMMENDATION_LADDER: [(f64, &str); 4] = [
    (80.0, "hot - contact immediately"),
    (60.0, "warm - schedule follow-up"),
    (40.0, "medium - nurture"),
    (20.0, "low - monitor"),
];
const FALLBACK_RECOMMENDATION: &str = "low priority";

pub(crate) fn score<G>(
    gateway: &G,
    config: &EngineConfig,
    lead_id: &LeadId,
    tenant: &TenantId,
    now: DateTime<Utc>,
) -> Result<LeadScore, EngineError>
where
    G: EntityGateway,
{
    let lead = gateway.lead(lead_id, tenant)?;

    let activity_count =
        gateway.count_activities(tenant, &ActivityFilter::for_lead(lead_id.clone()))?;
    let recent_count = gateway.count_activities(
        tenant,
        &ActivityFilter::for_lead(lead_id.clone()).created_after(now - Duration::days(7)),
    )?;
    let completed_count = gateway.count_activities(
        tenant,
        &ActivityFilter::for_lead(lead_id.clone()).with_status(ActivityStatus::Completed),
    )?;
    let site_visits = gateway.count_activities(
        tenant,
        &ActivityFilter::for_lead(lead_id.clone()).with_type(ActivityType::SiteVisit),
    )?;

    let engagement = (activity_count as f64 * 2.0).min(10.0)
        + (recent_count as f64 * 5.0).min(10.0)
        + (completed_count as f64 * 2.0).min(5.0);

    let budget_hits = EngineConfig::keyword_hits(&config.budget_keywords, &lead.notes);
    let budget = (10.0 + budget_hits as f64 * 5.0).min(25.0);

    let urgency_hits = EngineConfig::keyword_hits(&config.urgency_keywords, &lead.notes);
    let timeline = (5.0 + urgency_hits as f64 * 5.0).min(20.0);

    let source = config.source_score(&lead.source);

    let property_interest = ((site_visits as f64 * 3.0).min(10.0)
        + (lead.deal_ids.len() as f64 * 5.0).min(5.0))
    .min(15.0);

    // Internal sums stay unrounded; rounding happens once, here at the
    // output boundary.
    let total = engagement + budget + timeline + source + property_interest;

    let recommendation = RECOMMENDATION_LADDER
        .iter()
        .find(|(threshold, _)| total >= *threshold)
        .map(|(_, label)| *label)
        .unwrap_or(FALLBACK_RECOMMENDATION);

    Ok(LeadScore {
        lead_id: lead.id,
        total: clamp_round(total, 100.0),
        factors: LeadScoreFactors {
            engagement: clamp_round(engagement, 25.0),
            budget: clamp_round(budget, 25.0),
            timeline: clamp_round(timeline, 20.0),
            source: clamp_round(source, 15.0),
            property_interest: clamp_round(property_interest, 15.0),
        },
        recommendation,
    })
}

fn clamp_round(value: f64, max: f64) -> u8 {
    value.clamp(0.0, max).round() as u8
}
