use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::domain::{DealStage, TenantId};
use crate::gateway::EntityGateway;

use super::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SourceConversion {
    pub total: u32,
    pub converted: u32,
    pub conversion_rate_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadInsights {
    pub total_leads: u32,
    pub converted_leads: u32,
    pub conversion_rate_pct: f64,
    pub by_source: BTreeMap<String, SourceConversion>,
    pub recommendations: Vec<String>,
}

/// A source this prolific converting this poorly gets flagged.
const UNDERPERFORMER_MIN_LEADS: u32 = 10;
const UNDERPERFORMER_MAX_RATE_PCT: f64 = 5.0;
/// The best source is only praised above this rate.
const PRAISE_MIN_RATE_PCT: f64 = 20.0;

pub(crate) fn insights<G>(gateway: &G, tenant: &TenantId) -> Result<LeadInsights, EngineError>
where
    G: EntityGateway,
{
    let leads = gateway.leads(tenant)?;
    let deals = gateway.deals(tenant)?;

    let mut won_deal_ids = HashSet::new();
    let mut won_lead_ids = HashSet::new();
    for deal in &deals {
        if deal.stage == DealStage::ClosedWon {
            won_deal_ids.insert(&deal.id);
            if let Some(lead_id) = &deal.lead_id {
                won_lead_ids.insert(lead_id);
            }
        }
    }

    let mut counters: BTreeMap<String, (u32, u32)> = BTreeMap::new();
    let mut converted_leads = 0u32;

    for lead in &leads {
        let converted = won_lead_ids.contains(&lead.id)
            || lead.deal_ids.iter().any(|deal_id| won_deal_ids.contains(deal_id));
        if converted {
            converted_leads += 1;
        }

        let source = normalize_source(&lead.source);
        let entry = counters.entry(source).or_insert((0, 0));
        entry.0 += 1;
        if converted {
            entry.1 += 1;
        }
    }

    let by_source: BTreeMap<String, SourceConversion> = counters
        .into_iter()
        .map(|(source, (total, converted))| {
            (
                source,
                SourceConversion {
                    total,
                    converted,
                    conversion_rate_pct: rate_pct(converted, total),
                },
            )
        })
        .collect();

    let total_leads = leads.len() as u32;

    Ok(LeadInsights {
        total_leads,
        converted_leads,
        conversion_rate_pct: rate_pct(converted_leads, total_leads),
        recommendations: recommendations(&by_source),
        by_source,
    })
}

fn normalize_source(source: &str) -> String {
    let trimmed = source.trim();
    if trimmed.is_empty() {
        "unknown".to_string()
    } else {
        trimmed.to_string()
    }
}

fn rate_pct(converted: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        converted as f64 / total as f64 * 100.0
    }
}

/// Two independent rules: praise the single best source when it clears the
/// praise bar, and flag every high-volume low-rate source. Either, both, or
/// neither may fire.
fn recommendations(by_source: &BTreeMap<String, SourceConversion>) -> Vec<String> {
    let mut recommendations = Vec::new();

    let best = by_source.iter().max_by(|(_, a), (_, b)| {
        a.conversion_rate_pct
            .partial_cmp(&b.conversion_rate_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    if let Some((source, stats)) = best {
        if stats.conversion_rate_pct > PRAISE_MIN_RATE_PCT {
            recommendations.push(format!(
                "'{source}' converts at {:.1}%; prioritize budget and follow-up there",
                stats.conversion_rate_pct
            ));
        }
    }

    for (source, stats) in by_source {
        if stats.total > UNDERPERFORMER_MIN_LEADS
            && stats.conversion_rate_pct < UNDERPERFORMER_MAX_RATE_PCT
        {
            recommendations.push(format!(
                "'{source}' underperforms ({} leads, {:.1}% conversion); review targeting",
                stats.total, stats.conversion_rate_pct
            ));
        }
    }

    recommendations
}
