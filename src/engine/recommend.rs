use serde::Serialize;

use crate::domain::{Lead, LeadId, Property, PropertyId, TenantId};
use crate::gateway::EntityGateway;

use super::EngineError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyMatch {
    pub property_id: PropertyId,
    pub title: String,
    /// Suitability [0,100]. Base 50 plus non-negative bonuses, so the
    /// effective floor for any available property is 50.
    pub score: u8,
    pub reasons: Vec<String>,
}

const DEFAULT_LIMIT: usize = 5;
const BASE_SCORE: f64 = 50.0;
/// Relative budget distance tiers, tightest first: (max ratio, bonus).
const BUDGET_PROXIMITY_TIERS: [(f64, f64); 3] = [(0.10, 30.0), (0.25, 20.0), (0.50, 10.0)];
/// Matches scoring at or below this are dropped from the result.
const MINIMUM_SCORE: f64 = 30.0;

pub(crate) fn recommend<G>(
    gateway: &G,
    lead_id: &LeadId,
    tenant: &TenantId,
    limit: Option<usize>,
) -> Result<Vec<PropertyMatch>, EngineError>
where
    G: EntityGateway,
{
    let limit = match limit {
        Some(0) => {
            return Err(EngineError::InvalidInput(
                "recommendation limit must be at least 1".to_string(),
            ))
        }
        Some(limit) => limit,
        None => DEFAULT_LIMIT,
    };

    let lead = gateway.lead(lead_id, tenant)?;
    let properties = gateway.available_properties(tenant)?;

    let mut matches: Vec<PropertyMatch> = properties
        .iter()
        .filter_map(|property| score_property(&lead, property))
        .collect();

    // Stable sort keeps encounter order for equal scores.
    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches.truncate(limit);

    Ok(matches)
}

fn score_property(lead: &Lead, property: &Property) -> Option<PropertyMatch> {
    let mut score = BASE_SCORE;
    let mut reasons = Vec::new();

    // Budget proximity only applies when both sides state a number; a zero
    // budget would divide by zero and is treated as unstated.
    if let (Some(budget), Some(price)) = (lead.budget, property.price) {
        if budget > 0.0 {
            let distance = (budget - price).abs() / budget;
            if let Some((ratio, bonus)) = BUDGET_PROXIMITY_TIERS
                .iter()
                .find(|(ratio, _)| distance <= *ratio)
            {
                score += bonus;
                reasons.push(format!(
                    "Priced within {:.0}% of the stated budget",
                    ratio * 100.0
                ));
            }
        }
    }

    let location_preference = lead.location_preference.to_lowercase();
    let city = property.city.to_lowercase();
    if !city.is_empty() && location_preference.contains(&city) {
        score += 10.0;
        reasons.push(format!("Matches preferred location: {}", property.city));
    }

    if lead.kind_preference == Some(property.kind) {
        score += 10.0;
        reasons.push(format!(
            "Matches preferred property type: {}",
            property.kind.label()
        ));
    }

    if property.featured {
        reasons.push("Featured listing".to_string());
    }

    if let (Some(budget), Some(price)) = (lead.budget, property.price) {
        if price <= budget {
            reasons.push("Within budget".to_string());
        }
    }

    if score <= MINIMUM_SCORE {
        return None;
    }

    Some(PropertyMatch {
        property_id: property.id.clone(),
        title: property.title.clone(),
        score: score.clamp(0.0, 100.0).round() as u8,
        reasons,
    })
}
