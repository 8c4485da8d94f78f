use chrono::Duration;

use super::common::*;
use crate::domain::{DealId, DealStage, LeadId};
use crate::engine::EngineError;
use crate::gateway::InMemoryGateway;

#[test]
fn contract_deal_scenario_scores_83() {
    let gateway = InMemoryGateway::new();
    let mut fixture = deal("deal-1", DealStage::Contract);
    fixture.probability = Some(60.0);
    gateway.insert_deal(&tenant(), fixture);
    add_deal_activities(&gateway, "deal-1", 4, 2);

    let prediction = engine(gateway)
        .predict_deal(&DealId("deal-1".to_string()), &tenant(), now())
        .expect("deal predicts");

    // 0.7 * (60 + 20) + 0.3 * 90
    assert_eq!(prediction.probability, 83);
    assert_eq!(prediction.predicted_close, today() + Duration::days(5));
}

#[test]
fn stored_probability_defaults_to_50() {
    let gateway = InMemoryGateway::new();
    gateway.insert_deal(&tenant(), deal("deal-2", DealStage::Qualified));

    let prediction = engine(gateway)
        .predict_deal(&DealId("deal-2".to_string()), &tenant(), now())
        .expect("deal predicts");

    // 0.7 * 50 + 0.3 * 40
    assert_eq!(prediction.probability, 47);
    assert_eq!(prediction.predicted_close, today() + Duration::days(20));
}

#[test]
fn probability_is_clamped_for_extreme_inputs() {
    let gateway = InMemoryGateway::new();
    let mut inflated = deal("deal-3", DealStage::ClosedWon);
    inflated.probability = Some(900.0);
    gateway.insert_deal(&tenant(), inflated);
    add_deal_activities(&gateway, "deal-3", 50, 1);

    let prediction = engine(gateway)
        .predict_deal(&DealId("deal-3".to_string()), &tenant(), now())
        .expect("deal predicts");

    assert_eq!(prediction.probability, 100);
}

#[test]
fn lead_blend_applies_when_lead_exists() {
    let gateway = InMemoryGateway::new();
    let mut fixture = deal("deal-4", DealStage::Contract);
    fixture.probability = Some(60.0);
    fixture.lead_id = Some(LeadId("lead-1".to_string()));
    gateway.insert_deal(&tenant(), fixture);
    add_deal_activities(&gateway, "deal-4", 4, 2);
    // Bare lead scores 20 total.
    gateway.insert_lead(&tenant(), lead("lead-1"));

    let prediction = engine(gateway)
        .predict_deal(&DealId("deal-4".to_string()), &tenant(), now())
        .expect("deal predicts");

    // 0.8 * 83 + 0.2 * 20
    assert_eq!(prediction.probability, 70);
}

#[test]
fn dangling_lead_reference_is_skipped_silently() {
    let gateway = InMemoryGateway::new();
    let mut fixture = deal("deal-5", DealStage::Contract);
    fixture.probability = Some(60.0);
    fixture.lead_id = Some(LeadId("gone".to_string()));
    gateway.insert_deal(&tenant(), fixture);
    add_deal_activities(&gateway, "deal-5", 4, 2);

    let prediction = engine(gateway)
        .predict_deal(&DealId("deal-5".to_string()), &tenant(), now())
        .expect("prediction survives the missing lead");

    assert_eq!(prediction.probability, 83);
}

#[test]
fn activities_older_than_30_days_earn_no_bonus() {
    let gateway = InMemoryGateway::new();
    let mut fixture = deal("deal-6", DealStage::Contract);
    fixture.probability = Some(60.0);
    gateway.insert_deal(&tenant(), fixture);
    add_deal_activities(&gateway, "deal-6", 4, 45);

    let prediction = engine(gateway)
        .predict_deal(&DealId("deal-6".to_string()), &tenant(), now())
        .expect("deal predicts");

    // 0.7 * 60 + 0.3 * 90
    assert_eq!(prediction.probability, 69);
}

#[test]
fn risk_factors_fire_independently() {
    let gateway = InMemoryGateway::new();
    let mut risky = deal("deal-7", DealStage::Prospect);
    risky.probability = Some(5.0);
    risky.activity_count = 1;
    risky.expected_close = Some(today() - Duration::days(3));
    risky.created_at = today() - Duration::days(90);
    gateway.insert_deal(&tenant(), risky);

    let prediction = engine(gateway)
        .predict_deal(&DealId("deal-7".to_string()), &tenant(), now())
        .expect("deal predicts");

    let risks = prediction.risk_factors.join(" | ").to_lowercase();
    assert!(risks.contains("overdue"));
    assert!(risks.contains("low engagement"));
    assert!(risks.contains("low probability"));
    assert!(risks.contains("prospect"));
    assert_eq!(prediction.risk_factors.len(), 4);
}

#[test]
fn healthy_deal_has_no_risk_factors_and_a_default_action() {
    let gateway = InMemoryGateway::new();
    let mut healthy = deal("deal-8", DealStage::Contract);
    healthy.probability = Some(85.0);
    healthy.activity_count = 9;
    healthy.expected_close = Some(today() + Duration::days(10));
    gateway.insert_deal(&tenant(), healthy);
    add_deal_activities(&gateway, "deal-8", 4, 3);

    let prediction = engine(gateway)
        .predict_deal(&DealId("deal-8".to_string()), &tenant(), now())
        .expect("deal predicts");

    assert!(prediction.risk_factors.is_empty());
    assert_eq!(prediction.recommendations.len(), 1);
}

#[test]
fn gateway_outage_propagates() {
    let engine = crate::engine::ScoringEngine::new(std::sync::Arc::new(UnavailableGateway));

    let err = engine
        .predict_deal(&DealId("deal-9".to_string()), &tenant(), now())
        .expect_err("outage must propagate");

    assert!(matches!(err, EngineError::Gateway(_)));
    assert!(!err.is_not_found());
}

#[test]
fn unknown_deal_is_not_found() {
    let gateway = InMemoryGateway::new();

    let err = engine(gateway)
        .predict_deal(&DealId("missing".to_string()), &tenant(), now())
        .expect_err("missing deal must fail");

    assert!(err.is_not_found());
}
