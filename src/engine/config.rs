use serde::{Deserialize, Serialize};

use crate::domain::DealStage;

/// Heuristic constants for the scoring engine, kept as plain data so the
/// weights stay auditable and testable independently of the scoring code.
/// The defaults are the fixed domain-chosen values; nothing here is fitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Note keywords signaling spending capacity, matched case-insensitively
    /// as substrings.
    pub budget_keywords: Vec<String>,
    /// Note keywords signaling purchase urgency.
    pub urgency_keywords: Vec<String>,
    /// Ordered source tiers; the first tier containing a label that appears
    /// in the lead's source wins.
    pub source_tiers: Vec<SourceTier>,
    /// Score for sources matching no tier.
    pub fallback_source_score: f64,
    /// Heuristic pipeline position per stage, on a 0-100 scale.
    pub stage_weights: Vec<(DealStage, f64)>,
    /// Expected days remaining until close, per open stage.
    pub stage_durations_days: Vec<(DealStage, i64)>,
    /// Days-to-close fallback for stages absent from the duration table.
    pub fallback_stage_days: i64,
    /// Flat confidence attached to revenue forecasts. Heuristic only, not a
    /// statistical interval.
    pub forecast_confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceTier {
    pub labels: Vec<String>,
    pub score: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            budget_keywords: to_strings(&["high budget", "luxury", "premium", "cash buyer"]),
            urgency_keywords: to_strings(&["urgent", "asap", "rush", "immediately"]),
            source_tiers: vec![
                SourceTier {
                    labels: to_strings(&["website", "referral", "organic"]),
                    score: 15.0,
                },
                SourceTier {
                    labels: to_strings(&["social media", "email campaign"]),
                    score: 10.0,
                },
                SourceTier {
                    labels: to_strings(&["cold call", "unknown"]),
                    score: 5.0,
                },
            ],
            fallback_source_score: 5.0,
            stage_weights: vec![
                (DealStage::Prospect, 20.0),
                (DealStage::Qualified, 40.0),
                (DealStage::Proposal, 60.0),
                (DealStage::Negotiation, 75.0),
                (DealStage::Contract, 90.0),
                (DealStage::ClosedWon, 100.0),
                (DealStage::ClosedLost, 0.0),
            ],
            stage_durations_days: vec![
                (DealStage::Prospect, 30),
                (DealStage::Qualified, 20),
                (DealStage::Proposal, 15),
                (DealStage::Negotiation, 10),
                (DealStage::Contract, 5),
            ],
            fallback_stage_days: 15,
            forecast_confidence: 0.7,
        }
    }
}

impl EngineConfig {
    /// Count keyword hits in free-text notes, case-insensitively.
    pub fn keyword_hits(keywords: &[String], notes: &str) -> usize {
        let haystack = notes.to_lowercase();
        keywords
            .iter()
            .filter(|keyword| haystack.contains(&keyword.to_lowercase()))
            .count()
    }

    pub fn source_score(&self, source: &str) -> f64 {
        let source = source.to_lowercase();
        self.source_tiers
            .iter()
            .find(|tier| tier.labels.iter().any(|label| source.contains(label.as_str())))
            .map(|tier| tier.score)
            .unwrap_or(self.fallback_source_score)
    }

    /// Stage weight lookup; 50 is the neutral fallback for stages absent
    /// from a customized table.
    pub fn stage_weight(&self, stage: DealStage) -> f64 {
        self.stage_weights
            .iter()
            .find(|(entry, _)| *entry == stage)
            .map(|(_, weight)| *weight)
            .unwrap_or(50.0)
    }

    pub fn stage_duration_days(&self, stage: DealStage) -> i64 {
        self.stage_durations_days
            .iter()
            .find(|(entry, _)| *entry == stage)
            .map(|(_, days)| *days)
            .unwrap_or(self.fallback_stage_days)
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_tiers_match_substrings_case_insensitively() {
        let config = EngineConfig::default();
        assert_eq!(config.source_score("Company Website"), 15.0);
        assert_eq!(config.source_score("REFERRAL"), 15.0);
        assert_eq!(config.source_score("Social Media - Instagram"), 10.0);
        assert_eq!(config.source_score("cold call list"), 5.0);
        assert_eq!(config.source_score("billboard"), 5.0);
    }

    #[test]
    fn closed_stages_use_fallback_duration() {
        let config = EngineConfig::default();
        assert_eq!(config.stage_duration_days(DealStage::Contract), 5);
        assert_eq!(config.stage_duration_days(DealStage::ClosedWon), 15);
        assert_eq!(config.stage_duration_days(DealStage::ClosedLost), 15);
    }

    #[test]
    fn keyword_hits_count_each_keyword_once() {
        let hits = EngineConfig::keyword_hits(
            &EngineConfig::default().budget_keywords,
            "Looking for LUXURY finish, luxury towers preferred, premium only",
        );
        assert_eq!(hits, 2);
    }
}
