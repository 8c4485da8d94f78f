//! Scoring and forecasting engine for a multi-tenant real-estate CRM.
//!
//! The crate computes lead quality scores, deal-outcome predictions,
//! property recommendations, revenue forecasts, and lead-source insights
//! over records it reads through the [`gateway::EntityGateway`] trait. It
//! owns no storage and mutates nothing.

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod telemetry;
