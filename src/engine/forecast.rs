use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::domain::TenantId;
use crate::gateway::EntityGateway;

use super::{EngineConfig, EngineError};

/// Number of trailing calendar months fed into the trend fit.
const WINDOW_MONTHS: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueForecast {
    /// Realized closed-won revenue per calendar month, oldest first.
    pub monthly_actuals: Vec<f64>,
    /// Projected revenue for the requested horizon, floored at 0.
    pub projected: Vec<f64>,
    /// Fixed heuristic constant; not a statistical confidence interval.
    pub confidence: f64,
}

/// Fit an ordinary-least-squares line over the series indices and project
/// `horizon` further points, each floored at 0. A flat series projects its
/// own constant; a single-point or zero-variance series projects its mean.
pub fn project(series: &[f64], horizon: usize) -> Result<Vec<f64>, EngineError> {
    if series.is_empty() {
        return Err(EngineError::InvalidInput(
            "revenue series must not be empty".to_string(),
        ));
    }

    let n = series.len() as f64;
    let mean_x = (series.len() - 1) as f64 / 2.0;
    let mean_y = series.iter().sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (index, value) in series.iter().enumerate() {
        let dx = index as f64 - mean_x;
        numerator += dx * (value - mean_y);
        denominator += dx * dx;
    }

    let slope = if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    };
    let intercept = mean_y - slope * mean_x;

    Ok((series.len()..series.len() + horizon)
        .map(|index| (slope * index as f64 + intercept).max(0.0))
        .collect())
}

pub(crate) fn forecast_revenue<G>(
    gateway: &G,
    config: &EngineConfig,
    tenant: &TenantId,
    today: NaiveDate,
    horizon_months: usize,
) -> Result<RevenueForecast, EngineError>
where
    G: EntityGateway,
{
    let deals = gateway.deals(tenant)?;

    let mut monthly_actuals = vec![0.0; WINDOW_MONTHS];
    let current_month = month_ordinal(today);
    let window_start = current_month - (WINDOW_MONTHS as i64 - 1);

    for deal in &deals {
        let Some(closed_on) = deal.realized_on() else {
            continue;
        };
        let offset = month_ordinal(closed_on) - window_start;
        if (0..WINDOW_MONTHS as i64).contains(&offset) {
            monthly_actuals[offset as usize] += deal.amount;
        }
    }

    let projected = project(&monthly_actuals, horizon_months)?;

    Ok(RevenueForecast {
        monthly_actuals,
        projected,
        confidence: config.forecast_confidence,
    })
}

/// Months since year 0, so adjacent calendar months differ by exactly 1
/// across year boundaries.
fn month_ordinal(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}
