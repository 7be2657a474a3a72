use serde::Serialize;
use thiserror::Error;

/// One fully validated projection request. Constructed by the boundary layer
/// (CLI or HTTP payload); the engine never parses text or reads ambient state.
#[derive(Debug, Clone, Copy)]
pub struct SimulationParameters {
    pub initial_value: f64,
    pub monthly_contribution: f64,
    /// Fractional growth per month, e.g. 0.01 for 1%.
    pub monthly_rate: f64,
    pub periods: u32,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            initial_value: 1_000.0,
            monthly_contribution: 100.0,
            monthly_rate: 0.01,
            periods: 24,
        }
    }
}

/// Account state after one month's growth and contribution, with every
/// published figure already rounded to currency precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSnapshot {
    pub month: u32,
    pub total_value: f64,
    pub cumulative_contributions: f64,
    pub cumulative_growth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("periods must be >= 1")]
    InvalidPeriods,
    #[error("monthly rate must be strictly positive for goal-seeking mode")]
    DegenerateRate,
}

/// Outcome of the inverse solver. A negative computed contribution means the
/// initial value alone already covers the target; that is a reportable
/// status, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status")]
pub enum GoalResult {
    #[serde(rename = "contribution-required", rename_all = "camelCase")]
    ContributionRequired { monthly_contribution: f64 },
    #[serde(rename = "already-met", rename_all = "camelCase")]
    AlreadyMet { computed_contribution: f64 },
}

impl GoalResult {
    pub fn computed_contribution(self) -> f64 {
        match self {
            GoalResult::ContributionRequired {
                monthly_contribution,
            } => monthly_contribution,
            GoalResult::AlreadyMet {
                computed_contribution,
            } => computed_contribution,
        }
    }
}
