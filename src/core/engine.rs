use super::types::{EngineError, MonthSnapshot, SimulationParameters};

/// Round to currency precision. Every published figure is rounded
/// independently; `cumulative_growth` is rounded from the raw difference,
/// never recomputed from the two already-rounded fields.
fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Runs the month-by-month compounding recurrence.
///
/// Growth is applied to the running balance before the month's contribution
/// lands, so a contribution only starts compounding the following month.
/// Negative rates (loss scenarios) and negative contributions (withdrawals)
/// evaluate unconditionally; only a zero-length horizon is rejected.
pub fn project(params: &SimulationParameters) -> Result<Vec<MonthSnapshot>, EngineError> {
    if params.periods < 1 {
        return Err(EngineError::InvalidPeriods);
    }

    let mut total = params.initial_value;
    let mut cumulative_contributions = params.initial_value;
    let mut snapshots = Vec::with_capacity(params.periods as usize);

    for month in 1..=params.periods {
        total = total * (1.0 + params.monthly_rate) + params.monthly_contribution;
        cumulative_contributions += params.monthly_contribution;
        snapshots.push(MonthSnapshot {
            month,
            total_value: round_currency(total),
            cumulative_contributions: round_currency(cumulative_contributions),
            cumulative_growth: round_currency(total - cumulative_contributions),
        });
    }

    Ok(snapshots)
}
