use super::engine::{effective_monthly_rate, run_projection};
use super::error::{ComputeError, ensure_finite};
use super::types::{CalculationInput, ContributionGoal, RequiredContribution};

/// Future value of one unit contributed at the end of each of `months` months.
pub fn annuity_factor(monthly_rate: f64, months: usize) -> f64 {
    if monthly_rate == 0.0 {
        return months as f64;
    }
    ((1.0 + monthly_rate).powi(months as i32) - 1.0) / monthly_rate
}

/// Solves for the monthly contribution whose final balance sustains the goal's
/// withdrawal, then projects that contribution forward.
///
/// Fails with a validation error on `monthly_contribution` when the solved amount
/// exceeds what a projection accepts.
pub fn required_contribution(goal: &ContributionGoal) -> Result<RequiredContribution, ComputeError> {
    let months = goal.years_to_retirement() as usize * 12;
    let monthly_rate = ensure_finite(
        effective_monthly_rate(goal.annual_return_rate()),
        "monthly_rate",
    )?;

    let required_balance = ensure_finite(
        goal.target_monthly_withdrawal() * 12.0 / goal.annual_withdrawal_rate(),
        "required_balance",
    )?;
    let required_monthly_contribution = ensure_finite(
        required_balance / annuity_factor(monthly_rate, months),
        "required_monthly_contribution",
    )?;

    let input = CalculationInput::new(
        required_monthly_contribution,
        goal.years_to_retirement(),
        goal.annual_return_rate(),
        goal.annual_withdrawal_rate(),
    )?;
    let projection = run_projection(&input)?;

    Ok(RequiredContribution {
        target_monthly_withdrawal: goal.target_monthly_withdrawal(),
        required_balance,
        required_monthly_contribution,
        input,
        projection,
    })
}
