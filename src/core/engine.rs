use super::error::{ComputeError, ensure_finite};
use super::types::{CalculationInput, CalculationResult};
use super::validate::{Field, YEARS_TO_RETIREMENT_BOUNDS, validate_range};

/// Monthly rate that compounds to `annual_return_rate` over twelve months.
pub fn effective_monthly_rate(annual_return_rate: f64) -> f64 {
    (1.0 + annual_return_rate).powf(1.0 / 12.0) - 1.0
}

/// Validates the four scalars, then projects them.
pub fn project(
    monthly_contribution: f64,
    years_to_retirement: u32,
    annual_return_rate: f64,
    annual_withdrawal_rate: f64,
) -> Result<CalculationResult, ComputeError> {
    let input = CalculationInput::new(
        monthly_contribution,
        years_to_retirement,
        annual_return_rate,
        annual_withdrawal_rate,
    )?;
    run_projection(&input)
}

pub fn run_projection(input: &CalculationInput) -> Result<CalculationResult, ComputeError> {
    accumulate(
        input.monthly_contribution(),
        input.years_to_retirement(),
        input.annual_return_rate(),
        input.annual_withdrawal_rate(),
    )
}

/// Runs the recurrence without range checks on the amounts and rates.
///
/// A zero return accumulates linearly, a negative return compounds downward and a
/// zero withdrawal rate yields a zero withdrawal. Returns at or below -100% make the
/// monthly rate undefined and surface as [`ComputeError::NonFinite`].
///
/// The horizon sizes both trajectories, so it is still held to
/// [`YEARS_TO_RETIREMENT_BOUNDS`] and rejected as a validation error outside it.
pub fn project_unchecked(
    monthly_contribution: f64,
    years_to_retirement: u32,
    annual_return_rate: f64,
    annual_withdrawal_rate: f64,
) -> Result<CalculationResult, ComputeError> {
    validate_range(
        f64::from(years_to_retirement),
        YEARS_TO_RETIREMENT_BOUNDS,
        Field::YearsToRetirement,
    )?;
    accumulate(
        monthly_contribution,
        years_to_retirement,
        annual_return_rate,
        annual_withdrawal_rate,
    )
}

fn accumulate(
    monthly_contribution: f64,
    years_to_retirement: u32,
    annual_return_rate: f64,
    annual_withdrawal_rate: f64,
) -> Result<CalculationResult, ComputeError> {
    let months = years_to_retirement as usize * 12;
    let monthly_rate = ensure_finite(effective_monthly_rate(annual_return_rate), "monthly_rate")?;
    let growth = 1.0 + monthly_rate;

    let mut balance_trajectory = Vec::with_capacity(months + 1);
    let mut contributed_trajectory = Vec::with_capacity(months + 1);
    balance_trajectory.push(0.0);
    contributed_trajectory.push(0.0);

    let mut balance = 0.0;
    for month in 1..=months {
        balance = balance * growth + monthly_contribution;
        balance_trajectory.push(balance);
        contributed_trajectory.push(monthly_contribution * month as f64);
    }

    let final_balance = ensure_finite(balance, "final_balance")?;
    let total_contributed = contributed_trajectory.last().copied().unwrap_or(0.0);
    let earnings = final_balance - total_contributed;
    let sustainable_monthly_withdrawal = ensure_finite(
        final_balance * annual_withdrawal_rate / 12.0,
        "sustainable_monthly_withdrawal",
    )?;

    Ok(CalculationResult {
        months,
        monthly_rate,
        final_balance,
        total_contributed,
        earnings,
        sustainable_monthly_withdrawal,
        balance_trajectory,
        contributed_trajectory,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ValidationError;
    use approx::assert_relative_eq;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn closed_form_balance(contribution: f64, monthly_rate: f64, months: usize) -> f64 {
        contribution * ((1.0 + monthly_rate).powi(months as i32) - 1.0) / monthly_rate
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_trajectories_have_expected_shape(
            contribution_cents in 0u64..100_000_000,
            years in 1u32..=50,
            return_bp in 100u32..=2000,
            withdrawal_bp in 100u32..=1000
        ) {
            let contribution = contribution_cents as f64 / 100.0;
            let result = project(
                contribution,
                years,
                return_bp as f64 / 10_000.0,
                withdrawal_bp as f64 / 10_000.0,
            ).expect("inputs are in range");

            let expected_len = years as usize * 12 + 1;
            prop_assert_eq!(result.months, years as usize * 12);
            prop_assert_eq!(result.balance_trajectory.len(), expected_len);
            prop_assert_eq!(result.contributed_trajectory.len(), expected_len);
            prop_assert_eq!(result.balance_trajectory[0], 0.0);
            prop_assert_eq!(result.contributed_trajectory[0], 0.0);

            for (month, contributed) in result.contributed_trajectory.iter().enumerate() {
                prop_assert_eq!(*contributed, contribution * month as f64);
            }

            prop_assert_eq!(result.final_balance, *result.balance_trajectory.last().unwrap());
            prop_assert_eq!(result.total_contributed, *result.contributed_trajectory.last().unwrap());
        }

        #[test]
        fn prop_summary_scalars_are_consistent(
            contribution_cents in 0u64..100_000_000,
            years in 1u32..=50,
            return_bp in 100u32..=2000,
            withdrawal_bp in 100u32..=1000
        ) {
            let withdrawal_rate = withdrawal_bp as f64 / 10_000.0;
            let result = project(
                contribution_cents as f64 / 100.0,
                years,
                return_bp as f64 / 10_000.0,
                withdrawal_rate,
            ).expect("inputs are in range");

            let earnings = result.final_balance - result.total_contributed;
            prop_assert!((result.earnings - earnings).abs() <= 1e-9 * result.final_balance.abs().max(1.0));
            let withdrawal = result.final_balance * withdrawal_rate / 12.0;
            prop_assert!(
                (result.sustainable_monthly_withdrawal - withdrawal).abs()
                    <= 1e-9 * withdrawal.abs().max(1.0)
            );
            prop_assert!(result.earnings >= 0.0);
        }

        #[test]
        fn prop_balance_strictly_increases_with_positive_inputs(
            contribution_cents in 1u64..100_000_000,
            years in 1u32..=50,
            return_bp in 100u32..=2000
        ) {
            let result = project(
                contribution_cents as f64 / 100.0,
                years,
                return_bp as f64 / 10_000.0,
                0.04,
            ).expect("inputs are in range");

            for pair in result.balance_trajectory.windows(2) {
                prop_assert!(pair[1] > pair[0], "{} !> {}", pair[1], pair[0]);
            }
        }

        #[test]
        fn prop_recurrence_matches_geometric_series(
            contribution in 1u32..50_000,
            years in 1u32..=50,
            return_bp in 100u32..=2000
        ) {
            let contribution = contribution as f64;
            let result = project(contribution, years, return_bp as f64 / 10_000.0, 0.04)
                .expect("inputs are in range");
            let expected = closed_form_balance(contribution, result.monthly_rate, result.months);
            prop_assert!(
                (result.final_balance - expected).abs() <= 1e-9 * expected,
                "recurrence {} vs closed form {}", result.final_balance, expected
            );
        }
    }

    #[test]
    fn effective_monthly_rate_compounds_back_to_annual() {
        let monthly = effective_monthly_rate(0.10);
        assert_approx_tol(monthly, 0.00797414, 1e-8);
        assert_relative_eq!((1.0 + monthly).powi(12), 1.10, max_relative = 1e-12);
    }

    #[test]
    fn reference_scenario_matches_expected_figures() {
        let result = project(2_000.0, 25, 0.10, 0.04).expect("valid scenario");

        assert_eq!(result.months, 300);
        assert_approx_tol(result.monthly_rate, 0.00797414, 1e-8);
        assert_eq!(result.total_contributed, 600_000.0);
        assert!(result.final_balance > 2.0 * result.total_contributed);
        assert_relative_eq!(
            result.final_balance,
            closed_form_balance(2_000.0, result.monthly_rate, 300),
            max_relative = 1e-9
        );
        assert_relative_eq!(
            result.sustainable_monthly_withdrawal,
            result.final_balance * 0.04 / 12.0,
            max_relative = 1e-12
        );
        assert_eq!(result.earnings, result.final_balance - result.total_contributed);
    }

    #[test]
    fn zero_contribution_yields_flat_zero_projection() {
        let result = project(0.0, 30, 0.08, 0.04).expect("zero contribution is valid");

        assert!(result.balance_trajectory.iter().all(|b| *b == 0.0));
        assert!(result.contributed_trajectory.iter().all(|c| *c == 0.0));
        assert_eq!(result.final_balance, 0.0);
        assert_eq!(result.earnings, 0.0);
        assert_eq!(result.sustainable_monthly_withdrawal, 0.0);
    }

    #[test]
    fn one_year_horizon_has_thirteen_points() {
        let result = project(100.0, 1, 0.05, 0.04).expect("valid");
        assert_eq!(result.balance_trajectory.len(), 13);
        assert_eq!(result.contributed_trajectory[12], 1_200.0);
    }

    #[test]
    fn first_months_match_hand_calculation() {
        let result = project(1_000.0, 1, 0.12, 0.05).expect("valid");
        let r = result.monthly_rate;
        // month 1: 1000; month 2: 1000*(1+r)+1000; month 3: month2*(1+r)+1000
        assert_eq!(result.balance_trajectory[1], 1_000.0);
        assert_relative_eq!(result.balance_trajectory[2], 1_000.0 * (1.0 + r) + 1_000.0);
        assert_relative_eq!(
            result.balance_trajectory[3],
            (1_000.0 * (1.0 + r) + 1_000.0) * (1.0 + r) + 1_000.0
        );
    }

    #[test]
    fn project_rejects_out_of_range_input() {
        let err = project(-1.0, 25, 0.10, 0.04).expect_err("negative contribution");
        assert!(err.is_client_fault());
        assert!(matches!(
            err,
            ComputeError::Validation(ValidationError::OutOfRange {
                field: Field::MonthlyContribution,
                ..
            })
        ));

        let err = project(2_000.0, 51, 0.10, 0.04).expect_err("horizon too long");
        assert!(matches!(
            err,
            ComputeError::Validation(ValidationError::OutOfRange {
                field: Field::YearsToRetirement,
                ..
            })
        ));
    }

    #[test]
    fn repeated_runs_are_identical() {
        let first = project(1_234.56, 40, 0.07, 0.035).expect("valid");
        let second = project(1_234.56, 40, 0.07, 0.035).expect("valid");
        assert_eq!(first, second);
    }

    #[test]
    fn unchecked_zero_return_accumulates_linearly() {
        let result = project_unchecked(500.0, 2, 0.0, 0.04).expect("finite");
        assert_eq!(result.monthly_rate, 0.0);
        assert_eq!(result.final_balance, 12_000.0);
        assert_eq!(result.earnings, 0.0);
    }

    #[test]
    fn unchecked_zero_withdrawal_rate_yields_zero_withdrawal() {
        let result = project_unchecked(500.0, 2, 0.05, 0.0).expect("finite");
        assert_eq!(result.sustainable_monthly_withdrawal, 0.0);
    }

    #[test]
    fn unchecked_negative_return_loses_money() {
        let result = project_unchecked(500.0, 5, -0.10, 0.04).expect("finite");
        assert!(result.final_balance < result.total_contributed);
        assert!(result.earnings < 0.0);
    }

    #[test]
    fn unchecked_total_loss_rate_is_an_internal_error() {
        let err = project_unchecked(500.0, 5, -1.5, 0.04).expect_err("undefined rate");
        assert!(!err.is_client_fault());
        assert_eq!(
            err,
            ComputeError::NonFinite {
                quantity: "monthly_rate"
            }
        );
    }

    #[test]
    fn unchecked_horizon_beyond_cap_is_rejected() {
        let err = project_unchecked(1.0, u32::MAX, 0.05, 0.04).expect_err("horizon too long");
        assert!(err.is_client_fault());
        assert!(matches!(
            err,
            ComputeError::Validation(ValidationError::OutOfRange {
                field: Field::YearsToRetirement,
                ..
            })
        ));
        let err = project_unchecked(1.0, 0, 0.05, 0.04).expect_err("empty horizon");
        assert!(err.is_client_fault());
    }
}
