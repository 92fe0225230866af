use serde::Serialize;

use super::error::ValidationError;
use super::validate::{Field, validate_range, validate_whole};

/// Unvalidated scalars as collected by a caller. Years stay `f64` so that a
/// fractional horizon can be reported instead of silently truncated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawCalculationInput {
    pub monthly_contribution: f64,
    pub years_to_retirement: f64,
    pub annual_return_rate: f64,
    pub annual_withdrawal_rate: f64,
}

impl RawCalculationInput {
    pub fn validate(&self) -> Result<CalculationInput, ValidationError> {
        validate_range(
            self.monthly_contribution,
            Field::MonthlyContribution.bounds(),
            Field::MonthlyContribution,
        )?;
        let years = validate_whole(
            self.years_to_retirement,
            Field::YearsToRetirement.bounds(),
            Field::YearsToRetirement,
        )?;
        CalculationInput::new(
            self.monthly_contribution,
            years,
            self.annual_return_rate,
            self.annual_withdrawal_rate,
        )
    }
}

/// Fully validated projection input. Only obtainable through [`CalculationInput::new`]
/// or [`RawCalculationInput::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalculationInput {
    monthly_contribution: f64,
    years_to_retirement: u32,
    annual_return_rate: f64,
    annual_withdrawal_rate: f64,
}

impl CalculationInput {
    /// Checks fields in declaration order and stops at the first violation.
    pub fn new(
        monthly_contribution: f64,
        years_to_retirement: u32,
        annual_return_rate: f64,
        annual_withdrawal_rate: f64,
    ) -> Result<Self, ValidationError> {
        let monthly_contribution = validate_range(
            monthly_contribution,
            Field::MonthlyContribution.bounds(),
            Field::MonthlyContribution,
        )?;
        validate_range(
            years_to_retirement as f64,
            Field::YearsToRetirement.bounds(),
            Field::YearsToRetirement,
        )?;
        let annual_return_rate = validate_range(
            annual_return_rate,
            Field::AnnualReturnRate.bounds(),
            Field::AnnualReturnRate,
        )?;
        let annual_withdrawal_rate = validate_range(
            annual_withdrawal_rate,
            Field::AnnualWithdrawalRate.bounds(),
            Field::AnnualWithdrawalRate,
        )?;
        Ok(Self {
            monthly_contribution,
            years_to_retirement,
            annual_return_rate,
            annual_withdrawal_rate,
        })
    }

    pub fn monthly_contribution(&self) -> f64 {
        self.monthly_contribution
    }

    pub fn years_to_retirement(&self) -> u32 {
        self.years_to_retirement
    }

    pub fn annual_return_rate(&self) -> f64 {
        self.annual_return_rate
    }

    pub fn annual_withdrawal_rate(&self) -> f64 {
        self.annual_withdrawal_rate
    }

    pub fn months(&self) -> usize {
        self.years_to_retirement as usize * 12
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationResult {
    pub months: usize,
    pub monthly_rate: f64,
    pub final_balance: f64,
    pub total_contributed: f64,
    pub earnings: f64,
    pub sustainable_monthly_withdrawal: f64,
    pub balance_trajectory: Vec<f64>,
    pub contributed_trajectory: Vec<f64>,
}

impl CalculationResult {
    pub fn insights(&self) -> Insights {
        Insights {
            growth_multiple: ratio(self.final_balance, self.total_contributed),
            earnings_share: ratio(self.earnings, self.final_balance),
            withdrawal_share: ratio(self.sustainable_monthly_withdrawal, self.final_balance),
        }
    }

    /// Balance and cumulative contribution at the end of each whole year, year 0 included.
    pub fn yearly_points(&self) -> impl Iterator<Item = (usize, f64, f64)> + '_ {
        self.balance_trajectory
            .iter()
            .zip(&self.contributed_trajectory)
            .enumerate()
            .step_by(12)
            .map(|(month, (balance, contributed))| (month / 12, *balance, *contributed))
    }
}

/// Ratios shown alongside a projection. `None` where the denominator is zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Insights {
    pub growth_multiple: Option<f64>,
    pub earnings_share: Option<f64>,
    pub withdrawal_share: Option<f64>,
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawContributionGoal {
    pub target_monthly_withdrawal: f64,
    pub years_to_retirement: f64,
    pub annual_return_rate: f64,
    pub annual_withdrawal_rate: f64,
}

impl RawContributionGoal {
    pub fn validate(&self) -> Result<ContributionGoal, ValidationError> {
        validate_range(
            self.target_monthly_withdrawal,
            Field::TargetMonthlyWithdrawal.bounds(),
            Field::TargetMonthlyWithdrawal,
        )?;
        let years = validate_whole(
            self.years_to_retirement,
            Field::YearsToRetirement.bounds(),
            Field::YearsToRetirement,
        )?;
        ContributionGoal::new(
            self.target_monthly_withdrawal,
            years,
            self.annual_return_rate,
            self.annual_withdrawal_rate,
        )
    }
}

/// Validated input for the inverse problem: which monthly contribution sustains
/// `target_monthly_withdrawal` at retirement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContributionGoal {
    target_monthly_withdrawal: f64,
    years_to_retirement: u32,
    annual_return_rate: f64,
    annual_withdrawal_rate: f64,
}

impl ContributionGoal {
    pub fn new(
        target_monthly_withdrawal: f64,
        years_to_retirement: u32,
        annual_return_rate: f64,
        annual_withdrawal_rate: f64,
    ) -> Result<Self, ValidationError> {
        let target_monthly_withdrawal = validate_range(
            target_monthly_withdrawal,
            Field::TargetMonthlyWithdrawal.bounds(),
            Field::TargetMonthlyWithdrawal,
        )?;
        validate_range(
            years_to_retirement as f64,
            Field::YearsToRetirement.bounds(),
            Field::YearsToRetirement,
        )?;
        let annual_return_rate = validate_range(
            annual_return_rate,
            Field::AnnualReturnRate.bounds(),
            Field::AnnualReturnRate,
        )?;
        let annual_withdrawal_rate = validate_range(
            annual_withdrawal_rate,
            Field::AnnualWithdrawalRate.bounds(),
            Field::AnnualWithdrawalRate,
        )?;
        Ok(Self {
            target_monthly_withdrawal,
            years_to_retirement,
            annual_return_rate,
            annual_withdrawal_rate,
        })
    }

    pub fn target_monthly_withdrawal(&self) -> f64 {
        self.target_monthly_withdrawal
    }

    pub fn years_to_retirement(&self) -> u32 {
        self.years_to_retirement
    }

    pub fn annual_return_rate(&self) -> f64 {
        self.annual_return_rate
    }

    pub fn annual_withdrawal_rate(&self) -> f64 {
        self.annual_withdrawal_rate
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequiredContribution {
    pub target_monthly_withdrawal: f64,
    pub required_balance: f64,
    pub required_monthly_contribution: f64,
    /// The solved contribution as a validated forward input.
    #[serde(skip)]
    pub input: CalculationInput,
    pub projection: CalculationResult,
}
