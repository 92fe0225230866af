mod engine;
mod error;
mod solver;
mod types;
mod validate;

pub use engine::{effective_monthly_rate, project, project_unchecked, run_projection};
pub use error::{ComputeError, ValidationError};
pub use solver::{annuity_factor, required_contribution};
pub use types::{
    CalculationInput, CalculationResult, ContributionGoal, Insights, RawCalculationInput,
    RawContributionGoal, RequiredContribution,
};
pub use validate::{
    ANNUAL_RETURN_RATE_BOUNDS, ANNUAL_WITHDRAWAL_RATE_BOUNDS, Bounds, Field,
    MONTHLY_CONTRIBUTION_BOUNDS, TARGET_MONTHLY_WITHDRAWAL_BOUNDS, YEARS_TO_RETIREMENT_BOUNDS,
    parse_numeric, validate_range, validate_whole,
};
