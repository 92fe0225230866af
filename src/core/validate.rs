//! Range and type checks applied to every scalar before it reaches the engine.

use std::fmt;

use serde::Serialize;

use super::error::ValidationError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    MonthlyContribution,
    YearsToRetirement,
    AnnualReturnRate,
    AnnualWithdrawalRate,
    TargetMonthlyWithdrawal,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::MonthlyContribution => "monthly_contribution",
            Field::YearsToRetirement => "years_to_retirement",
            Field::AnnualReturnRate => "annual_return_rate",
            Field::AnnualWithdrawalRate => "annual_withdrawal_rate",
            Field::TargetMonthlyWithdrawal => "target_monthly_withdrawal",
        }
    }

    pub fn bounds(self) -> Bounds {
        match self {
            Field::MonthlyContribution => MONTHLY_CONTRIBUTION_BOUNDS,
            Field::YearsToRetirement => YEARS_TO_RETIREMENT_BOUNDS,
            Field::AnnualReturnRate => ANNUAL_RETURN_RATE_BOUNDS,
            Field::AnnualWithdrawalRate => ANNUAL_WITHDRAWAL_RATE_BOUNDS,
            Field::TargetMonthlyWithdrawal => TARGET_MONTHLY_WITHDRAWAL_BOUNDS,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive `[min, max]` range.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn contains(self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

pub const MONTHLY_CONTRIBUTION_BOUNDS: Bounds = Bounds {
    min: 0.0,
    max: 1_000_000.0,
};
pub const YEARS_TO_RETIREMENT_BOUNDS: Bounds = Bounds {
    min: 1.0,
    max: 50.0,
};
pub const ANNUAL_RETURN_RATE_BOUNDS: Bounds = Bounds {
    min: 0.01,
    max: 0.20,
};
pub const ANNUAL_WITHDRAWAL_RATE_BOUNDS: Bounds = Bounds {
    min: 0.01,
    max: 0.10,
};
pub const TARGET_MONTHLY_WITHDRAWAL_BOUNDS: Bounds = Bounds {
    min: 0.0,
    max: 1_000_000.0,
};

/// NaN and infinities are treated as non-numeric.
pub fn validate_range(value: f64, bounds: Bounds, field: Field) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotNumeric {
            field,
            raw: value.to_string(),
        });
    }
    if !bounds.contains(value) {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min: bounds.min,
            max: bounds.max,
        });
    }
    Ok(value)
}

pub fn validate_whole(value: f64, bounds: Bounds, field: Field) -> Result<u32, ValidationError> {
    let value = validate_range(value, bounds, field)?;
    if value.fract() != 0.0 {
        return Err(ValidationError::NotWhole { field, value });
    }
    Ok(value as u32)
}

pub fn parse_numeric(text: &str, field: Field) -> Result<f64, ValidationError> {
    let trimmed = text.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::NotNumeric {
            field,
            raw: trimmed.to_string(),
        }),
    }
}
