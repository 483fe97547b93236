//! Input rules for calculation requests.
//!
//! Every rule here runs before any arithmetic. A request that fails a rule
//! is rejected with a [`ValidationError`]; nothing is clamped or coerced.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

/// Loan terms offered, in years.
pub const OFFERED_TERMS: [u32; 6] = [5, 10, 15, 20, 25, 30];

/// Certificate validity windows offered, in days.
pub const OFFERED_VALIDITY_DAYS: [u32; 3] = [60, 90, 120];

pub const MIN_DSR_RATIO: Decimal = dec!(0.1);
pub const MAX_DSR_RATIO: Decimal = dec!(0.8);

/// Highest annual rate accepted, as a fraction.
pub const MAX_ANNUAL_RATE: Decimal = dec!(0.50);

/// Highest stress add-on accepted, in basis points.
pub const MAX_STRESS_BPS: u32 = 1_000;

/// Largest loan principal accepted for a payment calculation.
pub const MAX_PRINCIPAL: Decimal = dec!(10_000_000);

/// Largest gross monthly income accepted for an affordability calculation.
pub const MAX_MONTHLY_INCOME: Decimal = dec!(1_000_000);

/// Reasons a calculation request is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("applicant name must not be empty")]
    EmptyApplicantName,

    #[error("applicant name is {len} characters, at most {max} allowed", max = crate::core::applicant::MAX_NAME_LEN)]
    ApplicantNameTooLong { len: usize },

    #[error("{calculation_type} calculation requires {expected} and must not carry {unexpected}")]
    InputMismatch {
        calculation_type: &'static str,
        expected: &'static str,
        unexpected: &'static str,
    },

    #[error("{field} must not be negative, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },

    #[error("{field} must be at most {max}, got {value}")]
    AmountTooLarge {
        field: &'static str,
        value: Decimal,
        max: Decimal,
    },

    #[error("annual_interest_rate must be greater than 0 and at most {max}, got {value}", max = MAX_ANNUAL_RATE)]
    RateOutOfRange { value: Decimal },

    #[error("dsr_ratio must be between {min} and {max}, got {value}", min = MIN_DSR_RATIO, max = MAX_DSR_RATIO)]
    DsrOutOfRange { value: Decimal },

    #[error("term_years must be one of 5, 10, 15, 20, 25, 30, got {value}")]
    TermNotOffered { value: i64 },

    #[error("validity_days must be one of 60, 90, 120, got {value}")]
    ValidityNotOffered { value: i64 },

    #[error("stress_rate_bps must be between 0 and {max}, got {value}", max = MAX_STRESS_BPS)]
    StressOutOfRange { value: i64 },
}

pub fn check_non_negative(field: &'static str, value: Decimal) -> Result<Decimal, ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::NegativeAmount { field, value });
    }
    Ok(value)
}

/// Non-negative and no larger than `max`.
pub fn check_bounded_amount(
    field: &'static str,
    value: Decimal,
    max: Decimal,
) -> Result<Decimal, ValidationError> {
    let value = check_non_negative(field, value)?;
    if value > max {
        return Err(ValidationError::AmountTooLarge { field, value, max });
    }
    Ok(value)
}

pub fn check_annual_rate(value: Decimal) -> Result<Decimal, ValidationError> {
    if value <= Decimal::ZERO || value > MAX_ANNUAL_RATE {
        return Err(ValidationError::RateOutOfRange { value });
    }
    Ok(value)
}

pub fn check_dsr_ratio(value: Decimal) -> Result<Decimal, ValidationError> {
    if value < MIN_DSR_RATIO || value > MAX_DSR_RATIO {
        return Err(ValidationError::DsrOutOfRange { value });
    }
    Ok(value)
}

pub fn check_stress_bps(value: i64) -> Result<u32, ValidationError> {
    u32::try_from(value)
        .ok()
        .filter(|bps| *bps <= MAX_STRESS_BPS)
        .ok_or(ValidationError::StressOutOfRange { value })
}
