//! Pure calculation: amortization math, rate stress scenarios and the
//! calculator that assembles a result from a validated request.

pub mod amortization;
pub mod calculator;
pub mod stress;

use rust_decimal::Decimal;
use thiserror::Error;

/// Arithmetic that left the range `Decimal` can represent.
///
/// Request validation keeps amounts far below this, so seeing one means
/// the engine was called with unvalidated figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CalculationError {
    #[error("{0} is too large to calculate")]
    Overflow(&'static str),

    #[error("{0} divides by zero")]
    DivisionByZero(&'static str),
}

pub(crate) fn checked_mul(
    a: Decimal,
    b: Decimal,
    what: &'static str,
) -> Result<Decimal, CalculationError> {
    a.checked_mul(b).ok_or(CalculationError::Overflow(what))
}

pub(crate) fn checked_div(
    a: Decimal,
    b: Decimal,
    what: &'static str,
) -> Result<Decimal, CalculationError> {
    if b.is_zero() {
        return Err(CalculationError::DivisionByZero(what));
    }
    a.checked_div(b).ok_or(CalculationError::Overflow(what))
}

pub(crate) fn checked_sub(
    a: Decimal,
    b: Decimal,
    what: &'static str,
) -> Result<Decimal, CalculationError> {
    a.checked_sub(b).ok_or(CalculationError::Overflow(what))
}
