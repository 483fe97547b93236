use crate::core::request::TermYears;
use crate::engine::{checked_div, checked_mul, checked_sub, CalculationError};
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Fixed-rate amortization mathematics.
///
/// All functions are pure and work on unrounded values; rounding to cents
/// is the caller's decision. Rates are annual fractions (0.045 for 4.5%)
/// and are expected to be non-negative. A zero rate falls back to straight
/// division so no function ever divides by zero.
///
/// Every product is checked: figures too large for `Decimal` come back as
/// [`CalculationError::Overflow`] rather than a panic.
pub struct AmortizationEngine;

impl AmortizationEngine {
    pub fn monthly_rate(annual_rate: Decimal) -> Decimal {
        annual_rate / MONTHS_PER_YEAR
    }

    /// `(1 + r)^n` for monthly rate `r` over the whole term.
    fn compound_factor(monthly_rate: Decimal, term: TermYears) -> Result<Decimal, CalculationError> {
        (Decimal::ONE + monthly_rate)
            .checked_powi(i64::from(term.months()))
            .ok_or(CalculationError::Overflow("compound factor"))
    }

    /// Level monthly installment that repays `principal` over `term`.
    ///
    /// `P · r(1+r)^n / ((1+r)^n − 1)`, or `P / n` when the rate is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use prequal_engine::core::request::TermYears;
    /// use prequal_engine::engine::amortization::AmortizationEngine;
    /// use rust_decimal_macros::dec;
    ///
    /// let term = TermYears::new(20).unwrap();
    /// let payment = AmortizationEngine::monthly_payment(dec!(800_000), dec!(0.12), term).unwrap();
    /// assert_eq!(payment.round_dp(2), dec!(8808.69));
    /// ```
    pub fn monthly_payment(
        principal: Decimal,
        annual_rate: Decimal,
        term: TermYears,
    ) -> Result<Decimal, CalculationError> {
        let n = Decimal::from(term.months());
        let r = Self::monthly_rate(annual_rate);
        if r.is_zero() {
            return checked_div(principal, n, "monthly payment");
        }
        let factor = Self::compound_factor(r, term)?;
        let numerator = checked_mul(checked_mul(principal, r, "monthly payment")?, factor, "monthly payment")?;
        checked_div(numerator, factor - Decimal::ONE, "monthly payment")
    }

    /// Income available for a new loan payment: `income · dsr − obligations`, floored at zero.
    pub fn affordable_payment(
        gross_monthly_income: Decimal,
        dsr_ratio: Decimal,
        monthly_obligations: Decimal,
    ) -> Result<Decimal, CalculationError> {
        let budget = checked_mul(gross_monthly_income, dsr_ratio, "affordable payment")?;
        Ok(checked_sub(budget, monthly_obligations, "affordable payment")?.max(Decimal::ZERO))
    }

    /// Largest principal a fixed `payment` can amortize over `term`.
    ///
    /// The inverse of [`AmortizationEngine::monthly_payment`]:
    /// `A · ((1+r)^n − 1) / (r(1+r)^n)`, or `A · n` when the rate is zero.
    pub fn max_loan(
        payment: Decimal,
        annual_rate: Decimal,
        term: TermYears,
    ) -> Result<Decimal, CalculationError> {
        let n = Decimal::from(term.months());
        let r = Self::monthly_rate(annual_rate);
        if r.is_zero() {
            return checked_mul(payment, n, "maximum loan");
        }
        let factor = Self::compound_factor(r, term)?;
        let numerator = checked_mul(payment, factor - Decimal::ONE, "maximum loan")?;
        checked_div(numerator, checked_mul(r, factor, "maximum loan")?, "maximum loan")
    }

    /// Sum of every installment over the term.
    pub fn total_payments(monthly_payment: Decimal, term: TermYears) -> Result<Decimal, CalculationError> {
        checked_mul(monthly_payment, Decimal::from(term.months()), "total payments")
    }

    pub fn total_interest(total_payments: Decimal, principal: Decimal) -> Result<Decimal, CalculationError> {
        checked_sub(total_payments, principal, "total interest")
    }
}
