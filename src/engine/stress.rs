//! Rate stress testing.
//!
//! Re-runs a calculation at the contracted rate plus a basis-point
//! add-on to show how sensitive the result is to rising rates. A zero
//! add-on means no scenario at all: callers get `None`, never a
//! zero-filled record.

use crate::core::currency::{format_money, round_money, Currency};
use crate::core::request::{LoanTerms, TermYears};
use crate::core::result::{AffordabilityStress, PaymentStress};
use crate::engine::amortization::AmortizationEngine;
use crate::engine::{checked_div, checked_mul, checked_sub, CalculationError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const BPS_PER_UNIT: Decimal = dec!(10_000);
const BPS_PER_PERCENT: Decimal = dec!(100);

/// A rate shock applied on top of a base annual rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StressScenario {
    pub base_annual_rate: Decimal,
    pub stress_rate_bps: u32,
    pub term: TermYears,
}

impl StressScenario {
    /// The scenario requested by `terms`, or `None` when the add-on is zero.
    pub fn from_terms(terms: &LoanTerms) -> Option<Self> {
        if terms.stress_rate_bps() == 0 {
            return None;
        }
        Some(Self {
            base_annual_rate: terms.annual_interest_rate(),
            stress_rate_bps: terms.stress_rate_bps(),
            term: terms.term(),
        })
    }

    /// `base + bps / 10 000`, as an annual fraction.
    pub fn stressed_annual_rate(&self) -> Decimal {
        self.base_annual_rate + Decimal::from(self.stress_rate_bps) / BPS_PER_UNIT
    }

    /// Stressed rate in percent, derived from the displayed base percent.
    pub fn stressed_rate_percent(&self, base_rate_percent: Decimal) -> Decimal {
        (base_rate_percent + Decimal::from(self.stress_rate_bps) / BPS_PER_PERCENT).round_dp(2)
    }

    /// Maximum loan at the stressed rate for the same affordable payment.
    pub fn affordability(
        &self,
        affordable_payment: Decimal,
        base_max_loan: Decimal,
        base_rate_percent: Decimal,
        currency: Currency,
    ) -> Result<AffordabilityStress, CalculationError> {
        let stressed_rate = self.stressed_annual_rate();
        let stress_max_loan = round_money(AmortizationEngine::max_loan(
            affordable_payment,
            stressed_rate,
            self.term,
        )?);
        let reduction = checked_sub(base_max_loan, stress_max_loan, "stress reduction")?;
        Ok(AffordabilityStress {
            stress_rate_bps: self.stress_rate_bps,
            stress_annual_rate: stressed_rate,
            stress_rate_percent: self.stressed_rate_percent(base_rate_percent),
            stress_max_loan,
            stress_max_loan_formatted: format_money(stress_max_loan, currency),
            reduction_amount: round_money(reduction),
            reduction_percent: share_percent(reduction, base_max_loan)?,
        })
    }

    /// Monthly payment at the stressed rate for the same principal.
    pub fn payment(
        &self,
        principal: Decimal,
        base_payment: Decimal,
        base_rate_percent: Decimal,
        currency: Currency,
    ) -> Result<PaymentStress, CalculationError> {
        let stressed_rate = self.stressed_annual_rate();
        let stress_payment = round_money(AmortizationEngine::monthly_payment(
            principal,
            stressed_rate,
            self.term,
        )?);
        let increase = checked_sub(stress_payment, base_payment, "stress increase")?;
        Ok(PaymentStress {
            stress_rate_bps: self.stress_rate_bps,
            stress_annual_rate: stressed_rate,
            stress_rate_percent: self.stressed_rate_percent(base_rate_percent),
            stress_monthly_payment: stress_payment,
            stress_payment_formatted: format_money(stress_payment, currency),
            increase_amount: round_money(increase),
            increase_percent: share_percent(increase, base_payment)?,
        })
    }
}

/// `part / whole × 100`, rounded to two places; zero when `whole` is zero.
pub fn share_percent(part: Decimal, whole: Decimal) -> Result<Decimal, CalculationError> {
    if whole.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let ratio = checked_div(part, whole, "share percent")?;
    Ok(checked_mul(ratio, Decimal::ONE_HUNDRED, "share percent")?.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(bps: u32) -> LoanTerms {
        LoanTerms::new(dec!(0.045), TermYears::new(20).unwrap(), bps).unwrap()
    }

    #[test]
    fn test_zero_bps_has_no_scenario() {
        assert!(StressScenario::from_terms(&terms(0)).is_none());
    }

    #[test]
    fn test_stressed_rate() {
        let scenario = StressScenario::from_terms(&terms(200)).unwrap();
        assert_eq!(scenario.stressed_annual_rate(), dec!(0.065));
        assert_eq!(scenario.stressed_rate_percent(dec!(4.5)), dec!(6.50));
    }

    #[test]
    fn test_affordability_stress_reduces_loan() {
        let scenario = StressScenario::from_terms(&terms(200)).unwrap();
        let stress = scenario
            .affordability(dec!(1500), dec!(237098.16), dec!(4.5), Currency::Ttd)
            .unwrap();

        assert_eq!(stress.stress_max_loan, dec!(201187.51));
        assert_eq!(stress.reduction_amount, dec!(35910.65));
        assert!(stress.reduction_percent > Decimal::ZERO);
        assert_eq!(stress.reduction_percent, dec!(15.15));
        assert_eq!(stress.stress_max_loan_formatted, "TTD $201,187.51");
    }

    #[test]
    fn test_payment_stress_increases_payment() {
        let scenario = StressScenario::from_terms(&terms(200)).unwrap();
        let stress = scenario
            .payment(dec!(250_000), dec!(1581.62), dec!(4.5), Currency::Usd)
            .unwrap();

        assert_eq!(stress.stress_monthly_payment, dec!(1863.93));
        assert_eq!(stress.increase_amount, dec!(282.31));
        assert_eq!(stress.increase_percent, dec!(17.85));
    }

    #[test]
    fn test_share_percent_zero_whole() {
        assert_eq!(share_percent(dec!(10), Decimal::ZERO), Ok(Decimal::ZERO));
        assert_eq!(share_percent(dec!(50), dec!(200)), Ok(dec!(25)));
    }
}
