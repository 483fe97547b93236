use crate::core::certificate::CertificateStamp;
use crate::core::currency::{format_money, round_money, Currency};
use crate::core::request::{AffordabilityInput, CalculationRequest, LoanInput, PaymentInput};
use crate::core::result::{AffordabilityOutcome, CalculationOutcome, CalculationResult, PaymentOutcome};
use crate::engine::amortization::AmortizationEngine;
use crate::engine::stress::StressScenario;
use crate::engine::CalculationError;
use rust_decimal::Decimal;

/// Turns validated requests into results.
///
/// Stateless and synchronous: safe to call from any number of threads
/// at once. Monetary outputs are rounded to cents before anything is
/// derived from them, so totals always agree with the displayed payment.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use prequal_engine::core::applicant::Applicant;
/// use prequal_engine::core::certificate::CertificateStamp;
/// use prequal_engine::core::request::*;
/// use prequal_engine::core::result::CalculationOutcome;
/// use prequal_engine::engine::calculator::Calculator;
/// use rust_decimal_macros::dec;
///
/// let terms = LoanTerms::new(dec!(0.045), TermYears::new(20).unwrap(), 0).unwrap();
/// let input = PaymentInput::new(dec!(250_000), terms).unwrap();
/// let request = CalculationRequest::new(Applicant::new("Jane Doe"), LoanInput::Payment(input)).unwrap();
/// let stamp = CertificateStamp::issue(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), request.validity());
///
/// let result = Calculator::calculate(&request, stamp).unwrap();
/// match result.outcome() {
///     CalculationOutcome::Payment(p) => assert_eq!(p.monthly_payment, dec!(1581.62)),
///     _ => unreachable!(),
/// }
/// ```
pub struct Calculator;

impl Calculator {
    /// Compute and issue a result for `request` under `stamp`.
    pub fn calculate(
        request: &CalculationRequest,
        stamp: CertificateStamp,
    ) -> Result<CalculationResult, CalculationError> {
        let rate_percent = Self::rate_percent(request.input().terms().annual_interest_rate());
        let outcome = Self::outcome(request.input(), request.currency())?;
        Ok(CalculationResult::new(request, stamp, rate_percent, outcome))
    }

    /// Compute the variant-specific figures without issuing a certificate.
    pub fn outcome(input: &LoanInput, currency: Currency) -> Result<CalculationOutcome, CalculationError> {
        Ok(match input {
            LoanInput::Affordability(input) => {
                CalculationOutcome::Affordability(Self::affordability(input, currency)?)
            }
            LoanInput::Payment(input) => CalculationOutcome::Payment(Self::payment(input, currency)?),
        })
    }

    /// Annual fraction to percent, two places.
    pub fn rate_percent(annual_rate: Decimal) -> Decimal {
        (annual_rate * Decimal::ONE_HUNDRED).round_dp(2)
    }

    fn affordability(
        input: &AffordabilityInput,
        currency: Currency,
    ) -> Result<AffordabilityOutcome, CalculationError> {
        let terms = input.terms();
        let affordable_payment = round_money(AmortizationEngine::affordable_payment(
            input.gross_monthly_income(),
            input.dsr_ratio(),
            input.monthly_obligations(),
        )?);
        let max_loan = round_money(AmortizationEngine::max_loan(
            affordable_payment,
            terms.annual_interest_rate(),
            terms.term(),
        )?);

        let stress_test = StressScenario::from_terms(terms)
            .map(|scenario| {
                scenario.affordability(
                    affordable_payment,
                    max_loan,
                    Self::rate_percent(terms.annual_interest_rate()),
                    currency,
                )
            })
            .transpose()?;

        Ok(AffordabilityOutcome {
            gross_monthly_income: input.gross_monthly_income(),
            dsr_ratio: input.dsr_ratio(),
            monthly_obligations: input.monthly_obligations(),
            affordable_payment,
            affordable_payment_formatted: format_money(affordable_payment, currency),
            max_loan_amount: max_loan,
            max_loan_formatted: format_money(max_loan, currency),
            monthly_payment: affordable_payment,
            stress_test,
        })
    }

    fn payment(input: &PaymentInput, currency: Currency) -> Result<PaymentOutcome, CalculationError> {
        let terms = input.terms();
        let principal = input.principal_amount();
        let monthly_payment = round_money(AmortizationEngine::monthly_payment(
            principal,
            terms.annual_interest_rate(),
            terms.term(),
        )?);
        let total_payments = AmortizationEngine::total_payments(monthly_payment, terms.term())?;
        let total_interest = AmortizationEngine::total_interest(total_payments, principal)?;

        let stress_test = StressScenario::from_terms(terms)
            .map(|scenario| {
                scenario.payment(
                    principal,
                    monthly_payment,
                    Self::rate_percent(terms.annual_interest_rate()),
                    currency,
                )
            })
            .transpose()?;

        Ok(PaymentOutcome {
            principal_amount: principal,
            principal_formatted: format_money(principal, currency),
            monthly_payment,
            monthly_payment_formatted: format_money(monthly_payment, currency),
            total_payments: round_money(total_payments),
            total_payments_formatted: format_money(total_payments, currency),
            total_interest: round_money(total_interest),
            total_interest_formatted: format_money(total_interest, currency),
            stress_test,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::applicant::Applicant;
    use crate::core::certificate::CertificateId;
    use crate::core::request::{CalculationType, LoanTerms, TermYears, ValidityDays};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn stamp(validity: ValidityDays) -> CertificateStamp {
        CertificateStamp::new(
            CertificateId::new("TEST0001"),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            validity,
        )
    }

    fn affordability_request(obligations: Decimal, bps: u32) -> CalculationRequest {
        let terms = LoanTerms::new(dec!(0.045), TermYears::new(20).unwrap(), bps).unwrap();
        let input = AffordabilityInput::new(dec!(5000), dec!(0.4), obligations, terms).unwrap();
        CalculationRequest::new(Applicant::new("Jane Doe"), LoanInput::Affordability(input)).unwrap()
    }

    fn payment_request(principal: Decimal, rate: Decimal, years: u32, bps: u32) -> CalculationRequest {
        let terms = LoanTerms::new(rate, TermYears::new(years).unwrap(), bps).unwrap();
        let input = PaymentInput::new(principal, terms).unwrap();
        CalculationRequest::new(Applicant::new("Jane Doe"), LoanInput::Payment(input)).unwrap()
    }

    fn as_affordability(result: &CalculationResult) -> &AffordabilityOutcome {
        match result.outcome() {
            CalculationOutcome::Affordability(o) => o,
            other => panic!("expected affordability outcome, got {:?}", other),
        }
    }

    fn as_payment(result: &CalculationResult) -> &PaymentOutcome {
        match result.outcome() {
            CalculationOutcome::Payment(o) => o,
            other => panic!("expected payment outcome, got {:?}", other),
        }
    }

    #[test]
    fn test_payment_scenario() {
        let request = payment_request(dec!(250_000), dec!(0.045), 20, 0);
        let result = Calculator::calculate(&request, stamp(ValidityDays::default())).unwrap();
        let p = as_payment(&result);

        assert_eq!(result.calculation_type(), CalculationType::Payment);
        assert_eq!(p.monthly_payment, dec!(1581.62));
        assert_eq!(p.total_payments, dec!(379588.80));
        assert_eq!(p.total_interest, dec!(129588.80));
        assert_eq!(p.principal_formatted, "TTD $250,000.00");
        assert_eq!(p.total_payments_formatted, "TTD $379,588.80");
        assert!(p.stress_test.is_none());
        assert_eq!(result.interest_rate_percent(), dec!(4.50));
        assert_eq!(result.term_years(), 20);
    }

    #[test]
    fn test_affordability_scenario() {
        let request = affordability_request(dec!(500), 0);
        let result = Calculator::calculate(&request, stamp(ValidityDays::default())).unwrap();
        let a = as_affordability(&result);

        assert_eq!(a.affordable_payment, dec!(1500.00));
        assert_eq!(a.affordable_payment_formatted, "TTD $1,500.00");
        assert_eq!(a.max_loan_amount, dec!(237098.16));
        assert_eq!(a.monthly_payment, a.affordable_payment);
        assert!(a.stress_test.is_none());
    }

    #[test]
    fn test_affordability_stress_scenario() {
        let request = affordability_request(dec!(500), 200);
        let result = Calculator::calculate(&request, stamp(ValidityDays::default())).unwrap();
        let a = as_affordability(&result);
        let stress = a.stress_test.as_ref().unwrap();

        assert_eq!(stress.stress_rate_percent, dec!(6.50));
        assert!(stress.stress_max_loan < a.max_loan_amount);
        assert!(stress.reduction_percent > Decimal::ZERO);
        assert_eq!(
            stress.reduction_amount,
            a.max_loan_amount - stress.stress_max_loan
        );
    }

    #[test]
    fn test_obligations_exceeding_budget_yield_zero_loan() {
        let request = affordability_request(dec!(2500), 150);
        let result = Calculator::calculate(&request, stamp(ValidityDays::default())).unwrap();
        let a = as_affordability(&result);

        assert_eq!(a.affordable_payment, Decimal::ZERO);
        assert_eq!(a.max_loan_amount, Decimal::ZERO);
        let stress = a.stress_test.as_ref().unwrap();
        assert_eq!(stress.reduction_percent, Decimal::ZERO);
    }

    #[test]
    fn test_reference_payment_with_stress() {
        let request = payment_request(dec!(800_000), dec!(0.12), 20, 200);
        let result = Calculator::calculate(&request, stamp(ValidityDays::default())).unwrap();
        let p = as_payment(&result);

        assert_eq!(p.monthly_payment, dec!(8808.69));
        let stress = p.stress_test.as_ref().unwrap();
        assert_eq!(stress.stress_rate_percent, dec!(14.00));
        assert!(stress.stress_monthly_payment > p.monthly_payment);
        assert!(stress.increase_percent > Decimal::ZERO);
    }

    #[test]
    fn test_currency_flows_into_formatting() {
        let request = payment_request(dec!(500_000), dec!(0.10), 15, 0).with_currency(Currency::Cad);
        let result = Calculator::calculate(&request, stamp(ValidityDays::default())).unwrap();
        assert!(as_payment(&result).monthly_payment_formatted.starts_with("CAD $"));
        assert_eq!(result.currency(), Currency::Cad);
    }

    #[test]
    fn test_stamp_and_echo_fields() {
        let request = payment_request(dec!(100_000), dec!(0.05), 10, 0)
            .with_validity(ValidityDays::new(120).unwrap());
        let result = Calculator::calculate(&request, stamp(request.validity())).unwrap();

        assert_eq!(result.certificate_id().as_str(), "TEST0001");
        assert_eq!(result.validity_days(), 120);
        assert_eq!((result.expiry_date() - result.issue_date()).num_days(), 120);
        assert_eq!(result.applicant().name(), "Jane Doe");
        assert_eq!(result.annual_interest_rate(), dec!(0.05));
    }

    #[test]
    fn test_result_json_shape() {
        let request = affordability_request(dec!(500), 200);
        let result = Calculator::calculate(&request, stamp(ValidityDays::default())).unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["calculation_type"], "AFFORDABILITY");
        assert_eq!(json["certificate_id"], "TEST0001");
        assert_eq!(json["issue_date"], "2025-06-01");
        assert_eq!(json["expiry_date"], "2025-08-30");
        assert_eq!(json["term_years"], 20);
        assert_eq!(json["max_loan_formatted"], "TTD $237,098.16");
        assert_eq!(json["stress_test"]["stress_rate_bps"], 200);
        assert!(json.get("principal_formatted").is_none());

        let back: CalculationResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_no_stress_field_when_zero_bps() {
        let request = payment_request(dec!(100_000), dec!(0.05), 10, 0);
        let result = Calculator::calculate(&request, stamp(ValidityDays::default())).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("stress_test").is_none());
    }

    #[test]
    fn test_largest_accepted_amounts_calculate() {
        use crate::core::validation::{MAX_ANNUAL_RATE, MAX_MONTHLY_INCOME, MAX_PRINCIPAL, MAX_STRESS_BPS};

        let terms = LoanTerms::new(MAX_ANNUAL_RATE, TermYears::new(30).unwrap(), MAX_STRESS_BPS).unwrap();
        let payment = LoanInput::Payment(PaymentInput::new(MAX_PRINCIPAL, terms).unwrap());
        assert!(Calculator::outcome(&payment, Currency::Ttd).is_ok());

        let terms = LoanTerms::new(dec!(0.001), TermYears::new(30).unwrap(), MAX_STRESS_BPS).unwrap();
        let input = AffordabilityInput::new(MAX_MONTHLY_INCOME, dec!(0.8), Decimal::ZERO, terms).unwrap();
        assert!(Calculator::outcome(&LoanInput::Affordability(input), Currency::Ttd).is_ok());
    }

    #[test]
    fn test_display_report() {
        let request = payment_request(dec!(250_000), dec!(0.045), 20, 100);
        let result = Calculator::calculate(&request, stamp(ValidityDays::default())).unwrap();
        let report = result.to_string();

        assert!(report.contains("Monthly Payment:       TTD $1,581.62"));
        assert!(report.contains("Annual Interest Rate:  4.50%"));
        assert!(report.contains("Stress Test:           At 5.50%: Monthly Payment"));
    }
}
