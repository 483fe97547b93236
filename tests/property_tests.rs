use chrono::{Days, NaiveDate};
use prequal_engine::core::applicant::Applicant;
use prequal_engine::core::certificate::CertificateStamp;
use prequal_engine::core::currency::{round_money, Currency};
use prequal_engine::core::request::{
    AffordabilityInput, CalculationRequest, LoanInput, LoanTerms, PaymentInput, TermYears,
    ValidityDays,
};
use prequal_engine::core::result::CalculationOutcome;
use prequal_engine::engine::amortization::AmortizationEngine;
use prequal_engine::engine::calculator::Calculator;
use proptest::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Generate an offered loan term.
fn arb_term() -> impl Strategy<Value = TermYears> {
    prop::sample::select(TermYears::all().collect::<Vec<_>>())
}

/// Generate an offered validity window.
fn arb_validity() -> impl Strategy<Value = ValidityDays> {
    prop::sample::select(vec![60u32, 90, 120]).prop_map(|d| ValidityDays::new(d).unwrap())
}

/// Generate an accepted annual rate (0.01% to 50%).
fn arb_rate() -> impl Strategy<Value = Decimal> {
    (1i64..=5_000i64).prop_map(|bp| Decimal::new(bp, 4))
}

/// Generate a principal in whole currency units (1,000 to 5,000,000).
fn arb_principal() -> impl Strategy<Value = Decimal> {
    (1_000u64..5_000_000u64).prop_map(Decimal::from)
}

/// Generate a monthly payment in cents (1.00 to 50,000.00).
fn arb_payment() -> impl Strategy<Value = Decimal> {
    (100i64..5_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Generate an issue date within a few decades.
fn arb_issue_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..20_000u64).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2000, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(offset))
            .unwrap()
    })
}

fn request(input: LoanInput) -> CalculationRequest {
    CalculationRequest::new(Applicant::new("Property Test"), input).unwrap()
}

proptest! {
    // ===================================================================
    // INVARIANT 1: Payment grows with principal.
    //
    // At a fixed rate and term, borrowing more never costs less per month.
    // ===================================================================
    #[test]
    fn payment_monotonic_in_principal(
        a in arb_principal(),
        b in arb_principal(),
        rate in arb_rate(),
        term in arb_term(),
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(
            AmortizationEngine::monthly_payment(low, rate, term).unwrap()
                <= AmortizationEngine::monthly_payment(high, rate, term).unwrap()
        );
    }

    // ===================================================================
    // INVARIANT 2: Payment grows with rate.
    // ===================================================================
    #[test]
    fn payment_monotonic_in_rate(
        principal in arb_principal(),
        a in arb_rate(),
        b in arb_rate(),
        term in arb_term(),
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(
            AmortizationEngine::monthly_payment(principal, low, term).unwrap()
                <= AmortizationEngine::monthly_payment(principal, high, term).unwrap()
        );
    }

    // ===================================================================
    // INVARIANT 3: Longer terms mean smaller payments.
    //
    // With a positive rate, stretching the loan strictly lowers the
    // installment.
    // ===================================================================
    #[test]
    fn payment_decreases_with_term(
        principal in arb_principal(),
        rate in arb_rate(),
        a in arb_term(),
        b in arb_term(),
    ) {
        prop_assume!(a != b);
        let (short, long) = if a.years() < b.years() { (a, b) } else { (b, a) };
        prop_assert!(
            AmortizationEngine::monthly_payment(principal, rate, long).unwrap()
                < AmortizationEngine::monthly_payment(principal, rate, short).unwrap()
        );
    }

    // ===================================================================
    // INVARIANT 4: Max loan and payment are inverses.
    //
    // The payment on the maximum loan for A reproduces A to the cent.
    // ===================================================================
    #[test]
    fn max_loan_round_trips_through_payment(
        payment in arb_payment(),
        rate in arb_rate(),
        term in arb_term(),
    ) {
        let loan = AmortizationEngine::max_loan(payment, rate, term).unwrap();
        let back = AmortizationEngine::monthly_payment(loan, rate, term).unwrap();
        prop_assert!(
            (back - payment).abs() <= dec!(0.01),
            "payment {} → loan {} → payment {}", payment, loan, back
        );
    }

    // ===================================================================
    // INVARIANT 5: A principal survives the trip through its payment.
    //
    // Unrounded, max_loan(monthly_payment(P)) gives back P to the cent.
    // Once the payment is rounded to cents it can be off by half a cent,
    // and that error is scaled by the annuity factor (the loan one unit
    // of payment buys), so the recovered principal lies within
    // 0.005 · factor of P.
    // ===================================================================
    #[test]
    fn principal_round_trips_through_rounded_payment(
        principal in arb_principal(),
        rate in arb_rate(),
        term in arb_term(),
    ) {
        let exact = AmortizationEngine::monthly_payment(principal, rate, term).unwrap();
        let back = AmortizationEngine::max_loan(exact, rate, term).unwrap();
        prop_assert!(
            (back - principal).abs() <= dec!(0.01),
            "principal {} → payment {} → loan {}", principal, exact, back
        );

        let shown = round_money(exact);
        let loan = AmortizationEngine::max_loan(shown, rate, term).unwrap();
        let annuity_factor = AmortizationEngine::max_loan(Decimal::ONE, rate, term).unwrap();
        let tolerance = dec!(0.005) * annuity_factor + dec!(0.01);
        prop_assert!(
            (loan - principal).abs() <= tolerance,
            "principal {} → payment {} → loan {} (tolerance {})", principal, shown, loan, tolerance
        );
    }

    // ===================================================================
    // INVARIANT 6: A zero rate is straight division.
    // ===================================================================
    #[test]
    fn zero_rate_is_linear(principal in arb_principal(), payment in arb_payment(), term in arb_term()) {
        let n = Decimal::from(term.months());
        prop_assert_eq!(AmortizationEngine::monthly_payment(principal, Decimal::ZERO, term).unwrap(), principal / n);
        prop_assert_eq!(AmortizationEngine::max_loan(payment, Decimal::ZERO, term).unwrap(), payment * n);
    }

    // ===================================================================
    // INVARIANT 7: Stress is reported if and only if it was requested.
    //
    // A stressed payment is never lower than the base payment.
    // ===================================================================
    #[test]
    fn stress_present_iff_requested(
        principal in arb_principal(),
        rate in (1i64..=4_000i64).prop_map(|bp| Decimal::new(bp, 4)),
        term in arb_term(),
        bps in prop_oneof![Just(0u32), 1u32..=1_000u32],
    ) {
        let terms = LoanTerms::new(rate, term, bps).unwrap();
        let input = LoanInput::Payment(PaymentInput::new(principal, terms).unwrap());
        let outcome = Calculator::outcome(&input, Currency::Ttd).unwrap();

        prop_assert_eq!(outcome.has_stress_test(), bps > 0);
        if let CalculationOutcome::Payment(p) = outcome {
            if let Some(stress) = p.stress_test {
                prop_assert!(stress.stress_monthly_payment >= p.monthly_payment);
                prop_assert!(stress.increase_amount >= Decimal::ZERO);
            }
        }
    }

    // ===================================================================
    // INVARIANT 8: Reduction percent is the share of the base loan lost.
    // ===================================================================
    #[test]
    fn reduction_percent_matches_ratio(
        income in (1_000i64..100_000i64).prop_map(Decimal::from),
        rate in (1i64..=4_000i64).prop_map(|bp| Decimal::new(bp, 4)),
        term in arb_term(),
        bps in 1u32..=1_000u32,
    ) {
        let terms = LoanTerms::new(rate, term, bps).unwrap();
        let input = AffordabilityInput::new(income, dec!(0.4), Decimal::ZERO, terms).unwrap();
        let outcome = Calculator::outcome(&LoanInput::Affordability(input), Currency::Ttd).unwrap();

        if let CalculationOutcome::Affordability(a) = outcome {
            let stress = a.stress_test.unwrap();
            let base = a.max_loan_amount.to_f64().unwrap();
            let stressed = stress.stress_max_loan.to_f64().unwrap();
            let reported = stress.reduction_percent.to_f64().unwrap();
            let expected = (base - stressed) / base * 100.0;
            prop_assert!(
                (reported - expected).abs() < 0.006,
                "reduction {}% but loans give {}%", reported, expected
            );
            prop_assert_eq!(stress.reduction_amount, a.max_loan_amount - stress.stress_max_loan);
        } else {
            prop_assert!(false, "expected affordability outcome");
        }
    }

    // ===================================================================
    // INVARIANT 9: Totals agree with the displayed payment.
    // ===================================================================
    #[test]
    fn totals_derive_from_rounded_payment(
        principal in arb_principal(),
        rate in arb_rate(),
        term in arb_term(),
    ) {
        let terms = LoanTerms::new(rate, term, 0).unwrap();
        let input = LoanInput::Payment(PaymentInput::new(principal, terms).unwrap());
        if let CalculationOutcome::Payment(p) = Calculator::outcome(&input, Currency::Usd).unwrap() {
            prop_assert_eq!(p.monthly_payment, p.monthly_payment.round_dp(2));
            prop_assert_eq!(p.total_payments, p.monthly_payment * Decimal::from(term.months()));
            prop_assert_eq!(p.total_interest, p.total_payments - principal);
        } else {
            prop_assert!(false, "expected payment outcome");
        }
    }

    // ===================================================================
    // INVARIANT 10: Expiry is exactly validity days after issue.
    // ===================================================================
    #[test]
    fn expiry_is_issue_plus_validity(
        issue in arb_issue_date(),
        validity in arb_validity(),
        principal in arb_principal(),
    ) {
        let terms = LoanTerms::new(dec!(0.05), TermYears::new(20).unwrap(), 0).unwrap();
        let req = request(LoanInput::Payment(PaymentInput::new(principal, terms).unwrap()))
            .with_validity(validity);
        let result = Calculator::calculate(&req, CertificateStamp::issue(issue, req.validity())).unwrap();

        prop_assert_eq!(result.issue_date(), issue);
        prop_assert_eq!(
            (result.expiry_date() - result.issue_date()).num_days(),
            i64::from(validity.days())
        );
    }
}
