//! Affordability walkthrough.
//!
//! Shows how income, debt-service ratio and existing obligations turn
//! into a maximum loan, and how a rate shock shrinks it.

use chrono::NaiveDate;
use prequal_engine::core::applicant::Applicant;
use prequal_engine::core::certificate::CertificateStamp;
use prequal_engine::core::currency::{format_money, Currency};
use prequal_engine::core::request::{
    AffordabilityInput, CalculationRequest, LoanInput, LoanTerms, TermYears, ValidityDays,
};
use prequal_engine::core::result::CalculationOutcome;
use prequal_engine::engine::amortization::AmortizationEngine;
use prequal_engine::engine::calculator::Calculator;
use rust_decimal_macros::dec;

fn main() {
    println!("╔══════════════════════════════════════════════╗");
    println!("║  prequal-engine: Affordability Walkthrough   ║");
    println!("╚══════════════════════════════════════════════╝\n");

    // --- Scenario 1: How much can I borrow? ---
    println!("━━━ Scenario 1: Maximum Loan ━━━\n");

    let terms = LoanTerms::new(dec!(0.065), TermYears::new(25).unwrap(), 200).unwrap();
    let input = AffordabilityInput::new(dec!(25_000), dec!(0.40), dec!(3_500), terms).unwrap();
    let request = CalculationRequest::new(
        Applicant::new("Dana Walkthrough").with_email("dana@example.com"),
        LoanInput::Affordability(input),
    )
    .unwrap()
    .with_validity(ValidityDays::new(120).unwrap());

    let stamp = CertificateStamp::issue(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(), request.validity());
    let result = Calculator::calculate(&request, stamp).unwrap();
    println!("{}", result);

    // --- Scenario 2: The same applicant across every offered term ---
    println!("━━━ Scenario 2: Term Comparison ━━━\n");

    let payment = AmortizationEngine::affordable_payment(dec!(25_000), dec!(0.40), dec!(3_500)).unwrap();
    println!("Affordable payment: {}\n", format_money(payment, Currency::Ttd));
    for term in TermYears::all() {
        let loan = AmortizationEngine::max_loan(payment, dec!(0.065), term).unwrap();
        println!("  {:>2} years → {}", term.years(), format_money(loan, Currency::Ttd));
    }
    println!();

    // --- Scenario 3: Obligations that swallow the budget ---
    println!("━━━ Scenario 3: Over-committed Income ━━━\n");

    let terms = LoanTerms::new(dec!(0.065), TermYears::new(25).unwrap(), 0).unwrap();
    let input = AffordabilityInput::new(dec!(8_000), dec!(0.35), dec!(3_000), terms).unwrap();
    match Calculator::outcome(&LoanInput::Affordability(input), Currency::Ttd) {
        Ok(CalculationOutcome::Affordability(o)) => {
            println!("Affordable payment:  {}", o.affordable_payment_formatted);
            println!("Maximum loan:        {}", o.max_loan_formatted);
            println!("(obligations exceed 35% of income, so nothing is left for a new loan)");
        }
        Ok(CalculationOutcome::Payment(_)) => unreachable!(),
        Err(e) => eprintln!("calculation failed: {}", e),
    }
}
