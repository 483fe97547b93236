//! Payment walkthrough.
//!
//! Computes the monthly payment on a fixed loan, compares stress
//! scenarios, and prints the JSON a calculation service would return.

use chrono::NaiveDate;
use prequal_engine::core::applicant::Applicant;
use prequal_engine::core::certificate::CertificateStamp;
use prequal_engine::core::currency::Currency;
use prequal_engine::core::request::{
    CalculationRequest, LoanInput, LoanTerms, PaymentInput, TermYears,
};
use prequal_engine::core::result::CalculationOutcome;
use prequal_engine::engine::calculator::Calculator;
use rust_decimal_macros::dec;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║  prequal-engine: Payment Walkthrough     ║");
    println!("╚══════════════════════════════════════════╝\n");

    // --- Scenario 1: Monthly payment with a 200 bps shock ---
    println!("━━━ Scenario 1: Monthly Payment ━━━\n");

    let terms = LoanTerms::new(dec!(0.045), TermYears::new(20).unwrap(), 200).unwrap();
    let input = PaymentInput::new(dec!(250_000), terms).unwrap();
    let request = CalculationRequest::new(Applicant::new("Lee Walkthrough"), LoanInput::Payment(input))
        .unwrap()
        .with_currency(Currency::Usd);
    let stamp = CertificateStamp::issue(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(), request.validity());
    let result = Calculator::calculate(&request, stamp).unwrap();
    println!("{}", result);

    // --- Scenario 2: How sensitive is the payment to the shock size? ---
    println!("━━━ Scenario 2: Stress Ladder ━━━\n");

    for bps in [0u32, 100, 200, 300, 500] {
        let terms = LoanTerms::new(dec!(0.045), TermYears::new(20).unwrap(), bps).unwrap();
        let input = LoanInput::Payment(PaymentInput::new(dec!(250_000), terms).unwrap());
        if let Ok(CalculationOutcome::Payment(p)) = Calculator::outcome(&input, Currency::Usd) {
            match p.stress_test {
                Some(s) => println!("  +{:>3} bps → {}", bps, s.summary()),
                None => println!("  +{:>3} bps → {} (base)", bps, p.monthly_payment_formatted),
            }
        }
    }
    println!();

    // --- Scenario 3: Wire format ---
    println!("━━━ Scenario 3: Service Response JSON ━━━\n");
    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("could not serialize result: {}", e),
    }
}
