use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use prequal_engine::core::applicant::Applicant;
use prequal_engine::core::certificate::{CertificateId, CertificateStamp};
use prequal_engine::core::request::{
    AffordabilityInput, CalculationRequest, LoanInput, LoanTerms, PaymentInput, TermYears,
};
use prequal_engine::engine::amortization::AmortizationEngine;
use prequal_engine::engine::calculator::Calculator;
use rust_decimal_macros::dec;

fn bench_monthly_payment_30_years(c: &mut Criterion) {
    let term = TermYears::new(30).unwrap();

    c.bench_function("monthly_payment_30_years", |b| {
        b.iter(|| AmortizationEngine::monthly_payment(black_box(dec!(450_000)), black_box(dec!(0.065)), term))
    });
}

fn bench_max_loan_30_years(c: &mut Criterion) {
    let term = TermYears::new(30).unwrap();

    c.bench_function("max_loan_30_years", |b| {
        b.iter(|| AmortizationEngine::max_loan(black_box(dec!(3_250.00)), black_box(dec!(0.065)), term))
    });
}

fn bench_full_affordability_with_stress(c: &mut Criterion) {
    let terms = LoanTerms::new(dec!(0.065), TermYears::new(25).unwrap(), 300).unwrap();
    let input = AffordabilityInput::new(dec!(18_000), dec!(0.4), dec!(1_500), terms).unwrap();
    let request =
        CalculationRequest::new(Applicant::new("Bench"), LoanInput::Affordability(input)).unwrap();
    let stamp = CertificateStamp::new(
        CertificateId::new("BENCH001"),
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        request.validity(),
    );

    c.bench_function("affordability_with_stress", |b| {
        b.iter(|| Calculator::calculate(black_box(&request), stamp.clone()))
    });
}

fn bench_full_payment_with_stress(c: &mut Criterion) {
    let terms = LoanTerms::new(dec!(0.045), TermYears::new(20).unwrap(), 200).unwrap();
    let input = PaymentInput::new(dec!(250_000), terms).unwrap();
    let request = CalculationRequest::new(Applicant::new("Bench"), LoanInput::Payment(input)).unwrap();
    let stamp = CertificateStamp::new(
        CertificateId::new("BENCH002"),
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        request.validity(),
    );

    c.bench_function("payment_with_stress", |b| {
        b.iter(|| Calculator::calculate(black_box(&request), stamp.clone()))
    });
}

criterion_group!(
    benches,
    bench_monthly_payment_30_years,
    bench_max_loan_30_years,
    bench_full_affordability_with_stress,
    bench_full_payment_with_stress
);
criterion_main!(benches);
