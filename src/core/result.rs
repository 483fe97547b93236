use crate::core::applicant::Applicant;
use crate::core::certificate::{CertificateId, CertificateStamp};
use crate::core::currency::Currency;
use crate::core::request::{CalculationRequest, CalculationType};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of an affordability calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffordabilityOutcome {
    pub gross_monthly_income: Decimal,
    pub dsr_ratio: Decimal,
    pub monthly_obligations: Decimal,
    /// Income share left for a new loan after existing obligations, never negative.
    pub affordable_payment: Decimal,
    pub affordable_payment_formatted: String,
    pub max_loan_amount: Decimal,
    pub max_loan_formatted: String,
    /// The payment the maximum loan would carry; equal to `affordable_payment`.
    pub monthly_payment: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress_test: Option<AffordabilityStress>,
}

/// Maximum loan re-evaluated at a stressed rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffordabilityStress {
    pub stress_rate_bps: u32,
    pub stress_annual_rate: Decimal,
    pub stress_rate_percent: Decimal,
    pub stress_max_loan: Decimal,
    pub stress_max_loan_formatted: String,
    pub reduction_amount: Decimal,
    pub reduction_percent: Decimal,
}

impl AffordabilityStress {
    pub fn summary(&self) -> String {
        format!(
            "At {:.2}%: Max Loan {} (Reduction: {:.2}%)",
            self.stress_rate_percent, self.stress_max_loan_formatted, self.reduction_percent
        )
    }
}

/// Outcome of a payment calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOutcome {
    pub principal_amount: Decimal,
    pub principal_formatted: String,
    pub monthly_payment: Decimal,
    pub monthly_payment_formatted: String,
    pub total_payments: Decimal,
    pub total_payments_formatted: String,
    pub total_interest: Decimal,
    pub total_interest_formatted: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress_test: Option<PaymentStress>,
}

/// Monthly payment re-evaluated at a stressed rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStress {
    pub stress_rate_bps: u32,
    pub stress_annual_rate: Decimal,
    pub stress_rate_percent: Decimal,
    pub stress_monthly_payment: Decimal,
    pub stress_payment_formatted: String,
    pub increase_amount: Decimal,
    pub increase_percent: Decimal,
}

impl PaymentStress {
    pub fn summary(&self) -> String {
        format!(
            "At {:.2}%: Monthly Payment {} (Increase: {:.2}%)",
            self.stress_rate_percent, self.stress_payment_formatted, self.increase_percent
        )
    }
}

/// Variant-specific half of a result, tagged by `calculation_type` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "calculation_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculationOutcome {
    Affordability(AffordabilityOutcome),
    Payment(PaymentOutcome),
}

impl CalculationOutcome {
    pub fn calculation_type(&self) -> CalculationType {
        match self {
            CalculationOutcome::Affordability(_) => CalculationType::Affordability,
            CalculationOutcome::Payment(_) => CalculationType::Payment,
        }
    }

    pub fn has_stress_test(&self) -> bool {
        match self {
            CalculationOutcome::Affordability(o) => o.stress_test.is_some(),
            CalculationOutcome::Payment(o) => o.stress_test.is_some(),
        }
    }

    /// One-line description of the stress scenario, if one was run.
    pub fn stress_summary(&self) -> Option<String> {
        match self {
            CalculationOutcome::Affordability(o) => o.stress_test.as_ref().map(|s| s.summary()),
            CalculationOutcome::Payment(o) => o.stress_test.as_ref().map(|s| s.summary()),
        }
    }
}

/// A calculated and issued pre-qualification.
///
/// Created once per request and never modified. Serializes to the flat
/// JSON object returned by `POST /api/calculate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    certificate_id: CertificateId,
    applicant: Applicant,
    currency: Currency,
    issue_date: NaiveDate,
    expiry_date: NaiveDate,
    validity_days: u32,
    annual_interest_rate: Decimal,
    interest_rate_percent: Decimal,
    term_years: u32,
    #[serde(flatten)]
    outcome: CalculationOutcome,
}

impl CalculationResult {
    pub(crate) fn new(
        request: &CalculationRequest,
        stamp: CertificateStamp,
        interest_rate_percent: Decimal,
        outcome: CalculationOutcome,
    ) -> Self {
        let terms = request.input().terms();
        Self {
            certificate_id: stamp.certificate_id().clone(),
            applicant: request.applicant().clone(),
            currency: request.currency(),
            issue_date: stamp.issue_date(),
            expiry_date: stamp.expiry_date(),
            validity_days: request.validity().days(),
            annual_interest_rate: terms.annual_interest_rate(),
            interest_rate_percent,
            term_years: terms.term().years(),
            outcome,
        }
    }

    pub fn certificate_id(&self) -> &CertificateId {
        &self.certificate_id
    }

    pub fn calculation_type(&self) -> CalculationType {
        self.outcome.calculation_type()
    }

    pub fn applicant(&self) -> &Applicant {
        &self.applicant
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn issue_date(&self) -> NaiveDate {
        self.issue_date
    }

    pub fn expiry_date(&self) -> NaiveDate {
        self.expiry_date
    }

    pub fn validity_days(&self) -> u32 {
        self.validity_days
    }

    pub fn annual_interest_rate(&self) -> Decimal {
        self.annual_interest_rate
    }

    pub fn interest_rate_percent(&self) -> Decimal {
        self.interest_rate_percent
    }

    pub fn term_years(&self) -> u32 {
        self.term_years
    }

    pub fn outcome(&self) -> &CalculationOutcome {
        &self.outcome
    }
}

impl fmt::Display for CalculationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Pre-Qualification {} ===", self.calculation_type())?;
        writeln!(f, "Certificate ID:        {}", self.certificate_id)?;
        writeln!(f, "Applicant:             {}", self.applicant)?;
        writeln!(f, "Issue Date:            {}", self.issue_date)?;
        writeln!(f, "Expiry Date:           {}", self.expiry_date)?;

        match &self.outcome {
            CalculationOutcome::Affordability(o) => {
                writeln!(f, "Gross Monthly Income:  {}", o.gross_monthly_income)?;
                writeln!(f, "DSR Ratio:             {:.1}%", o.dsr_ratio * Decimal::ONE_HUNDRED)?;
                writeln!(f, "Monthly Obligations:   {}", o.monthly_obligations)?;
                writeln!(f, "Affordable Payment:    {}", o.affordable_payment_formatted)?;
                writeln!(f, "Maximum Loan Amount:   {}", o.max_loan_formatted)?;
            }
            CalculationOutcome::Payment(o) => {
                writeln!(f, "Principal:             {}", o.principal_formatted)?;
                writeln!(f, "Monthly Payment:       {}", o.monthly_payment_formatted)?;
                writeln!(f, "Total Payments:        {}", o.total_payments_formatted)?;
                writeln!(f, "Total Interest:        {}", o.total_interest_formatted)?;
            }
        }

        writeln!(f, "Annual Interest Rate:  {:.2}%", self.interest_rate_percent)?;
        writeln!(f, "Loan Term:             {} years", self.term_years)?;

        if let Some(summary) = self.outcome.stress_summary() {
            writeln!(f, "Stress Test:           {}", summary)?;
        }
        Ok(())
    }
}
