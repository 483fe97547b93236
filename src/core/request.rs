use crate::core::applicant::{Applicant, MAX_NAME_LEN};
use crate::core::currency::Currency;
use crate::core::validation::{
    check_annual_rate, check_bounded_amount, check_dsr_ratio, check_non_negative,
    check_stress_bps, ValidationError, MAX_MONTHLY_INCOME, MAX_PRINCIPAL,
    OFFERED_TERMS, OFFERED_VALIDITY_DAYS,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which question a request asks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculationType {
    /// How much can the applicant borrow?
    Affordability,
    /// What does a given loan cost per month?
    Payment,
}

impl CalculationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationType::Affordability => "AFFORDABILITY",
            CalculationType::Payment => "PAYMENT",
        }
    }
}

impl fmt::Display for CalculationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A loan term from the offered set (5 to 30 years in steps of 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct TermYears(u32);

impl TermYears {
    pub fn new(years: u32) -> Result<Self, ValidationError> {
        Self::try_from(i64::from(years))
    }

    pub fn years(&self) -> u32 {
        self.0
    }

    /// Number of monthly installments.
    pub fn months(&self) -> u32 {
        self.0 * 12
    }

    pub fn all() -> impl Iterator<Item = TermYears> {
        OFFERED_TERMS.into_iter().map(TermYears)
    }
}

impl TryFrom<i64> for TermYears {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        OFFERED_TERMS
            .iter()
            .copied()
            .find(|t| i64::from(*t) == value)
            .map(TermYears)
            .ok_or(ValidationError::TermNotOffered { value })
    }
}

impl From<TermYears> for u32 {
    fn from(term: TermYears) -> Self {
        term.0
    }
}

/// How long an issued certificate stays valid: 60, 90 or 120 days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct ValidityDays(u32);

impl ValidityDays {
    pub fn new(days: u32) -> Result<Self, ValidationError> {
        Self::try_from(i64::from(days))
    }

    pub fn days(&self) -> u32 {
        self.0
    }
}

impl Default for ValidityDays {
    fn default() -> Self {
        ValidityDays(90)
    }
}

impl TryFrom<i64> for ValidityDays {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        OFFERED_VALIDITY_DAYS
            .iter()
            .copied()
            .find(|d| i64::from(*d) == value)
            .map(ValidityDays)
            .ok_or(ValidationError::ValidityNotOffered { value })
    }
}

impl From<ValidityDays> for u32 {
    fn from(validity: ValidityDays) -> Self {
        validity.0
    }
}

/// Rate, term and stress add-on shared by both calculation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanTerms {
    annual_interest_rate: Decimal,
    term: TermYears,
    stress_rate_bps: u32,
}

impl LoanTerms {
    /// `annual_interest_rate` is a fraction (0.045 for 4.5%).
    pub fn new(
        annual_interest_rate: Decimal,
        term: TermYears,
        stress_rate_bps: u32,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            annual_interest_rate: check_annual_rate(annual_interest_rate)?,
            term,
            stress_rate_bps: check_stress_bps(i64::from(stress_rate_bps))?,
        })
    }

    pub fn annual_interest_rate(&self) -> Decimal {
        self.annual_interest_rate
    }

    pub fn term(&self) -> TermYears {
        self.term
    }

    pub fn stress_rate_bps(&self) -> u32 {
        self.stress_rate_bps
    }
}

/// Inputs for "how much can I borrow".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffordabilityInput {
    gross_monthly_income: Decimal,
    dsr_ratio: Decimal,
    monthly_obligations: Decimal,
    terms: LoanTerms,
}

impl AffordabilityInput {
    pub fn new(
        gross_monthly_income: Decimal,
        dsr_ratio: Decimal,
        monthly_obligations: Decimal,
        terms: LoanTerms,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            gross_monthly_income: check_bounded_amount(
                "gross_monthly_income",
                gross_monthly_income,
                MAX_MONTHLY_INCOME,
            )?,
            dsr_ratio: check_dsr_ratio(dsr_ratio)?,
            monthly_obligations: check_non_negative("monthly_obligations", monthly_obligations)?,
            terms,
        })
    }

    pub fn gross_monthly_income(&self) -> Decimal {
        self.gross_monthly_income
    }

    pub fn dsr_ratio(&self) -> Decimal {
        self.dsr_ratio
    }

    pub fn monthly_obligations(&self) -> Decimal {
        self.monthly_obligations
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }
}

/// Inputs for "what will this loan cost".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentInput {
    principal_amount: Decimal,
    terms: LoanTerms,
}

impl PaymentInput {
    pub fn new(principal_amount: Decimal, terms: LoanTerms) -> Result<Self, ValidationError> {
        Ok(Self {
            principal_amount: check_bounded_amount(
                "principal_amount",
                principal_amount,
                MAX_PRINCIPAL,
            )?,
            terms,
        })
    }

    pub fn principal_amount(&self) -> Decimal {
        self.principal_amount
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }
}

/// The calculation-specific half of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanInput {
    Affordability(AffordabilityInput),
    Payment(PaymentInput),
}

impl LoanInput {
    pub fn calculation_type(&self) -> CalculationType {
        match self {
            LoanInput::Affordability(_) => CalculationType::Affordability,
            LoanInput::Payment(_) => CalculationType::Payment,
        }
    }

    pub fn terms(&self) -> &LoanTerms {
        match self {
            LoanInput::Affordability(input) => input.terms(),
            LoanInput::Payment(input) => input.terms(),
        }
    }
}

/// A fully validated pre-qualification request.
///
/// Built once per submission and never mutated afterwards. The
/// calculation type is implied by the [`LoanInput`] variant, so a request
/// can never carry inputs for the wrong calculation.
///
/// # Examples
///
/// ```
/// use prequal_engine::core::applicant::Applicant;
/// use prequal_engine::core::request::{
///     CalculationRequest, CalculationType, LoanInput, LoanTerms, PaymentInput, TermYears,
/// };
/// use rust_decimal_macros::dec;
///
/// let terms = LoanTerms::new(dec!(0.045), TermYears::new(20).unwrap(), 0).unwrap();
/// let input = PaymentInput::new(dec!(250_000), terms).unwrap();
/// let request = CalculationRequest::new(Applicant::new("Jane Doe"), LoanInput::Payment(input)).unwrap();
///
/// assert_eq!(request.calculation_type(), CalculationType::Payment);
/// assert_eq!(request.validity().days(), 90);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CalculationRequestWire", into = "CalculationRequestWire")]
pub struct CalculationRequest {
    applicant: Applicant,
    currency: Currency,
    validity: ValidityDays,
    input: LoanInput,
}

impl CalculationRequest {
    /// Create a request with the default currency (TTD) and validity (90 days).
    pub fn new(applicant: Applicant, input: LoanInput) -> Result<Self, ValidationError> {
        let applicant = applicant.normalized();
        let name_len = applicant.name().chars().count();
        if name_len == 0 {
            return Err(ValidationError::EmptyApplicantName);
        }
        if name_len > MAX_NAME_LEN {
            return Err(ValidationError::ApplicantNameTooLong { len: name_len });
        }
        Ok(Self {
            applicant,
            currency: Currency::default(),
            validity: ValidityDays::default(),
            input,
        })
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_validity(mut self, validity: ValidityDays) -> Self {
        self.validity = validity;
        self
    }

    pub fn calculation_type(&self) -> CalculationType {
        self.input.calculation_type()
    }

    pub fn applicant(&self) -> &Applicant {
        &self.applicant
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn validity(&self) -> ValidityDays {
        self.validity
    }

    pub fn input(&self) -> &LoanInput {
        &self.input
    }
}

/// JSON shape of a request as it travels to the calculation service.
///
/// Every input field is optional here so that a missing value is reported
/// as a [`ValidationError`] naming the field rather than a parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequestWire {
    pub calculation_type: CalculationType,
    pub applicant: ApplicantWire,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default = "default_validity_days")]
    pub validity_days: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affordability_input: Option<AffordabilityInputWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_input: Option<PaymentInputWire>,
}

fn default_validity_days() -> i64 {
    i64::from(ValidityDays::default().days())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicantWire {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AffordabilityInputWire {
    pub gross_monthly_income: Option<Decimal>,
    pub dsr_ratio: Option<Decimal>,
    #[serde(default)]
    pub monthly_obligations: Option<Decimal>,
    pub annual_interest_rate: Option<Decimal>,
    pub term_years: Option<i64>,
    #[serde(default)]
    pub stress_rate_bps: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentInputWire {
    pub principal_amount: Option<Decimal>,
    pub annual_interest_rate: Option<Decimal>,
    pub term_years: Option<i64>,
    #[serde(default)]
    pub stress_rate_bps: Option<i64>,
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingField(field))
}

fn loan_terms(
    annual_interest_rate: Option<Decimal>,
    term_years: Option<i64>,
    stress_rate_bps: Option<i64>,
) -> Result<LoanTerms, ValidationError> {
    let rate = required(annual_interest_rate, "annual_interest_rate")?;
    let term = TermYears::try_from(required(term_years, "term_years")?)?;
    let bps = check_stress_bps(stress_rate_bps.unwrap_or(0))?;
    LoanTerms::new(rate, term, bps)
}

impl TryFrom<AffordabilityInputWire> for AffordabilityInput {
    type Error = ValidationError;

    fn try_from(wire: AffordabilityInputWire) -> Result<Self, Self::Error> {
        let gross = required(wire.gross_monthly_income, "gross_monthly_income")?;
        let dsr = required(wire.dsr_ratio, "dsr_ratio")?;
        let terms = loan_terms(wire.annual_interest_rate, wire.term_years, wire.stress_rate_bps)?;
        AffordabilityInput::new(
            gross,
            dsr,
            wire.monthly_obligations.unwrap_or(Decimal::ZERO),
            terms,
        )
    }
}

impl TryFrom<PaymentInputWire> for PaymentInput {
    type Error = ValidationError;

    fn try_from(wire: PaymentInputWire) -> Result<Self, Self::Error> {
        let principal = required(wire.principal_amount, "principal_amount")?;
        let terms = loan_terms(wire.annual_interest_rate, wire.term_years, wire.stress_rate_bps)?;
        PaymentInput::new(principal, terms)
    }
}

impl TryFrom<CalculationRequestWire> for CalculationRequest {
    type Error = ValidationError;

    fn try_from(wire: CalculationRequestWire) -> Result<Self, Self::Error> {
        let input = match (wire.calculation_type, wire.affordability_input, wire.payment_input) {
            (CalculationType::Affordability, Some(input), None) => {
                LoanInput::Affordability(input.try_into()?)
            }
            (CalculationType::Payment, None, Some(input)) => LoanInput::Payment(input.try_into()?),
            (CalculationType::Affordability, _, _) => {
                return Err(ValidationError::InputMismatch {
                    calculation_type: "AFFORDABILITY",
                    expected: "affordability_input",
                    unexpected: "payment_input",
                })
            }
            (CalculationType::Payment, _, _) => {
                return Err(ValidationError::InputMismatch {
                    calculation_type: "PAYMENT",
                    expected: "payment_input",
                    unexpected: "affordability_input",
                })
            }
        };

        let mut applicant = Applicant::new(wire.applicant.name);
        if let Some(email) = wire.applicant.email {
            applicant = applicant.with_email(email);
        }
        if let Some(phone) = wire.applicant.phone {
            applicant = applicant.with_phone(phone);
        }

        Ok(CalculationRequest::new(applicant, input)?
            .with_currency(wire.currency)
            .with_validity(ValidityDays::try_from(wire.validity_days)?))
    }
}

impl From<CalculationRequest> for CalculationRequestWire {
    fn from(request: CalculationRequest) -> Self {
        let (affordability_input, payment_input) = match request.input {
            LoanInput::Affordability(input) => (
                Some(AffordabilityInputWire {
                    gross_monthly_income: Some(input.gross_monthly_income),
                    dsr_ratio: Some(input.dsr_ratio),
                    monthly_obligations: Some(input.monthly_obligations),
                    annual_interest_rate: Some(input.terms.annual_interest_rate),
                    term_years: Some(i64::from(input.terms.term.years())),
                    stress_rate_bps: Some(i64::from(input.terms.stress_rate_bps)),
                }),
                None,
            ),
            LoanInput::Payment(input) => (
                None,
                Some(PaymentInputWire {
                    principal_amount: Some(input.principal_amount),
                    annual_interest_rate: Some(input.terms.annual_interest_rate),
                    term_years: Some(i64::from(input.terms.term.years())),
                    stress_rate_bps: Some(i64::from(input.terms.stress_rate_bps)),
                }),
            ),
        };

        CalculationRequestWire {
            calculation_type: request.input.calculation_type(),
            applicant: ApplicantWire {
                name: request.applicant.name().to_string(),
                email: request.applicant.email().map(str::to_string),
                phone: request.applicant.phone().map(str::to_string),
            },
            currency: request.currency,
            validity_days: i64::from(request.validity.days()),
            affordability_input,
            payment_input,
        }
    }
}
