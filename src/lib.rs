//! # prequal-engine
//!
//! Mortgage pre-qualification: affordability and payment calculations
//! with an optional interest-rate stress test, issued as a dated,
//! expiring certificate.
//!
//! Given an applicant and either their income profile or a target loan,
//! this engine computes the maximum loan they can carry or the monthly
//! payment on the loan, and re-runs the figures at a stressed rate.
//!
//! ## Architecture
//!
//! - **core**: Foundational types: requests, results, currency, validation, certificate stamps
//! - **engine**: Amortization mathematics, stress derivation, result assembly
//! - **client**: The calculation service seam, HTTP client, submission gate
//! - **service**: Reference HTTP calculation and certificate service
//! - **config**: Environment configuration and logger setup

pub mod client;
pub mod config;
pub mod core;
pub mod engine;
pub mod service;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::client::credential::{AuthPolicy, Credential};
    pub use crate::client::http::HttpCalculationClient;
    pub use crate::client::{CalculationService, ClientError, Prequalifier};
    pub use crate::core::applicant::Applicant;
    pub use crate::core::certificate::{CertificateId, CertificateStamp};
    pub use crate::core::currency::{format_money, Currency};
    pub use crate::core::request::{
        AffordabilityInput, CalculationRequest, CalculationType, LoanInput, LoanTerms,
        PaymentInput, TermYears, ValidityDays,
    };
    pub use crate::core::result::{CalculationOutcome, CalculationResult};
    pub use crate::core::validation::ValidationError;
    pub use crate::engine::amortization::AmortizationEngine;
    pub use crate::engine::calculator::Calculator;
}
