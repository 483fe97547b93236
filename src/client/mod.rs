//! Talking to a calculation service.
//!
//! [`CalculationService`] is the seam between a front end and whatever
//! computes and issues certificates. [`Prequalifier`] wraps a service with
//! the submission rules every front end needs: validate first, honour the
//! auth policy, and never run two submissions at once.

pub mod credential;
pub mod gate;
pub mod http;

use crate::core::certificate::CertificateId;
use crate::core::request::{CalculationRequest, CalculationRequestWire};
use crate::core::result::CalculationResult;
use crate::core::validation::ValidationError;
use async_trait::async_trait;
use credential::{AuthPolicy, Credential};
use gate::SubmissionGate;
use thiserror::Error;

pub const CALCULATION_FAILED: &str = "An error occurred during calculation";
pub const CERTIFICATE_FAILED: &str = "Failed to generate certificate. Please try again.";

/// Everything that can go wrong between a submit and a result.
///
/// None of these end the process; each carries a message fit to show
/// the user, after which they may act again.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    Service { status: u16, message: String },

    #[error("please sign in to continue: {0}")]
    Auth(String),

    #[error("could not reach the calculation service: {message}")]
    Transport { message: String },

    #[error("a submission is already in progress")]
    InFlight,
}

impl ClientError {
    /// Worth trying again unchanged: network trouble, or a busy gate.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Transport { .. } | ClientError::InFlight)
    }
}

/// A downloaded certificate, ready to be saved under `file_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateDocument {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Download name for a certificate: `Pre-Qualification_Certificate_<id>.<ext>`.
pub fn certificate_file_name(id: &CertificateId, content_type: &str) -> String {
    let extension = if content_type.starts_with("application/pdf") {
        "pdf"
    } else {
        "txt"
    };
    format!("Pre-Qualification_Certificate_{}.{}", id, extension)
}

/// A remote (or local) calculation and certificate service.
#[async_trait]
pub trait CalculationService: Send + Sync {
    /// `POST /api/calculate`.
    async fn calculate(
        &self,
        request: &CalculationRequest,
        credential: Option<&Credential>,
    ) -> Result<CalculationResult, ClientError>;

    /// `POST /api/generate-certificate/{certificate_id}`, echoing `result`.
    async fn generate_certificate(
        &self,
        result: &CalculationResult,
        credential: Option<&Credential>,
    ) -> Result<CertificateDocument, ClientError>;
}

/// Submission front door for a [`CalculationService`].
pub struct Prequalifier<S> {
    service: S,
    policy: AuthPolicy,
    gate: SubmissionGate,
}

impl<S: CalculationService> Prequalifier<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            policy: AuthPolicy::default(),
            gate: SubmissionGate::new(),
        }
    }

    pub fn with_policy(mut self, policy: AuthPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// True while a submission or download is outstanding.
    pub fn is_busy(&self) -> bool {
        self.gate.is_in_flight()
    }

    /// Validate raw form data, then submit it.
    ///
    /// An invalid request fails with [`ClientError::Validation`] and no
    /// call is made.
    pub async fn submit_form(
        &self,
        form: CalculationRequestWire,
        credential: Option<&Credential>,
    ) -> Result<CalculationResult, ClientError> {
        let request = CalculationRequest::try_from(form)?;
        self.submit(&request, credential).await
    }

    pub async fn submit(
        &self,
        request: &CalculationRequest,
        credential: Option<&Credential>,
    ) -> Result<CalculationResult, ClientError> {
        self.authorize(credential)?;
        let _permit = self.gate.try_begin().ok_or(ClientError::InFlight)?;

        log::info!(
            "submitting {} calculation for {}",
            request.calculation_type(),
            request.applicant().name()
        );
        let result = self.service.calculate(request, credential).await;
        match &result {
            Ok(r) => log::info!("certificate {} issued", r.certificate_id()),
            Err(e) => log::warn!("calculation failed: {}", e),
        }
        result
    }

    pub async fn download_certificate(
        &self,
        result: &CalculationResult,
        credential: Option<&Credential>,
    ) -> Result<CertificateDocument, ClientError> {
        self.authorize(credential)?;
        let _permit = self.gate.try_begin().ok_or(ClientError::InFlight)?;

        log::debug!("requesting certificate {}", result.certificate_id());
        self.service.generate_certificate(result, credential).await
    }

    fn authorize(&self, credential: Option<&Credential>) -> Result<(), ClientError> {
        if self.policy == AuthPolicy::Required && credential.is_none() {
            return Err(ClientError::Auth("no active session".to_string()));
        }
        Ok(())
    }
}
