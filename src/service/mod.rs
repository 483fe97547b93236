//! Reference calculation service.
//!
//! Serves the calculation and certificate endpoints on top of the
//! engine. Issued results are kept in memory for the life of the process
//! so a certificate can be generated by id alone.

pub mod certificate;

use crate::core::certificate::{CertificateId, CertificateStamp};
use crate::core::request::{CalculationRequest, CalculationRequestWire};
use crate::core::result::CalculationResult;
use crate::core::validation::ValidationError;
use crate::engine::calculator::Calculator;
use crate::engine::CalculationError;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use certificate::{render_certificate, CERTIFICATE_CONTENT_TYPE};
use chrono::{NaiveDate, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

pub const SERVICE_NAME: &str = "prequal-engine";

/// Failures answered to the caller as `{"detail": "..."}`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Calculation(#[from] CalculationError),

    #[error("malformed request body: {0}")]
    MalformedRequest(String),

    #[error("Certificate {0} not found")]
    UnknownCertificate(CertificateId),

    #[error("Certificate {id} expired on {expired_on}")]
    ExpiredCertificate {
        id: CertificateId,
        expired_on: NaiveDate,
    },

    #[error("Certificate id {body} does not match requested id {path}")]
    CertificateMismatch {
        path: CertificateId,
        body: CertificateId,
    },

    #[error("service I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_)
            | ServiceError::Calculation(_)
            | ServiceError::CertificateMismatch { .. } => StatusCode::BAD_REQUEST,
            ServiceError::MalformedRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::UnknownCertificate(_) => StatusCode::NOT_FOUND,
            ServiceError::ExpiredCertificate { .. } => StatusCode::GONE,
            ServiceError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::warn!("rejected request ({}): {}", status.as_u16(), self);
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// Results issued by this process, by certificate id.
///
/// Entries live until their certificate expires; expired ones are dropped
/// whenever a new result is recorded.
#[derive(Debug, Default)]
pub struct ServiceState {
    issued: RwLock<HashMap<CertificateId, CalculationResult>>,
}

impl ServiceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, result: CalculationResult) {
        self.record_on(result, Utc::now().date_naive()).await
    }

    /// Store `result` and evict every entry that expired before `today`.
    pub async fn record_on(&self, result: CalculationResult, today: NaiveDate) {
        let mut issued = self.issued.write().await;
        let before = issued.len();
        issued.retain(|_, r| r.expiry_date() >= today);
        let evicted = before - issued.len();
        if evicted > 0 {
            log::debug!("evicted {} expired certificate(s)", evicted);
        }
        issued.insert(result.certificate_id().clone(), result);
    }

    pub async fn lookup(&self, id: &CertificateId) -> Result<CalculationResult, ServiceError> {
        self.lookup_on(id, Utc::now().date_naive()).await
    }

    /// A recorded result still valid on `today`.
    pub async fn lookup_on(
        &self,
        id: &CertificateId,
        today: NaiveDate,
    ) -> Result<CalculationResult, ServiceError> {
        match self.issued.read().await.get(id) {
            None => Err(ServiceError::UnknownCertificate(id.clone())),
            Some(r) if r.expiry_date() < today => Err(ServiceError::ExpiredCertificate {
                id: id.clone(),
                expired_on: r.expiry_date(),
            }),
            Some(r) => Ok(r.clone()),
        }
    }

    pub async fn issued_count(&self) -> usize {
        self.issued.read().await.len()
    }
}

pub fn router(state: Arc<ServiceState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/calculate", post(calculate))
        .route(
            "/api/generate-certificate/:certificate_id",
            post(generate_certificate),
        )
        .with_state(state)
}

/// Serve on an already-bound listener until the process stops.
pub async fn serve(listener: TcpListener, state: Arc<ServiceState>) -> Result<(), ServiceError> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("{} listening on http://{}", SERVICE_NAME, addr);
    }
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Bind `addr` and serve with a fresh registry.
pub async fn run(addr: &str) -> Result<(), ServiceError> {
    let listener = TcpListener::bind(addr).await?;
    serve(listener, Arc::new(ServiceState::new())).await
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn calculate(
    State(state): State<Arc<ServiceState>>,
    payload: Result<Json<CalculationRequestWire>, JsonRejection>,
) -> Result<Json<CalculationResult>, ServiceError> {
    let Json(wire) = payload.map_err(|r| ServiceError::MalformedRequest(r.body_text()))?;
    let request = CalculationRequest::try_from(wire)?;

    let stamp = CertificateStamp::issue(Utc::now().date_naive(), request.validity());
    let result = Calculator::calculate(&request, stamp)?;
    log::info!(
        "issued {} certificate {} for {}",
        result.calculation_type(),
        result.certificate_id(),
        result.applicant().name()
    );

    state.record(result.clone()).await;
    Ok(Json(result))
}

async fn generate_certificate(
    State(state): State<Arc<ServiceState>>,
    Path(certificate_id): Path<String>,
    body: Bytes,
) -> Result<Response, ServiceError> {
    let certificate_id = CertificateId::new(certificate_id);

    let result = match echoed_result(&body)? {
        Some(result) if result.certificate_id() != &certificate_id => {
            return Err(ServiceError::CertificateMismatch {
                path: certificate_id,
                body: result.certificate_id().clone(),
            });
        }
        Some(result) => result,
        None => state.lookup(&certificate_id).await?,
    };

    log::debug!("rendering certificate {}", certificate_id);
    let disposition = format!(
        "attachment; filename=\"Pre-Qualification_Certificate_{}.txt\"",
        certificate_id
    );
    Ok((
        [
            (header::CONTENT_TYPE, CERTIFICATE_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        render_certificate(&result),
    )
        .into_response())
}

/// The result echoed in a certificate request body, if any.
///
/// An empty body or `{}` means "look it up".
fn echoed_result(body: &[u8]) -> Result<Option<CalculationResult>, ServiceError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| ServiceError::MalformedRequest(e.to_string()))?;
    if value.as_object().map_or(false, |o| o.is_empty()) {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| ServiceError::MalformedRequest(e.to_string()))
}
