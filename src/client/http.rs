use crate::client::credential::Credential;
use crate::client::{
    certificate_file_name, CalculationService, CertificateDocument, ClientError,
    CALCULATION_FAILED, CERTIFICATE_FAILED,
};
use crate::core::request::CalculationRequest;
use crate::core::result::CalculationResult;
use async_trait::async_trait;
use reqwest::{header, RequestBuilder, Response, StatusCode};
use std::time::Duration;

/// Used when no timeout is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`CalculationService`] over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpCalculationClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpCalculationClient {
    /// `base_url` is the service root, e.g. `http://127.0.0.1:8001`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport_error)?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post(&self, path: &str, credential: Option<&Credential>) -> RequestBuilder {
        let builder = self.http.post(format!("{}{}", self.base_url, path));
        match credential {
            Some(c) => builder.bearer_auth(c.token()),
            None => builder,
        }
    }
}

#[async_trait]
impl CalculationService for HttpCalculationClient {
    async fn calculate(
        &self,
        request: &CalculationRequest,
        credential: Option<&Credential>,
    ) -> Result<CalculationResult, ClientError> {
        let response = self
            .post("/api/calculate", credential)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;
        let response = ensure_success(response, CALCULATION_FAILED).await?;
        let status = response.status();

        response.json::<CalculationResult>().await.map_err(|e| {
            log::warn!("undecodable calculation response: {}", e);
            ClientError::Service {
                status: status.as_u16(),
                message: CALCULATION_FAILED.to_string(),
            }
        })
    }

    async fn generate_certificate(
        &self,
        result: &CalculationResult,
        credential: Option<&Credential>,
    ) -> Result<CertificateDocument, ClientError> {
        let path = format!("/api/generate-certificate/{}", result.certificate_id());
        let response = self
            .post(&path, credential)
            .json(result)
            .send()
            .await
            .map_err(transport_error)?;
        let response = ensure_success(response, CERTIFICATE_FAILED).await?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = response.bytes().await.map_err(transport_error)?;

        Ok(CertificateDocument {
            file_name: certificate_file_name(result.certificate_id(), &content_type),
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}

fn transport_error(err: reqwest::Error) -> ClientError {
    let message = if err.is_timeout() {
        "the request timed out".to_string()
    } else {
        err.to_string()
    };
    ClientError::Transport { message }
}

/// Pass 2xx responses through; turn anything else into a user-facing error.
async fn ensure_success(response: Response, fallback: &str) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| fallback.to_string());
    log::debug!("service answered {}: {}", status, body);

    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Auth(message));
    }
    Err(ClientError::Service {
        status: status.as_u16(),
        message,
    })
}

/// The service's own explanation: `message`, else `detail`, when either is a string.
pub fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "detail"]
        .iter()
        .filter_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .find(|s| !s.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_message_over_detail() {
        assert_eq!(
            error_message(r#"{"message":"first","detail":"second"}"#).as_deref(),
            Some("first")
        );
        assert_eq!(
            error_message(r#"{"detail":"Monthly obligations exceed affordable debt service"}"#)
                .as_deref(),
            Some("Monthly obligations exceed affordable debt service")
        );
    }

    #[test]
    fn test_error_message_ignores_structured_detail() {
        assert_eq!(error_message(r#"{"detail":[{"loc":["body"],"msg":"x"}]}"#), None);
        assert_eq!(error_message("Internal Server Error"), None);
        assert_eq!(error_message(r#"{"message":"  "}"#), None);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = HttpCalculationClient::new("http://localhost:8001/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8001");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_retryable_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            HttpCalculationClient::new(format!("http://{}", addr), Duration::from_secs(2)).unwrap();
        let err = client
            .calculate(&sample_request(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport { .. }));
        assert!(err.is_retryable());
    }

    fn sample_request() -> CalculationRequest {
        use crate::core::applicant::Applicant;
        use crate::core::request::{LoanInput, LoanTerms, PaymentInput, TermYears};
        use rust_decimal_macros::dec;

        let terms = LoanTerms::new(dec!(0.05), TermYears::new(10).unwrap(), 0).unwrap();
        let input = PaymentInput::new(dec!(10_000), terms).unwrap();
        CalculationRequest::new(Applicant::new("Sam"), LoanInput::Payment(input)).unwrap()
    }
}
