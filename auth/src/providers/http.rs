//! HTTP gateway to the portal verifier API.
//!
//! Implements every provider trait against the backend's JSON endpoints.
//! The backend keeps all secrets: codes never appear in responses, and
//! the session credential is a cookie managed by the HTTP client.

use crate::config::PortalAuthConfig;
use crate::error::{AuthFlowError, Result};
use crate::input::{LastFour, OneTimeCode};
use crate::providers::{
    ChallengeReceipt, CustomerDirectory, EmailChannel, RegistrationReceipt, RegistrationService,
    SessionStore, SmsChannel, WholesalerDirectory,
};
use crate::state::{
    AuthSession, Channel, CustomerId, CustomerRecord, RegistrationRequest, WholesalerId,
    WholesalerProfile,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// HTTP client for the portal verifier API.
///
/// Sessions ride on an opaque cookie, so hosts that want session
/// restoration must supply a cookie-keeping `reqwest::Client` via
/// [`PortalApiClient::with_http_client`].
#[derive(Debug, Clone)]
pub struct PortalApiClient {
    base_url: String,
    http_client: reqwest::Client,
    config: PortalAuthConfig,
}

impl PortalApiClient {
    /// Create a client for the API at `base_url`.
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            http_client: reqwest::Client::new(),
            config: PortalAuthConfig::new(),
        }
    }

    /// Use a custom HTTP client (cookie store, proxies, timeouts).
    #[must_use]
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = http_client;
        self
    }

    /// Override the code lifetimes used when a response omits its expiry.
    #[must_use]
    pub fn with_config(mut self, config: PortalAuthConfig) -> Self {
        self.config = config;
        self
    }

    fn receipt_for(&self, channel: Channel, stated: Option<DateTime<Utc>>) -> ChallengeReceipt {
        ChallengeReceipt {
            expires_at: stated.unwrap_or_else(|| Utc::now() + self.config.code_ttl(channel)),
        }
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Portal API request failed");
            return Err(classify_error(status, &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AuthFlowError::Transport(e.to_string()))
    }

    async fn expect_success(response: reqwest::Response) -> Result<()> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Portal API request failed");
            return Err(classify_error(status, &body));
        }

        Ok(())
    }
}

/// Map a failed response onto the flow error taxonomy.
///
/// The machine-readable `code` field wins when present; otherwise the
/// HTTP status decides. Message text is never branched on.
fn classify_error(status: reqwest::StatusCode, body: &str) -> AuthFlowError {
    let parsed: Option<ApiErrorBody> = serde_json::from_str(body).ok();

    if let Some(error_body) = &parsed {
        match error_body.code.as_deref() {
            Some("customer_not_found") => return AuthFlowError::CustomerNotFound,
            Some("ambiguous_match") => return AuthFlowError::AmbiguousMatch,
            Some("invalid_code") => return AuthFlowError::InvalidCode,
            Some("expired_code") => return AuthFlowError::ExpiredCode,
            Some("sms_delivery_failed") => {
                return AuthFlowError::DeliveryFailed {
                    channel: Channel::Sms,
                }
            }
            Some("email_delivery_failed") => {
                return AuthFlowError::DeliveryFailed {
                    channel: Channel::Email,
                }
            }
            Some("validation_error") => {
                return AuthFlowError::Validation(
                    error_body
                        .message
                        .clone()
                        .unwrap_or_else(|| "Invalid request".to_string()),
                )
            }
            _ => {}
        }
    }

    match status.as_u16() {
        404 => AuthFlowError::CustomerNotFound,
        409 => AuthFlowError::AmbiguousMatch,
        400 => AuthFlowError::Validation(
            parsed
                .and_then(|b| b.message)
                .unwrap_or_else(|| "Invalid request".to_string()),
        ),
        _ => AuthFlowError::Transport(format!("HTTP {status}")),
    }
}

impl WholesalerDirectory for PortalApiClient {
    fn resolve(
        &self,
        wholesaler_id: WholesalerId,
    ) -> impl Future<Output = Result<Option<WholesalerProfile>>> + Send {
        let client = self.clone();

        async move {
            let response = client
                .http_client
                .get(format!(
                    "{}/api/marketplace/wholesaler/{}",
                    client.base_url, wholesaler_id
                ))
                .send()
                .await
                .map_err(|e| AuthFlowError::Transport(e.to_string()))?;

            // An unknown wholesaler is a degrade case, not an error.
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Ok(None);
            }

            let raw: WholesalerProfileResponse = Self::parse(response).await?;
            Ok(Some(raw.into()))
        }
    }
}

impl SessionStore for PortalApiClient {
    fn check_session(
        &self,
        wholesaler_id: WholesalerId,
    ) -> impl Future<Output = Result<Option<AuthSession>>> + Send {
        let client = self.clone();

        async move {
            let response = client
                .http_client
                .get(format!(
                    "{}/api/customer-auth/check/{}",
                    client.base_url, wholesaler_id
                ))
                .send()
                .await
                .map_err(|e| AuthFlowError::Transport(e.to_string()))?;

            let raw: CheckSessionResponse = Self::parse(response).await?;
            match raw.customer {
                Some(customer) if raw.authenticated => Ok(Some(AuthSession {
                    customer: customer.into(),
                    wholesaler_id,
                    authenticated_at: Utc::now(),
                })),
                _ => Ok(None),
            }
        }
    }
}

impl CustomerDirectory for PortalApiClient {
    fn match_last_four(
        &self,
        wholesaler_id: WholesalerId,
        last_four: &LastFour,
    ) -> impl Future<Output = Result<CustomerRecord>> + Send {
        let client = self.clone();
        let payload = PhoneChallengeRequest {
            wholesaler_id,
            last_four_digits: last_four.as_str().to_string(),
        };

        async move {
            let response = client
                .http_client
                .post(format!("{}/api/customer-auth/verify", client.base_url))
                .json(&payload)
                .send()
                .await
                .map_err(|e| AuthFlowError::Transport(e.to_string()))?;

            let raw: CustomerEnvelope = Self::parse(response).await?;
            Ok(raw.customer.into())
        }
    }
}

impl SmsChannel for PortalApiClient {
    fn request_code(
        &self,
        wholesaler_id: WholesalerId,
        last_four: &LastFour,
    ) -> impl Future<Output = Result<ChallengeReceipt>> + Send {
        let client = self.clone();
        let payload = PhoneChallengeRequest {
            wholesaler_id,
            last_four_digits: last_four.as_str().to_string(),
        };

        async move {
            let response = client
                .http_client
                .post(format!("{}/api/customer-auth/request-sms", client.base_url))
                .json(&payload)
                .send()
                .await
                .map_err(|e| AuthFlowError::Transport(e.to_string()))?;

            let raw: IssueCodeResponse = Self::parse(response).await?;
            Ok(client.receipt_for(Channel::Sms, raw.expires_at))
        }
    }

    fn verify_code(
        &self,
        wholesaler_id: WholesalerId,
        last_four: &LastFour,
        code: &OneTimeCode,
    ) -> impl Future<Output = Result<CustomerRecord>> + Send {
        let client = self.clone();
        let payload = VerifySmsRequest {
            wholesaler_id,
            last_four_digits: last_four.as_str().to_string(),
            sms_code: code.as_str().to_string(),
        };

        async move {
            let response = client
                .http_client
                .post(format!("{}/api/customer-auth/verify-sms", client.base_url))
                .json(&payload)
                .send()
                .await
                .map_err(|e| AuthFlowError::Transport(e.to_string()))?;

            let raw: CustomerEnvelope = Self::parse(response).await?;
            Ok(raw.customer.into())
        }
    }
}

impl EmailChannel for PortalApiClient {
    fn send_code(
        &self,
        customer_id: CustomerId,
        email: &str,
    ) -> impl Future<Output = Result<ChallengeReceipt>> + Send {
        let client = self.clone();
        let payload = EmailChallengeRequest {
            customer_id,
            email: email.to_string(),
            code: None,
        };

        async move {
            let response = client
                .http_client
                .post(format!(
                    "{}/api/customer-email-verification/send",
                    client.base_url
                ))
                .json(&payload)
                .send()
                .await
                .map_err(|e| AuthFlowError::Transport(e.to_string()))?;

            let raw: IssueCodeResponse = Self::parse(response).await?;
            Ok(client.receipt_for(Channel::Email, raw.expires_at))
        }
    }

    fn verify_code(
        &self,
        customer_id: CustomerId,
        email: &str,
        code: &OneTimeCode,
    ) -> impl Future<Output = Result<()>> + Send {
        let client = self.clone();
        let payload = EmailChallengeRequest {
            customer_id,
            email: email.to_string(),
            code: Some(code.as_str().to_string()),
        };

        async move {
            let response = client
                .http_client
                .post(format!(
                    "{}/api/customer-email-verification/verify",
                    client.base_url
                ))
                .json(&payload)
                .send()
                .await
                .map_err(|e| AuthFlowError::Transport(e.to_string()))?;

            Self::expect_success(response).await
        }
    }
}

impl RegistrationService for PortalApiClient {
    fn submit(
        &self,
        request: &RegistrationRequest,
    ) -> impl Future<Output = Result<RegistrationReceipt>> + Send {
        let client = self.clone();
        let payload = RegistrationWireRequest::from(request);

        async move {
            let response = client
                .http_client
                .post(format!(
                    "{}/api/customer/request-wholesaler-access",
                    client.base_url
                ))
                .json(&payload)
                .send()
                .await
                .map_err(|e| AuthFlowError::Transport(e.to_string()))?;

            let raw: RegistrationResponse = Self::parse(response).await?;
            Ok(RegistrationReceipt {
                message: raw.message,
            })
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Wire Types
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PhoneChallengeRequest {
    wholesaler_id: WholesalerId,
    last_four_digits: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifySmsRequest {
    wholesaler_id: WholesalerId,
    last_four_digits: String,
    sms_code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailChallengeRequest {
    customer_id: CustomerId,
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegistrationWireRequest {
    wholesaler_id: WholesalerId,
    customer_name: String,
    customer_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_message: Option<String>,
}

impl From<&RegistrationRequest> for RegistrationWireRequest {
    fn from(request: &RegistrationRequest) -> Self {
        Self {
            wholesaler_id: request.wholesaler_id,
            customer_name: request.name.clone(),
            customer_phone: request.phone.clone(),
            customer_email: request.email.clone(),
            business_name: request.business_name.clone(),
            request_message: request.message.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WholesalerProfileResponse {
    id: uuid::Uuid,
    business_name: String,
    logo_url: Option<String>,
}

impl From<WholesalerProfileResponse> for WholesalerProfile {
    fn from(raw: WholesalerProfileResponse) -> Self {
        Self {
            id: WholesalerId(raw.id),
            business_name: raw.business_name,
            logo_url: raw.logo_url,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCustomer {
    id: uuid::Uuid,
    name: String,
    phone: String,
    email: Option<String>,
    wholesaler_id: uuid::Uuid,
}

impl From<RawCustomer> for CustomerRecord {
    fn from(raw: RawCustomer) -> Self {
        Self {
            id: CustomerId(raw.id),
            name: raw.name,
            phone: raw.phone,
            email: raw.email,
            wholesaler_id: WholesalerId(raw.wholesaler_id),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CustomerEnvelope {
    customer: RawCustomer,
}

#[derive(Debug, Deserialize)]
struct CheckSessionResponse {
    authenticated: bool,
    customer: Option<RawCustomer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueCodeResponse {
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegistrationResponse {
    message: String,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_classify_error_prefers_machine_code() {
        let error = classify_error(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"code":"expired_code","message":"whatever"}"#,
        );
        assert_eq!(error, AuthFlowError::ExpiredCode);

        let error = classify_error(
            reqwest::StatusCode::NOT_FOUND,
            r#"{"code":"ambiguous_match"}"#,
        );
        assert_eq!(error, AuthFlowError::AmbiguousMatch);
    }

    #[test]
    fn test_classify_error_status_fallbacks() {
        assert_eq!(
            classify_error(reqwest::StatusCode::NOT_FOUND, ""),
            AuthFlowError::CustomerNotFound
        );
        assert_eq!(
            classify_error(reqwest::StatusCode::CONFLICT, "not json"),
            AuthFlowError::AmbiguousMatch
        );
        assert!(matches!(
            classify_error(reqwest::StatusCode::BAD_REQUEST, ""),
            AuthFlowError::Validation(_)
        ));
        assert!(matches!(
            classify_error(reqwest::StatusCode::INTERNAL_SERVER_ERROR, ""),
            AuthFlowError::Transport(_)
        ));
    }

    #[test]
    fn test_classify_error_delivery_codes() {
        let error = classify_error(
            reqwest::StatusCode::BAD_GATEWAY,
            r#"{"code":"sms_delivery_failed"}"#,
        );
        assert_eq!(
            error,
            AuthFlowError::DeliveryFailed {
                channel: Channel::Sms
            }
        );
    }

    #[test]
    fn test_session_response_shapes() {
        let raw: CheckSessionResponse =
            serde_json::from_str(r#"{"authenticated":false}"#).unwrap();
        assert!(!raw.authenticated);
        assert!(raw.customer.is_none());

        let raw: CheckSessionResponse = serde_json::from_str(
            r#"{
                "authenticated": true,
                "customer": {
                    "id": "7f1a0c1e-2b3d-4e5f-8a9b-0c1d2e3f4a5b",
                    "name": "Jane",
                    "phone": "0501234821",
                    "wholesalerId": "1f1a0c1e-2b3d-4e5f-8a9b-0c1d2e3f4a5b"
                }
            }"#,
        )
        .unwrap();
        assert!(raw.authenticated);
        let customer: CustomerRecord = raw.customer.unwrap().into();
        assert_eq!(customer.name, "Jane");
        assert!(customer.email.is_none());
    }

    #[test]
    fn test_issue_response_tolerates_empty_body() {
        let raw: IssueCodeResponse = serde_json::from_str("{}").unwrap();
        assert!(raw.expires_at.is_none());

        let raw: IssueCodeResponse =
            serde_json::from_str(r#"{"expiresAt":"2025-01-01T00:05:00Z"}"#).unwrap();
        assert!(raw.expires_at.is_some());
    }

    #[test]
    fn test_registration_wire_field_names() {
        let request = RegistrationRequest {
            wholesaler_id: WholesalerId::new(),
            name: "Jane".to_string(),
            phone: "0501234821".to_string(),
            email: None,
            business_name: Some("Jane's Cafe".to_string()),
            message: None,
        };

        let wire = RegistrationWireRequest::from(&request);
        let json = serde_json::to_value(&wire).unwrap();

        assert_eq!(json["customerName"], "Jane");
        assert_eq!(json["customerPhone"], "0501234821");
        assert_eq!(json["businessName"], "Jane's Cafe");
        // Absent optionals are omitted, not serialized as null.
        assert!(json.get("customerEmail").is_none());
        assert!(json.get("requestMessage").is_none());
    }

    #[test]
    fn test_receipt_synthesizes_expiry_from_config() {
        let client = PortalApiClient::new("http://localhost:3000".to_string());

        let before = Utc::now();
        let receipt = client.receipt_for(Channel::Sms, None);
        assert!(receipt.expires_at >= before + chrono::Duration::seconds(299));
        assert!(receipt.expires_at <= Utc::now() + chrono::Duration::seconds(300));

        let stated = Utc::now() + chrono::Duration::seconds(42);
        let receipt = client.receipt_for(Channel::Email, Some(stated));
        assert_eq!(receipt.expires_at, stated);
    }
}
