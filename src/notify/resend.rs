//! Resend API client (`POST /emails` with a bearer key).

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument, warn};
use url::Url;

use super::{MailError, Mailer, OutgoingEmail};
use crate::user_agent::service_user_agent;

/// Production API root.
pub const DEFAULT_RESEND_BASE_URL: &str = "https://api.resend.com/";

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

/// Sends mail through Resend.
#[derive(Clone)]
pub struct ResendMailer {
    http: Client,
    endpoint: Url,
    api_key: String,
}

impl fmt::Debug for ResendMailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResendMailer")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl ResendMailer {
    /// Creates a client for `base_url` (normally [`DEFAULT_RESEND_BASE_URL`]).
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Client`] if the HTTP client cannot be built, or
    /// [`MailError::InvalidResponse`] if `base_url` cannot be joined.
    pub fn new(api_key: impl Into<String>, base_url: &Url) -> Result<Self, MailError> {
        let http = Client::builder()
            .user_agent(service_user_agent())
            .build()
            .map_err(MailError::Client)?;
        let endpoint = base_url
            .join("emails")
            .map_err(|e| MailError::InvalidResponse(format!("invalid mail API base URL: {e}")))?;
        Ok(Self {
            http,
            endpoint,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    #[instrument(skip(self, email), fields(subject = %email.subject, recipients = email.to.len()))]
    async fn send(&self, email: &OutgoingEmail) -> Result<String, MailError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await
            .map_err(MailError::Network)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or(body);
            warn!(status = status.as_u16(), message = %message, "mail provider rejected message");
            return Err(MailError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let payload: SendResponse = response
            .json()
            .await
            .map_err(|e| MailError::InvalidResponse(e.to_string()))?;
        info!(email_id = %payload.id, "email sent");
        Ok(payload.id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn email() -> OutgoingEmail {
        OutgoingEmail {
            from: "Library <noreply@example.com>".to_string(),
            to: vec!["admin@example.com".to_string()],
            subject: "New signup".to_string(),
            html: "<p>hi</p>".to_string(),
        }
    }

    async fn mailer(server: &MockServer) -> ResendMailer {
        let base = Url::parse(&format!("{}/", server.uri())).unwrap();
        ResendMailer::new("re_test_key", &base).unwrap()
    }

    #[tokio::test]
    async fn test_send_posts_json_with_bearer_and_returns_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("authorization", "Bearer re_test_key"))
            .and(body_partial_json(serde_json::json!({
                "to": ["admin@example.com"],
                "subject": "New signup"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "msg_123"})))
            .expect(1)
            .mount(&server)
            .await;

        let id = mailer(&server).await.send(&email()).await.unwrap();
        assert_eq!(id, "msg_123");
    }

    #[tokio::test]
    async fn test_send_surfaces_provider_message_on_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "statusCode": 422,
                "name": "validation_error",
                "message": "Invalid `to` field"
            })))
            .mount(&server)
            .await;

        let result = mailer(&server).await.send(&email()).await;
        assert!(matches!(
            result,
            Err(MailError::Rejected { status: 422, ref message }) if message == "Invalid `to` field"
        ));
    }

    #[tokio::test]
    async fn test_send_rejects_response_without_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let result = mailer(&server).await.send(&email()).await;
        assert!(matches!(result, Err(MailError::InvalidResponse(_))));
    }
}
