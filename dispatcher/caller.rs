use std::time::{Duration, Instant};

use async_trait::async_trait;
use lib::types::{BatchId, CallAttemptDetails, Recipient};
use lib::validation::validate_endpoint_url;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Error, Debug)]
pub enum CallInitiatorError {
    #[error("Invalid call endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Fires one outbound call for one recipient. Failures are reported in the
/// returned details, never as an error; a recipient's failure must not
/// abort the group it belongs to.
#[async_trait]
pub trait CallInitiator {
    async fn initiate(
        &self,
        batch_id: &BatchId,
        recipient: &Recipient,
    ) -> CallAttemptDetails;
}

pub struct HttpCallInitiator {
    http_client: reqwest::Client,
    endpoint: Url,
    request_timeout: Duration,
}

impl HttpCallInitiator {
    pub fn new(
        endpoint: &str,
        request_timeout: Duration,
    ) -> Result<Self, CallInitiatorError> {
        validate_endpoint_url(endpoint).map_err(|e| {
            CallInitiatorError::InvalidEndpoint(e.to_string())
        })?;
        let endpoint = Url::parse(endpoint).map_err(|e| {
            CallInitiatorError::InvalidEndpoint(e.to_string())
        })?;

        // It's important to not follow any redirects for security reasons.
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            http_client,
            endpoint,
            request_timeout,
        })
    }
}

/// The call payload carries the recipient's identity under fixed keys and
/// every extra source-list column under its original name. Extra columns
/// never shadow the fixed keys.
fn build_payload(recipient: &Recipient) -> serde_json::Value {
    let mut payload = serde_json::Map::new();
    payload.insert(
        "recipient_id".to_string(),
        serde_json::json!(recipient.recipient_id),
    );
    payload.insert("full_name".to_string(), serde_json::json!(recipient.name));
    payload.insert(
        "phone_number".to_string(),
        serde_json::json!(recipient.phone),
    );
    for (key, value) in &recipient.extra {
        payload.entry(key.clone()).or_insert_with(|| value.clone());
    }
    serde_json::Value::Object(payload)
}

#[async_trait]
impl CallInitiator for HttpCallInitiator {
    #[tracing::instrument(skip_all, fields(
            batch_id = %batch_id,
            recipient_id = %recipient.recipient_id,
            ))]
    async fn initiate(
        &self,
        batch_id: &BatchId,
        recipient: &Recipient,
    ) -> CallAttemptDetails {
        let payload = build_payload(recipient);

        let request_start_time = Instant::now();
        let response = self
            .http_client
            .post(self.endpoint.clone())
            .json(&payload)
            .timeout(self.request_timeout)
            .send()
            .await;
        let latency = request_start_time.elapsed();

        match response {
            | Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    CallAttemptDetails {
                        response_code: Some(status.as_u16() as i32),
                        response_latency_s: latency,
                        response_payload: resp
                            .json::<serde_json::Value>()
                            .await
                            .ok(),
                        error_msg: None,
                    }
                } else {
                    let body = resp.text().await.unwrap_or_default();
                    CallAttemptDetails {
                        response_code: Some(status.as_u16() as i32),
                        response_latency_s: latency,
                        response_payload: None,
                        error_msg: Some(format!(
                            "HTTP {}: {}",
                            status.as_u16(),
                            body
                        )),
                    }
                }
            }
            | Err(e) => {
                let message = if e.is_connect() {
                    "Connection Failed"
                } else if e.is_timeout() {
                    "Request timeout"
                } else {
                    "Request failed"
                }
                .to_string();

                debug!(
                    "Call for recipient '{}' failed with: {:?}",
                    recipient.recipient_id, e
                );

                CallAttemptDetails::with_error(message)
            }
        }
    }
}
