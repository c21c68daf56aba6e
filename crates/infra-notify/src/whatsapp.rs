// WhatsApp notifier over the provider's HTTP send API

use async_trait::async_trait;
use dontq_core::port::{Notifier, NotifyError};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_ENDPOINT: &str = "https://marketing.otpless.app/v1/api/send";
const CHANNEL: &str = "WHATSAPP";

/// Provider settings
#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    pub endpoint: String,
    pub client_id: String,
    pub client_secret: String,
    pub timeout: Duration,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest<'a> {
    send_to: &'a str,
    channel: &'a str,
    message: &'a str,
}

#[derive(Deserialize)]
struct SendResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

pub struct WhatsAppNotifier {
    client: reqwest::Client,
    config: WhatsAppConfig,
}

impl WhatsAppNotifier {
    pub fn new(config: WhatsAppConfig) -> Result<Self, NotifyError> {
        if config.endpoint.trim().is_empty() {
            return Err(NotifyError::Config("endpoint is empty".to_string()));
        }
        if config.client_id.is_empty() || config.client_secret.is_empty() {
            return Err(NotifyError::Config(
                "client_id and client_secret are required".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotifyError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Notifier for WhatsAppNotifier {
    async fn send(&self, destination: &str, body: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .header("clientId", &self.config.client_id)
            .header("clientSecret", &self.config.client_secret)
            .json(&SendRequest {
                send_to: destination,
                channel: CHANNEL,
                message: body,
            })
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(NotifyError::Transport(format!("provider returned {}", status)));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(status = %status, detail = %detail, "Provider refused message");
            return Err(NotifyError::Rejected(format!("{}: {}", status, detail)));
        }

        let parsed: SendResponse = response
            .json()
            .await
            .map_err(|e| NotifyError::Transport(format!("unreadable provider response: {}", e)))?;

        if !parsed.success {
            return Err(NotifyError::Rejected(
                parsed
                    .message
                    .unwrap_or_else(|| "provider reported failure".to_string()),
            ));
        }

        debug!(destination = %destination, "WhatsApp message accepted");
        Ok(())
    }
}
