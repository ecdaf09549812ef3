//! WhatsApp Business API channel

use super::DeliveryChannel;
use crate::config::ApiCredentials;
use crate::error::{Error, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::info;

type CredentialSource = Box<dyn Fn() -> Result<ApiCredentials>>;

/// Sends synchronously over HTTP. Credentials are resolved on every send.
pub struct ApiChannel {
    client: Client,
    credentials: CredentialSource,
}

impl ApiChannel {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client))
    }

    /// Use a prebuilt client; credentials still come from the environment
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            credentials: Box::new(ApiCredentials::from_env),
        }
    }

    /// Replace where credentials come from
    pub fn with_credentials<F>(mut self, source: F) -> Self
    where
        F: Fn() -> Result<ApiCredentials> + 'static,
    {
        self.credentials = Box::new(source);
        self
    }
}

/// JSON body for a plain text message
pub fn request_body(recipient: &str, message: &str, sender_id: &str) -> Value {
    json!({
        "messaging_product": "whatsapp",
        "to": recipient,
        "type": "text",
        "text": { "body": message },
        "sender": sender_id,
    })
}

impl DeliveryChannel for ApiChannel {
    fn name(&self) -> &'static str {
        "api"
    }

    fn send(&self, recipient: &str, message: &str, dry_run: bool) -> Result<()> {
        if dry_run {
            info!("[DRY-RUN][API] Would send to number: {}", recipient);
            return Ok(());
        }

        let creds = (self.credentials)()?;

        let response = self
            .client
            .post(&creds.url)
            .bearer_auth(&creds.token)
            .json(&request_body(recipient, message, &creds.sender_id))
            .send()?;

        let status = response.status();
        if status == StatusCode::OK {
            info!("API message sent to {}", recipient);
            return Ok(());
        }

        let body = response.text().unwrap_or_default();
        Err(Error::Delivery {
            status: status.as_u16(),
            body,
        })
    }
}
