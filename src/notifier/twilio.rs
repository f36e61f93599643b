use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{Notifier, NotifyError};

const DEFAULT_API_BASE: &str = "https://api.twilio.com";

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

/// Twilio account and the numbers to send between
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number with country code, e.g. `+18001234567`
    pub from: String,
    /// Recipient number with country code
    pub to: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

/// Sends SMS through the Twilio Messages API
#[derive(Debug, Clone)]
pub struct TwilioNotifier {
    credentials: TwilioCredentials,
    client: Client,
}

impl TwilioNotifier {
    pub fn new(credentials: TwilioCredentials) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            credentials,
            client,
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.credentials.api_base.trim_end_matches('/'),
            self.credentials.account_sid
        )
    }
}

#[async_trait]
impl Notifier for TwilioNotifier {
    async fn send(&self, body: &str) -> Result<(), NotifyError> {
        let form = [
            ("To", self.credentials.to.as_str()),
            ("From", self.credentials.from.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(
                &self.credentials.account_sid,
                Some(&self.credentials.auth_token),
            )
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Twilio error ({}): {}", status, body);
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!("Text message sent to {}", self.credentials.to);
        Ok(())
    }
}
