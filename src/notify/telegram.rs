use crate::config::TelegramConfig;
use crate::notify::{MessageTransport, NotifyError};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

const PARSE_MODE: &str = "HTML";

/// Upper bound on reading an error body for its `description`.
const ERROR_BODY_TIMEOUT: Duration = Duration::from_secs(2);

/// Sends messages through the Telegram Bot API `sendMessage` method.
#[derive(Debug, Clone)]
pub struct TelegramTransport {
    client: reqwest::Client,
    config: TelegramConfig,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    description: Option<String>,
}

impl TelegramTransport {
    pub fn new(config: TelegramConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_base.trim_end_matches('/'),
            self.config.token.expose_secret()
        )
    }
}

#[async_trait]
impl MessageTransport for TelegramTransport {
    async fn send_message(&self, text: &str, destination: &str) -> Result<(), NotifyError> {
        // Post the form. This returns as soon as the status line and headers are in.
        let response = self
            .client
            .post(self.endpoint())
            .form(&[("chat_id", destination), ("text", text), ("parse_mode", PARSE_MODE)])
            .send()
            .await
            .map_err(|e| NotifyError::Http(e.without_url()))?;

        let status = response.status();
        debug!("Telegram responded with {}", status);

        // Success is decided by the status alone. The body is dropped unread.
        if status.is_success() {
            return Ok(());
        }

        // On failure, try briefly to pick up Telegram's `description`.
        let description = match timeout(ERROR_BODY_TIMEOUT, response.json::<ErrorBody>()).await {
            Ok(Ok(body)) => body.description,
            Ok(Err(_)) => None,
            Err(_) => {
                warn!("Timed out reading Telegram error body");
                None
            }
        };
        Err(NotifyError::Status {
            status: status.as_u16(),
            description,
        })
    }
}
