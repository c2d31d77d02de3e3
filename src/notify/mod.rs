pub mod demo_request;
pub mod error;
pub mod telegram;

use crate::config::NotificationChannels;
use async_trait::async_trait;
use tracing::{info, instrument, warn};

pub use crate::notify::demo_request::DemoRequest;
pub use crate::notify::error::NotifyError;

/// Delivers a text message to one chat.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send_message(&self, text: &str, destination: &str) -> Result<(), NotifyError>;
}

/// Formats events and sends each one through the transport exactly once. Nothing is retried.
pub struct Dispatcher<T> {
    transport: T,
    channels: NotificationChannels,
}

impl<T: MessageTransport> Dispatcher<T> {
    pub fn new(transport: T, channels: NotificationChannels) -> Self {
        Self { transport, channels }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn channels(&self) -> &NotificationChannels {
        &self.channels
    }

    #[instrument(skip(self, message))]
    pub async fn send_message(&self, message: &str, destination: &str) -> Result<(), NotifyError> {
        info!("Sending message to `{}`", destination);
        match self.transport.send_message(message, destination).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Failed to send message to `{}`: {}", destination, e);
                Err(e)
            }
        }
    }

    #[instrument(skip_all)]
    pub async fn notify_new_demo_request(&self, request: &DemoRequest) -> Result<(), NotifyError> {
        let message = request.render();
        self.send_message(&message, &self.channels.demo_requests).await
    }
}
