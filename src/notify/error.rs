use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    /// The request never produced a response. The URL is stripped because it embeds the bot token.
    #[error("failed to reach messaging API: {0}")]
    Http(#[from] reqwest::Error),

    #[error(
        "messaging API returned HTTP {status}: {}",
        .description.as_deref().unwrap_or("no description")
    )]
    Status {
        status: u16,
        description: Option<String>,
    },
}
