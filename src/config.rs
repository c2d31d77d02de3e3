use crate::notify::telegram::TelegramTransport;
use crate::notify::Dispatcher;
use crate::preferences::{Preferences, SqlitePreferenceStore};
use anyhow::Context;
use derive_builder::Builder;
use secrecy::SecretString;
use std::path::PathBuf;

pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Clone, Builder)]
pub struct TelegramConfig {
    /// Bot token, as issued by @BotFather.
    #[builder(setter(into))]
    pub token: SecretString,

    /// Base URL of the Bot API. Overridden in tests to point at a local server.
    #[builder(setter(into), default = "DEFAULT_TELEGRAM_API_BASE.to_string()")]
    pub api_base: String,
}

impl TelegramConfig {
    /// Reads the bot token from `TELEGRAM_BOT_TOKEN`.
    pub fn from_env() -> anyhow::Result<Self> {
        let token = std::env::var(TELEGRAM_TOKEN_ENV)
            .with_context(|| format!("`{}` is not set", TELEGRAM_TOKEN_ENV))?;
        anyhow::ensure!(!token.trim().is_empty(), "`{}` is empty", TELEGRAM_TOKEN_ENV);
        Ok(TelegramConfigBuilder::default()
            .token(SecretString::new(token))
            .build()?)
    }
}

/// Fixed destinations, one per notification category.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct NotificationChannels {
    #[builder(setter(into))]
    pub demo_requests: String,
}

#[derive(Debug, Clone, Builder)]
pub struct PerchConfig {
    #[builder(setter(into), default = "PathBuf::from(\"perch.db\")")]
    pub database: PathBuf,

    #[builder(setter(strip_option), default)]
    pub telegram: Option<TelegramConfig>,

    pub channels: NotificationChannels,
}

impl PerchConfig {
    pub async fn preferences(&self) -> anyhow::Result<Preferences<SqlitePreferenceStore>> {
        let filename = self
            .database
            .to_str()
            .with_context(|| format!("Database path `{}` is not valid UTF-8", self.database.display()))?;
        let store = SqlitePreferenceStore::new(filename).await?;
        Ok(Preferences::new(store))
    }

    pub fn dispatcher(&self) -> anyhow::Result<Dispatcher<TelegramTransport>> {
        let telegram = self
            .telegram
            .clone()
            .context("Telegram is not configured")?;
        let transport = TelegramTransport::new(telegram)?;
        Ok(Dispatcher::new(transport, self.channels.clone()))
    }
}
