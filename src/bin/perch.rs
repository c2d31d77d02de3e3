use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use perch::config::{NotificationChannelsBuilder, PerchConfig, PerchConfigBuilder, TelegramConfig};
use perch::notify::DemoRequest;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The SQLite database holding preferences. Created if it does not exist.
    #[arg(long, default_value = "perch.db")]
    database: PathBuf,

    /// Override the Telegram Bot API base URL.
    #[arg(long)]
    api_base: Option<String>,

    /// The chat that receives demo request notifications.
    #[arg(long, env = "PERCH_DEMO_REQUESTS_CHAT", default_value = "")]
    demo_requests_chat: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read or write preferences.
    #[command(subcommand)]
    Pref(PrefCommand),

    /// Send chat notifications.
    #[command(subcommand)]
    Notify(NotifyCommand),
}

#[derive(Subcommand, Debug)]
enum PrefCommand {
    /// Print the value stored under a key.
    Get {
        key: String,

        /// Printed when the key has never been set.
        #[arg(long)]
        default: Option<String>,
    },

    /// Store a value, replacing any previous one.
    Set { key: String, value: String },
}

#[derive(Subcommand, Debug)]
enum NotifyCommand {
    /// Send a raw message to a chat.
    Send {
        #[arg(long)]
        chat: String,

        text: String,
    },

    /// Announce a new demo request on the demo requests chat.
    DemoRequest {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        country: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .context("Configure tracing")?;

    let args = Args::parse();
    let config = build_config(&args)?;

    match args.command {
        Command::Pref(PrefCommand::Get { key, default }) => {
            let prefs = config.preferences().await?;
            if let Some(value) = prefs.get(&key, default.as_deref()).await? {
                println!("{}", value);
            }
        }
        Command::Pref(PrefCommand::Set { key, value }) => {
            let prefs = config.preferences().await?;
            prefs.set(&key, &value).await?;
        }
        Command::Notify(NotifyCommand::Send { chat, text }) => {
            config.dispatcher()?.send_message(&text, &chat).await?;
        }
        Command::Notify(NotifyCommand::DemoRequest { name, email, phone, country }) => {
            anyhow::ensure!(
                !config.channels.demo_requests.is_empty(),
                "--demo-requests-chat (or PERCH_DEMO_REQUESTS_CHAT) is required"
            );
            let request = DemoRequest::new(name, email, phone, country);
            config.dispatcher()?.notify_new_demo_request(&request).await?;
        }
    }

    Ok(())
}

fn build_config(args: &Args) -> anyhow::Result<PerchConfig> {
    let channels = NotificationChannelsBuilder::default()
        .demo_requests(args.demo_requests_chat.clone())
        .build()?;

    let mut builder = PerchConfigBuilder::default();
    builder.database(args.database.clone()).channels(channels);

    // The token is only needed, and only read, for notifications.
    if matches!(args.command, Command::Notify(_)) {
        let mut telegram = TelegramConfig::from_env()?;
        if let Some(api_base) = &args.api_base {
            telegram.api_base = api_base.clone();
        }
        builder.telegram(telegram);
    }

    Ok(builder.build()?)
}
