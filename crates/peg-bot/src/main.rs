//! Peg Bot - Main entry point.

use anyhow::Context;
use peg_bot::config::{Config, LogFormat, WebexConfig};
use peg_bot::{AppResult, BotIdentity, Collaborators, Dispatcher, InFlight, InboundMessage};
use peg_store::{PegStore, Settings};
use std::sync::Arc;
use tokio::signal;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use webex_client::{Message, MessageReceiver, WebexClient};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.bot.log_level, config.bot.log_format);

    info!("Starting Peg Bot...");

    let webex = WebexClient::new(
        &config.webex.base_url,
        &config.webex.access_token,
        config.webex.timeout,
    )
    .context("Failed to create Webex client")?;

    if !webex.health_check().await {
        error!("Webex API not reachable at {}", config.webex.base_url);
        return Err(anyhow::anyhow!("Webex API not reachable").into());
    }
    info!("Webex API healthy");

    let bot = resolve_identity(&webex, &config.webex).await?;
    info!("Running as {} ({})", bot.display_name, bot.id);

    let store = PegStore::open(config.pegs.data_path.clone()).await?;

    let settings = Arc::new(Settings::new());
    config.seed_settings(&settings);

    let collaborators = Collaborators {
        bot: bot.clone(),
        store,
        settings,
        members: Arc::new(webex.clone()),
    };

    // Registries are validated here; a broken registry stops startup.
    let dispatcher = Arc::new(Dispatcher::from_collaborators(&collaborators)?);

    if config.webex.rooms.0.is_empty() {
        warn!("No rooms configured - set WEBEX__ROOMS to start receiving messages");
    }
    info!("Listening for messages...");

    let receiver = MessageReceiver::new(
        webex.clone(),
        config.webex.rooms.to_vec(),
        bot.id.clone(),
        config.webex.poll_interval,
    );
    let mut stream = Box::pin(receiver.stream());
    let mut in_flight = InFlight::new();

    // Main message loop
    loop {
        tokio::select! {
            Some(message) = stream.next() => {
                let dispatcher = dispatcher.clone();
                let webex = webex.clone();
                in_flight.spawn(async move {
                    handle_message(&dispatcher, &webex, message).await;
                });
            }
            _ = in_flight.reap() => {}
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!("Shutting down...");
    in_flight.drain().await;
    Ok(())
}

async fn handle_message(dispatcher: &Dispatcher, webex: &WebexClient, message: Message) {
    let Some(inbound) = InboundMessage::from_webex(&message) else {
        debug!("Skipping message {} without text", message.id);
        return;
    };

    let reply = dispatcher.dispatch(&inbound, &message.room_id).await;
    let request = reply.into_request(&message.room_id);

    if let Err(e) = webex.send(&request).await {
        error!("Failed to send reply to {}: {}", message.id, e);
    }
}

/// Use the configured identity, asking the API for whatever is missing.
async fn resolve_identity(webex: &WebexClient, config: &WebexConfig) -> AppResult<BotIdentity> {
    if let (Some(id), Some(name)) = (&config.bot_id, &config.bot_name) {
        return Ok(BotIdentity::new(id.as_str(), name.as_str()));
    }

    let me = webex.me().await?;
    Ok(BotIdentity::new(
        config.bot_id.clone().unwrap_or(me.id),
        config.bot_name.clone().unwrap_or(me.display_name),
    ))
}

fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
