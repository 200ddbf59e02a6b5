mod commands;
mod config;
mod listing;
mod platform;
mod registry;
mod router;
mod schedule;
#[cfg(test)]
mod testing;
mod texts;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use teloxide::Bot;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::platform::telegram::{self, TelegramTransport};
use crate::registry::UserStore;
use crate::router::Router;
use crate::schedule::{HttpPageSource, ScheduleService};

/// Log to stdout and append the same events, without colors, to `log_file`.
fn init_logging(log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file: {}", log_file.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,schedulebot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    init_logging(&config.logging.file)?;

    info!("Bot started");
    info!("Configuration loaded from: {}", config_path.display());
    info!("  Schedule page: {}", config.schedule.page_url);
    info!("  Database: {}", config.registry.database_path.display());
    info!("  Log file: {}", config.logging.file.display());

    let registry = UserStore::open(&config.registry.database_path)?;
    let page_source = HttpPageSource::new(&config.schedule)?;
    let schedule = ScheduleService::new(Arc::new(page_source), &config.schedule);

    let bot = Bot::new(&config.telegram.bot_token);
    let transport = TelegramTransport::new(bot.clone());

    let router = Arc::new(Router::new(
        config.telegram.admin_id,
        config.logging.file.clone(),
        Arc::new(transport),
        Arc::new(registry),
        schedule,
    ));

    info!("Bot is starting...");
    telegram::run(bot, router).await?;

    Ok(())
}
