use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default = "default_registry_config")]
    pub registry: RegistryConfig,
    #[serde(default = "default_logging_config")]
    pub logging: LoggingConfig,
    #[serde(default = "default_schedule_config")]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Telegram user id of the single administrator
    #[serde(default)]
    pub admin_id: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RegistryConfig {
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    /// Log file, also served to the administrator as a document
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ScheduleConfig {
    #[serde(default = "default_page_url")]
    pub page_url: String,
    /// Origin used to absolutize relative image paths
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl ScheduleConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("app.db")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("app.log")
}

fn default_page_url() -> String {
    "https://nklpis.ru/student/obrazovanie/raspisanije2/".to_string()
}

fn default_base_url() -> String {
    "https://nklpis.ru".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_registry_config() -> RegistryConfig {
    RegistryConfig {
        database_path: default_db_path(),
    }
}

fn default_logging_config() -> LoggingConfig {
    LoggingConfig {
        file: default_log_file(),
    }
}

fn default_schedule_config() -> ScheduleConfig {
    ScheduleConfig {
        page_url: default_page_url(),
        base_url: default_base_url(),
        fetch_timeout_secs: default_fetch_timeout_secs(),
    }
}

impl Config {
    /// Load the TOML file (if it exists), then apply `BOT_TOKEN` / `ADMIN`
    /// from the environment or a `.env` file.
    pub fn load(path: &Path) -> Result<Self> {
        // A missing .env is the normal case outside local development
        dotenvy::dotenv().ok();

        let content = if path.exists() {
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?
        } else {
            String::new()
        };

        let mut config = Self::parse(&content)?;
        config.apply_env_overrides(
            std::env::var("BOT_TOKEN").ok(),
            std::env::var("ADMIN").ok(),
        )?;
        config.validate()?;
        Ok(config)
    }

    fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    fn apply_env_overrides(
        &mut self,
        bot_token: Option<String>,
        admin: Option<String>,
    ) -> Result<()> {
        if let Some(token) = bot_token.filter(|t| !t.is_empty()) {
            self.telegram.bot_token = token;
        }
        if let Some(admin) = admin.filter(|a| !a.is_empty()) {
            self.telegram.admin_id = admin
                .trim()
                .parse()
                .with_context(|| format!("Failed to parse ADMIN id: {}", admin))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.is_empty() {
            anyhow::bail!("Bot token is not set (telegram.bot_token or BOT_TOKEN)");
        }
        if self.telegram.admin_id == 0 {
            anyhow::bail!("Administrator id is not set (telegram.admin_id or ADMIN)");
        }
        Ok(())
    }
}
