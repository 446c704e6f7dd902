use std::path::PathBuf;

/// Process configuration, read once at startup. Each notification channel is
/// independently optional: a missing credential disables that channel only.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub store_url: String,
    /// Shared secret for webhook signature verification.
    pub api_secret: String,
    pub snapshot_path: PathBuf,
    pub low_stock_threshold: i64,
    pub slack: SlackConfig,
    pub notion: NotionConfig,
}

#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub bot_token: Option<String>,
    pub webhook_url: Option<String>,
    pub channel_id: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub api_key: Option<String>,
    pub database_id: Option<String>,
    pub api_base: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("BIND_ADDR")
            && !value.is_empty()
        {
            config.bind_addr = value;
        }
        if let Ok(value) = std::env::var("SHOPIFY_STORE_URL") {
            config.store_url = value;
        }
        if let Ok(value) = std::env::var("SHOPIFY_API_SECRET") {
            config.api_secret = value;
        }
        if let Ok(value) = std::env::var("WEBHOOK_DB_PATH")
            && !value.is_empty()
        {
            config.snapshot_path = PathBuf::from(value);
        }
        if let Ok(value) = std::env::var("LOW_STOCK_THRESHOLD")
            && let Ok(parsed) = value.parse::<i64>()
        {
            config.low_stock_threshold = parsed;
        }

        config.slack.bot_token = configured("SLACK_BOT_TOKEN");
        config.slack.webhook_url = configured("SLACK_WEBHOOK_URL");
        if let Some(value) = configured("SLACK_CHANNEL_ID") {
            config.slack.channel_id = value;
        }
        config.notion.api_key = configured("NOTION_API_KEY");
        config.notion.database_id = configured("NOTION_DATABASE_ID");

        config
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:12321".to_string(),
            store_url: String::new(),
            api_secret: String::new(),
            snapshot_path: PathBuf::from("data/webhooks.json"),
            low_stock_threshold: 10,
            slack: SlackConfig::default(),
            notion: NotionConfig::default(),
        }
    }
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            webhook_url: None,
            channel_id: "general".to_string(),
            api_base: "https://slack.com".to_string(),
        }
    }
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            database_id: None,
            api_base: "https://api.notion.com".to_string(),
        }
    }
}

// Treats template placeholders left in a .env file as unset.
fn configured(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .filter(|value| !value.is_empty() && !value.contains("YOUR_"))
}
