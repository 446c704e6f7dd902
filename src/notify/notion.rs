use std::time::Duration;

use reqwest::Client;
use serde_json::{Value, json};

use crate::config::NotionConfig;

use super::slack::ChannelError;

const NOTION_VERSION: &str = "2022-06-28";

/// Structured-document log client: one page per event in a Notion database.
pub struct NotionClient {
    client: Client,
    api_key: Option<String>,
    database_id: Option<String>,
    api_base: String,
}

impl NotionClient {
    pub fn new(config: &NotionConfig) -> Result<Self, ChannelError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            database_id: config.database_id.clone(),
            api_base: config.api_base.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn has_database(&self) -> bool {
        self.database_id.is_some()
    }

    pub async fn create_record(&self, properties: Value) -> Result<Value, ChannelError> {
        let (Some(api_key), Some(database_id)) = (&self.api_key, &self.database_id) else {
            return Err(ChannelError::NotConfigured);
        };

        let body = json!({
            "parent": { "database_id": database_id },
            "properties": properties,
        });
        let response = self
            .client
            .post(format!("{}/v1/pages", self.api_base))
            .bearer_auth(api_key)
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ChannelError::UnexpectedStatus(status.as_u16(), text));
        }
        Ok(response.json().await?)
    }
}
