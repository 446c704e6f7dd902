use std::time::Duration;

use reqwest::Client;
use serde_json::{Value, json};
use thiserror::Error;

use crate::config::SlackConfig;

use super::format::SlackMessage;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("slack api error: {0}")]
    SlackApi(String),
    #[error("unexpected status {0}: {1}")]
    UnexpectedStatus(u16, String),
    #[error("channel not configured")]
    NotConfigured,
}

/// Chat channel client. Prefers the bot-token Web API (`chat.postMessage`);
/// falls back to an incoming-webhook URL when no token is configured.
pub struct SlackClient {
    client: Client,
    bot_token: Option<String>,
    webhook_url: Option<String>,
    channel_id: String,
    api_base: String,
}

impl SlackClient {
    pub fn new(config: &SlackConfig) -> Result<Self, ChannelError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            client,
            bot_token: config.bot_token.clone(),
            webhook_url: config.webhook_url.clone(),
            channel_id: config.channel_id.clone(),
            api_base: config.api_base.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.bot_token.is_some() || self.webhook_url.is_some()
    }

    pub async fn post(&self, message: &SlackMessage) -> Result<Value, ChannelError> {
        if let Some(token) = &self.bot_token {
            return self.post_message(token, message).await;
        }
        if let Some(url) = &self.webhook_url {
            return self.post_webhook(url, message).await;
        }
        Err(ChannelError::NotConfigured)
    }

    async fn post_message(
        &self,
        token: &str,
        message: &SlackMessage,
    ) -> Result<Value, ChannelError> {
        let body = json!({
            "channel": self.channel_id,
            "text": message.text,
            "attachments": message.attachments,
        });
        let response = self
            .client
            .post(format!("{}/api/chat.postMessage", self.api_base))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        let payload: Value = response.json().await?;

        // The Web API reports failures in-band with ok=false.
        if payload.get("ok").and_then(Value::as_bool) == Some(false) {
            let reason = payload
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            return Err(ChannelError::SlackApi(reason));
        }
        Ok(payload)
    }

    async fn post_webhook(&self, url: &str, message: &SlackMessage) -> Result<Value, ChannelError> {
        let response = self.client.post(url).json(message).send().await?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ChannelError::UnexpectedStatus(status.as_u16(), text));
        }
        // Incoming webhooks answer with a bare "ok" body, not JSON.
        Ok(json!({ "ok": true, "response": text }))
    }
}
