pub mod format;
pub mod notion;
pub mod rules;
pub mod slack;

use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};

use crate::config::AppConfig;
use crate::types::{Event, Topic};

pub use rules::{Channel, Condition, Priority, Rule};
pub use slack::ChannelError;

use notion::NotionClient;
use slack::SlackClient;

/// Decides, per event, whether and where to notify, and renders a
/// channel-appropriate message.
///
/// Delivery is fire-and-forget: each channel's outcome is collected
/// independently and a failure is recorded in that channel's slot, never
/// retried and never raised to the webhook handler.
pub struct NotificationService {
    slack: SlackClient,
    notion: NotionClient,
    low_stock_threshold: i64,
}

/// Per-channel outcomes for a single dispatched event. A `None` slot means
/// the channel was not in the rule or not configured.
#[derive(Debug, Default, Serialize)]
pub struct NotifyResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slack: Option<ChannelOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notion: Option<ChannelOutcome>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ChannelOutcome {
    Delivered(Value),
    Error { error: String },
}

impl ChannelOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, ChannelOutcome::Delivered(_))
    }
}

/// Snapshot of channel availability and the rule table, for the status
/// endpoint.
#[derive(Debug, Serialize)]
pub struct ChannelStatus {
    pub slack: bool,
    pub notion: bool,
    pub rules: Vec<RuleStatus>,
}

#[derive(Debug, Serialize)]
pub struct RuleStatus {
    pub topic: Topic,
    pub enabled: bool,
    pub priority: Priority,
    pub channels: Vec<Channel>,
}

impl NotificationService {
    pub fn new(config: &AppConfig) -> Result<Self, ChannelError> {
        Ok(Self {
            slack: SlackClient::new(&config.slack)?,
            notion: NotionClient::new(&config.notion)?,
            low_stock_threshold: config.low_stock_threshold,
        })
    }

    /// Routes one event. Returns `None` when no rule matches, the rule is
    /// disabled, or the rule's condition fails against the payload.
    pub async fn notify(
        &self,
        topic: Topic,
        raw: &Value,
        event: &Event,
    ) -> Option<NotifyResults> {
        let rule = rules::rule_for(topic)?;
        if !rule.notify {
            return None;
        }

        if let Some(Condition::LowStock) = rule.condition {
            // Missing `available` counts as out of stock.
            let available = raw.get("available").and_then(Value::as_i64).unwrap_or(0);
            if available > self.low_stock_threshold {
                return None;
            }
        }

        let mut results = NotifyResults::default();

        if rule.channels.contains(&Channel::Slack) && self.slack.is_configured() {
            let message = format::slack_message(topic, raw, rule.priority);
            results.slack = Some(match self.slack.post(&message).await {
                Ok(value) => ChannelOutcome::Delivered(value),
                Err(err) => {
                    tracing::warn!(topic = %topic, error = %err, "slack notification failed");
                    ChannelOutcome::Error {
                        error: err.to_string(),
                    }
                }
            });
        }

        if rule.channels.contains(&Channel::Notion)
            && self.notion.is_configured()
            && self.notion.has_database()
        {
            let properties = notion_properties(topic, raw, event);
            results.notion = Some(match self.notion.create_record(properties).await {
                Ok(value) => ChannelOutcome::Delivered(value),
                Err(err) => {
                    tracing::warn!(topic = %topic, error = %err, "notion logging failed");
                    ChannelOutcome::Error {
                        error: err.to_string(),
                    }
                }
            });
        }

        Some(results)
    }

    pub fn status(&self) -> ChannelStatus {
        let rules = Topic::ALL
            .into_iter()
            .filter_map(|topic| {
                rules::rule_for(topic).map(|rule| RuleStatus {
                    topic,
                    enabled: rule.notify,
                    priority: rule.priority,
                    channels: rule.channels.to_vec(),
                })
            })
            .collect();

        ChannelStatus {
            slack: self.slack.is_configured(),
            notion: self.notion.is_configured(),
            rules,
        }
    }
}

fn notion_properties(topic: Topic, raw: &Value, event: &Event) -> Value {
    json!({
        "Event": { "title": [{ "text": { "content": topic.as_str() } }] },
        "Type": { "select": { "name": event.kind.as_str() } },
        "Summary": { "rich_text": [{ "text": { "content": format::event_summary(topic, raw) } }] },
        "Date": { "date": { "start": Utc::now().to_rfc3339() } },
    })
}
