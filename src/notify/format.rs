use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::types::Topic;
use crate::types::event::{array_len, i64_field, str_field, str_field_or};

use super::rules::Priority;

/// Slack message with classic attachment formatting: a colored bar keyed by
/// priority, a title line, a body line, and zero or more short fields.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SlackMessage {
    pub text: String,
    pub attachments: Vec<SlackAttachment>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SlackAttachment {
    pub color: &'static str,
    pub title: String,
    pub text: String,
    pub fields: Vec<SlackField>,
    pub footer: &'static str,
    pub footer_icon: &'static str,
    pub ts: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SlackField {
    pub title: &'static str,
    pub value: String,
    pub short: bool,
}

const FOOTER: &str = "KhakiSol.com | Webhook Server";
const FOOTER_ICON: &str = "https://khakisol.com/favicon.ico";

fn color(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "#ff0000",
        Priority::Normal => "#36a64f",
        Priority::Low => "#cccccc",
    }
}

fn icon(topic: Topic) -> &'static str {
    match topic {
        Topic::OrdersCreate => "\u{1f6d2}",
        Topic::OrdersFulfilled => "\u{2705}",
        Topic::OrdersCancelled => "\u{274c}",
        Topic::OrdersUpdated | Topic::ProductsUpdate => "\u{1f4dd}",
        Topic::InventoryLevelsUpdate => "\u{1f4e6}",
        Topic::CustomersCreate => "\u{1f464}",
        Topic::ProductsCreate => "\u{1f195}",
        Topic::ProductsDelete => "\u{1f5d1}\u{fe0f}",
        Topic::RefundsCreate => "\u{1f4b8}",
        Topic::CustomersUpdate | Topic::AppUninstalled => "\u{1f4e1}",
    }
}

/// Builds the channel message for a topic. Pure function of
/// `(topic, payload, priority)`; unknown shapes degrade to a generic line.
pub fn slack_message(topic: Topic, raw: &Value, priority: Priority) -> SlackMessage {
    let icon = icon(topic);
    let (title, text, fields) = match topic {
        Topic::OrdersCreate => (
            format!("{icon} New Order #{}", num(raw, "order_number")),
            format!("Customer: {}", order_customer_line(raw)),
            vec![
                field(
                    "Total",
                    format!("{} {}", str_field(raw, "total_price"), str_field(raw, "currency")),
                ),
                field("Items", array_len(raw, "line_items").to_string()),
            ],
        ),
        Topic::OrdersFulfilled => (
            format!("{icon} Order Fulfilled #{}", num(raw, "order_number")),
            format!("Tracking: {}", tracking_number(raw)),
            Vec::new(),
        ),
        Topic::OrdersCancelled => (
            format!("{icon} Order Cancelled #{}", num(raw, "order_number")),
            format!(
                "Reason: {}",
                str_field_or(raw, "cancel_reason", "Not specified")
            ),
            vec![field(
                "Refund",
                if array_len(raw, "refunds") > 0 { "Yes" } else { "No" }.to_string(),
            )],
        ),
        Topic::InventoryLevelsUpdate => (
            format!("{icon} Low Stock Alert"),
            format!("Inventory level: {} units", num(raw, "available")),
            vec![
                field("Item ID", num(raw, "inventory_item_id")),
                field("Available", num(raw, "available")),
            ],
        ),
        Topic::CustomersCreate => (
            format!("{icon} New Customer"),
            customer_line(raw),
            Vec::new(),
        ),
        Topic::ProductsCreate => (
            format!("{icon} New Product Created"),
            str_field(raw, "title"),
            vec![
                field("Vendor", str_field_or(raw, "vendor", "N/A")),
                field("Variants", array_len(raw, "variants").to_string()),
            ],
        ),
        Topic::ProductsDelete => (
            format!("{icon} Product Deleted"),
            format!("Product ID: {}", num(raw, "id")),
            Vec::new(),
        ),
        Topic::RefundsCreate => (
            format!("{icon} Refund Issued"),
            format!("Order #{}", num(raw, "order_id")),
            vec![field("Amount", refund_amount(raw))],
        ),
        _ => (
            format!("{icon} {topic}"),
            "Webhook received".to_string(),
            Vec::new(),
        ),
    };

    SlackMessage {
        text: title.clone(),
        attachments: vec![SlackAttachment {
            color: color(priority),
            title,
            text,
            fields,
            footer: FOOTER,
            footer_icon: FOOTER_ICON,
            ts: Utc::now().timestamp(),
        }],
    }
}

/// One-line record summary for the doc-log channel, keyed by topic.
pub fn event_summary(topic: Topic, raw: &Value) -> String {
    match topic {
        Topic::OrdersCreate => format!(
            "Order #{} - {} {}",
            num(raw, "order_number"),
            str_field(raw, "total_price"),
            str_field(raw, "currency")
        ),
        Topic::OrdersFulfilled => format!("Order #{} fulfilled", num(raw, "order_number")),
        Topic::OrdersCancelled => format!("Order #{} cancelled", num(raw, "order_number")),
        Topic::CustomersCreate => customer_line(raw),
        Topic::ProductsCreate => str_field(raw, "title"),
        Topic::InventoryLevelsUpdate => format!("Stock: {} units", num(raw, "available")),
        _ => topic.as_str().to_string(),
    }
}

fn field(title: &'static str, value: String) -> SlackField {
    SlackField {
        title,
        value,
        short: true,
    }
}

fn num(raw: &Value, key: &str) -> String {
    i64_field(raw, key).map_or_else(|| "?".to_string(), |n| n.to_string())
}

fn order_customer_line(raw: &Value) -> String {
    let customer = raw.get("customer").cloned().unwrap_or(Value::Null);
    let first = str_field(&customer, "first_name");
    let last = str_field(&customer, "last_name");
    if last.is_empty() {
        format!("{first} {}", str_field(raw, "email")).trim().to_string()
    } else {
        format!("{first} {last}")
    }
}

fn customer_line(raw: &Value) -> String {
    format!(
        "{} {} ({})",
        str_field(raw, "first_name"),
        str_field(raw, "last_name"),
        str_field(raw, "email")
    )
}

fn tracking_number(raw: &Value) -> String {
    raw.get("fulfillments")
        .and_then(Value::as_array)
        .and_then(|f| f.first())
        .and_then(|f| f.get("tracking_number"))
        .and_then(Value::as_str)
        .unwrap_or("N/A")
        .to_string()
}

fn refund_amount(raw: &Value) -> String {
    raw.get("transactions")
        .and_then(Value::as_array)
        .and_then(|t| t.first())
        .and_then(|t| t.get("amount"))
        .and_then(Value::as_str)
        .unwrap_or("N/A")
        .to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn order_create_message_has_total_and_items() {
        let raw = json!({
            "order_number": 1001,
            "total_price": "49.99",
            "currency": "USD",
            "email": "a@b.co",
            "customer": { "first_name": "A", "last_name": "B" },
            "line_items": [{}, {}]
        });

        let message = slack_message(Topic::OrdersCreate, &raw, Priority::High);
        assert!(message.text.contains("New Order #1001"));
        let attachment = &message.attachments[0];
        assert_eq!(attachment.color, "#ff0000");
        assert_eq!(attachment.text, "Customer: A B");
        assert_eq!(attachment.fields[0].value, "49.99 USD");
        assert_eq!(attachment.fields[1].value, "2");
    }

    #[test]
    fn cancelled_order_reports_refund_presence() {
        let raw = json!({ "order_number": 5, "refunds": [{}] });
        let message = slack_message(Topic::OrdersCancelled, &raw, Priority::High);
        let attachment = &message.attachments[0];
        assert_eq!(attachment.text, "Reason: Not specified");
        assert_eq!(attachment.fields[0].value, "Yes");
    }

    #[test]
    fn unlisted_topic_gets_generic_line() {
        let message = slack_message(Topic::AppUninstalled, &json!({}), Priority::Normal);
        assert_eq!(message.attachments[0].text, "Webhook received");
        assert_eq!(message.attachments[0].color, "#36a64f");
    }

    #[test]
    fn summaries_follow_topic() {
        let raw = json!({ "order_number": 8, "total_price": "12.00", "currency": "EUR" });
        assert_eq!(
            event_summary(Topic::OrdersCreate, &raw),
            "Order #8 - 12.00 EUR"
        );
        assert_eq!(event_summary(Topic::OrdersFulfilled, &raw), "Order #8 fulfilled");
        assert_eq!(
            event_summary(Topic::ProductsDelete, &raw),
            "products/delete"
        );
    }
}
