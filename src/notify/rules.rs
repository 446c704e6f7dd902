use serde::Serialize;

use crate::types::Topic;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Normal,
    Low,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Slack,
    Notion,
}

/// Named predicate evaluated against the raw payload before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Notify only when available quantity is at or below the configured
    /// low-stock threshold.
    LowStock,
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub notify: bool,
    pub priority: Priority,
    pub channels: &'static [Channel],
    pub condition: Option<Condition>,
}

const SLACK_ONLY: &[Channel] = &[Channel::Slack];

/// Static topic-keyed rule table. The domain has a small fixed topic set, so
/// this stays a lookup rather than a rules engine. Topics without an entry
/// are recorded but never notified.
pub fn rule_for(topic: Topic) -> Option<Rule> {
    let rule = match topic {
        Topic::OrdersCreate => Rule {
            notify: true,
            priority: Priority::High,
            channels: SLACK_ONLY,
            condition: None,
        },
        Topic::OrdersFulfilled => Rule {
            notify: true,
            priority: Priority::Normal,
            channels: SLACK_ONLY,
            condition: None,
        },
        Topic::OrdersCancelled => Rule {
            notify: true,
            priority: Priority::High,
            channels: SLACK_ONLY,
            condition: None,
        },
        Topic::InventoryLevelsUpdate => Rule {
            notify: true,
            priority: Priority::Low,
            channels: SLACK_ONLY,
            condition: Some(Condition::LowStock),
        },
        Topic::CustomersCreate => Rule {
            notify: true,
            priority: Priority::Normal,
            channels: SLACK_ONLY,
            condition: None,
        },
        Topic::ProductsCreate => Rule {
            notify: true,
            priority: Priority::Normal,
            channels: SLACK_ONLY,
            condition: None,
        },
        Topic::ProductsDelete => Rule {
            notify: true,
            priority: Priority::High,
            channels: SLACK_ONLY,
            condition: None,
        },
        Topic::RefundsCreate => Rule {
            notify: true,
            priority: Priority::High,
            channels: SLACK_ONLY,
            condition: None,
        },
        Topic::OrdersUpdated
        | Topic::ProductsUpdate
        | Topic::CustomersUpdate
        | Topic::AppUninstalled => return None,
    };
    Some(rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_topics_have_no_rule() {
        assert!(rule_for(Topic::OrdersUpdated).is_none());
        assert!(rule_for(Topic::ProductsUpdate).is_none());
        assert!(rule_for(Topic::CustomersUpdate).is_none());
        assert!(rule_for(Topic::AppUninstalled).is_none());
    }

    #[test]
    fn inventory_rule_is_conditional() {
        let rule = rule_for(Topic::InventoryLevelsUpdate);
        assert!(matches!(
            rule,
            Some(Rule {
                condition: Some(Condition::LowStock),
                priority: Priority::Low,
                ..
            })
        ));
    }
}
