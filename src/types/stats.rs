use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Event, EventKind, Topic};

/// Rolling counters maintained incrementally on every insert and persisted
/// alongside the event list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Stats {
    pub total: u64,
    pub by_topic: BTreeMap<String, u64>,
    pub by_hour: BTreeMap<String, u64>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Number of hour buckets retained in `by_hour`.
const HOUR_BUCKETS: usize = 24;

impl Stats {
    pub fn record(&mut self, event: &Event) {
        self.total += 1;
        self.last_updated = Some(event.timestamp);

        *self
            .by_topic
            .entry(event.topic.as_str().to_string())
            .or_insert(0) += 1;

        let hour = event.timestamp.format("%Y-%m-%dT%H").to_string();
        *self.by_hour.entry(hour).or_insert(0) += 1;
        while self.by_hour.len() > HOUR_BUCKETS {
            let Some(oldest) = self.by_hour.keys().next().cloned() else {
                break;
            };
            self.by_hour.remove(&oldest);
        }
    }
}

/// `Stats` plus a short digest of the latest events.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    #[serde(flatten)]
    pub stats: Stats,
    pub recent_activity: Vec<ActivityLine>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLine {
    pub topic: Topic,
    pub time: DateTime<Utc>,
    pub summary: String,
}

/// Headline numbers for the dashboard: lifetime totals plus today's slice.
/// "Today" is an ISO-date prefix match against now, not a rolling window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_events: u64,
    pub today_events: usize,
    pub by_topic: BTreeMap<String, u64>,
    pub last_updated: Option<DateTime<Utc>>,
    pub today_breakdown: TodayBreakdown,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct TodayBreakdown {
    pub orders: usize,
    pub products: usize,
    pub inventory: usize,
    pub customers: usize,
}

impl TodayBreakdown {
    pub fn count(&mut self, kind: EventKind) {
        match kind {
            EventKind::Order => self.orders += 1,
            EventKind::Product => self.products += 1,
            EventKind::Inventory => self.inventory += 1,
            EventKind::Customer => self.customers += 1,
            EventKind::Refund | EventKind::App => {}
        }
    }
}

/// Aggregates over order events: revenue and item totals come from
/// `orders/create` only; fulfilled/cancelled are lifecycle counters.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total_orders: u64,
    pub total_revenue: String,
    pub total_items: u64,
    pub fulfilled: usize,
    pub cancelled: usize,
}
