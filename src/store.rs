use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::types::{
    ActivityLine, Event, EventData, EventKind, OrderStats, Stats, StatsReport, Summary, Topic,
    TodayBreakdown,
};

/// How many events survive retention trimming, in memory and on disk.
pub const RETENTION_CAP: usize = 1000;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot io: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot parse: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Append-only record of every received webhook with cheap aggregate queries.
///
/// State lives in memory and is rewritten to a JSON snapshot file on every
/// mutation. Persistence is best-effort: a failed read or write is logged and
/// the in-memory state stays authoritative for the life of the process.
pub struct EventStore {
    inner: Mutex<StoreInner>,
    path: PathBuf,
    cap: usize,
}

struct StoreInner {
    events: Vec<Event>,
    stats: Stats,
}

/// On-disk layout: `{ "events": [...], "stats": {...} }`, full rewrite on
/// every mutation, no schema versioning.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    events: Vec<Event>,
    #[serde(default)]
    stats: Stats,
}

/// Constraints for [`EventStore::query`]. All fields optional; an empty
/// filter returns the whole retained history, newest-first.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub kind: Option<EventKind>,
    pub topic: Option<Topic>,
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl EventStore {
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::with_retention(path, RETENTION_CAP)
    }

    /// Like [`EventStore::open`] with a custom retention cap. Mostly useful
    /// for exercising trimming without inserting a thousand events.
    pub fn with_retention(path: impl AsRef<Path>, cap: usize) -> Self {
        let path = path.as_ref().to_path_buf();
        let inner = match load_snapshot(&path) {
            Ok(Some(snapshot)) => {
                tracing::info!(
                    count = snapshot.events.len(),
                    path = %path.display(),
                    "loaded webhook events from snapshot"
                );
                StoreInner {
                    events: snapshot.events,
                    stats: snapshot.stats,
                }
            }
            Ok(None) => StoreInner {
                events: Vec::new(),
                stats: Stats::default(),
            },
            Err(err) => {
                tracing::error!(error = %err, path = %path.display(), "failed to load webhook snapshot");
                StoreInner {
                    events: Vec::new(),
                    stats: Stats::default(),
                }
            }
        };

        Self {
            inner: Mutex::new(inner),
            path,
            cap,
        }
    }

    /// Records a webhook. Never fails from the caller's perspective: the
    /// projection tolerates missing fields and a snapshot write error is
    /// logged, not returned.
    pub fn add_event(&self, kind: EventKind, topic: Topic, raw: Value) -> Event {
        let timestamp = Utc::now();
        let event = Event {
            id: new_event_id(timestamp),
            kind,
            topic,
            timestamp,
            data: EventData::extract(kind, &raw),
            raw,
        };

        let mut inner = self.lock();
        inner.events.push(event.clone());
        let excess = inner.events.len().saturating_sub(self.cap);
        if excess > 0 {
            inner.events.drain(..excess);
        }
        inner.stats.record(&event);

        if let Err(err) = persist(&self.path, &inner) {
            tracing::error!(error = %err, path = %self.path.display(), "failed to save webhook snapshot");
        }

        event
    }

    /// Pure read over the retained history; results are newest-first and
    /// `limit` keeps the most recent matches.
    pub fn query(&self, filter: &EventFilter) -> Vec<Event> {
        let inner = self.lock();
        let mut events: Vec<Event> = inner
            .events
            .iter()
            .filter(|e| filter.kind.is_none_or(|kind| e.kind == kind))
            .filter(|e| filter.topic.is_none_or(|topic| e.topic == topic))
            .filter(|e| filter.since.is_none_or(|since| e.timestamp >= since))
            .cloned()
            .collect();

        if let Some(limit) = filter.limit {
            let skip = events.len().saturating_sub(limit);
            events.drain(..skip);
        }

        events.reverse();
        events
    }

    pub fn stats(&self) -> StatsReport {
        let inner = self.lock();
        let recent_activity = inner
            .events
            .iter()
            .rev()
            .take(5)
            .map(|e| ActivityLine {
                topic: e.topic,
                time: e.timestamp,
                summary: e.data.summary(e.topic),
            })
            .collect();

        StatsReport {
            stats: inner.stats.clone(),
            recent_activity,
        }
    }

    pub fn summary(&self) -> Summary {
        let inner = self.lock();
        let today = Utc::now().date_naive();
        let mut today_events = 0;
        let mut breakdown = TodayBreakdown::default();
        for event in &inner.events {
            if event.timestamp.date_naive() == today {
                today_events += 1;
                breakdown.count(event.kind);
            }
        }

        Summary {
            total_events: inner.stats.total,
            today_events,
            by_topic: inner.stats.by_topic.clone(),
            last_updated: inner.stats.last_updated,
            today_breakdown: breakdown,
        }
    }

    pub fn order_stats(&self) -> OrderStats {
        let inner = self.lock();
        let mut stats = OrderStats::default();
        let mut revenue = 0.0_f64;

        for event in &inner.events {
            match event.topic {
                Topic::OrdersCreate => {
                    stats.total_orders += 1;
                    if let EventData::Order {
                        total, item_count, ..
                    } = &event.data
                    {
                        revenue += total.parse::<f64>().unwrap_or(0.0);
                        stats.total_items += *item_count as u64;
                    }
                }
                Topic::OrdersFulfilled => stats.fulfilled += 1,
                Topic::OrdersCancelled => stats.cancelled += 1,
                _ => {}
            }
        }

        stats.total_revenue = format!("{revenue:.2}");
        stats
    }

    /// Drops all events and counters and rewrites the snapshot.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.events.clear();
        inner.stats = Stats::default();
        if let Err(err) = persist(&self.path, &inner) {
            tracing::error!(error = %err, path = %self.path.display(), "failed to save webhook snapshot");
        }
    }

    // A poisoned mutex only means another handler panicked mid-insert; the
    // data itself is still a consistent snapshot-of-last-write.
    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn load_snapshot(path: &Path) -> Result<Option<Snapshot>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&contents)?))
}

fn persist(path: &Path, inner: &StoreInner) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let snapshot = Snapshot {
        events: inner.events.clone(),
        stats: inner.stats.clone(),
    };
    fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;
    Ok(())
}

fn new_event_id(timestamp: DateTime<Utc>) -> String {
    let suffix: String = rand::rng()
        .sample_iter(rand::distr::Alphanumeric)
        .take(9)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    format!("evt_{}_{suffix}", timestamp.timestamp_millis())
}
