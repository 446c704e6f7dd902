use axum::{Json, extract::State};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};

use crate::{
    notify::ChannelStatus,
    state::AppState,
    store::EventFilter,
    types::{Event, OrderStats, StatsReport, Summary},
};

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now(),
        "store": state.config.store_url,
    }))
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub summary: Summary,
    pub stats: StatsReport,
    pub orders: OrderStats,
    pub events: Vec<Event>,
}

pub async fn dashboard_json(State(state): State<AppState>) -> Json<DashboardResponse> {
    Json(DashboardResponse {
        summary: state.store.summary(),
        stats: state.store.stats(),
        orders: state.store.order_stats(),
        events: state.store.query(&EventFilter::default()),
    })
}

pub async fn integrations_status(State(state): State<AppState>) -> Json<ChannelStatus> {
    Json(state.notifier.status())
}
