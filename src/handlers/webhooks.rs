use axum::{Router, body::Bytes, extract::State, routing::post};
use chrono::Utc;
use serde_json::{Value, json};

use crate::{error::ApiError, state::AppState, types::Topic};

/// One POST route per Shopify topic. The route table is the single place the
/// route -> topic mapping is spelled out; nothing is inferred from the path.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/webhooks/orders/create", post(orders_create))
        .route("/webhooks/orders/updated", post(orders_updated))
        .route("/webhooks/orders/fulfilled", post(orders_fulfilled))
        .route("/webhooks/orders/cancelled", post(orders_cancelled))
        .route("/webhooks/products/create", post(products_create))
        .route("/webhooks/products/update", post(products_update))
        .route("/webhooks/products/delete", post(products_delete))
        .route(
            "/webhooks/inventory_levels/update",
            post(inventory_levels_update),
        )
        .route("/webhooks/customers/create", post(customers_create))
        .route("/webhooks/customers/update", post(customers_update))
        .route("/webhooks/refunds/create", post(refunds_create))
        .route("/webhooks/app/uninstalled", post(app_uninstalled))
}

async fn orders_create(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    ingest(&state, Topic::OrdersCreate, &body).await
}

async fn orders_updated(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    ingest(&state, Topic::OrdersUpdated, &body).await
}

async fn orders_fulfilled(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    ingest(&state, Topic::OrdersFulfilled, &body).await
}

async fn orders_cancelled(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    ingest(&state, Topic::OrdersCancelled, &body).await
}

async fn products_create(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    ingest(&state, Topic::ProductsCreate, &body).await
}

async fn products_update(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    ingest(&state, Topic::ProductsUpdate, &body).await
}

async fn products_delete(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    ingest(&state, Topic::ProductsDelete, &body).await
}

async fn inventory_levels_update(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    ingest(&state, Topic::InventoryLevelsUpdate, &body).await
}

async fn customers_create(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    ingest(&state, Topic::CustomersCreate, &body).await
}

async fn customers_update(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    ingest(&state, Topic::CustomersUpdate, &body).await
}

async fn refunds_create(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    ingest(&state, Topic::RefundsCreate, &body).await
}

/// Shopify sends no useful body on uninstall; record the moment instead.
async fn app_uninstalled(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    let payload = json!({ "timestamp": Utc::now() });
    record_and_notify(&state, Topic::AppUninstalled, payload).await
}

async fn ingest(state: &AppState, topic: Topic, body: &Bytes) -> Result<&'static str, ApiError> {
    let payload: Value = serde_json::from_slice(body)
        .map_err(|_| ApiError::BadRequest("body must be valid JSON".to_string()))?;
    record_and_notify(state, topic, payload).await
}

/// Records the event and fans out notifications. Once the signature has been
/// verified the response is always `200 OK`: Shopify treats non-200 as
/// failure-and-retry, so downstream trouble is a logging concern only.
async fn record_and_notify(
    state: &AppState,
    topic: Topic,
    payload: Value,
) -> Result<&'static str, ApiError> {
    let event = state.store.add_event(topic.kind(), topic, payload);
    tracing::info!(
        topic = %topic,
        event_id = %event.id,
        summary = %event.data.summary(topic),
        "webhook recorded"
    );

    if let Some(results) = state.notifier.notify(topic, &event.raw, &event).await {
        let delivered = |outcome: &Option<crate::notify::ChannelOutcome>| {
            outcome.as_ref().is_some_and(|o| o.is_delivered())
        };
        tracing::info!(
            topic = %topic,
            slack = delivered(&results.slack),
            notion = delivered(&results.notion),
            "notifications dispatched"
        );
    }

    Ok("OK")
}
