pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod notify;
pub mod state;
pub mod store;
pub mod types;

use axum::{Router, middleware, routing::get};

use crate::state::AppState;

/// Assembles the full router: webhook routes behind signature verification,
/// plus the unauthenticated JSON status surface.
pub fn build_app(state: AppState) -> Router {
    let webhooks = handlers::webhooks::routes().layer(middleware::from_fn_with_state(
        state.clone(),
        auth::verify_shopify_webhook,
    ));

    let api = Router::new()
        .route("/health", get(handlers::dashboard::health))
        .route("/dashboard/json", get(handlers::dashboard::dashboard_json))
        .route(
            "/api/integrations/status",
            get(handlers::dashboard::integrations_status),
        );

    Router::new().merge(webhooks).merge(api).with_state(state)
}
