use std::net::SocketAddr;
use std::sync::Arc;

use khakisol_webhooks::{
    build_app, config::AppConfig, notify::NotificationService, state::AppState, store::EventStore,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Arc::new(AppConfig::from_env());
    if config.api_secret.is_empty() {
        tracing::warn!("SHOPIFY_API_SECRET is not set; webhook signatures will never validate");
    }

    let store = Arc::new(EventStore::open(&config.snapshot_path));
    let notifier = Arc::new(NotificationService::new(&config)?);
    let state = AppState {
        store,
        notifier,
        config: Arc::clone(&config),
    };

    let app = build_app(state);

    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, store = %config.store_url, "webhook server listening");

    // Connect info feeds the loopback-only test-mode bypass.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
