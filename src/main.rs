use std::sync::Arc;

use instastore::advisor::{self, Responder, SilentResponder, WebhookResponder};
use instastore::app::{self, AppState};
use instastore::config::StoreConfig;
use instastore::store::{KeyValueStore, LibSqlStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = StoreConfig::from_env()?;

    eprintln!("🛒 Instastore v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://0.0.0.0:{}/api/products", config.port);

    // ── Storage ─────────────────────────────────────────────────────────
    let store: Arc<dyn KeyValueStore> = Arc::new(
        LibSqlStore::new_local(&config.db_path)
            .await
            .unwrap_or_else(|e| {
                eprintln!(
                    "Error: Failed to open database at {}: {}",
                    config.db_path.display(),
                    e
                );
                std::process::exit(1);
            }),
    );
    eprintln!("   Database: {}", config.db_path.display());

    // ── Advisor ─────────────────────────────────────────────────────────
    let responder: Arc<dyn Responder> = match config.webhook_url {
        Some(ref url) => {
            eprintln!(
                "   Advisor webhook: {} (timeout {}s)",
                url,
                config.responder_timeout.as_secs()
            );
            Arc::new(WebhookResponder::new(url.clone(), config.responder_timeout)?)
        }
        None => {
            eprintln!("   Advisor webhook: none (scripted prompts only)");
            Arc::new(SilentResponder)
        }
    };

    let state = AppState::build(store, config.admin.clone(), responder).await?;
    eprintln!("   Products: {}", state.catalog.list().await.len());
    eprintln!(
        "   Chat sessions expire after {}s idle\n",
        config.chat_idle_ttl.as_secs()
    );

    advisor::spawn_expiry_task(Arc::clone(&state.chats), config.chat_idle_ttl);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Instastore API started");
    axum::serve(listener, app::router(state)).await?;

    Ok(())
}
