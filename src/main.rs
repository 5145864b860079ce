//! Entry point: load config, wire dependencies, and run the server.

use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use userauth::auth::{PasswordHasher, TokenService};
use userauth::config::{Config, StorageBackend};
use userauth::db::{self, PgUserStore};
use userauth::repositories::{InMemoryUserStore, UserStore};
use userauth::{create_app, AppState, CredentialService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.uses_default_secret() {
        tracing::warn!("JWT_SECRET not set; using the development default");
    }

    let store: Arc<dyn UserStore> = match config.storage {
        StorageBackend::Postgres => {
            let pool = db::create_pool(&config.database_url).await?;
            db::ensure_schema(&pool).await?;
            Arc::new(PgUserStore::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory user store; data is lost on exit");
            Arc::new(InMemoryUserStore::new())
        }
    };

    let hasher = PasswordHasher::with_cost(
        config.hash_memory_kib,
        config.hash_iterations,
        config.hash_parallelism,
    )?;
    let tokens = TokenService::new(config.jwt_secret.as_bytes())?;
    let state = AppState::new(CredentialService::new(store, hasher), tokens);

    let app = create_app(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!(addr = %config.server_addr, storage = ?config.storage, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
