use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use social_login::{
    InMemoryAccountStore, InMemoryCacheStore, InMemoryLinkStore, InMemorySessionStore,
    LoginOrchestrator, ProviderRegistry, ReqwestHttpClient, shared_cache_store,
};
use social_login_axum::{SOCIAL_ROUTE_PREFIX, SocialLoginState, social_login_router};

mod handlers;

use crate::handlers::{index, login};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Providers come from SOCIAL_LOGIN_ORIGIN / SOCIAL_<PROVIDER>_CLIENT_ID /
    // SOCIAL_<PROVIDER>_CLIENT_SECRET in the environment or .env
    let registry = ProviderRegistry::from_env()?;
    if registry.is_empty() {
        tracing::warn!("No providers configured; set SOCIAL_GOOGLE_CLIENT_ID etc.");
    }

    let orchestrator = LoginOrchestrator::new(
        registry,
        shared_cache_store(InMemoryCacheStore::new()),
        Arc::new(ReqwestHttpClient::new()),
        Arc::new(InMemorySessionStore::new()),
        Arc::new(InMemoryAccountStore::new()),
        Arc::new(InMemoryLinkStore::new()),
    );

    let state = SocialLoginState {
        orchestrator: Arc::new(orchestrator),
        default_website_id: 1,
    };

    let app = Router::new()
        .route("/", get(index))
        .route("/login", get(login))
        .nest(SOCIAL_ROUTE_PREFIX.as_str(), social_login_router(state));

    let addr = SocketAddr::from(([0, 0, 0, 0], 3001));
    tracing::info!("Demo listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
