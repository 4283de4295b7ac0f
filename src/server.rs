use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{ApiConfig, AppConfig};
use crate::handlers::{protected, public};
use crate::middleware::require_identity;
use crate::state::AppState;

const DEFAULT_LOG_FILTER: &str = "artenact_api=info,artenact=info,tower_http=info";

/// Install the fmt subscriber; `RUST_LOG` overrides the default filter
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub fn app(state: AppState, api: &ApiConfig) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected API
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(DefaultBodyLimit::max(api.max_request_size_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state);

    if api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/profile", get(protected::profile_get).post(protected::profile_post))
        .route("/api/story/refine", post(protected::story_refine))
        // route_layer: unknown paths still 404 instead of demanding a token
        .route_layer(from_fn_with_state(state, require_identity))
}

/// Initialise collaborators, serve until a shutdown signal, then tear down
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    info!("Starting Artenact API in {:?} mode", config.environment);

    let state = AppState::init(&config).await?;
    let app = app(state.clone(), &config.api);

    let bind_addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Artenact API listening on http://{}", bind_addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error");

    state.shutdown().await;
    info!("Shutdown complete");
    served
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
