//! Content gateway for the Phezulu Cyber site.
//!
//! Serves pillars, insights, partners, photos and employees resolved from the site API,
//! falling back to the bundled catalog whenever the API is unreachable, slow or returns
//! something unusable. Pages built on top of the gateway never render empty.
//!
//!
//!
//! # Routes
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | GET | `/content/{kind}` | `pillars`, `insights`, `partners`, `photos`, `employees` |
//! | GET | `/content/pillars/{slug}` | Single pillar, 404 if unknown |
//! | GET | `/content/pillars/{slug}/services/{service}` | Single service detail |
//! | GET | `/content/insights/{slug}` | Single insight |
//! | GET | `/status` | Live status or the catalog default |
//! | POST | `/contact` | 422 with a message when the form is invalid |
//! | POST | `/cache/invalidate` | Bearer `ADMIN_TOKEN`, drops every cached kind |
//! | POST | `/cache/invalidate/{kind}` | Bearer `ADMIN_TOKEN`, drops one kind |
//!
//! Slugs compare case and punctuation insensitively, so `/content/pillars/AI%20+%20Data%20Services`
//! and `/content/pillars/ai-data-services` name the same pillar.
//!
//!
//!
//! # Caching
//!
//! Each kind is fetched once per process and kept until an admin invalidates it. Admin
//! screens should call the invalidation route after saving so visitors see the edit
//! without a restart. Failed fetches are never cached.
//!
//!
//!
//! # Environment
//!
//! | Variable | Default |
//! |----------|---------|
//! | `RUST_PORT` | `1111` |
//! | `PHEZULU_API_URL` | `http://localhost:5000` |
//! | `INSIGHTS_TIMEOUT_MS` | `1500` |
//! | `CONTACT_FALLBACK_DELAY_MS` | `1500` |
//! | `ADMIN_TOKEN` | unset, or `/run/secrets/ADMIN_TOKEN` |
//! | `RUST_LOG` | unset |
//!
//!
//!
//! # Setup
//!
//! Run against a local API.
//! ```sh
//! PHEZULU_API_URL=http://localhost:5000 RUST_LOG=info cargo run -p backend
//! ```
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use catalog::models::{Employee, Insight, Partner, Photo, Pillar};
use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use routes::{
    contact_handler, insight_handler, invalidate_all_handler, invalidate_handler, list_handler,
    pillar_handler, service_handler, status_handler,
};
use state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/content/pillars", get(list_handler::<Pillar>))
        .route("/content/pillars/{slug}", get(pillar_handler))
        .route(
            "/content/pillars/{slug}/services/{service}",
            get(service_handler),
        )
        .route("/content/insights", get(list_handler::<Insight>))
        .route("/content/insights/{slug}", get(insight_handler))
        .route("/content/partners", get(list_handler::<Partner>))
        .route("/content/photos", get(list_handler::<Photo>))
        .route("/content/employees", get(list_handler::<Employee>))
        .route("/status", get(status_handler))
        .route("/contact", post(contact_handler))
        .route("/cache/invalidate", post(invalidate_all_handler))
        .route("/cache/invalidate/{kind}", post(invalidate_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new();
    info!(
        "Fallback catalog v{} with {} pillars",
        state.resolver.catalog().version,
        state.resolver.catalog().pillars.len()
    );

    info!("Starting server...");
    let app = build_router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
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
}
