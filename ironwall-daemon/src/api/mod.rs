//! HTTP API for the browser dashboard.
//!
//! | Method | Path          | Body         | Response                      |
//! |--------|---------------|--------------|-------------------------------|
//! | GET    | `/rules`      |              | rules in evaluation order     |
//! | POST   | `/rules`      | `RuleSpec`   | created rule, or 422          |
//! | DELETE | `/rules/{id}` |              | `{status, message}`, always 200 |
//! | POST   | `/simulate`   | `PacketSpec` | audit log entry, or 422       |
//! | GET    | `/logs`       |              | entries, oldest first         |
//! | GET    | `/health`     |              | liveness and counters         |

mod error;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{delete, get};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use ironwall_core::config::ApiConfig;
use ironwall_rule_engine::Simulator;

pub use error::ApiError;
pub use handlers::{DeleteResponse, HealthResponse};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    simulator: Arc<Simulator>,
}

impl AppState {
    /// Wrap a simulator for use by the handlers.
    pub fn new(simulator: Arc<Simulator>) -> Self {
        Self { simulator }
    }

    /// The simulator backing this API.
    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }
}

/// Build the API router.
///
/// When `allow_any_origin` is set, permissive CORS headers are added so a
/// dashboard served from another origin can call the API.
pub fn router(state: AppState, allow_any_origin: bool) -> Router {
    let router = Router::new()
        .route(
            "/rules",
            get(handlers::list_rules).post(handlers::create_rule),
        )
        .route("/rules/{id}", delete(handlers::delete_rule))
        .route("/simulate", axum::routing::post(handlers::simulate))
        .route("/logs", get(handlers::list_logs))
        .route("/health", get(handlers::health))
        .with_state(state);

    if allow_any_origin {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}

/// Bind the API listener and serve until `shutdown` resolves.
pub async fn serve<F>(config: &ApiConfig, simulator: Arc<Simulator>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = format!("{}:{}", config.listen_addr, config.port)
        .parse()
        .with_context(|| format!("invalid api listen address '{}'", config.listen_addr))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind api listener on {addr}"))?;

    if addr.ip().is_unspecified() {
        tracing::warn!(
            listen_addr = %addr,
            "api is exposed on all interfaces; it has no authentication"
        );
    }

    let app = router(AppState::new(simulator), config.allow_any_origin);

    tracing::info!(listen_addr = %addr, cors = config.allow_any_origin, "api server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("api server terminated with an error")?;

    tracing::info!("api server stopped");
    Ok(())
}
