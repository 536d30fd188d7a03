//! HTTP surface of the support chat: `GET /` and `POST /chat`.

use std::{env, sync::Arc};

mod app;
mod error_handler;
mod middleware_layer;
mod routes;

pub use app::app_state::AppState;
pub use app::http::response_envelope::{ApiError, ApiErrorDetail, ErrorEnvelope};
pub use error_handler::{AppError, AppResult};
pub use middleware_layer::error_envelope::REQUEST_ID_HEADER;
pub use routes::chat::chat_route::CHAT_OUTCOME_HEADER;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::signal;
use tracing::{error, info};

use crate::{
    middleware_layer::error_envelope::error_envelope,
    routes::{chat::chat_route::chat, index_route::index},
};

pub const DEFAULT_API_ADDRESS: &str = "0.0.0.0:8080";

/// Builds the state from env, binds `API_ADDRESS` and serves until Ctrl+C.
pub async fn start() -> AppResult<()> {
    let host_url = env::var("API_ADDRESS")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_ADDRESS.to_string());

    let state = Arc::new(AppState::from_env()?);
    let app = router(state);

    // Bind to address
    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(|source| AppError::Bind {
            address: host_url.clone(),
            source,
        })?;
    info!(address = %host_url, "support chat listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// Routes and middleware over the given state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/chat", post(chat))
        .layer(middleware::from_fn(error_envelope))
        .with_state(state)
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => {
            error!(error = %e, "failed to listen for shutdown signal; serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
