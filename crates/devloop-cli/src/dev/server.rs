//! Development server: static files plus the reload push channel on one
//! listener.

use crate::dev::headers;
use crate::dev::reload::RELOAD_ENDPOINT;
use crate::dev::SharedState;
use crate::error::{CliError, Result};
use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response, Sse},
    routing::get,
    Router,
};
use std::net::SocketAddr;

/// Development server.
pub struct DevServer {
    addr: SocketAddr,
    state: SharedState,
}

impl DevServer {
    pub fn new(addr: SocketAddr, state: SharedState) -> Self {
        Self { addr, state }
    }

    /// Bind and serve until the task is dropped.
    ///
    /// Push channels never end on their own, so shutdown is done by
    /// aborting this future rather than draining connections.
    ///
    /// # Errors
    ///
    /// Returns error if server cannot bind to configured address
    pub async fn start(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", self.addr, e)))?;

        crate::ui::success(&format!("Development server running at http://{}", self.addr));

        axum::serve(listener, router(self.state))
            .await
            .map_err(|e| CliError::Server(format!("Server error: {}", e)))?;

        Ok(())
    }
}

/// Build the axum router with all routes.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route(RELOAD_ENDPOINT, get(handle_reload_stream))
        .fallback(handle_static)
        .layer(headers::opener_policy_layer())
        .layer(headers::embedder_policy_layer())
        .layer(headers::no_cache_layer())
        .with_state(state)
}

/// Open a push channel for one browser tab.
async fn handle_reload_stream(State(state): State<SharedState>) -> impl IntoResponse {
    let stream = state.reload.subscribe();
    tracing::debug!(clients = state.reload.client_count(), "reload client connected");

    ([(header::CONNECTION, "keep-alive")], Sse::new(stream))
}

/// Serve a file, or the entry page for anything unmatched.
async fn handle_static(State(state): State<SharedState>, uri: Uri) -> Response {
    match state.files.respond(uri.path()).await {
        Ok(file) => ([(header::CONTENT_TYPE, file.content_type)], file.body).into_response(),
        Err(e) => {
            tracing::error!(path = uri.path(), error = %e, "failed to serve entry page");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                e.to_string(),
            )
                .into_response()
        }
    }
}
