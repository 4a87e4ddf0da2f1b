//! HTTP API server for the mushroom bot

pub mod health;
pub mod webhooks;

use std::sync::Arc;

use axum::Router;
use secrecy::SecretString;
use axum::routing::post;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use self::webhooks::telegram::{self, UpdateProcessor};
use crate::Result;

/// Shared state for API handlers
pub struct ApiState {
    pub processor: Arc<UpdateProcessor>,
    /// Expected `X-Telegram-Bot-Api-Secret-Token`, when configured
    pub webhook_secret: Option<SecretString>,
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    processor: Arc<UpdateProcessor>,
    port: u16,
    webhook_secret: Option<SecretString>,
}

impl ApiServerBuilder {
    /// Create a new API server builder
    #[must_use]
    pub fn new(processor: Arc<UpdateProcessor>, port: u16) -> Self {
        Self {
            processor,
            port,
            webhook_secret: None,
        }
    }

    /// Require Telegram's secret token header on webhook requests
    #[must_use]
    pub fn webhook_secret(mut self, secret: Option<SecretString>) -> Self {
        self.webhook_secret = secret;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        ApiServer {
            state: Arc::new(ApiState {
                processor: self.processor,
                webhook_secret: self.webhook_secret,
            }),
            port: self.port,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    /// Build the router with all routes
    ///
    /// The webhook is served both at `/` and at `/api/webhooks/telegram`.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", post(telegram::handle_update))
            .with_state(self.state.clone())
            .nest("/api/webhooks", webhooks::router(self.state.clone()))
            .merge(health::router())
            .layer(TraceLayer::new_for_http())
    }

    /// Run the API server until SIGINT or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        tracing::info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
            sigterm.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
