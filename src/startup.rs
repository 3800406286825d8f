//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;

use crate::config::Settings;
use crate::hub::{Hub, HubHandle};
use crate::presentation::http::{handlers::health, routes, Pages};
use crate::presentation::middleware::create_trace_layer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub hub: HubHandle,
    pub pages: Arc<Pages>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Parse the page templates and start the hub.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(settings: Settings) -> Result<Self> {
        let pages = Pages::load()?;
        tracing::info!("Page templates parsed");

        let hub = Hub::spawn();

        Ok(Self {
            hub,
            pages: Arc::new(pages),
            settings: Arc::new(settings),
        })
    }
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
    state: AppState,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        health::init_server_start();

        let addr = settings.server_addr();
        let state = AppState::new(settings)?;

        // Build router with middleware
        let router = routes::create_router(state.clone()).layer(create_trace_layer());

        // Bind to address
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            router,
            state,
        })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Run the server until `shutdown` completes
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Handle to the running hub
    pub fn hub(&self) -> &HubHandle {
        &self.state.hub
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = ?err, "failed to install ctrl-c handler");
    }
    tracing::info!("Shutdown signal received");
}
